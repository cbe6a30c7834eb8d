use ndarray::{Array1, ArrayView1, ArrayViewMut1};

/// Right-hand side of the semi-discrete system `du/dt = L(t, u)`.
pub trait OdeRhs {
    fn compute_derivative(&mut self, t: f64, u: ArrayView1<f64>, dudt: ArrayViewMut1<f64>);
}

/// Explicit single-step integrator advancing `u` and `t` in place.
pub trait OdeSolver {
    fn step(&mut self, rhs: &mut dyn OdeRhs, u: &mut Array1<f64>, t: &mut f64, dt: f64);
    fn name(&self) -> &'static str;
}

pub fn ode_solver_from_id(id: i64, dof_num: usize) -> Result<Box<dyn OdeSolver>, String> {
    match id {
        1 => Ok(Box::new(ForwardEuler::new(dof_num))),
        2 => Ok(Box::new(Rk2Ssp::new(dof_num))),
        3 => Ok(Box::new(Rk3Ssp::new(dof_num))),
        _ => Err(format!("Unknown ODE solver type: {}", id)),
    }
}

pub struct ForwardEuler {
    dudt: Array1<f64>,
}

impl ForwardEuler {
    pub fn new(dof_num: usize) -> ForwardEuler {
        ForwardEuler {
            dudt: Array1::zeros(dof_num),
        }
    }
}

impl OdeSolver for ForwardEuler {
    fn step(&mut self, rhs: &mut dyn OdeRhs, u: &mut Array1<f64>, t: &mut f64, dt: f64) {
        rhs.compute_derivative(*t, u.view(), self.dudt.view_mut());
        u.scaled_add(dt, &self.dudt);
        *t += dt;
    }

    fn name(&self) -> &'static str {
        "Forward Euler"
    }
}

pub struct Rk2Ssp {
    dudt: Array1<f64>,
    u1: Array1<f64>,
}

impl Rk2Ssp {
    pub fn new(dof_num: usize) -> Rk2Ssp {
        Rk2Ssp {
            dudt: Array1::zeros(dof_num),
            u1: Array1::zeros(dof_num),
        }
    }
}

impl OdeSolver for Rk2Ssp {
    fn step(&mut self, rhs: &mut dyn OdeRhs, u: &mut Array1<f64>, t: &mut f64, dt: f64) {
        // Shu-Osher form: convex combinations of forward-Euler substeps
        rhs.compute_derivative(*t, u.view(), self.dudt.view_mut());
        self.u1.assign(u);
        self.u1.scaled_add(dt, &self.dudt);

        rhs.compute_derivative(*t + dt, self.u1.view(), self.dudt.view_mut());
        self.u1.scaled_add(dt, &self.dudt);
        for (ui, &u1i) in u.iter_mut().zip(self.u1.iter()) {
            *ui = 0.5 * *ui + 0.5 * u1i;
        }
        *t += dt;
    }

    fn name(&self) -> &'static str {
        "RK2 SSP"
    }
}

pub struct Rk3Ssp {
    dudt: Array1<f64>,
    u1: Array1<f64>,
    u2: Array1<f64>,
}

impl Rk3Ssp {
    pub fn new(dof_num: usize) -> Rk3Ssp {
        Rk3Ssp {
            dudt: Array1::zeros(dof_num),
            u1: Array1::zeros(dof_num),
            u2: Array1::zeros(dof_num),
        }
    }
}

impl OdeSolver for Rk3Ssp {
    fn step(&mut self, rhs: &mut dyn OdeRhs, u: &mut Array1<f64>, t: &mut f64, dt: f64) {
        rhs.compute_derivative(*t, u.view(), self.dudt.view_mut());
        self.u1.assign(u);
        self.u1.scaled_add(dt, &self.dudt);

        rhs.compute_derivative(*t + dt, self.u1.view(), self.dudt.view_mut());
        self.u1.scaled_add(dt, &self.dudt);
        self.u2.assign(u);
        for (u2i, &u1i) in self.u2.iter_mut().zip(self.u1.iter()) {
            *u2i = 0.75 * *u2i + 0.25 * u1i;
        }

        rhs.compute_derivative(*t + 0.5 * dt, self.u2.view(), self.dudt.view_mut());
        self.u2.scaled_add(dt, &self.dudt);
        for (ui, &u2i) in u.iter_mut().zip(self.u2.iter()) {
            *ui = *ui / 3.0 + 2.0 / 3.0 * u2i;
        }
        *t += dt;
    }

    fn name(&self) -> &'static str {
        "RK3 SSP"
    }
}
