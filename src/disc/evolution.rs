use ndarray::{Array1, ArrayView1, ArrayViewMut1};

use crate::disc::comm::Communicator;
use crate::disc::dof_info::DofInfo;
use crate::disc::fe_space::FeSpace1d;
use crate::disc::physics::HyperbolicSystem;
use crate::temporal_disc::OdeRhs;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EvolutionScheme {
    Standard,
    MonolithicConvexLimiting,
}

impl EvolutionScheme {
    pub fn from_id(id: i64) -> Result<EvolutionScheme, String> {
        match id {
            0 => Ok(EvolutionScheme::Standard),
            1 => Ok(EvolutionScheme::MonolithicConvexLimiting),
            _ => Err(format!("Unknown evolution scheme: {}", id)),
        }
    }
}

/// Semi-discrete evolution operator: turns the current solution into its
/// time derivative under the selected scheme.
///
/// Standard is the lumped-mass group-FEM Galerkin residual (high order, no
/// bounds guarantee). MonolithicConvexLimiting augments the bar-state
/// low-order scheme with per-edge antidiffusive fluxes, each clipped so
/// that one forward-Euler substep keeps both endpoint DOFs inside the
/// bounds of the DOF bounds engine. Every limited flux is computed once per
/// undirected edge and applied with opposite signs to its endpoints, so the
/// pairwise corrections cancel exactly in the global mass balance.
pub struct FeEvolution<'a> {
    pub scheme: EvolutionScheme,
    fes: &'a FeSpace1d,
    hyp: &'a dyn HyperbolicSystem,
    comm: &'a dyn Communicator,
    pub dofs: DofInfo,
    // nodal wave-speed bounds, fixed for the run
    wave_speeds: Array1<f64>,
    // nodal flux values, refilled on every evaluation
    fluxes: Array1<f64>,
    pub u_old: Option<Array1<f64>>,
}

impl<'a> FeEvolution<'a> {
    pub fn new(
        fes: &'a FeSpace1d,
        hyp: &'a dyn HyperbolicSystem,
        dofs: DofInfo,
        scheme: EvolutionScheme,
        comm: &'a dyn Communicator,
    ) -> FeEvolution<'a> {
        let wave_speeds =
            Array1::from_shape_fn(fes.dof_num, |idof| hyp.wave_speed(fes.dof_coords[idof]));
        let u_old = if hyp.steady_state() {
            Some(Array1::zeros(fes.dof_num))
        } else {
            None
        };
        FeEvolution {
            scheme,
            fes,
            hyp,
            comm,
            dofs,
            wave_speeds,
            fluxes: Array1::zeros(fes.dof_num),
            u_old,
        }
    }

    fn compute_nodal_fluxes(&mut self, u: ArrayView1<f64>) {
        for idof in 0..self.fes.dof_num {
            self.fluxes[idof] = self.hyp.flux(self.fes.dof_coords[idof], u[idof]);
        }
    }

    fn evolve_standard(&mut self, u: ArrayView1<f64>, mut dudt: ArrayViewMut1<f64>) {
        self.compute_nodal_fluxes(u);
        dudt.fill(0.0);
        for edge in &self.fes.edges {
            dudt[edge.idof] -= edge.cij * self.fluxes[edge.jdof];
            dudt[edge.jdof] += edge.cij * self.fluxes[edge.idof];
        }
        for idof in 0..self.fes.dof_num {
            dudt[idof] /= self.fes.lumped_mass[idof];
        }
    }

    fn evolve_mcl(&mut self, u: ArrayView1<f64>, mut dudt: ArrayViewMut1<f64>) {
        self.compute_nodal_fluxes(u);
        self.dofs.compute_bounds(u, self.comm);
        dudt.fill(0.0);
        for edge in &self.fes.edges {
            let (i, j) = (edge.idof, edge.jdof);
            let dij = self.viscosity(edge.cij, i, j, u);
            if dij <= 0.0 {
                continue;
            }
            let du = u[j] - u[i];
            let dfc = edge.cij * (self.fluxes[j] - self.fluxes[i]);
            // bar state, contained in [min(u_i, u_j), max(u_i, u_j)]
            // because dij dominates the secant slope
            let bar = 0.5 * (u[i] + u[j]) - dfc / (2.0 * dij);

            // low-order bounds-preserving part
            dudt[i] += 2.0 * dij * (bar - u[i]);
            dudt[j] += 2.0 * dij * (bar - u[j]);

            // raw antidiffusive flux; applying it unlimited recovers the
            // Standard derivative
            let raw = dij * (-du);
            let limited = if raw > 0.0 {
                let cap_i = 2.0 * dij * (self.dofs.u_max[i] - bar);
                let cap_j = 2.0 * dij * (bar - self.dofs.u_min[j]);
                debug_assert!(cap_i >= -1e-12 && cap_j >= -1e-12);
                raw.min(cap_i.min(cap_j))
            } else if raw < 0.0 {
                let cap_i = 2.0 * dij * (self.dofs.u_min[i] - bar);
                let cap_j = 2.0 * dij * (bar - self.dofs.u_max[j]);
                debug_assert!(cap_i <= 1e-12 && cap_j <= 1e-12);
                raw.max(cap_i.max(cap_j))
            } else {
                0.0
            };
            dudt[i] += limited;
            dudt[j] -= limited;
        }
        for idof in 0..self.fes.dof_num {
            dudt[idof] /= self.fes.lumped_mass[idof];
        }
    }

    // Rusanov bound reinforced by the secant slope, symmetric in i and j.
    fn viscosity(&self, cij: f64, i: usize, j: usize, u: ArrayView1<f64>) -> f64 {
        let mut dij = cij.abs() * self.wave_speeds[i].max(self.wave_speeds[j]);
        let du = u[j] - u[i];
        if du.abs() > 1e-14 {
            dij = dij.max((cij * (self.fluxes[j] - self.fluxes[i]) / du).abs());
        }
        dij
    }

    /// Largest forward-Euler step for which the limited update is a convex
    /// combination at every DOF, `min_i m_i / (2 sum_j d_ij)`.
    pub fn max_stable_dt(&mut self, u: ArrayView1<f64>) -> f64 {
        self.compute_nodal_fluxes(u);
        let mut row_sums = Array1::<f64>::zeros(self.fes.dof_num);
        for edge in &self.fes.edges {
            let dij = self.viscosity(edge.cij, edge.idof, edge.jdof, u);
            row_sums[edge.idof] += dij;
            row_sums[edge.jdof] += dij;
        }
        let mut dt = f64::MAX;
        for idof in 0..self.fes.dof_num {
            if row_sums[idof] > 0.0 {
                dt = dt.min(self.fes.lumped_mass[idof] / (2.0 * row_sums[idof]));
            }
        }
        dt
    }

    /// Pseudo-time steady-state residual `sqrt(sum_i m_i ((u_i - uOld_i)/dt)^2)`,
    /// all-reduced across partitions. While the iteration has not converged
    /// the retained snapshot advances with it; once the residual falls below
    /// `tol` the snapshot is left untouched so the caller can fall back to
    /// the last fully converged iterate.
    pub fn convergence_check(&mut self, dt: f64, tol: f64, u: ArrayView1<f64>) -> f64 {
        let u_old = self
            .u_old
            .as_mut()
            .expect("convergence check requires steady-state mode");
        let mut local = 0.0;
        for idof in 0..u.len() {
            let rate = (u[idof] - u_old[idof]) / dt;
            local += self.fes.lumped_mass[idof] * rate * rate;
        }
        let res = self.comm.all_reduce_sum(local).sqrt();
        if res >= tol {
            u_old.assign(&u);
        }
        res
    }

    /// Global discrete mass `sum_i m_i u_i`.
    pub fn total_mass(&self, u: ArrayView1<f64>) -> f64 {
        let local = self.fes.lumped_mass.dot(&u);
        self.comm.all_reduce_sum(local)
    }

    /// Number of DOFs outside the currently stored admissible bounds.
    pub fn count_bound_violations(&self, u: ArrayView1<f64>, eps: f64) -> usize {
        (0..u.len())
            .filter(|&idof| {
                u[idof] < self.dofs.u_min[idof] - eps || u[idof] > self.dofs.u_max[idof] + eps
            })
            .count()
    }
}

impl OdeRhs for FeEvolution<'_> {
    fn compute_derivative(&mut self, _t: f64, u: ArrayView1<f64>, dudt: ArrayViewMut1<f64>) {
        match self.scheme {
            EvolutionScheme::Standard => self.evolve_standard(u, dudt),
            EvolutionScheme::MonolithicConvexLimiting => self.evolve_mcl(u, dudt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::basis::lagrange1d::LagrangeBasis1DLobatto;
    use crate::disc::comm::SerialComm;
    use crate::disc::mesh::mesh1d::Mesh1d;
    use crate::disc::physics::Advection;

    fn setup(nelem: usize, order: usize) -> (FeSpace1d, Advection) {
        let mesh = Mesh1d::new_uniform(nelem, 0.0, 1.0);
        let basis = LagrangeBasis1DLobatto::new(order + 1);
        let fes = FeSpace1d::new(&mesh, &basis);
        let hyp = Advection::new(1, 0.0, 1.0).unwrap();
        (fes, hyp)
    }

    fn rough_data(n: usize) -> Array1<f64> {
        // deterministic, oscillatory, sign-changing
        Array1::from_shape_fn(n, |i| (i as f64 * 2.13).sin() + 0.3 * (i as f64 * 7.7).cos())
    }

    #[test]
    fn scheme_ids() {
        assert_eq!(
            EvolutionScheme::from_id(0).unwrap(),
            EvolutionScheme::Standard
        );
        assert_eq!(
            EvolutionScheme::from_id(1).unwrap(),
            EvolutionScheme::MonolithicConvexLimiting
        );
        assert!(EvolutionScheme::from_id(2).is_err());
    }

    #[test]
    fn constant_state_is_stationary() {
        let (fes, hyp) = setup(4, 3);
        for scheme in [
            EvolutionScheme::Standard,
            EvolutionScheme::MonolithicConvexLimiting,
        ] {
            let dofs = DofInfo::new(&fes);
            let mut evol = FeEvolution::new(&fes, &hyp, dofs, scheme, &SerialComm);
            let u = Array1::from_elem(fes.dof_num, 0.7);
            let mut dudt = Array1::zeros(fes.dof_num);
            evol.compute_derivative(0.0, u.view(), dudt.view_mut());
            for idof in 0..fes.dof_num {
                assert!(dudt[idof].abs() < 1e-12, "scheme {:?}", scheme);
            }
        }
    }

    #[test]
    fn both_schemes_conserve_mass() {
        let (fes, hyp) = setup(6, 3);
        let u = rough_data(fes.dof_num);
        for scheme in [
            EvolutionScheme::Standard,
            EvolutionScheme::MonolithicConvexLimiting,
        ] {
            let dofs = DofInfo::new(&fes);
            let mut evol = FeEvolution::new(&fes, &hyp, dofs, scheme, &SerialComm);
            let mut dudt = Array1::zeros(fes.dof_num);
            evol.compute_derivative(0.0, u.view(), dudt.view_mut());
            let mass_rate: f64 = (0..fes.dof_num)
                .map(|i| fes.lumped_mass[i] * dudt[i])
                .sum();
            assert!(
                mass_rate.abs() < 1e-12,
                "scheme {:?}: mass rate {}",
                scheme,
                mass_rate
            );
        }
    }

    #[test]
    fn unlimited_antidiffusion_recovers_standard() {
        // low-order bar states plus the raw (unclipped) antidiffusive
        // fluxes must reproduce the Galerkin derivative edge by edge
        let (fes, hyp) = setup(5, 2);
        let dofs = DofInfo::new(&fes);
        let mut evol = FeEvolution::new(
            &fes,
            &hyp,
            dofs,
            EvolutionScheme::Standard,
            &SerialComm,
        );
        let u = rough_data(fes.dof_num);
        let mut expected = Array1::zeros(fes.dof_num);
        evol.compute_derivative(0.0, u.view(), expected.view_mut());

        let mut rebuilt = Array1::<f64>::zeros(fes.dof_num);
        for edge in &fes.edges {
            let (i, j) = (edge.idof, edge.jdof);
            let dij = evol.viscosity(edge.cij, i, j, u.view());
            if dij <= 0.0 {
                continue;
            }
            let dfc = edge.cij * (evol.fluxes[j] - evol.fluxes[i]);
            let bar = 0.5 * (u[i] + u[j]) - dfc / (2.0 * dij);
            let raw = dij * (u[i] - u[j]);
            rebuilt[i] += 2.0 * dij * (bar - u[i]) + raw;
            rebuilt[j] += 2.0 * dij * (bar - u[j]) - raw;
        }
        for idof in 0..fes.dof_num {
            rebuilt[idof] /= fes.lumped_mass[idof];
            assert!(
                (rebuilt[idof] - expected[idof]).abs() < 1e-11,
                "dof {}: rebuilt {}, expected {}",
                idof,
                rebuilt[idof],
                expected[idof]
            );
        }
    }

    #[test]
    fn limited_step_preserves_bounds() {
        let (fes, hyp) = setup(8, 3);
        let dofs = DofInfo::new(&fes);
        let mut evol = FeEvolution::new(
            &fes,
            &hyp,
            dofs,
            EvolutionScheme::MonolithicConvexLimiting,
            &SerialComm,
        );
        let u = rough_data(fes.dof_num);
        let dt = evol.max_stable_dt(u.view());
        assert!(dt > 0.0);

        let mut dudt = Array1::zeros(fes.dof_num);
        evol.compute_derivative(0.0, u.view(), dudt.view_mut());
        // bounds stored by the evaluation are the pre-step bounds
        let u_min = evol.dofs.u_min.clone();
        let u_max = evol.dofs.u_max.clone();
        let mut next = Array1::zeros(fes.dof_num);
        for idof in 0..fes.dof_num {
            next[idof] = u[idof] + dt * dudt[idof];
            assert!(
                next[idof] >= u_min[idof] - 1e-12 && next[idof] <= u_max[idof] + 1e-12,
                "dof {}: {} not in [{}, {}]",
                idof,
                next[idof],
                u_min[idof],
                u_max[idof]
            );
        }
        assert_eq!(evol.count_bound_violations(next.view(), 1e-12), 0);
    }

    #[test]
    fn standard_substep_violates_bounds_at_a_jump() {
        let (fes, hyp) = setup(8, 3);
        let dofs = DofInfo::new(&fes);
        let mut evol = FeEvolution::new(&fes, &hyp, dofs, EvolutionScheme::Standard, &SerialComm);
        // square pulse nodal interpolant
        let u = Array1::from_shape_fn(fes.dof_num, |i| hyp.initial_condition(fes.dof_coords[i]));
        let dt = 0.9 * evol.max_stable_dt(u.view());

        evol.dofs.compute_bounds(u.view(), &SerialComm);
        let mut dudt = Array1::zeros(fes.dof_num);
        evol.compute_derivative(0.0, u.view(), dudt.view_mut());
        let next = &u + &dudt.mapv(|v| dt * v);
        assert!(evol.count_bound_violations(next.view(), 1e-9) > 0);
    }

    #[test]
    fn convergence_check_retains_last_unconverged_iterate() {
        let (fes, _) = setup(4, 2);
        let hyp = Advection::new(2, 0.0, 1.0).unwrap();
        let dofs = DofInfo::new(&fes);
        let mut evol = FeEvolution::new(
            &fes,
            &hyp,
            dofs,
            EvolutionScheme::MonolithicConvexLimiting,
            &SerialComm,
        );
        assert!(evol.u_old.is_some());

        let u1 = Array1::from_elem(fes.dof_num, 1.0);
        let res = evol.convergence_check(0.1, 1e-12, u1.view());
        assert!(res > 1e-12);
        // snapshot advanced with the iteration
        assert_eq!(evol.u_old.as_ref().unwrap()[0], 1.0);

        // converged: the snapshot must stay on the previous iterate
        let mut u2 = u1.clone();
        u2[0] += 1e-15;
        let res = evol.convergence_check(0.1, 1e-12, u2.view());
        assert!(res < 1e-12);
        assert_eq!(evol.u_old.as_ref().unwrap()[0], 1.0);
    }

    #[test]
    fn pseudo_time_residual_decreases_monotonically() {
        // the alternating mode is fully clipped by the limiter, so forward
        // Euler relaxes it geometrically toward the mean
        use crate::temporal_disc::{ForwardEuler, OdeSolver};
        let mesh = Mesh1d::new_uniform(4, 0.0, 1.0);
        let basis = LagrangeBasis1DLobatto::new(2);
        let fes = FeSpace1d::new(&mesh, &basis);
        let hyp = Advection::new(2, 0.0, 1.0).unwrap();
        let dofs = DofInfo::new(&fes);
        let mut evol = FeEvolution::new(
            &fes,
            &hyp,
            dofs,
            EvolutionScheme::MonolithicConvexLimiting,
            &SerialComm,
        );
        let mut stepper = ForwardEuler::new(fes.dof_num);
        let mut u = Array1::from(vec![0.75, 0.25, 0.75, 0.25]);
        let mut t = 0.0;
        let dt = 0.1;
        assert!(dt <= evol.max_stable_dt(u.view()));

        let mut prev = f64::MAX;
        let mut converged = false;
        for step in 0..60 {
            stepper.step(&mut evol, &mut u, &mut t, dt);
            let res = evol.convergence_check(dt, 1e-12, u.view());
            assert!(
                res <= prev + 1e-13,
                "step {}: residual rose from {} to {}",
                step,
                prev,
                res
            );
            prev = res;
            if res < 1e-12 {
                converged = true;
                break;
            }
        }
        assert!(converged, "final residual {}", prev);
        for &ui in u.iter() {
            assert!((ui - 0.5).abs() < 1e-12, "{}", ui);
        }
    }

    #[test]
    fn transient_mode_has_no_snapshot() {
        let (fes, hyp) = setup(4, 2);
        let dofs = DofInfo::new(&fes);
        let evol = FeEvolution::new(&fes, &hyp, dofs, EvolutionScheme::Standard, &SerialComm);
        assert!(evol.u_old.is_none());
    }
}
