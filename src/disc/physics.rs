use ndarray::{Array1, ArrayView1};
use ndarray_stats::QuantileExt;

use crate::disc::basis::lagrange1d::LagrangeBasis1DLobatto;
use crate::disc::fe_space::FeSpace1d;
use crate::disc::gauss_points::legendre_points::get_legendre_points_interval;

pub struct Errors {
    pub l1: f64,
    pub l2: f64,
    pub linf: f64,
}

/// Capability interface of one conservation law `u_t + f(x, u)_x = 0`.
/// The evolution operator only ever calls these; it owns no physics.
pub trait HyperbolicSystem {
    fn name(&self) -> &'static str;
    fn initial_condition(&self, x: f64) -> f64;
    fn flux(&self, x: f64, u: f64) -> f64;
    /// Upper bound on |df/du| at x, for the graph-viscosity coefficients.
    fn wave_speed(&self, x: f64) -> f64;
    fn steady_state(&self) -> bool {
        false
    }
    fn solution_known(&self) -> bool {
        false
    }
    fn exact_solution(&self, _x: f64, _t: f64) -> Option<f64> {
        None
    }

    /// L1/L2/Linf errors against the exact solution by element quadrature.
    fn compute_errors(
        &self,
        fes: &FeSpace1d,
        basis: &LagrangeBasis1DLobatto,
        u: ArrayView1<f64>,
        t: f64,
    ) -> Option<Errors> {
        if !self.solution_known() {
            return None;
        }
        let nbasis = basis.nbasis();
        let ngp = (nbasis + 2).min(6);
        let (gl_points, gl_weights) = get_legendre_points_interval(ngp);
        let mut l1 = 0.0;
        let mut l2 = 0.0;
        let mut point_errors = Array1::zeros(fes.elem_num * ngp);
        let mut coeffs = vec![0.0; nbasis];
        for ielem in 0..fes.elem_num {
            let jacob_det = fes.elem_jacob[ielem];
            let x_left = fes.dof_coords[fes.elem_dofs[(ielem, 0)]];
            for ibasis in 0..nbasis {
                coeffs[ibasis] = u[fes.elem_dofs[(ielem, ibasis)]];
            }
            for igp in 0..ngp {
                let xi = gl_points[igp];
                let x = x_left + (xi + 1.0) * jacob_det;
                let uh = basis.evaluate_function_at(&coeffs, xi);
                let ue = self.exact_solution(x, t)?;
                let err = (uh - ue).abs();
                l1 += gl_weights[igp] * jacob_det * err;
                l2 += gl_weights[igp] * jacob_det * err * err;
                point_errors[ielem * ngp + igp] = err;
            }
        }
        let linf = *point_errors.max().unwrap_or(&0.0);
        Some(Errors {
            l1,
            l2: l2.sqrt(),
            linf,
        })
    }
}

/// Scalar advection `u_t + (v u)_x = 0` with unit transport velocity on a
/// periodic domain. Setups: 0 - smooth sine profile, 1 - discontinuous
/// square pulse, 2 - pseudo-time relaxation of a perturbed constant.
pub struct Advection {
    pub config_num: usize,
    domain_min: f64,
    domain_len: f64,
    velocity: f64,
}

impl Advection {
    pub fn new(config_num: usize, domain_min: f64, domain_max: f64) -> Result<Advection, String> {
        if config_num > 2 {
            return Err(format!("Unknown problem setup: {}", config_num));
        }
        Ok(Advection {
            config_num,
            domain_min,
            domain_len: domain_max - domain_min,
            velocity: 1.0,
        })
    }

    // fractional position in the periodic domain
    fn frac(&self, x: f64) -> f64 {
        ((x - self.domain_min) / self.domain_len).rem_euclid(1.0)
    }

    fn profile(&self, s: f64) -> f64 {
        match self.config_num {
            0 => 0.5 + 0.5 * (2.0 * std::f64::consts::PI * s).sin(),
            1 => {
                if (0.25..0.5).contains(&s) {
                    1.0
                } else {
                    0.0
                }
            }
            2 => 0.5 + 0.25 * (2.0 * std::f64::consts::PI * s).sin(),
            _ => unreachable!(),
        }
    }
}

impl HyperbolicSystem for Advection {
    fn name(&self) -> &'static str {
        "Advection"
    }

    fn initial_condition(&self, x: f64) -> f64 {
        self.profile(self.frac(x))
    }

    fn flux(&self, _x: f64, u: f64) -> f64 {
        self.velocity * u
    }

    fn wave_speed(&self, _x: f64) -> f64 {
        self.velocity.abs()
    }

    fn steady_state(&self) -> bool {
        self.config_num == 2
    }

    fn solution_known(&self) -> bool {
        true
    }

    fn exact_solution(&self, x: f64, t: f64) -> Option<f64> {
        if self.steady_state() {
            // the dissipative pseudo-time iteration relaxes the
            // perturbation to the mass-weighted mean
            return Some(0.5);
        }
        let s = self.frac(x - self.velocity * t);
        Some(self.profile(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::mesh::mesh1d::Mesh1d;
    use ndarray::Array1;

    #[test]
    fn rejects_unknown_setup() {
        assert!(Advection::new(7, 0.0, 1.0).is_err());
    }

    #[test]
    fn exact_solution_matches_initial_condition_at_t0() {
        let hyp = Advection::new(0, 0.0, 1.0).unwrap();
        for &x in &[0.0, 0.13, 0.5, 0.99] {
            assert!((hyp.exact_solution(x, 0.0).unwrap() - hyp.initial_condition(x)).abs() < 1e-15);
        }
    }

    #[test]
    fn transport_is_periodic() {
        let hyp = Advection::new(1, 0.0, 1.0).unwrap();
        // after one full period the pulse returns
        for &x in &[0.1, 0.3, 0.7] {
            assert_eq!(
                hyp.exact_solution(x, 1.0).unwrap(),
                hyp.initial_condition(x)
            );
        }
    }

    #[test]
    fn interpolant_error_is_small_for_smooth_profile() {
        let hyp = Advection::new(0, 0.0, 1.0).unwrap();
        let mesh = Mesh1d::new_uniform(8, 0.0, 1.0);
        let basis = LagrangeBasis1DLobatto::new(4);
        let fes = FeSpace1d::new(&mesh, &basis);
        let u = Array1::from_shape_fn(fes.dof_num, |i| hyp.initial_condition(fes.dof_coords[i]));
        let errors = hyp.compute_errors(&fes, &basis, u.view(), 0.0).unwrap();
        assert!(errors.l2 > 0.0);
        assert!(errors.l2 < 1e-3, "l2 = {}", errors.l2);
        assert!(errors.linf < 1e-2, "linf = {}", errors.linf);
    }
}
