use crate::disc::gauss_points::lobatto_points::get_lobatto_points_interval;
use ndarray::{Array, Ix2};

/// Nodal Lagrange basis on Gauss-Lobatto points of the reference
/// interval [-1, 1]. The basis is cardinal: phi_i(x_j) = delta_ij.
pub struct LagrangeBasis1DLobatto {
    pub cell_gauss_points: Vec<f64>,
    pub cell_gauss_weights: Vec<f64>,
    pub phis_cell_gps: Array<f64, Ix2>,  // (ngp, nbasis)
    pub dphis_cell_gps: Array<f64, Ix2>, // (ngp, nbasis)
}

impl LagrangeBasis1DLobatto {
    pub fn new(cell_gp_num: usize) -> LagrangeBasis1DLobatto {
        let dofs = cell_gp_num;
        let (cell_gauss_points, cell_gauss_weights) = get_lobatto_points_interval(dofs);
        let cell_gauss_points: Vec<f64> = cell_gauss_points.to_vec();
        let cell_gauss_weights: Vec<f64> = cell_gauss_weights.to_vec();
        let mut phis_cell_gps = Array::zeros((dofs, dofs));
        let mut dphis_cell_gps = Array::zeros((dofs, dofs));
        // Compute the basis functions at the gauss points
        for j in 0..dofs {
            for i in 0..dofs {
                phis_cell_gps[(j, i)] = if i == j { 1.0 } else { 0.0 };
            }
        }
        // Compute the derivatives of the basis functions at the gauss points
        for j in 0..dofs {
            // loop over basis functions
            for i in 0..dofs {
                // loop over gauss points
                let mut sum = 0.0;
                for l in 0..dofs {
                    if l != j {
                        let mut product = 1.0;
                        for m in 0..dofs {
                            if m != j && m != l {
                                product *= (cell_gauss_points[i] - cell_gauss_points[m])
                                    / (cell_gauss_points[j] - cell_gauss_points[m]);
                            }
                        }
                        sum += product / (cell_gauss_points[j] - cell_gauss_points[l]);
                    }
                }

                dphis_cell_gps[(i, j)] = sum;
            }
        }
        LagrangeBasis1DLobatto {
            cell_gauss_points,
            cell_gauss_weights,
            phis_cell_gps,
            dphis_cell_gps,
        }
    }

    pub fn nbasis(&self) -> usize {
        self.cell_gauss_points.len()
    }

    /// Evaluates the i-th basis function at point x
    pub fn evaluate_basis_at(&self, i: usize, x: f64) -> f64 {
        let n = self.cell_gauss_points.len();
        let x_i = self.cell_gauss_points[i];
        let mut result = 1.0;
        for j in 0..n {
            if j != i {
                let x_j = self.cell_gauss_points[j];
                result *= (x - x_j) / (x_i - x_j);
            }
        }

        result
    }

    /// Evaluates the derivative of the i-th basis function at point x
    pub fn evaluate_basis_derivative_at(&self, i: usize, x: f64) -> f64 {
        let n = self.cell_gauss_points.len();
        let x_i = self.cell_gauss_points[i];
        let mut sum = 0.0;
        for l in 0..n {
            if l != i {
                let mut product = 1.0;
                for m in 0..n {
                    if m != i && m != l {
                        product *= (x - self.cell_gauss_points[m])
                            / (x_i - self.cell_gauss_points[m]);
                    }
                }
                sum += product / (x_i - self.cell_gauss_points[l]);
            }
        }

        sum
    }

    /// Evaluates a function at a point using the basis representation
    pub fn evaluate_function_at(&self, coefficients: &[f64], x: f64) -> f64 {
        let n = self.cell_gauss_points.len();
        assert_eq!(
            coefficients.len(),
            n,
            "Coefficient vector length must match basis size"
        );

        let mut result = 0.0;
        for i in 0..n {
            result += coefficients[i] * self.evaluate_basis_at(i, x);
        }

        result
    }
}
