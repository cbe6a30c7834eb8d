use hashbrown::HashSet;
use ndarray::{Array1, ArrayView1};

use crate::disc::comm::Communicator;
use crate::disc::fe_space::FeSpace1d;

/// DOF bounds engine: precomputed stencil neighborhoods and the per-step
/// admissible min/max bounds derived from them.
pub struct DofInfo {
    // for each DOF, the sorted DOFs sharing at least one element with it
    pub neighbors: Vec<Vec<usize>>,
    pub u_min: Array1<f64>,
    pub u_max: Array1<f64>,
}

impl DofInfo {
    pub fn new(fes: &FeSpace1d) -> DofInfo {
        let nbasis = fes.order + 1;
        let mut stencils: Vec<HashSet<usize>> = vec![HashSet::new(); fes.dof_num];
        for ielem in 0..fes.elem_num {
            for a in 0..nbasis {
                let idof = fes.elem_dofs[(ielem, a)];
                for b in 0..nbasis {
                    let jdof = fes.elem_dofs[(ielem, b)];
                    if idof != jdof {
                        stencils[idof].insert(jdof);
                    }
                }
            }
        }
        let neighbors = stencils
            .into_iter()
            .map(|set| {
                let mut list: Vec<usize> = set.into_iter().collect();
                list.sort_unstable();
                list
            })
            .collect();
        DofInfo {
            neighbors,
            u_min: Array1::zeros(fes.dof_num),
            u_max: Array1::zeros(fes.dof_num),
        }
    }

    /// Recomputes the admissible bounds for the given solution: for every
    /// DOF the min/max of `u` over the DOF itself and its stencil, merged
    /// across partitions. A DOF without neighbors keeps its own value as
    /// both bounds.
    pub fn compute_bounds(&mut self, u: ArrayView1<f64>, comm: &dyn Communicator) {
        for idof in 0..u.len() {
            let mut lo = u[idof];
            let mut hi = u[idof];
            for &jdof in &self.neighbors[idof] {
                lo = lo.min(u[jdof]);
                hi = hi.max(u[jdof]);
            }
            self.u_min[idof] = lo;
            self.u_max[idof] = hi;
        }
        comm.sync_bounds(self.u_min.view_mut(), self.u_max.view_mut());
    }
}
