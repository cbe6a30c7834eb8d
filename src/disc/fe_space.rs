use hashbrown::HashMap;
use ndarray::{Array1, Array2};

use crate::disc::basis::lagrange1d::LagrangeBasis1DLobatto;
use crate::disc::gauss_points::legendre_points::get_legendre_points_interval;
use crate::disc::mesh::mesh1d::Mesh1d;

/// One off-diagonal entry pair of the discrete divergence operator
/// `c_ij = int phi_i dphi_j/dx dx`. On the periodic domain the operator is
/// exactly antisymmetric, so `c_ji = -cij` and one entry per undirected
/// DOF pair suffices.
pub struct DivergenceEdge {
    pub idof: usize,
    pub jdof: usize,
    pub cij: f64,
}

/// Continuous Lagrange space on a periodic 1D mesh: element-endpoint DOFs
/// are shared between neighboring elements and wrap around the domain.
pub struct FeSpace1d {
    pub order: usize,
    pub dof_num: usize,
    pub elem_num: usize,
    pub elem_dofs: Array2<usize>, // (elem_num, order + 1)
    pub elem_jacob: Array1<f64>,
    pub dof_coords: Array1<f64>,
    pub lumped_mass: Array1<f64>,
    pub edges: Vec<DivergenceEdge>,
}

impl FeSpace1d {
    pub fn new(mesh: &Mesh1d, basis: &LagrangeBasis1DLobatto) -> FeSpace1d {
        let nbasis = basis.nbasis();
        let order = nbasis - 1;
        let nelem = mesh.elem_num;
        let dof_num = nelem * order;

        let mut elem_dofs = Array2::zeros((nelem, nbasis));
        let mut elem_jacob = Array1::zeros(nelem);
        let mut dof_coords = Array1::zeros(dof_num);
        for ielem in 0..nelem {
            let elem = &mesh.elements[ielem];
            let x_left = mesh.nodes[elem.inodes[0]].x;
            elem_jacob[ielem] = elem.jacob_det;
            for ibasis in 0..nbasis {
                let idof = (ielem * order + ibasis) % dof_num;
                elem_dofs[(ielem, ibasis)] = idof;
                let xi = basis.cell_gauss_points[ibasis];
                dof_coords[idof] = x_left + (xi + 1.0) * elem.jacob_det;
            }
        }
        // The wrapped DOF keeps the coordinate of the left domain endpoint.
        dof_coords[0] = mesh.nodes[0].x;

        // Lumped mass: row sums of the consistent mass matrix. For the
        // cardinal Lobatto basis these are the Lobatto weights scaled by the
        // element jacobian (exact, since phi_i has degree <= 2n - 3).
        let mut lumped_mass = Array1::zeros(dof_num);
        for ielem in 0..nelem {
            for ibasis in 0..nbasis {
                let idof = elem_dofs[(ielem, ibasis)];
                lumped_mass[idof] += elem_jacob[ielem] * basis.cell_gauss_weights[ibasis];
            }
        }

        // Divergence operator on the reference element: the jacobian of the
        // basis derivative cancels against the one of the volume element, so
        // c^e_ab = int phi_a(xi) dphi_b/dxi (xi) dxi.
        let (gl_points, gl_weights) = get_legendre_points_interval(nbasis);
        let mut local_c = Array2::zeros((nbasis, nbasis));
        for a in 0..nbasis {
            for b in 0..nbasis {
                let mut entry = 0.0;
                for igp in 0..nbasis {
                    let xi = gl_points[igp];
                    entry += gl_weights[igp]
                        * basis.evaluate_basis_at(a, xi)
                        * basis.evaluate_basis_derivative_at(b, xi);
                }
                local_c[(a, b)] = entry;
            }
        }

        let mut accum: HashMap<(usize, usize), f64> = HashMap::new();
        for ielem in 0..nelem {
            for a in 0..nbasis {
                for b in 0..nbasis {
                    let idof = elem_dofs[(ielem, a)];
                    let jdof = elem_dofs[(ielem, b)];
                    if idof == jdof {
                        continue;
                    }
                    *accum.entry((idof, jdof)).or_insert(0.0) += local_c[(a, b)];
                }
            }
        }

        let mut edges = Vec::new();
        for (&(idof, jdof), &cij) in accum.iter() {
            if idof < jdof {
                let cji = accum.get(&(jdof, idof)).copied().unwrap_or(0.0);
                debug_assert!(
                    (cij + cji).abs() < 1e-12,
                    "divergence operator lost antisymmetry: c[{},{}] = {}, c[{},{}] = {}",
                    idof,
                    jdof,
                    cij,
                    jdof,
                    idof,
                    cji
                );
                edges.push(DivergenceEdge { idof, jdof, cij });
            }
        }
        // Deterministic edge ordering regardless of hash-map iteration.
        edges.sort_by_key(|e| (e.idof, e.jdof));

        FeSpace1d {
            order,
            dof_num,
            elem_num: nelem,
            elem_dofs,
            elem_jacob,
            dof_coords,
            lumped_mass,
            edges,
        }
    }

    /// Total measure of the domain, `sum_i m_i`.
    pub fn domain_size(&self) -> f64 {
        self.lumped_mass.sum()
    }
}
