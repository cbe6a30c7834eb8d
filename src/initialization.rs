use crate::disc::basis::lagrange1d::LagrangeBasis1DLobatto;
use crate::disc::mesh::mesh1d::Mesh1d;
use crate::disc::physics::{Advection, HyperbolicSystem};
use crate::io::param_parser::SolverParamParser;
use crate::solver::Configuration;

pub fn initialize_params(args: &[String]) -> Result<SolverParamParser, String> {
    crate::io::param_parser::parse_command_line(args)
}

/// Builds the mesh from the CSV node file when one is given, otherwise a
/// uniform mesh over the configured domain, then applies the requested
/// uniform refinements.
pub fn initialize_mesh(params: &SolverParamParser) -> Result<Mesh1d, String> {
    let mut mesh = match &params.mesh_file {
        Some(path) => {
            Mesh1d::from_csv_file(path).map_err(|e| format!("Failed to read mesh {}: {}", path, e))?
        }
        None => Mesh1d::new_uniform(params.elem_num, params.domain_min, params.domain_max),
    };
    for _ in 0..params.refine_num {
        mesh.refine_uniform();
    }
    Ok(mesh)
}

pub fn initialize_basis(polynomial_order: usize) -> LagrangeBasis1DLobatto {
    LagrangeBasis1DLobatto::new(polynomial_order + 1)
}

/// The physics domain is the mesh extent, so CSV meshes and the uniform
/// default get consistent periodic wrapping.
pub fn initialize_physics(
    params: &SolverParamParser,
    mesh: &Mesh1d,
) -> Result<Box<dyn HyperbolicSystem>, String> {
    let (domain_min, domain_max) = mesh.bounding_box();
    match params.problem_num {
        0 => Ok(Box::new(Advection::new(
            params.config_num,
            domain_min,
            domain_max,
        )?)),
        _ => Err(format!("Unknown problem: {}", params.problem_num)),
    }
}

pub fn initialize_configuration(params: &SolverParamParser) -> Configuration {
    Configuration {
        problem_num: params.problem_num,
        config_num: params.config_num,
        order: params.polynomial_order,
        t_final: params.final_time,
        dt: params.dt,
        ode_solver_type: params.ode_solver_type,
        evolution_scheme: params.evolution_scheme,
        vis_steps: params.vis_steps,
        precision: params.precision,
    }
}
