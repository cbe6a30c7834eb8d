use std::process::exit;

use hyplim::disc::comm::SerialComm;
use hyplim::disc::fe_space::FeSpace1d;
use hyplim::initialization;
use hyplim::io::param_parser;
use hyplim::solver::Solver;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let params = match initialization::initialize_params(&args[1..]) {
        Ok(params) => params,
        Err(msg) => {
            eprintln!("{}", msg);
            param_parser::print_usage(&args[0]);
            exit(-1);
        }
    };

    let mesh = match initialization::initialize_mesh(&params) {
        Ok(mesh) => mesh,
        Err(msg) => {
            eprintln!("{}", msg);
            exit(-1);
        }
    };
    let basis = initialization::initialize_basis(params.polynomial_order);
    let fes = FeSpace1d::new(&mesh, &basis);
    let hyp = match initialization::initialize_physics(&params, &mesh) {
        Ok(hyp) => hyp,
        Err(msg) => {
            eprintln!("{}", msg);
            exit(-1);
        }
    };
    let config = initialization::initialize_configuration(&params);

    if config.ode_solver_type != 1 && hyp.steady_state() {
        println!("Warning: high-order time integration of a steady-state problem.");
    }

    let comm = SerialComm;
    let mut solver = match Solver::new(&config, &fes, &basis, hyp.as_ref(), &comm) {
        Ok(solver) => solver,
        Err(msg) => {
            eprintln!("{}", msg);
            exit(-1);
        }
    };
    if let Err(msg) = solver.solve() {
        eprintln!("{}", msg);
        exit(-1);
    }
}
