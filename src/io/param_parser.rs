use serde::Deserialize;
use std::fs;

/// Run parameters, filled from defaults, then a JSON parameter file
/// (`-f`), then individual command-line overrides.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SolverParamParser {
    pub problem_num: usize,
    pub config_num: usize,
    pub mesh_file: Option<String>,
    pub elem_num: usize,
    pub refine_num: usize,
    pub polynomial_order: usize,
    pub final_time: f64,
    pub dt: f64,
    pub ode_solver_type: i64,
    pub vis_steps: usize,
    pub evolution_scheme: i64,
    pub precision: usize,
    pub domain_min: f64,
    pub domain_max: f64,
}

impl Default for SolverParamParser {
    fn default() -> SolverParamParser {
        SolverParamParser {
            problem_num: 0,
            config_num: 1,
            mesh_file: None,
            elem_num: 32,
            refine_num: 0,
            polynomial_order: 3,
            final_time: 1.0,
            dt: 1.0e-3,
            ode_solver_type: 3,
            vis_steps: 100,
            evolution_scheme: 1,
            precision: 8,
            domain_min: 0.0,
            domain_max: 1.0,
        }
    }
}

impl SolverParamParser {
    pub fn parse(file_path: &str) -> Result<SolverParamParser, String> {
        let file_content = fs::read_to_string(file_path)
            .map_err(|e| format!("Failed to read {}: {}", file_path, e))?;
        serde_json::from_str(&file_content)
            .map_err(|e| format!("Failed to parse {}: {}", file_path, e))
    }
}

pub fn print_usage(program: &str) {
    println!("Usage: {} [options]", program);
    println!("  -f  <file>   JSON parameter file (parsed before other options)");
    println!("  -p  <int>    problem id (0: advection)");
    println!("  -c  <int>    problem setup (0: smooth, 1: square pulse, 2: steady)");
    println!("  -m  <file>   mesh node CSV file (default: uniform mesh)");
    println!("  -r  <int>    number of uniform refinements");
    println!("  -o  <int>    polynomial order");
    println!("  -tf <float>  final time");
    println!("  -dt <float>  time step");
    println!("  -s  <int>    ODE solver (1: FE, 2: RK2 SSP, 3: RK3 SSP)");
    println!("  -vs <int>    visualization interval in steps");
    println!("  -e  <int>    evolution scheme (0: standard, 1: limited)");
}

/// Parses command-line arguments into run parameters. `args` excludes the
/// program name. A `-f` file is applied first so explicit flags win.
pub fn parse_command_line(args: &[String]) -> Result<SolverParamParser, String> {
    let mut params = SolverParamParser::default();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "-f" {
            let path = args
                .get(i + 1)
                .ok_or_else(|| "Missing value for -f".to_string())?;
            params = SolverParamParser::parse(path)?;
            i += 2;
        } else {
            i += 1;
        }
    }

    fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
        args.get(i + 1)
            .map(|s| s.as_str())
            .ok_or_else(|| format!("Missing value for {}", flag))
    }

    fn parse_num<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T, String> {
        raw.parse()
            .map_err(|_| format!("Invalid value for {}: {}", flag, raw))
    }

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-f" => {
                i += 2;
                continue;
            }
            "-p" => params.problem_num = parse_num(value(args, i, flag)?, flag)?,
            "-c" => params.config_num = parse_num(value(args, i, flag)?, flag)?,
            "-m" => params.mesh_file = Some(value(args, i, flag)?.to_string()),
            "-r" => params.refine_num = parse_num(value(args, i, flag)?, flag)?,
            "-o" => params.polynomial_order = parse_num(value(args, i, flag)?, flag)?,
            "-tf" => params.final_time = parse_num(value(args, i, flag)?, flag)?,
            "-dt" => params.dt = parse_num(value(args, i, flag)?, flag)?,
            "-s" => params.ode_solver_type = parse_num(value(args, i, flag)?, flag)?,
            "-vs" => params.vis_steps = parse_num(value(args, i, flag)?, flag)?,
            "-e" => params.evolution_scheme = parse_num(value(args, i, flag)?, flag)?,
            _ => return Err(format!("Unknown option: {}", flag)),
        }
        i += 2;
    }

    if params.polynomial_order == 0 {
        return Err("Polynomial order must be at least 1".to_string());
    }
    if params.dt <= 0.0 {
        return Err(format!("Time step must be positive, got {}", params.dt));
    }
    Ok(params)
}
