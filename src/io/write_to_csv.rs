use csv::Writer;
use ndarray::ArrayView1;
use serde::Serialize;

use crate::disc::fe_space::FeSpace1d;

#[derive(Serialize)]
struct PointData {
    x: String,
    solution: String,
}

/// Writes the nodal solution as `x,solution` rows, one per global DOF in
/// coordinate order, formatted at the configured precision.
pub fn write_to_csv(
    u: ArrayView1<f64>,
    fes: &FeSpace1d,
    precision: usize,
    filename: &str,
) -> Result<(), csv::Error> {
    let mut writer = Writer::from_path(filename)?;
    for idof in 0..fes.dof_num {
        let data = PointData {
            x: format!("{:.*}", precision, fes.dof_coords[idof]),
            solution: format!("{:.*}", precision, u[idof]),
        };
        writer.serialize(data)?;
    }
    writer.flush()?;
    Ok(())
}
