use ndarray::ArrayView1;
use std::fs;
use std::path::Path;
use vtkio::{
    Vtk,
    model::{
        Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, DataSet, ElementType,
        IOBuffer, UnstructuredGridPiece, Version, VertexNumbers,
    },
};

use once_cell::sync::Lazy;

use crate::disc::{basis::lagrange1d::LagrangeBasis1DLobatto, fe_space::FeSpace1d};

pub static OUTPUT_DIR: Lazy<String> = Lazy::new(|| {
    let outputs_dir = "outputs";
    if !Path::new(outputs_dir).exists() {
        fs::create_dir(outputs_dir).expect("Failed to create outputs directory");
    }
    outputs_dir.to_string()
});

/// Writes the nodal solution as a VTU line mesh: one point per element-local
/// Lobatto node, one line cell per node interval. Points are duplicated at
/// shared element endpoints so each element stays a contiguous block.
pub fn write_nodal_solutions(
    name: &str,
    u: ArrayView1<f64>,
    fes: &FeSpace1d,
    basis: &LagrangeBasis1DLobatto,
    current_step: usize,
) -> Result<(), vtkio::Error> {
    let nbasis = basis.nbasis();
    let mut vtk_points = Vec::with_capacity(fes.elem_num * nbasis * 3);
    let mut point_solutions = Vec::with_capacity(fes.elem_num * nbasis);
    let mut connectivity = Vec::with_capacity(fes.elem_num * (nbasis - 1) * 2);
    let mut cell_types = Vec::with_capacity(fes.elem_num * (nbasis - 1));
    let mut global_point_id = 0_u64;

    for ielem in 0..fes.elem_num {
        let jacob_det = fes.elem_jacob[ielem];
        let x_left = fes.dof_coords[fes.elem_dofs[(ielem, 0)]];
        for ibasis in 0..nbasis {
            let xi = basis.cell_gauss_points[ibasis];
            vtk_points.push(x_left + (xi + 1.0) * jacob_det);
            vtk_points.push(0.0);
            vtk_points.push(0.0);
            point_solutions.push(u[fes.elem_dofs[(ielem, ibasis)]]);
        }
        for ibasis in 0..nbasis - 1 {
            connectivity.push(global_point_id + ibasis as u64);
            connectivity.push(global_point_id + ibasis as u64 + 1);
            cell_types.push(CellType::Line);
        }
        global_point_id += nbasis as u64;
    }

    let filename = format!("{}/{}_nodal_{}.vtu", &*OUTPUT_DIR, name, current_step);

    let vtk_file = Vtk {
        version: Version::XML { major: 1, minor: 0 },
        title: "Solution Point Data".into(),
        byte_order: ByteOrder::native(),
        data: DataSet::inline(UnstructuredGridPiece {
            points: IOBuffer::F64(vtk_points),
            cells: Cells {
                cell_verts: VertexNumbers::XML {
                    connectivity,
                    offsets: (0..cell_types.len())
                        .map(|i| ((i + 1) * 2) as u64)
                        .collect(),
                },
                types: cell_types,
            },
            data: Attributes {
                point: vec![Attribute::DataArray(DataArray {
                    name: "solution".to_string(),
                    elem: ElementType::Scalars {
                        num_comp: 1,
                        lookup_table: None,
                    },
                    data: IOBuffer::F64(point_solutions),
                })],
                cell: vec![],
            },
        }),
        file_path: None,
    };

    vtk_file.export(&filename)?;
    Ok(())
}
