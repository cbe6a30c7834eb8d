use serde::Deserialize;
use std::path::Path;

pub struct Node1d {
    pub x: f64,
}

pub struct Element1d {
    pub inodes: [usize; 2],
    // periodic neighbors: [left element, right element]
    pub ineighbors: [usize; 2],
    pub jacob_det: f64,
}

/// Unstructured mesh of intervals with periodic topology: the last node
/// coordinate closes the domain and is identified with the first one.
pub struct Mesh1d {
    pub nodes: Vec<Node1d>,
    pub elements: Vec<Element1d>,
    pub elem_num: usize,
    pub node_num: usize,
}

#[derive(Deserialize)]
struct NodeRecord {
    x: f64,
}

impl Mesh1d {
    /// Builds a mesh from sorted node coordinates; `coords[0]` and the last
    /// entry are the periodically identified domain endpoints.
    pub fn from_coords(coords: &[f64]) -> Mesh1d {
        assert!(coords.len() >= 2, "Mesh needs at least two nodes");
        let elem_num = coords.len() - 1;
        let nodes: Vec<Node1d> = coords.iter().map(|&x| Node1d { x }).collect();
        let mut elements = Vec::with_capacity(elem_num);
        for ielem in 0..elem_num {
            let x0 = coords[ielem];
            let x1 = coords[ielem + 1];
            assert!(
                x1 > x0,
                "Mesh nodes must be strictly increasing: x[{}] = {}, x[{}] = {}",
                ielem,
                x0,
                ielem + 1,
                x1
            );
            elements.push(Element1d {
                inodes: [ielem, ielem + 1],
                ineighbors: [
                    (ielem + elem_num - 1) % elem_num,
                    (ielem + 1) % elem_num,
                ],
                jacob_det: 0.5 * (x1 - x0),
            });
        }
        Mesh1d {
            node_num: nodes.len(),
            elem_num,
            nodes,
            elements,
        }
    }

    pub fn new_uniform(elem_num: usize, left_coord: f64, right_coord: f64) -> Mesh1d {
        assert!(elem_num > 0, "Mesh needs at least one element");
        let h = (right_coord - left_coord) / elem_num as f64;
        let coords: Vec<f64> = (0..=elem_num)
            .map(|i| left_coord + h * i as f64)
            .collect();
        Mesh1d::from_coords(&coords)
    }

    /// Reads node coordinates from a CSV file with a single `x` column.
    pub fn from_csv_file(path: impl AsRef<Path>) -> Result<Mesh1d, csv::Error> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut coords = Vec::new();
        for record in reader.deserialize() {
            let record: NodeRecord = record?;
            coords.push(record.x);
        }
        Ok(Mesh1d::from_coords(&coords))
    }

    /// Splits every element at its midpoint.
    pub fn refine_uniform(&mut self) {
        let mut coords = Vec::with_capacity(2 * self.elem_num + 1);
        for ielem in 0..self.elem_num {
            let x0 = self.nodes[self.elements[ielem].inodes[0]].x;
            let x1 = self.nodes[self.elements[ielem].inodes[1]].x;
            coords.push(x0);
            coords.push(0.5 * (x0 + x1));
        }
        coords.push(self.nodes[self.node_num - 1].x);
        *self = Mesh1d::from_coords(&coords);
    }

    pub fn bounding_box(&self) -> (f64, f64) {
        (self.nodes[0].x, self.nodes[self.node_num - 1].x)
    }

    pub fn domain_length(&self) -> f64 {
        let (lo, hi) = self.bounding_box();
        hi - lo
    }
}
