pub mod legendre_points;
pub mod lobatto_points;
