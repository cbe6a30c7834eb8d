pub mod basis;
pub mod comm;
pub mod dof_info;
pub mod evolution;
pub mod fe_space;
pub mod gauss_points;
pub mod mesh;
pub mod physics;
