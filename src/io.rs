pub mod param_parser;
pub mod write_to_csv;
pub mod write_to_vtu;
