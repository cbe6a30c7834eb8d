pub mod lagrange1d;
