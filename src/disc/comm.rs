use ndarray::ArrayViewMut1;

/// Exchange capability between mesh partitions. The evolution core and the
/// DOF bounds engine talk to partitions only through this trait, so the
/// same code runs unchanged on one partition or many; a distributed driver
/// supplies an implementation that performs the halo exchange and the
/// global reductions over its communicator.
pub trait Communicator {
    /// Merges per-DOF bounds for DOFs shared across partition boundaries.
    /// Must be called after local bounds are computed and before they are
    /// used; the bounds of a shared DOF become the min/max over all
    /// partitions owning it.
    fn sync_bounds(&self, u_min: ArrayViewMut1<f64>, u_max: ArrayViewMut1<f64>);

    /// Global sum of a per-partition partial scalar (mass, residual norm).
    fn all_reduce_sum(&self, local: f64) -> f64;
}

/// Single-partition communicator: every DOF is owned locally, so the halo
/// exchange is empty and reductions are the identity.
pub struct SerialComm;

impl Communicator for SerialComm {
    fn sync_bounds(&self, _u_min: ArrayViewMut1<f64>, _u_max: ArrayViewMut1<f64>) {}

    fn all_reduce_sum(&self, local: f64) -> f64 {
        local
    }
}
