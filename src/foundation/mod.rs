pub(crate) mod affinity;
pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
