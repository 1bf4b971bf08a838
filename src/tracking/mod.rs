//! Per-batch change tracking and batch lifecycle observers.

pub(crate) mod change_tracker;
pub(crate) mod observer;
