//! Batch commit: layout diff into frame records, then mounting onto the native registry.

pub(crate) mod animation;
pub(crate) mod context;
pub(crate) mod mounter;
pub(crate) mod planner;
pub(crate) mod record;
