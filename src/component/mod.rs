//! Component descriptors: per-view-type creation, props and mount hooks.

pub(crate) mod descriptor;
pub(crate) mod registry;
