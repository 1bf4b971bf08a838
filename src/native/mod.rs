//! UI-actor side: native widget contract and the native registry.

pub(crate) mod registry;
pub(crate) mod view;
