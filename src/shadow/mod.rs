//! Shadow tree: layout-aware mirror of the declarative UI tree.

pub(crate) mod children;
pub(crate) mod node;
pub(crate) mod registry;
