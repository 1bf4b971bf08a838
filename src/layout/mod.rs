//! Layout engine seam and the bundled Taffy flexbox implementation.

pub(crate) mod cache;
pub(crate) mod engine;
pub(crate) mod style;
pub(crate) mod taffy_engine;
