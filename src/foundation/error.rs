use crate::foundation::core::Tag;

/// Convenience result type used across shadowtree.
pub type ShadowResult<T> = Result<T, ShadowError>;

/// Error taxonomy of the shadow-tree engine.
#[derive(thiserror::Error, Debug)]
pub enum ShadowError {
    /// An internal invariant was violated by the caller (programmer error).
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// A command referenced a tag that is unknown (never created or already purged).
    #[error("unknown tag {0}")]
    LookupMiss(Tag),

    /// A layout query produced a non-finite value or an invalid ancestor relationship.
    #[error("layout anomaly: {0}")]
    Layout(String),

    /// A mutation closure or component hook failed while mounting.
    #[error("mount failure: {0}")]
    Mount(String),

    /// The peer actor has shut down and can no longer receive work.
    #[error("actor unavailable: {0}")]
    Actor(String),

    /// Errors when serializing or deserializing commands or options.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShadowError {
    /// Build a [`ShadowError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`ShadowError::Mount`] value.
    pub fn mount(msg: impl Into<String>) -> Self {
        Self::Mount(msg.into())
    }

    /// Build a [`ShadowError::Actor`] value.
    pub fn actor(msg: impl Into<String>) -> Self {
        Self::Actor(msg.into())
    }

    /// Build a [`ShadowError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this is an expected lookup miss (teardown race) rather than a real failure.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, Self::LookupMiss(_))
    }
}

/// Report a programmer error.
///
/// Fatal when debug assertions are enabled; otherwise logged and returned so the caller can
/// turn the operation into a no-op.
#[track_caller]
pub fn invariant(msg: impl Into<String>) -> ShadowError {
    let msg = msg.into();
    tracing::error!(%msg, "invariant violation");
    if cfg!(debug_assertions) {
        panic!("invariant violation: {msg}");
    }
    ShadowError::Invariant(msg)
}

/// Log an error at the command boundary and drop it.
pub(crate) fn absorb(op: &'static str, result: ShadowResult<()>) {
    match result {
        Ok(()) => {}
        Err(ShadowError::LookupMiss(tag)) => {
            tracing::warn!(op, %tag, "command references unknown tag; ignored");
        }
        Err(ShadowError::Layout(msg)) => {
            tracing::warn!(op, %msg, "layout anomaly");
        }
        Err(err) => {
            tracing::error!(op, error = %err, "command failed");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
