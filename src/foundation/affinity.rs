use std::thread::{self, ThreadId};

use crate::foundation::error::{ShadowResult, invariant};

/// Binds a registry to the actor thread that created it.
///
/// Touching the registry from any other thread is a programmer error.
#[derive(Debug, Clone)]
pub(crate) struct ActorAffinity {
    owner: ThreadId,
    actor: &'static str,
}

impl ActorAffinity {
    /// Bind to the calling thread.
    pub(crate) fn current(actor: &'static str) -> Self {
        Self {
            owner: thread::current().id(),
            actor,
        }
    }

    pub(crate) fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Fails (fatally in debug builds) when called off the owning actor.
    #[track_caller]
    pub(crate) fn check(&self) -> ShadowResult<()> {
        if self.is_current() {
            return Ok(());
        }
        Err(invariant(format!(
            "{} registry accessed from thread {:?}, owned by {:?}",
            self.actor,
            thread::current().name(),
            self.owner
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/affinity.rs"]
mod tests;
