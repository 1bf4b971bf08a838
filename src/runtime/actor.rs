use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};

use crate::foundation::error::{ShadowError, ShadowResult};

type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

enum Msg<S> {
    Run(Job<S>),
    Stop,
}

/// Sending side of an actor: closures posted here run one at a time on the actor thread.
pub struct ActorHandle<S> {
    name: Arc<str>,
    tx: mpsc::Sender<Msg<S>>,
}

impl<S> Clone for ActorHandle<S> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            tx: self.tx.clone(),
        }
    }
}

impl<S> std::fmt::Debug for ActorHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<S: 'static> ActorHandle<S> {
    /// Actor (thread) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Post `job` without waiting for it.
    pub fn dispatch(&self, job: impl FnOnce(&mut S) + Send + 'static) -> ShadowResult<()> {
        self.tx
            .send(Msg::Run(Box::new(job)))
            .map_err(|_| ShadowError::actor(format!("{} has shut down", self.name)))
    }

    /// Run `job` on the actor and wait for its result.
    ///
    /// Must not be called from the actor's own thread.
    pub fn call<R: Send + 'static>(
        &self,
        job: impl FnOnce(&mut S) -> R + Send + 'static,
    ) -> ShadowResult<R> {
        let (reply_tx, reply_rx) = mpsc::sync_channel::<R>(1);
        self.dispatch(move |state| {
            let _ = reply_tx.send(job(state));
        })?;
        reply_rx.recv().map_err(|_| {
            ShadowError::actor(format!("{} dropped the reply (job panicked?)", self.name))
        })
    }
}

/// A named thread that owns `S` and runs posted closures against it in order.
pub struct Actor<S: 'static> {
    handle: ActorHandle<S>,
    thread: Option<JoinHandle<()>>,
}

impl<S: 'static> Actor<S> {
    /// Spawn the thread and build its state there, so thread-bound state never moves.
    pub fn spawn(
        name: &str,
        init: impl FnOnce(ActorHandle<S>) -> S + Send + 'static,
    ) -> ShadowResult<Self> {
        let (tx, rx) = mpsc::channel::<Msg<S>>();
        let handle = ActorHandle {
            name: Arc::from(name),
            tx,
        };
        let own = handle.clone();
        let thread = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || run(own, rx, init))
            .map_err(|e| ShadowError::actor(format!("spawn {name}: {e}")))?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    /// A handle for posting work.
    pub fn handle(&self) -> &ActorHandle<S> {
        &self.handle
    }

    /// Stop after already-queued work and join the thread.
    pub fn shutdown(mut self) -> ShadowResult<()> {
        self.stop()
    }

    fn stop(&mut self) -> ShadowResult<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        let _ = self.handle.tx.send(Msg::Stop);
        thread
            .join()
            .map_err(|_| ShadowError::actor(format!("{} panicked", self.handle.name)))
    }
}

impl<S: 'static> Drop for Actor<S> {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::error!(error = %err, "actor shutdown failed");
        }
    }
}

fn run<S>(own: ActorHandle<S>, rx: mpsc::Receiver<Msg<S>>, init: impl FnOnce(ActorHandle<S>) -> S) {
    let name = Arc::clone(&own.name);
    let mut state = init(own);
    tracing::debug!(actor = %name, "actor started");
    while let Ok(msg) = rx.recv() {
        match msg {
            Msg::Run(job) => {
                // A panicking job is logged; the actor keeps serving.
                if catch_unwind(AssertUnwindSafe(|| job(&mut state))).is_err() {
                    tracing::error!(actor = %name, "actor job panicked");
                }
            }
            Msg::Stop => break,
        }
    }
    tracing::debug!(actor = %name, "actor stopped");
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/actor.rs"]
mod tests;
