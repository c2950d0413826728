//! Restartable start/stop state shared by the trace and profiler lifecycles.

use serde::Serialize;
use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Externally visible state of a lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Stopped,
    Starting,
    Started,
}

/// What a `start()` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new underlying instance is running.
    Started,
    /// Already starting or started; nothing was built.
    AlreadyRunning,
    /// Turned off by a kill switch or an environment gate.
    Disabled,
    /// No export target could be resolved.
    Unconfigured,
    /// A `stop()` arrived while starting; the new instance was shut down.
    Superseded,
}

enum Slot<H> {
    Stopped,
    Starting(u64),
    Started(H),
}

struct Inner<H> {
    slot: Slot<H>,
    attempts: u64,
}

/// Proof that the holder owns the current start attempt.
#[derive(Debug)]
pub(crate) struct StartTicket(u64);

/// What `begin_stop` found.
pub(crate) enum Stopping<H> {
    /// Nothing was running.
    Idle,
    /// A start was in flight; it will discard its instance on completion.
    Interrupted,
    /// The live instance, now owned by the caller.
    Running(H),
}

/// Holds at most one live handle `H`.
///
/// Every transition is one short critical section; no lock is held
/// across an `.await`.
pub(crate) struct LifecycleCell<H> {
    inner: Mutex<Inner<H>>,
}

impl<H> LifecycleCell<H> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                slot: Slot::Stopped,
                attempts: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<H>> {
        // State stays consistent even if a holder panicked mid-section.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> LifecycleState {
        match self.lock().slot {
            Slot::Stopped => LifecycleState::Stopped,
            Slot::Starting(_) => LifecycleState::Starting,
            Slot::Started(_) => LifecycleState::Started,
        }
    }

    /// Move `Stopped -> Starting`. `None` if anything else is in progress.
    pub(crate) fn try_begin_start(&self) -> Option<StartTicket> {
        let mut inner = self.lock();
        if !matches!(inner.slot, Slot::Stopped) {
            return None;
        }
        inner.attempts += 1;
        let attempt = inner.attempts;
        inner.slot = Slot::Starting(attempt);
        Some(StartTicket(attempt))
    }

    /// Give up a start attempt without publishing anything.
    pub(crate) fn abandon_start(&self, ticket: StartTicket) {
        let mut inner = self.lock();
        if matches!(inner.slot, Slot::Starting(attempt) if attempt == ticket.0) {
            inner.slot = Slot::Stopped;
        }
    }

    /// Publish the handle built for `ticket`.
    ///
    /// Hands the handle back if a `stop()` superseded this attempt.
    pub(crate) fn finish_start(&self, ticket: StartTicket, handle: H) -> Result<(), H> {
        let mut inner = self.lock();
        if matches!(inner.slot, Slot::Starting(attempt) if attempt == ticket.0) {
            inner.slot = Slot::Started(handle);
            Ok(())
        } else {
            Err(handle)
        }
    }

    /// Move to `Stopped`, taking ownership of any live handle.
    pub(crate) fn begin_stop(&self) -> Stopping<H> {
        let mut inner = self.lock();
        match mem::replace(&mut inner.slot, Slot::Stopped) {
            Slot::Stopped => Stopping::Idle,
            Slot::Starting(_) => Stopping::Interrupted,
            Slot::Started(handle) => Stopping::Running(handle),
        }
    }
}
