//! Ripple sessions
//!
//! `animate` returns a [`RippleSession`]: the caller's handle on one running
//! ripple. It carries the outcome flag the decision branch consults and the
//! cancellation entry point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ripple_core::ViewId;

use crate::controller::RippleRun;

/// Shared "hold succeeded" signal
///
/// Defaults to `true`. A gesture recognizer keeps a clone and flips it; the
/// ripple reads it when the scale phase completes and at the decision point.
#[derive(Clone, Debug)]
pub struct OutcomeFlag(Arc<AtomicBool>);

impl OutcomeFlag {
    pub fn new(succeeded: bool) -> Self {
        Self(Arc::new(AtomicBool::new(succeeded)))
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, succeeded: bool) {
        self.0.store(succeeded, Ordering::Release);
    }
}

impl Default for OutcomeFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Result of the decision fork
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionOutcome {
    Succeeded,
    Failed,
}

impl From<bool> for DecisionOutcome {
    fn from(succeeded: bool) -> Self {
        if succeeded {
            DecisionOutcome::Succeeded
        } else {
            DecisionOutcome::Failed
        }
    }
}

/// Where the opacity phase stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeStage {
    /// Not started yet (sequential fade waiting for the scale phase)
    Waiting,
    /// Plain fade from initial to end opacity
    Fading,
    /// Heading for the decision opacity
    FadingToDecision,
    /// Decision resolved, heading for the branch's final opacity
    Settling(DecisionOutcome),
    /// Fade reached its terminal opacity, or was abandoned
    Finished,
}

/// Lifecycle of a ripple overlay
///
/// `Created → Running → Detached`. Detached is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RipplePhase {
    Created,
    Running { scaling: bool, fade: FadeStage },
    Detached,
}

/// Handle on one running ripple
#[derive(Clone)]
pub struct RippleSession {
    run: Arc<RippleRun>,
}

impl RippleSession {
    pub(crate) fn new(run: Arc<RippleRun>) -> Self {
        Self { run }
    }

    /// The overlay view; stale once the ripple detaches
    pub fn overlay(&self) -> ViewId {
        self.run.overlay()
    }

    /// The host view the overlay is attached to
    pub fn host(&self) -> ViewId {
        self.run.host()
    }

    /// Clone of the outcome flag, for handing to a gesture recognizer
    pub fn outcome(&self) -> OutcomeFlag {
        self.run.outcome().clone()
    }

    pub fn hold_succeeded(&self) -> bool {
        self.run.outcome().get()
    }

    pub fn set_hold_succeeded(&self, succeeded: bool) {
        self.run.outcome().set(succeeded);
    }

    pub fn phase(&self) -> RipplePhase {
        self.run.phase()
    }

    /// True once the overlay is gone and no callback is pending
    pub fn is_finished(&self) -> bool {
        self.run.is_finished()
    }

    pub fn is_cancelled(&self) -> bool {
        self.run.is_cancelled()
    }

    /// Stop the ripple now
    ///
    /// Detaches the overlay, cancels every pending transition and drops the
    /// completion callback without calling it. Returns false, changing
    /// nothing, if the ripple was already cancelled or had finished.
    pub fn cancel(&self) -> bool {
        self.run.cancel()
    }
}

impl std::fmt::Debug for RippleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RippleSession")
            .field("overlay", &self.overlay())
            .field("phase", &self.phase())
            .field("hold_succeeded", &self.hold_succeeded())
            .finish()
    }
}
