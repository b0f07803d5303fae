//! Ripple controller
//!
//! Spawns a circular overlay inside a host view and drives it through two
//! independently scheduled phases:
//!
//! - **Scale**: uniform scale from identity to the growth factor, anchored
//!   at the overlay's center
//! - **Fade**: opacity from the initial to the end value, optionally forked
//!   at the decision time by the outcome flag
//!
//! The overlay is detached when the fade reaches its terminal opacity, when
//! a failed hold is observed at the end of the scale phase, or when the
//! session is cancelled.
//!
//! # Locking
//!
//! Per-run state, the scheduler and the view tree each sit behind their own
//! mutex. Tween updates run under the scheduler lock and only touch the view
//! tree. Completion callbacks run with no lock held, and every path below
//! releases the run state before calling into the scheduler or the caller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ripple_animation::{SchedulerHandle, TimerId, Tween, TweenId};
use ripple_core::{
    Affine2D, Point, Rect, SharedViewTree, Size, ViewId, ViewNode, ViewShape, ViewTree,
};

use crate::config::{FadeStart, FailureFade};
use crate::configuration::RippleConfiguration;
use crate::error::{Result, RippleError};
use crate::growth::OVERLAY_EXTENT;
use crate::session::{DecisionOutcome, FadeStage, OutcomeFlag, RipplePhase, RippleSession};

type OnComplete = Box<dyn FnOnce(bool) + Send>;

fn lock_views(views: &SharedViewTree) -> MutexGuard<'_, ViewTree> {
    views.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Starts ripples on views of a shared view tree
#[derive(Clone)]
pub struct RippleController {
    views: SharedViewTree,
    scheduler: SchedulerHandle,
}

impl RippleController {
    pub fn new(views: SharedViewTree, scheduler: SchedulerHandle) -> Self {
        Self { views, scheduler }
    }

    pub fn views(&self) -> &SharedViewTree {
        &self.views
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    /// Run a ripple inside `host`
    ///
    /// `on_complete` is called exactly once with the outcome, unless the
    /// session is cancelled first. Without a decision branch it fires after
    /// both phases finished and the overlay is detached; with one it fires
    /// when the scale phase completes.
    pub fn animate<F>(
        &self,
        host: ViewId,
        config: &RippleConfiguration,
        on_complete: F,
    ) -> Result<RippleSession>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.animate_with_outcome(host, config, OutcomeFlag::default(), on_complete)
    }

    /// Run a ripple whose completion takes no outcome
    pub fn animate_then<F>(
        &self,
        host: ViewId,
        config: &RippleConfiguration,
        on_complete: F,
    ) -> Result<RippleSession>
    where
        F: FnOnce() + Send + 'static,
    {
        self.animate(host, config, move |_| on_complete())
    }

    /// Run a ripple that reads a caller-owned outcome flag
    ///
    /// Lets a gesture recognizer created before the ripple share its flag.
    pub fn animate_with_outcome<F>(
        &self,
        host: ViewId,
        config: &RippleConfiguration,
        outcome: OutcomeFlag,
        on_complete: F,
    ) -> Result<RippleSession>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        if !self.scheduler.is_alive() {
            return Err(RippleError::SchedulerUnavailable);
        }

        let start = config.start_point();
        let overlay_frame =
            Rect::from_origin_size(start, Size::new(OVERLAY_EXTENT, OVERLAY_EXTENT));

        let (overlay, host_size) = {
            let mut views = lock_views(&self.views);
            let host_size = views
                .get(host)
                .map(|node| node.frame().size())
                .ok_or(RippleError::UnknownHost(host))?;
            if host_size.is_degenerate() {
                return Err(RippleError::DegenerateHostBounds {
                    width: host_size.width,
                    height: host_size.height,
                });
            }

            views.set_clips_to_bounds(host, config.clips_to_bounds());
            let overlay = views.add_subview(
                host,
                ViewNode::new(overlay_frame)
                    .with_background(config.color())
                    .with_shape(ViewShape::Circle)
                    .with_opacity(config.initial_opacity()),
            )?;
            (overlay, host_size)
        };

        let growth =
            config
                .growth()
                .growth_factor(host_size, start, config.scale(), OVERLAY_EXTENT);

        tracing::debug!(
            "Ripple {:?}: host {:?} ({}x{}), start ({}, {}), growth {:.3}, decision {}",
            overlay,
            host,
            host_size.width,
            host_size.height,
            start.x,
            start.y,
            growth,
            config.decision_enabled()
        );

        let run = Arc::new(RippleRun {
            views: Arc::clone(&self.views),
            scheduler: self.scheduler.clone(),
            config: *config,
            host,
            overlay,
            anchor: overlay_frame.center(),
            growth,
            outcome,
            state: Mutex::new(RunState::new(Box::new(on_complete))),
        });

        if let Err(err) = run.start() {
            tracing::warn!("Ripple {:?}: failed to start: {}", overlay, err);
            run.cancel();
            return Err(err);
        }

        Ok(RippleSession::new(run))
    }
}

/// Mutable part of a run
struct RunState {
    started: bool,
    scaling: bool,
    fade: FadeStage,
    detached: bool,
    cancelled: bool,
    /// Flag value observed when the scale phase completed
    scale_outcome: Option<bool>,
    scale_tween: Option<TweenId>,
    fade_tween: Option<TweenId>,
    decision_timer: Option<TimerId>,
    on_complete: Option<OnComplete>,
}

impl RunState {
    fn new(on_complete: OnComplete) -> Self {
        Self {
            started: false,
            scaling: false,
            fade: FadeStage::Waiting,
            detached: false,
            cancelled: false,
            scale_outcome: None,
            scale_tween: None,
            fade_tween: None,
            decision_timer: None,
            on_complete: Some(on_complete),
        }
    }

    /// Overlay gone, growth over and the callback spent
    fn is_settled(&self) -> bool {
        self.detached && !self.scaling && self.on_complete.is_none()
    }

    /// Take every fade-side handle still registered with the scheduler
    fn take_fade_work(&mut self) -> (Option<TweenId>, Option<TimerId>) {
        (self.fade_tween.take(), self.decision_timer.take())
    }
}

/// One ripple in flight, shared by its session and its scheduled callbacks
pub(crate) struct RippleRun {
    views: SharedViewTree,
    scheduler: SchedulerHandle,
    config: RippleConfiguration,
    host: ViewId,
    overlay: ViewId,
    /// Scale anchor in host coordinates
    anchor: Point,
    growth: f32,
    outcome: OutcomeFlag,
    state: Mutex<RunState>,
}

impl RippleRun {
    fn state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn overlay(&self) -> ViewId {
        self.overlay
    }

    pub(crate) fn host(&self) -> ViewId {
        self.host
    }

    pub(crate) fn outcome(&self) -> &OutcomeFlag {
        &self.outcome
    }

    pub(crate) fn phase(&self) -> RipplePhase {
        let state = self.state();
        if state.detached {
            RipplePhase::Detached
        } else if !state.started {
            RipplePhase::Created
        } else {
            RipplePhase::Running {
                scaling: state.scaling,
                fade: state.fade,
            }
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        let state = self.state();
        state.cancelled || state.is_settled()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.state().cancelled
    }

    // =========================================================================
    // Phase Setup
    // =========================================================================

    fn start(self: &Arc<Self>) -> Result<()> {
        self.state().started = true;
        self.start_scale()?;
        if self.config.fade_start() == FadeStart::WithScale {
            self.start_fade()?;
        }
        Ok(())
    }

    fn start_scale(self: &Arc<Self>) -> Result<()> {
        let views = Arc::clone(&self.views);
        let overlay = self.overlay;
        let anchor = self.anchor;
        let run = Arc::clone(self);

        let tween = Tween::new(1.0, self.growth, self.config.scale_duration_ms())
            .easing(self.config.easing());
        let id = self
            .scheduler
            .register_tween(
                tween,
                move |scale| {
                    lock_views(&views).set_transform(
                        overlay,
                        Affine2D::scale_about(scale, scale, anchor),
                    );
                },
                move || run.on_scale_complete(),
            )
            .ok_or(RippleError::SchedulerUnavailable)?;

        let mut state = self.state();
        state.scaling = true;
        state.scale_tween = Some(id);
        Ok(())
    }

    fn start_fade(self: &Arc<Self>) -> Result<()> {
        let initial = self.config.initial_opacity();
        match self.config.decision() {
            None => {
                let id = self.fade_opacity(
                    initial,
                    self.config.end_opacity(),
                    self.config.fade_duration_ms(),
                    |run| run.on_fade_complete(),
                )?;
                let mut state = self.state();
                state.fade = FadeStage::Fading;
                state.fade_tween = Some(id);
            }
            Some(decision) => {
                let decision_ms = decision.time * 1000.0;
                let id = self.fade_opacity(initial, decision.opacity, decision_ms, |run| {
                    let mut state = run.state();
                    if state.fade == FadeStage::FadingToDecision {
                        state.fade_tween = None;
                    }
                })?;

                let run = Arc::clone(self);
                let timer = match self.scheduler.schedule(decision_ms, move || run.on_decision()) {
                    Some(timer) => timer,
                    None => {
                        self.scheduler.cancel_tween(id);
                        return Err(RippleError::SchedulerUnavailable);
                    }
                };

                let mut state = self.state();
                state.fade = FadeStage::FadingToDecision;
                state.fade_tween = Some(id);
                state.decision_timer = Some(timer);
            }
        }
        Ok(())
    }

    /// Register an opacity tween on the overlay
    fn fade_opacity<C>(
        self: &Arc<Self>,
        from: f32,
        to: f32,
        duration_ms: f64,
        on_done: C,
    ) -> Result<TweenId>
    where
        C: FnOnce(&Arc<RippleRun>) + Send + 'static,
    {
        let views = Arc::clone(&self.views);
        let overlay = self.overlay;
        let run = Arc::clone(self);

        let tween = Tween::new(from, to, duration_ms).easing(self.config.easing());
        self.scheduler
            .register_tween(
                tween,
                move |opacity| {
                    lock_views(&views).set_opacity(overlay, opacity);
                },
                move || on_done(&run),
            )
            .ok_or(RippleError::SchedulerUnavailable)
    }

    // =========================================================================
    // Phase Completions
    // =========================================================================

    fn on_scale_complete(self: &Arc<Self>) {
        let succeeded = self.outcome.get();

        let mut state = self.state();
        if state.cancelled {
            return;
        }
        state.scaling = false;
        state.scale_tween = None;
        state.scale_outcome = Some(succeeded);
        tracing::debug!(
            "Ripple {:?}: scale finished, hold succeeded: {}",
            self.overlay,
            succeeded
        );

        if !self.config.decision_enabled() {
            let start_fade = self.config.fade_start() == FadeStart::AfterScale && !state.detached;
            drop(state);
            if start_fade {
                self.start_fade_or_detach();
            }
            self.finish_if_settled();
            return;
        }

        let callback = state.on_complete.take();
        if succeeded {
            let start_fade = self.config.fade_start() == FadeStart::AfterScale && !state.detached;
            drop(state);
            if start_fade {
                self.start_fade_or_detach();
            }
        } else {
            // A failed hold removes the overlay as soon as growth ends
            state.fade = FadeStage::Finished;
            let (tween, timer) = state.take_fade_work();
            drop(state);
            self.cancel_work(None, tween, timer);
            self.detach("hold failed");
        }

        if let Some(callback) = callback {
            callback(succeeded);
        }
    }

    fn on_decision(self: &Arc<Self>) {
        let Some(decision) = self.config.decision().copied() else {
            return;
        };
        let outcome = DecisionOutcome::from(self.outcome.get());

        {
            let mut state = self.state();
            if state.cancelled || state.detached {
                return;
            }
            state.decision_timer = None;
            state.fade = FadeStage::Settling(outcome);
        }

        let fade_ms = self.config.fade_duration_ms();
        let decision_ms = decision.time * 1000.0;
        let (target, duration_ms) = match outcome {
            DecisionOutcome::Succeeded => (decision.succeeded_opacity, fade_ms - decision_ms),
            DecisionOutcome::Failed => match self.config.failure_fade() {
                FailureFade::FullDuration => (self.config.end_opacity(), fade_ms),
                FailureFade::Remaining => (self.config.end_opacity(), fade_ms - decision_ms),
            },
        };
        tracing::debug!(
            "Ripple {:?}: decision {:?}, settling to {} over {}ms",
            self.overlay,
            outcome,
            target,
            duration_ms
        );

        match self.fade_opacity(decision.opacity, target, duration_ms, |run| {
            run.on_fade_complete()
        }) {
            Ok(id) => self.state().fade_tween = Some(id),
            Err(err) => {
                tracing::warn!("Ripple {:?}: {}", self.overlay, err);
                self.state().fade = FadeStage::Finished;
                self.detach("scheduler gone");
            }
        }
    }

    fn on_fade_complete(self: &Arc<Self>) {
        {
            let mut state = self.state();
            if state.cancelled {
                return;
            }
            state.fade = FadeStage::Finished;
            state.fade_tween = None;
        }
        self.detach("fade finished");
        self.finish_if_settled();
    }

    fn start_fade_or_detach(self: &Arc<Self>) {
        if let Err(err) = self.start_fade() {
            tracing::warn!("Ripple {:?}: failed to start fade: {}", self.overlay, err);
            self.state().fade = FadeStage::Finished;
            self.detach("scheduler gone");
        }
    }

    /// Fire the completion once both phases are over (no decision branch)
    fn finish_if_settled(&self) {
        if self.config.decision_enabled() {
            return;
        }
        let pending = {
            let mut state = self.state();
            if state.cancelled || state.scaling || state.fade != FadeStage::Finished {
                return;
            }
            let outcome = state.scale_outcome.unwrap_or(true);
            state.on_complete.take().map(|callback| (callback, outcome))
        };
        if let Some((callback, outcome)) = pending {
            tracing::debug!("Ripple {:?}: complete", self.overlay);
            callback(outcome);
        }
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    fn detach(&self, reason: &str) {
        {
            let mut state = self.state();
            if state.detached {
                return;
            }
            state.detached = true;
        }
        let removed = lock_views(&self.views).remove_from_superview(self.overlay);
        tracing::debug!(
            "Ripple {:?}: detached ({}), was attached: {}",
            self.overlay,
            reason,
            removed
        );
    }

    fn cancel_work(&self, scale: Option<TweenId>, fade: Option<TweenId>, timer: Option<TimerId>) {
        for id in scale.into_iter().chain(fade) {
            self.scheduler.cancel_tween(id);
        }
        if let Some(timer) = timer {
            self.scheduler.cancel_timer(timer);
        }
    }

    pub(crate) fn cancel(&self) -> bool {
        let (callback, scale, fade, timer) = {
            let mut state = self.state();
            if state.cancelled || state.is_settled() {
                return false;
            }
            state.cancelled = true;
            state.scaling = false;
            state.fade = FadeStage::Finished;
            let (fade, timer) = state.take_fade_work();
            (state.on_complete.take(), state.scale_tween.take(), fade, timer)
        };
        self.cancel_work(scale, fade, timer);
        self.detach("cancelled");
        tracing::debug!(
            "Ripple {:?}: cancelled, callback suppressed: {}",
            self.overlay,
            callback.is_some()
        );
        drop(callback);
        true
    }
}
