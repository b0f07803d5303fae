//! Ripple Animation System
//!
//! Timed tweens, easing curves and the scheduler that drives them.
//!
//! # Features
//!
//! - **Easing**: the standard ease-in/out family plus CSS-style cubic beziers
//! - **Tweens**: a value travelling between two endpoints over a duration
//! - **Scheduler**: a virtual clock that samples every tween, fires
//!   completions and one-shot timers strictly in deadline order, and
//!   supports cancellation
//! - **Wall-clock ticking**: `AnimationScheduler::tick()` advances by the
//!   real time elapsed since the previous tick

pub mod easing;
pub mod scheduler;
pub mod tween;

pub use easing::Easing;
pub use scheduler::{
    AnimationScheduler, CompletionCallback, SchedulerHandle, TimerId, TweenId, UpdateCallback,
};
pub use tween::Tween;
