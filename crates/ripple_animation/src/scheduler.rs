//! Animation scheduler
//!
//! Owns every running tween and pending timer and advances them on a single
//! clock. The clock is virtual: it only moves when [`AnimationScheduler::advance`]
//! (explicit delta) or [`AnimationScheduler::tick`] (wall-clock delta) is
//! called, which makes timing fully deterministic under test.
//!
//! # Ordering
//!
//! One `advance` may cross several deadlines. The scheduler steps to each
//! deadline in turn, samples every tween there, and fires the completions and
//! timers due at that instant in registration order before moving on. Work
//! scheduled from inside a completion is anchored at the instant it was
//! scheduled and is picked up within the same `advance`.
//!
//! # Callbacks
//!
//! - Update callbacks run while the scheduler is locked. They may touch
//!   anything except the scheduler itself.
//! - Completion and timer callbacks run with the scheduler unlocked and may
//!   register or cancel work through a [`SchedulerHandle`].
//!
//! Cancelling a tween or timer drops its callbacks without running them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

use slotmap::{new_key_type, SlotMap};

use crate::tween::Tween;

new_key_type! {
    /// Handle to a registered tween
    pub struct TweenId;
    /// Handle to a pending one-shot timer
    pub struct TimerId;
}

/// Receives the tween's current value each time the scheduler samples it
pub type UpdateCallback = Box<dyn FnMut(f32) + Send>;

/// Runs once when a tween reaches its target or a timer fires
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

struct TweenEntry {
    tween: Tween,
    seq: u64,
    on_update: UpdateCallback,
    on_complete: CompletionCallback,
}

struct TimerEntry {
    deadline_ms: f64,
    seq: u64,
    callback: CompletionCallback,
}

enum Due {
    Tween(TweenId),
    Timer(TimerId),
}

/// Internal state of the animation scheduler
struct SchedulerInner {
    tweens: SlotMap<TweenId, TweenEntry>,
    timers: SlotMap<TimerId, TimerEntry>,
    now_ms: f64,
    next_seq: u64,
    last_frame: Instant,
}

impl SchedulerInner {
    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn next_deadline(&self) -> Option<f64> {
        let tweens = self.tweens.values().map(|e| e.tween.deadline_ms());
        let timers = self.timers.values().map(|t| t.deadline_ms);
        tweens.chain(timers).min_by(|a, b| a.total_cmp(b))
    }

    /// Push the current value of every tween to its update callback
    fn sample(&mut self) {
        let now = self.now_ms;
        for entry in self.tweens.values_mut() {
            (entry.on_update)(entry.tween.value_at(now));
        }
    }

    /// Remove everything due at or before `now` and return the callbacks in
    /// deadline order, ties broken by registration order
    fn take_due(&mut self) -> Vec<CompletionCallback> {
        let now = self.now_ms;
        let mut due: Vec<(f64, u64, Due)> = Vec::new();

        for (id, entry) in self.tweens.iter() {
            if entry.tween.deadline_ms() <= now {
                due.push((entry.tween.deadline_ms(), entry.seq, Due::Tween(id)));
            }
        }
        for (id, timer) in self.timers.iter() {
            if timer.deadline_ms <= now {
                due.push((timer.deadline_ms, timer.seq, Due::Timer(id)));
            }
        }
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        due.into_iter()
            .filter_map(|(_, _, item)| match item {
                Due::Tween(id) => self.tweens.remove(id).map(|e| e.on_complete),
                Due::Timer(id) => self.timers.remove(id).map(|t| t.callback),
            })
            .collect()
    }

    fn has_pending(&self) -> bool {
        !self.tweens.is_empty() || !self.timers.is_empty()
    }
}

fn lock(inner: &Mutex<SchedulerInner>) -> MutexGuard<'_, SchedulerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The animation scheduler that advances all tweens and timers
///
/// Held by whoever owns the frame loop; components receive a
/// [`SchedulerHandle`] to register work.
///
/// ```ignore
/// let scheduler = AnimationScheduler::new();
/// let handle = scheduler.handle();
/// handle.register_tween(Tween::new(0.0, 1.0, 300.0), |v| println!("{v}"), || {});
/// scheduler.advance(16.0);
/// ```
pub struct AnimationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                tweens: SlotMap::with_key(),
                timers: SlotMap::with_key(),
                now_ms: 0.0,
                next_seq: 0,
                last_frame: Instant::now(),
            })),
        }
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Current clock time in milliseconds
    pub fn now_ms(&self) -> f64 {
        lock(&self.inner).now_ms
    }

    /// Advance the clock by `dt_ms`, firing everything that comes due
    ///
    /// Returns true if work is still pending afterwards.
    pub fn advance(&self, dt_ms: f64) -> bool {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        let target = lock(&self.inner).now_ms + dt_ms;

        loop {
            let due = {
                let mut inner = lock(&self.inner);
                match inner.next_deadline() {
                    Some(deadline) if deadline <= target => {
                        inner.now_ms = inner.now_ms.max(deadline);
                        inner.sample();
                        inner.take_due()
                    }
                    _ => {
                        inner.now_ms = target;
                        inner.sample();
                        break;
                    }
                }
            };

            tracing::trace!("AnimationScheduler: firing {} callbacks", due.len());
            for callback in due {
                callback();
            }
        }

        self.has_active_animations()
    }

    /// Advance by the wall-clock time elapsed since the previous tick
    ///
    /// Returns true if work is still pending.
    pub fn tick(&self) -> bool {
        let dt_ms = {
            let mut inner = lock(&self.inner);
            let now = Instant::now();
            let dt = (now - inner.last_frame).as_secs_f64() * 1000.0;
            inner.last_frame = now;
            dt
        };
        self.advance(dt_ms)
    }

    /// Check if any tweens or timers are still pending
    pub fn has_active_animations(&self) -> bool {
        lock(&self.inner).has_pending()
    }

    /// Get the number of running tweens
    pub fn tween_count(&self) -> usize {
        lock(&self.inner).tweens.len()
    }

    /// Get the number of pending timers
    pub fn timer_count(&self) -> usize {
        lock(&self.inner).timers.len()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the animation scheduler
///
/// This is passed to components that need to register animations.
/// It won't prevent the scheduler from being dropped; once it is, every
/// operation becomes a no-op.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Current clock time, if the scheduler is alive
    pub fn now_ms(&self) -> Option<f64> {
        let inner = self.inner.upgrade()?;
        let now = lock(&inner).now_ms;
        Some(now)
    }

    // =========================================================================
    // Tween Operations
    // =========================================================================

    /// Register a tween anchored at the current clock time
    ///
    /// `on_update` receives every sampled value, the last one being exactly
    /// the target. `on_complete` runs once the target is reached, unless the
    /// tween is cancelled first.
    pub fn register_tween<U, C>(
        &self,
        mut tween: Tween,
        on_update: U,
        on_complete: C,
    ) -> Option<TweenId>
    where
        U: FnMut(f32) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let inner = self.inner.upgrade()?;
        let mut guard = lock(&inner);
        tween.anchor(guard.now_ms);
        let seq = guard.next_seq();
        let id = guard.tweens.insert(TweenEntry {
            tween,
            seq,
            on_update: Box::new(on_update),
            on_complete: Box::new(on_complete),
        });
        tracing::trace!(
            "AnimationScheduler: tween {:?} {} -> {} over {}ms (deadline {}ms)",
            id,
            tween.from_value(),
            tween.to_value(),
            tween.duration_ms(),
            tween.deadline_ms()
        );
        Some(id)
    }

    /// Cancel a tween without running its completion
    ///
    /// Returns false if it already finished or was cancelled.
    pub fn cancel_tween(&self, id: TweenId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = lock(&inner).tweens.remove(id).is_some();
        removed
    }

    // =========================================================================
    // Timer Operations
    // =========================================================================

    /// Run `callback` once, `delay_ms` after the current clock time
    pub fn schedule<C>(&self, delay_ms: f64, callback: C) -> Option<TimerId>
    where
        C: FnOnce() + Send + 'static,
    {
        let inner = self.inner.upgrade()?;
        let mut guard = lock(&inner);
        let delay_ms = if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 };
        let deadline_ms = guard.now_ms + delay_ms;
        let seq = guard.next_seq();
        let id = guard.timers.insert(TimerEntry {
            deadline_ms,
            seq,
            callback: Box::new(callback),
        });
        tracing::trace!("AnimationScheduler: timer {:?} at {}ms", id, deadline_ms);
        Some(id)
    }

    /// Cancel a pending timer
    ///
    /// Returns false if it already fired or was cancelled.
    pub fn cancel_timer(&self, id: TimerId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let removed = lock(&inner).timers.remove(id).is_some();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> CompletionCallback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |name: &str| -> CompletionCallback {
            let sink = Arc::clone(&sink);
            let name = name.to_string();
            Box::new(move || sink.lock().unwrap().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_tween_samples_and_completes() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let value = Arc::new(Mutex::new(0.0_f32));
        let done = Arc::new(AtomicUsize::new(0));

        let v = Arc::clone(&value);
        let d = Arc::clone(&done);
        let id = handle
            .register_tween(
                Tween::new(0.0, 100.0, 1000.0).easing(Easing::Linear),
                move |x| *v.lock().unwrap() = x,
                move || {
                    d.fetch_add(1, Ordering::SeqCst);
                },
            )
            .unwrap();

        assert!(scheduler.advance(500.0));
        assert!((*value.lock().unwrap() - 50.0).abs() < 1e-3);
        assert_eq!(scheduler.tween_count(), 1);

        assert!(!scheduler.advance(600.0));
        assert_eq!(*value.lock().unwrap(), 100.0);
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert!(!handle.cancel_tween(id));

        // Nothing fires twice
        scheduler.advance(1000.0);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_events_fire_in_deadline_order_within_one_advance() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let (log, make) = recorder();

        let late = make("late");
        let early = make("early");
        let middle = make("middle");
        handle.register_tween(Tween::new(0.0, 1.0, 900.0), |_| {}, late);
        handle.schedule(100.0, early);
        handle.register_tween(Tween::new(0.0, 1.0, 400.0), |_| {}, middle);

        scheduler.advance(5000.0);
        assert_eq!(*log.lock().unwrap(), vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_ties_break_by_registration_order() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let (log, make) = recorder();

        let first = make("tween");
        let second = make("timer");
        handle.register_tween(Tween::new(0.0, 1.0, 300.0), |_| {}, first);
        handle.schedule(300.0, second);

        scheduler.advance(300.0);
        assert_eq!(*log.lock().unwrap(), vec!["tween", "timer"]);
    }

    #[test]
    fn test_completion_can_schedule_follow_up() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let value = Arc::new(Mutex::new(-1.0_f32));
        let started_at = Arc::new(Mutex::new(None));

        let follow_up = handle.clone();
        let v = Arc::clone(&value);
        let s = Arc::clone(&started_at);
        handle.schedule(300.0, move || {
            *s.lock().unwrap() = follow_up.now_ms();
            follow_up.register_tween(
                Tween::new(0.5, 0.0, 700.0).easing(Easing::Linear),
                move |x| *v.lock().unwrap() = x,
                || {},
            );
        });

        // One big step crosses the timer and most of the follow-up tween
        scheduler.advance(650.0);
        assert_eq!(*started_at.lock().unwrap(), Some(300.0));
        assert!((*value.lock().unwrap() - 0.25).abs() < 1e-3);

        scheduler.advance(350.0);
        assert_eq!(*value.lock().unwrap(), 0.0);
        assert!(!scheduler.has_active_animations());
    }

    #[test]
    fn test_cancel_drops_callbacks() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let fired = Arc::new(AtomicUsize::new(0));

        let f1 = Arc::clone(&fired);
        let f2 = Arc::clone(&fired);
        let tween = handle
            .register_tween(Tween::new(0.0, 1.0, 100.0), |_| {}, move || {
                f1.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        let timer = handle
            .schedule(50.0, move || {
                f2.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert!(handle.cancel_tween(tween));
        assert!(handle.cancel_timer(timer));
        assert!(!handle.cancel_tween(tween));
        assert!(!handle.cancel_timer(timer));

        scheduler.advance(1000.0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.tween_count(), 0);
        assert_eq!(scheduler.timer_count(), 0);
    }

    #[test]
    fn test_tween_registered_later_starts_from_now() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let value = Arc::new(Mutex::new(-1.0_f32));

        scheduler.advance(200.0);
        let v = Arc::clone(&value);
        handle.register_tween(
            Tween::new(1.0, 0.0, 100.0).easing(Easing::Linear),
            move |x| *v.lock().unwrap() = x,
            || {},
        );

        scheduler.advance(50.0);
        assert!((*value.lock().unwrap() - 0.5).abs() < 1e-3);
        scheduler.advance(50.0);
        assert_eq!(*value.lock().unwrap(), 0.0);
    }

    #[test]
    fn test_zero_duration_completes_on_next_advance() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let done = Arc::new(AtomicUsize::new(0));

        let d = Arc::clone(&done);
        handle.register_tween(Tween::new(0.0, 1.0, 0.0), |_| {}, move || {
            d.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.advance(0.0);
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_duration_from_callback_lands_before_completing() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let samples = Arc::new(Mutex::new(Vec::new()));
        let completed_after = Arc::new(Mutex::new(None));

        let inner_handle = handle.clone();
        let s = Arc::clone(&samples);
        let c = Arc::clone(&completed_after);
        handle.schedule(100.0, move || {
            let seen = Arc::clone(&s);
            inner_handle.register_tween(
                Tween::new(0.5, 0.8, 0.0),
                move |x| s.lock().unwrap().push(x),
                move || *c.lock().unwrap() = seen.lock().unwrap().last().copied(),
            );
        });

        scheduler.advance(100.0);
        assert_eq!(*samples.lock().unwrap(), vec![0.8]);
        assert_eq!(*completed_after.lock().unwrap(), Some(0.8));
        assert_eq!(scheduler.tween_count(), 0);
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = AnimationScheduler::new();
            scheduler.handle()
        };

        // Scheduler is dropped, handle should not be alive
        assert!(!handle.is_alive());
        assert_eq!(handle.now_ms(), None);

        // Operations should safely no-op
        assert!(handle
            .register_tween(Tween::new(0.0, 1.0, 10.0), |_| {}, || {})
            .is_none());
        assert!(handle.schedule(10.0, || {}).is_none());
    }

    #[test]
    fn test_negative_advance_is_ignored() {
        let scheduler = AnimationScheduler::new();
        scheduler.advance(100.0);
        scheduler.advance(-50.0);
        scheduler.advance(f64::NAN);
        assert_eq!(scheduler.now_ms(), 100.0);
    }

    #[test]
    fn test_tick_uses_wall_clock() {
        let scheduler = AnimationScheduler::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        scheduler.tick();
        assert!(scheduler.now_ms() >= 5.0);
    }
}
