//! Timed tweens
//!
//! A [`Tween`] moves a float from `from` to `to` over `duration_ms`. The
//! scheduler anchors it on its clock at registration; everything else is a
//! pure function of the clock time.

use crate::easing::Easing;

/// A single timed transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration_ms: f64,
    easing: Easing,
    /// Clock time at which the transition begins
    start_ms: f64,
}

impl Tween {
    /// Create a tween; negative or non-finite durations are treated as zero
    pub fn new(from: f32, to: f32, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            duration_ms: sanitize(duration_ms),
            easing: Easing::default(),
            start_ms: 0.0,
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn from_value(&self) -> f32 {
        self.from
    }

    pub fn to_value(&self) -> f32 {
        self.to
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Pin the tween to the clock; it starts moving at `now_ms`
    pub(crate) fn anchor(&mut self, now_ms: f64) {
        self.start_ms = now_ms;
    }

    /// Clock time at which the tween reaches its target
    pub fn deadline_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }

    /// Linear progress (0.0 to 1.0) at a clock time
    pub fn progress_at(&self, now_ms: f64) -> f32 {
        if now_ms >= self.deadline_ms() {
            return 1.0;
        }
        if now_ms <= self.start_ms || self.duration_ms <= 0.0 {
            return 0.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms) as f32
    }

    /// Eased value at a clock time
    pub fn value_at(&self, now_ms: f64) -> f32 {
        let progress = self.progress_at(now_ms);
        if progress >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(progress)
    }
}

fn sanitize(ms: f64) -> f64 {
    if ms.is_finite() && ms > 0.0 {
        ms
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_progress() {
        let mut tween = Tween::new(0.0, 100.0, 1000.0).easing(Easing::Linear);
        tween.anchor(0.0);

        assert_eq!(tween.value_at(0.0), 0.0);
        assert!((tween.value_at(250.0) - 25.0).abs() < 1e-4);
        assert_eq!(tween.value_at(1000.0), 100.0);
        assert_eq!(tween.value_at(5000.0), 100.0);
    }

    #[test]
    fn test_anchor_shifts_deadline() {
        let mut tween = Tween::new(1.0, 0.0, 200.0);
        tween.anchor(400.0);

        assert_eq!(tween.deadline_ms(), 600.0);
        assert_eq!(tween.value_at(350.0), 1.0);
        assert_eq!(tween.value_at(600.0), 0.0);
    }

    #[test]
    fn test_scale_tween_lands_on_growth() {
        let mut tween = Tween::new(1.0, 254.558, 1000.0);
        tween.anchor(0.0);

        assert!((tween.value_at(500.0) - 127.779).abs() < 1e-2);
        assert_eq!(tween.value_at(1000.0), 254.558);
    }

    #[test]
    fn test_zero_duration_lands_immediately() {
        let mut tween = Tween::new(0.2, 0.8, 0.0);
        tween.anchor(50.0);

        assert_eq!(tween.deadline_ms(), 50.0);
        assert_eq!(tween.value_at(50.0), 0.8);
    }

    #[test]
    fn test_invalid_durations_sanitized() {
        assert_eq!(Tween::new(0.0, 1.0, -5.0).duration_ms(), 0.0);
        assert_eq!(Tween::new(0.0, 1.0, f64::NAN).duration_ms(), 0.0);
        assert_eq!(Tween::new(0.0, 1.0, f64::INFINITY).duration_ms(), 0.0);
    }
}
