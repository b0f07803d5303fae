//! Ripple configuration
//!
//! An immutable description of one ripple request. Construction goes
//! through [`RippleConfigurationBuilder`], which starts from a
//! [`RippleDefaults`] value and validates on `build()`: an invalid value is
//! rejected, never clamped.

use std::time::Duration;

use ripple_animation::Easing;
use ripple_core::{Color, Point};
use serde::{Deserialize, Serialize};

use crate::config::{FadeStart, FailureFade, GrowthPolicy, RippleDefaults};
use crate::error::{Result, RippleError};

/// Parameters of the hold/decision fork in the fade phase
///
/// The fade first heads for `opacity`, reaching it `time` seconds into the
/// fade. At that instant the outcome flag picks the rest of the path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionBranch {
    /// Seconds into the fade phase; must not exceed the fade duration
    pub time: f64,
    /// Opacity reached at `time`
    pub opacity: f32,
    /// Final opacity when the hold succeeded
    pub succeeded_opacity: f32,
}

impl DecisionBranch {
    pub fn new(time: f64, opacity: f32, succeeded_opacity: f32) -> Self {
        Self {
            time,
            opacity,
            succeeded_opacity,
        }
    }
}

/// A validated ripple request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleConfiguration {
    color: Color,
    clips_to_bounds: bool,
    start_point: Point,
    scale: f32,
    scale_duration: f64,
    fade_duration: f64,
    initial_opacity: f32,
    end_opacity: f32,
    decision: Option<DecisionBranch>,
    growth: GrowthPolicy,
    fade_start: FadeStart,
    failure_fade: FailureFade,
    easing: Easing,
}

impl RippleConfiguration {
    /// Start a builder from the built-in defaults
    pub fn builder(color: Color) -> RippleConfigurationBuilder {
        Self::builder_with(color, &RippleDefaults::default())
    }

    /// Start a builder from explicit defaults
    pub fn builder_with(color: Color, defaults: &RippleDefaults) -> RippleConfigurationBuilder {
        RippleConfigurationBuilder {
            config: RippleConfiguration {
                color,
                clips_to_bounds: defaults.clips_to_bounds,
                start_point: Point::ZERO,
                scale: defaults.scale,
                scale_duration: defaults.scale_duration,
                fade_duration: defaults.fade_duration,
                initial_opacity: defaults.initial_opacity,
                end_opacity: defaults.end_opacity,
                decision: defaults.decision,
                growth: defaults.growth,
                fade_start: defaults.fade_start,
                failure_fade: defaults.failure_fade,
                easing: defaults.easing,
            },
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn clips_to_bounds(&self) -> bool {
        self.clips_to_bounds
    }

    pub fn start_point(&self) -> Point {
        self.start_point
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn scale_duration(&self) -> Duration {
        Duration::from_secs_f64(self.scale_duration)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_secs_f64(self.fade_duration)
    }

    pub fn initial_opacity(&self) -> f32 {
        self.initial_opacity
    }

    pub fn end_opacity(&self) -> f32 {
        self.end_opacity
    }

    pub fn decision(&self) -> Option<&DecisionBranch> {
        self.decision.as_ref()
    }

    pub fn decision_enabled(&self) -> bool {
        self.decision.is_some()
    }

    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }

    pub fn fade_start(&self) -> FadeStart {
        self.fade_start
    }

    pub fn failure_fade(&self) -> FailureFade {
        self.failure_fade
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub(crate) fn scale_duration_ms(&self) -> f64 {
        self.scale_duration * 1000.0
    }

    pub(crate) fn fade_duration_ms(&self) -> f64 {
        self.fade_duration * 1000.0
    }
}

/// Builder for [`RippleConfiguration`]
///
/// Durations are given in seconds.
#[derive(Clone, Debug)]
pub struct RippleConfigurationBuilder {
    config: RippleConfiguration,
}

impl RippleConfigurationBuilder {
    pub fn color(mut self, color: Color) -> Self {
        self.config.color = color;
        self
    }

    pub fn clips_to_bounds(mut self, clips: bool) -> Self {
        self.config.clips_to_bounds = clips;
        self
    }

    /// Ripple origin in host-local coordinates
    pub fn start_point(mut self, point: Point) -> Self {
        self.config.start_point = point;
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn scale_duration(mut self, seconds: f64) -> Self {
        self.config.scale_duration = seconds;
        self
    }

    pub fn fade_duration(mut self, seconds: f64) -> Self {
        self.config.fade_duration = seconds;
        self
    }

    pub fn initial_opacity(mut self, opacity: f32) -> Self {
        self.config.initial_opacity = opacity;
        self
    }

    pub fn end_opacity(mut self, opacity: f32) -> Self {
        self.config.end_opacity = opacity;
        self
    }

    /// Enable the decision branch
    pub fn decision(mut self, decision: DecisionBranch) -> Self {
        self.config.decision = Some(decision);
        self
    }

    /// Disable the decision branch even if the defaults enable it
    pub fn without_decision(mut self) -> Self {
        self.config.decision = None;
        self
    }

    pub fn growth(mut self, growth: GrowthPolicy) -> Self {
        self.config.growth = growth;
        self
    }

    pub fn fade_start(mut self, fade_start: FadeStart) -> Self {
        self.config.fade_start = fade_start;
        self
    }

    pub fn failure_fade(mut self, failure_fade: FailureFade) -> Self {
        self.config.failure_fade = failure_fade;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.config.easing = easing;
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<RippleConfiguration> {
        let c = self.config;

        check_duration("scale_duration", c.scale_duration)?;
        check_duration("fade_duration", c.fade_duration)?;
        check_opacity("initial_opacity", c.initial_opacity)?;
        check_opacity("end_opacity", c.end_opacity)?;

        if !c.scale.is_finite() {
            return Err(RippleError::NonFinite {
                field: "scale",
                value: c.scale as f64,
            });
        }
        if c.scale <= 0.0 {
            return Err(RippleError::InvalidScale(c.scale));
        }
        if !c.start_point.is_finite() {
            return Err(RippleError::NonFinite {
                field: "start_point",
                value: if c.start_point.x.is_finite() {
                    c.start_point.y as f64
                } else {
                    c.start_point.x as f64
                },
            });
        }

        if let Some(decision) = c.decision {
            check_duration("decision.time", decision.time)?;
            check_opacity("decision.opacity", decision.opacity)?;
            check_opacity("decision.succeeded_opacity", decision.succeeded_opacity)?;
            if decision.time > c.fade_duration {
                return Err(RippleError::DecisionTimeExceedsFade {
                    decision_time: decision.time,
                    fade_duration: c.fade_duration,
                });
            }
        }

        Ok(c)
    }
}

fn check_duration(field: &'static str, seconds: f64) -> Result<()> {
    if !seconds.is_finite() {
        return Err(RippleError::NonFinite {
            field,
            value: seconds,
        });
    }
    if seconds < 0.0 {
        return Err(RippleError::NegativeDuration {
            field,
            value: seconds,
        });
    }
    Duration::try_from_secs_f64(seconds)
        .map(|_| ())
        .map_err(|_| RippleError::DurationTooLong {
            field,
            value: seconds,
        })
}

fn check_opacity(field: &'static str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(RippleError::OpacityOutOfRange { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_uses_defaults() {
        let config = RippleConfiguration::builder(Color::RED).build().unwrap();

        assert_eq!(config.color(), Color::RED);
        assert_eq!(config.start_point(), Point::ZERO);
        assert_eq!(config.scale(), 1.0);
        assert_eq!(config.scale_duration(), Duration::from_secs(1));
        assert_eq!(config.fade_duration(), Duration::from_millis(200));
        assert_eq!(config.initial_opacity(), 1.0);
        assert_eq!(config.end_opacity(), 0.0);
        assert!(!config.decision_enabled());
        assert!(!config.clips_to_bounds());
        assert_eq!(config.easing(), Easing::EaseInOut);
    }

    #[test]
    fn test_builder_merges_custom_defaults() {
        let defaults = RippleDefaults {
            clips_to_bounds: true,
            fade_duration: 1.0,
            decision: Some(DecisionBranch::new(0.3, 0.5, 0.8)),
            ..RippleDefaults::default()
        };
        let config = RippleConfiguration::builder_with(Color::BLUE, &defaults)
            .start_point(Point::new(4.0, 8.0))
            .build()
            .unwrap();

        assert!(config.clips_to_bounds());
        assert_eq!(config.decision(), Some(&DecisionBranch::new(0.3, 0.5, 0.8)));
        assert_eq!(config.start_point(), Point::new(4.0, 8.0));

        let plain = RippleConfiguration::builder_with(Color::BLUE, &defaults)
            .without_decision()
            .build()
            .unwrap();
        assert!(!plain.decision_enabled());
    }

    #[test]
    fn test_rejects_negative_scale_duration() {
        let err = RippleConfiguration::builder(Color::RED)
            .scale_duration(-0.1)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RippleError::NegativeDuration {
                field: "scale_duration",
                ..
            }
        ));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_rejects_negative_fade_duration() {
        let err = RippleConfiguration::builder(Color::RED)
            .fade_duration(-1.0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RippleError::NegativeDuration {
                field: "fade_duration",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_decision_after_fade() {
        let err = RippleConfiguration::builder(Color::RED)
            .fade_duration(1.0)
            .decision(DecisionBranch::new(1.5, 0.5, 1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, RippleError::DecisionTimeExceedsFade { .. }));
    }

    #[test]
    fn test_decision_at_fade_end_allowed() {
        let config = RippleConfiguration::builder(Color::RED)
            .fade_duration(1.0)
            .decision(DecisionBranch::new(1.0, 0.5, 1.0))
            .build();
        assert!(config.is_ok());
    }

    #[test]
    fn test_rejects_opacities_out_of_range() {
        let cases = [
            RippleConfiguration::builder(Color::RED).initial_opacity(1.01),
            RippleConfiguration::builder(Color::RED).end_opacity(-0.1),
            RippleConfiguration::builder(Color::RED).initial_opacity(f32::NAN),
            RippleConfiguration::builder(Color::RED).decision(DecisionBranch::new(0.1, 2.0, 1.0)),
            RippleConfiguration::builder(Color::RED).decision(DecisionBranch::new(0.1, 0.5, -1.0)),
        ];
        for builder in cases {
            let err = builder.build().unwrap_err();
            assert!(
                matches!(err, RippleError::OpacityOutOfRange { .. }),
                "unexpected {:?}",
                err
            );
        }
    }

    #[test]
    fn test_rejects_bad_scale_and_non_finite_values() {
        let err = RippleConfiguration::builder(Color::RED)
            .scale(0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, RippleError::InvalidScale(_)));

        let err = RippleConfiguration::builder(Color::RED)
            .fade_duration(f64::INFINITY)
            .build()
            .unwrap_err();
        assert!(matches!(err, RippleError::NonFinite { .. }));

        let err = RippleConfiguration::builder(Color::RED)
            .start_point(Point::new(f32::NAN, 0.0))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RippleError::NonFinite {
                field: "start_point",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_durations_beyond_duration_range() {
        let err = RippleConfiguration::builder(Color::RED)
            .scale_duration(1e20)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RippleError::DurationTooLong {
                field: "scale_duration",
                ..
            }
        ));
        assert!(err.is_configuration_error());

        let err = RippleConfiguration::builder(Color::RED)
            .fade_duration(1e20)
            .build()
            .unwrap_err();
        assert!(matches!(err, RippleError::DurationTooLong { .. }));
    }

    #[test]
    fn test_long_but_representable_duration_accessors() {
        let config = RippleConfiguration::builder(Color::RED)
            .scale_duration(86_400.0)
            .build()
            .unwrap();
        assert_eq!(config.scale_duration(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_durations_in_milliseconds() {
        let config = RippleConfiguration::builder(Color::RED)
            .scale_duration(0.5)
            .fade_duration(0.3)
            .build()
            .unwrap();
        assert_eq!(config.scale_duration_ms(), 500.0);
        assert_eq!(config.fade_duration_ms(), 300.0);
    }
}
