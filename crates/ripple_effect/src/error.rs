//! Error types for ripple_effect

use ripple_core::{ViewError, ViewId};
use thiserror::Error;

/// Errors raised while configuring or starting a ripple
///
/// Every variant is reported before any visual side effect happens: a
/// rejected `animate` call never leaves an overlay behind.
#[derive(Error, Debug)]
pub enum RippleError {
    /// A duration is negative
    #[error("{field} must not be negative (got {value}s)")]
    NegativeDuration { field: &'static str, value: f64 },

    /// A duration is too large to be represented
    #[error("{field} is out of range (got {value}s)")]
    DurationTooLong { field: &'static str, value: f64 },

    /// A numeric field is NaN or infinite
    #[error("{field} must be finite (got {value})")]
    NonFinite { field: &'static str, value: f64 },

    /// An opacity lies outside [0, 1]
    #[error("{field} must be within [0, 1] (got {value})")]
    OpacityOutOfRange { field: &'static str, value: f32 },

    /// The scale multiplier is zero or negative
    #[error("scale must be greater than zero (got {0})")]
    InvalidScale(f32),

    /// The decision point falls after the fade ends
    #[error("decision time {decision_time}s exceeds fade duration {fade_duration}s")]
    DecisionTimeExceedsFade {
        decision_time: f64,
        fade_duration: f64,
    },

    /// The host has zero, negative or non-finite width or height
    #[error("host bounds are degenerate ({width}x{height})")]
    DegenerateHostBounds { width: f32, height: f32 },

    /// The host view is not in the view tree
    #[error("host view {0:?} is not in the view tree")]
    UnknownHost(ViewId),

    /// The animation scheduler has been dropped
    #[error("animation scheduler is no longer running")]
    SchedulerUnavailable,

    /// View tree rejected an operation
    #[error(transparent)]
    View(#[from] ViewError),

    /// Failed to read a defaults file
    #[error("failed to read ripple defaults: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Failed to parse a defaults file
    #[error("failed to parse ripple defaults: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl RippleError {
    /// True for errors describing an invalid configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RippleError::NegativeDuration { .. }
                | RippleError::DurationTooLong { .. }
                | RippleError::NonFinite { .. }
                | RippleError::OpacityOutOfRange { .. }
                | RippleError::InvalidScale(_)
                | RippleError::DecisionTimeExceedsFade { .. }
        )
    }

    /// True for errors about the host or runtime an `animate` call ran against
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            RippleError::DegenerateHostBounds { .. }
                | RippleError::UnknownHost(_)
                | RippleError::SchedulerUnavailable
                | RippleError::View(_)
        )
    }
}

/// Result type for ripple_effect operations
pub type Result<T> = std::result::Result<T, RippleError>;
