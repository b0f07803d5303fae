//! Ripple defaults
//!
//! Every ripple configuration is seeded from an explicit [`RippleDefaults`]
//! value. The built-in defaults reproduce the classic effect (1 s growth,
//! 0.2 s fade from fully opaque to transparent); apps that want a different
//! house style load their own from TOML:
//!
//! ```toml
//! scale = 1.2
//! scale_duration = 0.6
//! fade_duration = 0.4
//! easing = "ease-out"
//!
//! [decision]
//! time = 0.3
//! opacity = 0.5
//! succeeded_opacity = 0.8
//! ```
//!
//! Missing keys fall back to the built-in values.

use std::fs;
use std::path::Path;

use ripple_animation::Easing;
use ripple_core::Color;
use serde::{Deserialize, Serialize};

use crate::configuration::{DecisionBranch, RippleConfiguration};
use crate::error::Result;

/// Default growth duration in seconds
pub const DEFAULT_SCALE_DURATION: f64 = 1.0;
/// Default fade duration in seconds
pub const DEFAULT_FADE_DURATION: f64 = 0.2;
/// Default multiplier for [`GrowthPolicy::CoverCorners`]
pub const DEFAULT_SCALE: f32 = 1.0;

/// How the final overlay size is derived from the host bounds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrowthPolicy {
    /// Grow until the circle covers the host's farthest corner from the
    /// start point, times `scale`
    #[default]
    CoverCorners,
    /// Grow to the host width times `scale`, ignoring where the touch landed
    ///
    /// The older behaviour; it only covers the host for large scales
    /// (historically 100).
    WidthRatio,
}

/// When the opacity phase begins
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FadeStart {
    /// Scale and fade start together
    #[default]
    WithScale,
    /// Fade starts once the scale phase completes
    AfterScale,
}

/// Duration of the fade after a failed decision
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureFade {
    /// Restart the whole fade duration from the decision point, so a failed
    /// hold fades for `decision.time + fade_duration` in total
    #[default]
    FullDuration,
    /// Fade over what is left of the fade duration, like the success branch
    Remaining,
}

/// Defaults merged into every [`RippleConfiguration`] built from them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleDefaults {
    pub clips_to_bounds: bool,
    pub scale: f32,
    /// Seconds
    pub scale_duration: f64,
    /// Seconds
    pub fade_duration: f64,
    pub initial_opacity: f32,
    pub end_opacity: f32,
    pub growth: GrowthPolicy,
    pub fade_start: FadeStart,
    pub failure_fade: FailureFade,
    pub easing: Easing,
    pub decision: Option<DecisionBranch>,
}

impl Default for RippleDefaults {
    fn default() -> Self {
        Self {
            clips_to_bounds: false,
            scale: DEFAULT_SCALE,
            scale_duration: DEFAULT_SCALE_DURATION,
            fade_duration: DEFAULT_FADE_DURATION,
            initial_opacity: 1.0,
            end_opacity: 0.0,
            growth: GrowthPolicy::default(),
            fade_start: FadeStart::default(),
            failure_fade: FailureFade::default(),
            easing: Easing::default(),
            decision: None,
        }
    }
}

impl RippleDefaults {
    /// Parse defaults from TOML and check they describe a valid ripple
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let defaults: RippleDefaults = toml::from_str(content)?;
        defaults.validate()?;
        Ok(defaults)
    }

    /// Load defaults from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let defaults = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded ripple defaults from {}", path.display());
        Ok(defaults)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Validate by building a probe configuration from these defaults
    pub fn validate(&self) -> Result<()> {
        RippleConfiguration::builder_with(Color::BLACK, self)
            .build()
            .map(|_| ())
    }
}
