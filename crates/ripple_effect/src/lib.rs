//! Ripple Effect
//!
//! Touch feedback for a host view: a circular overlay grows from the touch
//! point until it covers the host while fading out, then detaches.
//!
//! # Features
//!
//! - **Configuration**: validated, immutable ripple requests seeded from
//!   [`RippleDefaults`] (built-in or loaded from TOML)
//! - **Growth policies**: cover the farthest corner from the touch point,
//!   or scale relative to the host width
//! - **Decision branch**: the fade pauses on an intermediate opacity and
//!   settles on a success or failure path, picked by an [`OutcomeFlag`]
//!   shared with a gesture recognizer
//! - **Sessions**: every ripple can be observed and cancelled
//!
//! # Example
//!
//! ```rust
//! use ripple_animation::AnimationScheduler;
//! use ripple_core::{Color, Point, Rect, ViewTree};
//! use ripple_effect::{RippleConfiguration, RippleController};
//!
//! let scheduler = AnimationScheduler::new();
//! let views = ViewTree::shared();
//! let button = views.lock().unwrap().create_root(Rect::new(0.0, 0.0, 100.0, 50.0));
//!
//! let config = RippleConfiguration::builder(Color::WHITE)
//!     .start_point(Point::new(10.0, 10.0))
//!     .build()
//!     .unwrap();
//!
//! let controller = RippleController::new(views.clone(), scheduler.handle());
//! let session = controller.animate(button, &config, |_| {}).unwrap();
//!
//! scheduler.advance(1_000.0);
//! assert!(session.is_finished());
//! assert!(views.lock().unwrap().children(button).is_empty());
//! ```

pub mod config;
pub mod configuration;
pub mod controller;
pub mod error;
pub mod growth;
pub mod session;

pub use config::{FadeStart, FailureFade, GrowthPolicy, RippleDefaults};
pub use configuration::{DecisionBranch, RippleConfiguration, RippleConfigurationBuilder};
pub use controller::RippleController;
pub use error::{Result, RippleError};
pub use growth::OVERLAY_EXTENT;
pub use session::{DecisionOutcome, FadeStage, OutcomeFlag, RipplePhase, RippleSession};
