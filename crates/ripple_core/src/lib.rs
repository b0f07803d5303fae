//! Ripple Core
//!
//! Foundational primitives shared by the ripple crates:
//!
//! - **Geometry**: points, sizes, rects, 2D affine transforms and colors
//! - **View Tree**: a retained hierarchy of views that transient overlays
//!   attach to and detach from
//! - **Shapes**: mask shapes applied to a view's bounds (the ripple overlay
//!   is a circle)
//!
//! # Example
//!
//! ```rust
//! use ripple_core::{Color, Rect, ViewNode, ViewShape, ViewTree};
//!
//! let mut tree = ViewTree::new();
//! let button = tree.create_root(Rect::new(0.0, 0.0, 120.0, 44.0));
//!
//! let overlay = tree
//!     .add_subview(
//!         button,
//!         ViewNode::new(Rect::new(10.0, 10.0, 1.0, 1.0))
//!             .with_background(Color::RED)
//!             .with_shape(ViewShape::Circle),
//!     )
//!     .unwrap();
//!
//! assert_eq!(tree.children(button), &[overlay]);
//! assert!(tree.remove_from_superview(overlay));
//! assert!(tree.children(button).is_empty());
//! ```

pub mod error;
pub mod geometry;
pub mod shape;
pub mod view;

pub use error::{Result, ViewError};
pub use geometry::{Affine2D, Color, Point, Rect, Size};
pub use shape::{ClipShape, ViewShape};
pub use view::{SharedViewTree, ViewId, ViewNode, ViewTree};
