//! View mask shapes
//!
//! A [`ViewShape`] is the declarative mask a view carries; resolving it
//! against the view's bounds yields a concrete [`ClipShape`].

use crate::geometry::{Affine2D, Point, Rect};

/// Mask applied to a view's bounds
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ViewShape {
    /// Plain rectangle (no mask)
    #[default]
    Rect,
    /// Rectangle with a uniform corner radius
    RoundedRect(f32),
    /// Circle inscribed in the bounds, radius = half the width
    ///
    /// This is the ripple overlay's shape: a rounded rect whose corner radius
    /// is half its width, which for a square frame is a circle.
    Circle,
}

impl ViewShape {
    /// Resolve this shape against concrete bounds
    pub fn clip(&self, bounds: Rect) -> ClipShape {
        match *self {
            ViewShape::Rect => ClipShape::Rect(bounds),
            ViewShape::RoundedRect(radius) => ClipShape::rounded_rect(bounds, radius),
            ViewShape::Circle => ClipShape::circle(bounds.center(), bounds.width() / 2.0),
        }
    }
}

/// Concrete clip geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipShape {
    Rect(Rect),
    RoundedRect { rect: Rect, corner_radius: f32 },
    Circle { center: Point, radius: f32 },
}

impl ClipShape {
    pub fn rect(rect: Rect) -> Self {
        ClipShape::Rect(rect)
    }

    /// Rounded rect; the radius is clamped to half the shorter side
    pub fn rounded_rect(rect: Rect, corner_radius: f32) -> Self {
        let max = rect.width().min(rect.height()) / 2.0;
        ClipShape::RoundedRect {
            rect,
            corner_radius: corner_radius.clamp(0.0, max.max(0.0)),
        }
    }

    pub fn circle(center: Point, radius: f32) -> Self {
        ClipShape::Circle { center, radius }
    }

    /// Bounding box of the shape
    pub fn bounds(&self) -> Rect {
        match *self {
            ClipShape::Rect(rect) => rect,
            ClipShape::RoundedRect { rect, .. } => rect,
            ClipShape::Circle { center, radius } => Rect::new(
                center.x - radius,
                center.y - radius,
                radius * 2.0,
                radius * 2.0,
            ),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        match *self {
            ClipShape::Rect(rect) => rect.contains(point),
            ClipShape::RoundedRect {
                rect,
                corner_radius,
            } => {
                if !rect.contains(point) {
                    return false;
                }
                // Distance from the inner rect shrunk by the radius
                let inner = Rect::new(
                    rect.x() + corner_radius,
                    rect.y() + corner_radius,
                    rect.width() - 2.0 * corner_radius,
                    rect.height() - 2.0 * corner_radius,
                );
                let nearest = Point::new(
                    point.x.clamp(inner.x(), inner.x() + inner.width()),
                    point.y.clamp(inner.y(), inner.y() + inner.height()),
                );
                nearest.distance(point) <= corner_radius
            }
            ClipShape::Circle { center, radius } => center.distance(point) <= radius,
        }
    }

    /// Apply a transform to the shape
    ///
    /// Circles and rounded corners assume a uniform scale; non-uniform
    /// transforms use the horizontal factor for radii.
    pub fn transformed(&self, transform: &Affine2D) -> ClipShape {
        match *self {
            ClipShape::Rect(rect) => ClipShape::Rect(rect.transformed(transform)),
            ClipShape::RoundedRect {
                rect,
                corner_radius,
            } => ClipShape::RoundedRect {
                rect: rect.transformed(transform),
                corner_radius: corner_radius * transform.scale_x(),
            },
            ClipShape::Circle { center, radius } => ClipShape::Circle {
                center: transform.transform_point(center),
                radius: radius * transform.scale_x(),
            },
        }
    }
}
