//! Overlay growth math

use std::f32::consts::SQRT_2;

use ripple_core::{Point, Size};

use crate::config::GrowthPolicy;

/// Side length of the overlay before it grows
pub const OVERLAY_EXTENT: f32 = 1.0;

impl GrowthPolicy {
    /// Uniform scale factor applied to an overlay `overlay_extent` wide that
    /// starts at `start` inside a host of size `host`
    ///
    /// `CoverCorners` takes the largest of the four axis distances from the
    /// start point to the host edges; `2·√2·max` is at least the diameter
    /// needed to reach the farthest corner, so any `scale >= 1` covers the
    /// host wherever the touch landed.
    pub fn growth_factor(&self, host: Size, start: Point, scale: f32, overlay_extent: f32) -> f32 {
        match self {
            GrowthPolicy::CoverCorners => {
                let x1 = start.x;
                let x2 = host.width - start.x;
                let y1 = start.y;
                let y2 = host.height - start.y;
                let reach = x1.max(x2).max(y1).max(y2);
                2.0 * scale * SQRT_2 * reach / overlay_extent
            }
            GrowthPolicy::WidthRatio => host.width / overlay_extent * scale,
        }
    }
}
