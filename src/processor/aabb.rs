//! Axis-aligned footprints for placed instances.
//!
//! Positions are bottom-center anchors, so a `[w, h]` footprint at `(x, y)`
//! straddles `x` and grows upward from `y`:
//!
//! ```text
//! x_min = x - w/2    x_max = x + w/2
//! y_min = y - h      y_max = y
//! ```

use crate::model::{Point, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Aabb {
    pub fn from_anchor(position: Point, base_size: Size) -> Self {
        let [x, y] = position;
        let [w, h] = base_size;
        let half_w = w / 2.0;
        Self {
            x_min: x - half_w,
            x_max: x + half_w,
            y_min: y - h,
            y_max: y,
        }
    }

    /// Open-interval overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.x_max <= other.x_min
            || self.x_min >= other.x_max
            || self.y_max <= other.y_min
            || self.y_min >= other.y_max)
    }
}
