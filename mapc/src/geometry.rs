use math::prelude::*;
use math::{vector_to_degrees, Aabb2, Line2d, Pnt2d, Vec2d};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlopeType {
    Horizontal,
    Vertical,
    Positive,
    Negative,
}

impl SlopeType {
    pub fn classify(delta: Vec2d) -> SlopeType {
        if delta.x == 0.0 {
            SlopeType::Vertical
        } else if delta.y == 0.0 {
            SlopeType::Horizontal
        } else if delta.y / delta.x > 0.0 {
            SlopeType::Positive
        } else {
            SlopeType::Negative
        }
    }
}

/// Attributes derived from a line's two endpoints.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineGeometry {
    pub delta: Vec2d,
    pub length: f64,
    /// Degrees counter-clockwise from the positive x axis, in `[0, 360)`.
    pub angle: f64,
    pub slope_type: SlopeType,
    pub bounds: Aabb2,
}

impl LineGeometry {
    pub fn between(from: Pnt2d, to: Pnt2d) -> LineGeometry {
        let delta = to - from;
        LineGeometry {
            delta,
            length: delta.magnitude(),
            angle: vector_to_degrees(delta),
            slope_type: SlopeType::classify(delta),
            bounds: Aabb2::from_points(vec![from, to]),
        }
    }
}

/// Whether the segment `from -> to` passes through the closed box `aabb`.
pub fn segment_touches_box(from: Pnt2d, to: Pnt2d, aabb: &Aabb2) -> bool {
    if !Aabb2::from_points(vec![from, to]).intersects(aabb) {
        return false;
    }
    let line = Line2d::from_two_points(from, to);
    if line.is_degenerate() {
        return aabb.contains(from);
    }

    let corners = [
        aabb.min,
        Pnt2d::new(aabb.max.x, aabb.min.y),
        aabb.max,
        Pnt2d::new(aabb.min.x, aabb.max.y),
    ];
    let mut left = false;
    let mut right = false;
    for &corner in &corners {
        let distance = line.signed_distance(corner);
        if distance > 0.0 {
            right = true;
        } else if distance < 0.0 {
            left = true;
        } else {
            return true;
        }
    }
    left && right
}
