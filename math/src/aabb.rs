use cgmath::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::f64;

/// An axis aligned bounding box in map space.
///
/// The empty box has `min` at positive infinity and `max` at negative infinity, so adding any
/// point to it produces the degenerate box around that point.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Aabb2 {
    pub fn empty() -> Self {
        Aabb2 {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn zero() -> Self {
        Aabb2 {
            min: Point2::new(0.0, 0.0),
            max: Point2::new(0.0, 0.0),
        }
    }

    pub fn from_point(point: Point2<f64>) -> Self {
        Aabb2 {
            min: point,
            max: point,
        }
    }

    pub fn from_points<I: IntoIterator<Item = Point2<f64>>>(points: I) -> Self {
        points.into_iter().fold(Self::empty(), |mut aabb, point| {
            aabb.add_point(point);
            aabb
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn add_point(&mut self, point: Point2<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    pub fn size(&self) -> Vector2<f64> {
        if self.is_empty() {
            Vector2::new(0.0, 0.0)
        } else {
            self.max - self.min
        }
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    pub fn contains(&self, point: Point2<f64>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn intersects(&self, other: &Aabb2) -> bool {
        !(self.is_empty() || other.is_empty() || self.max.x < other.min.x
            || other.max.x < self.min.x || self.max.y < other.min.y
            || other.max.y < self.min.y)
    }
}

impl Default for Aabb2 {
    fn default() -> Self {
        Self::empty()
    }
}
