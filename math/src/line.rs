use cgmath::prelude::*;
use cgmath::{BaseFloat, Point2, Vector2};
use num_traits::NumCast;
use serde::{Deserialize, Serialize};

pub type Line2d = Line2<f64>;

/// A directed line through `origin`, with a unit `displace` and the length of the segment it
/// was built from.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line2<T: BaseFloat> {
    pub origin: Point2<T>,
    pub displace: Vector2<T>,
    pub length: T,
}

impl<T: BaseFloat> Line2<T> {
    pub fn from_origin_and_displace(origin: Point2<T>, displace: Vector2<T>) -> Line2<T> {
        let length = displace.magnitude();
        if length.abs() >= epsilon() {
            Line2 {
                origin,
                displace: displace / length,
                length,
            }
        } else {
            Line2 {
                origin,
                displace: Vector2::zero(),
                length: T::zero(),
            }
        }
    }

    pub fn from_two_points(origin: Point2<T>, towards: Point2<T>) -> Line2<T> {
        Self::from_origin_and_displace(origin, towards - origin)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length == T::zero()
    }

    /// Positive on the right of the line (looking along `displace`), negative on the left.
    pub fn signed_distance(&self, to: Point2<T>) -> T {
        (to - self.origin).perp_dot(self.displace)
    }
}

fn epsilon<T: BaseFloat>() -> T {
    <T as NumCast>::from(1e-16).unwrap_or_else(T::zero)
}
