pub mod aabb;
pub mod angle;
pub mod line;

pub use self::aabb::Aabb2;
pub use self::angle::{normalize_degrees, vector_to_degrees};
pub use self::line::{Line2, Line2d};
pub use cgmath::{Point2, Point3, Vector2};

pub type Pnt2d = Point2<f64>;
pub type Pnt3d = Point3<f64>;
pub type Vec2d = Vector2<f64>;

pub mod prelude {
    pub use cgmath::prelude::*;
}
