use cgmath::Vector2;

/// Wraps an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// The counter-clockwise angle of `vector` from the positive x axis, in `[0, 360)` degrees.
pub fn vector_to_degrees(vector: Vector2<f64>) -> f64 {
    normalize_degrees(vector.y.atan2(vector.x).to_degrees())
}

#[cfg(test)]
mod test {
    use super::{normalize_degrees, vector_to_degrees};
    use cgmath::vec2;

    #[test]
    fn test_vector_to_degrees() {
        assert_eq!(vector_to_degrees(vec2(1.0, 0.0)), 0.0);
        assert!((vector_to_degrees(vec2(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((vector_to_degrees(vec2(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((vector_to_degrees(vec2(0.0, -1.0)) - 270.0).abs() < 1e-9);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
    }
}
