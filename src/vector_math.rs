//! Basic vector math helper functions.
//! Small helpers for magnitudes, normalised vectors and seeking.
use glam::Vec3;

/// Returns the magnitude of a vector expressed by its components.
///
/// # Examples
/// ```
/// use voices::vector_math::vec_mag;
/// let magnitude = vec_mag(3.0, 4.0, 12.0);
/// assert!((magnitude - 13.0).abs() < f32::EPSILON);
/// ```
#[must_use]
pub fn vec_mag(component_x: f32, component_y: f32, component_z: f32) -> f32 {
    Vec3::new(component_x, component_y, component_z).length()
}

/// Returns the unit vector in the direction of `vector`.
///
/// Non-finite input and the zero vector both yield [`Vec3::ZERO`].
///
/// # Examples
///
/// ```
/// use glam::Vec3;
/// use voices::vec_normalize;
/// let unit = vec_normalize(Vec3::new(3.0, 0.0, 4.0));
/// assert!((unit.x - 0.6).abs() < 1e-6);
/// assert!((unit.z - 0.8).abs() < 1e-6);
///
/// assert_eq!(vec_normalize(Vec3::ZERO), Vec3::ZERO);
/// ```
#[must_use]
pub fn vec_normalize(vector: Vec3) -> Vec3 {
    if !vector.is_finite() {
        return Vec3::ZERO;
    }
    vector.try_normalize().unwrap_or(Vec3::ZERO)
}

/// Direction and remaining distance from one point to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seek {
    /// Unit vector pointing at the target, or zero when there is none.
    pub direction: Vec3,
    /// Straight-line distance to the target.
    pub distance: f32,
}

/// Computes the seek vector from `from` towards `to`.
///
/// When both points coincide, or either is not finite, the direction is
/// [`Vec3::ZERO`] so callers simply do not move.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use voices::vector_math::seek;
/// let s = seek(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0));
/// assert_eq!(s.direction, Vec3::new(0.0, 0.0, -1.0));
/// assert!((s.distance - 2.0).abs() < f32::EPSILON);
/// ```
#[must_use]
pub fn seek(from: Vec3, to: Vec3) -> Seek {
    let delta = to - from;
    if !delta.is_finite() {
        return Seek {
            direction: Vec3::ZERO,
            distance: 0.0,
        };
    }
    let distance = delta.length();
    if distance == 0.0 {
        return Seek {
            direction: Vec3::ZERO,
            distance,
        };
    }
    Seek {
        direction: delta / distance,
        distance,
    }
}

/// Point on a horizontal ring of `radius` around `centre` at `angle`
/// radians, lifted to `height`.
#[must_use]
pub fn ring_point(centre: Vec3, radius: f32, angle: f32, height: f32) -> Vec3 {
    Vec3::new(
        centre.x + radius * angle.cos(),
        height,
        centre.z + radius * angle.sin(),
    )
}
