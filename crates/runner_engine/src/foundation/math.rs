//! Math utilities and types
//!
//! Provides the fundamental math types used for track placement and world
//! translation. Coordinates are Y-up right-handed; the track runs along +Z.

pub use nalgebra::{Quaternion, Unit, Vector3};

/// World-space vector
pub type Vec3 = Vector3<f32>;

/// Unit quaternion
pub type Quat = Unit<Quaternion<f32>>;

/// World-space pose of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Origin, no rotation, unit scale
    pub fn identity() -> Self {
        Self::default()
    }

    /// Pose at `position` with no rotation
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Pose at `position` rotated by `rotation`
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Move the transform by `offset` in world space
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Local +Z axis expressed in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::z()
    }

    /// Apply this transform to a local-space point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(&point)
    }
}

/// Placement constants
pub mod constants {
    /// Degrees to radians
    pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

    /// Tolerance used for anchor coincidence checks
    pub const ANCHOR_EPSILON: f32 = 1e-3;
}

/// Placement helpers
pub mod utils {
    use super::{constants, Quat, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Interpolate from `a` to `b`; `t` is not clamped
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Rotation about +X by `tilt_degrees`; positive tilt makes local +Z descend
    pub fn tilt_rotation(tilt_degrees: f32) -> Quat {
        Quat::from_axis_angle(&Vec3::x_axis(), deg_to_rad(tilt_degrees))
    }

    /// Billboard orientation for an object at `position` seen from `viewpoint`
    ///
    /// The object's local +Z points away from the viewpoint so its front face
    /// (-Z) is presented to the viewer. Degenerate inputs (coincident points or
    /// a view direction parallel to `up`) yield the identity rotation.
    pub fn facing_rotation(position: Vec3, viewpoint: Vec3, up: Vec3) -> Quat {
        let away = position - viewpoint;
        if away.norm_squared() < f32::EPSILON {
            return Quat::identity();
        }
        let dir = away.normalize();
        if dir.cross(&up).norm_squared() < f32::EPSILON {
            return Quat::identity();
        }
        Quat::face_towards(&dir, &up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_tilt_rotation_descends_along_z() {
        let rotation = utils::tilt_rotation(30.0);
        let forward = rotation * Vec3::z();

        assert_relative_eq!(forward.y, -0.5, epsilon = EPSILON);
        assert_relative_eq!(forward.z, 3.0_f32.sqrt() / 2.0, epsilon = EPSILON);
    }

    #[test]
    fn test_facing_rotation_points_away_from_viewer() {
        let position = Vec3::new(0.0, 0.0, 10.0);
        let viewpoint = Vec3::new(0.0, 0.0, 0.0);
        let rotation = utils::facing_rotation(position, viewpoint, Vec3::y());

        assert_relative_eq!(rotation * Vec3::z(), Vec3::z(), epsilon = EPSILON);
    }

    #[test]
    fn test_facing_rotation_degenerate_is_identity() {
        let rotation = utils::facing_rotation(Vec3::zeros(), Vec3::zeros(), Vec3::y());
        assert_relative_eq!(rotation, Quat::identity(), epsilon = EPSILON);

        let above = utils::facing_rotation(Vec3::new(0.0, 5.0, 0.0), Vec3::zeros(), Vec3::y());
        assert_relative_eq!(above, Quat::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_transform_translate_and_point() {
        let mut transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        transform.translate(Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(transform.position, Vec3::new(1.0, 2.0, 2.0));
        assert_relative_eq!(
            transform.transform_point(Vec3::new(0.0, 0.0, 1.0)),
            Vec3::new(1.0, 2.0, 3.0),
            epsilon = EPSILON
        );
    }
}
