//! Math utilities and types
//!
//! Provides the fundamental math types used by engine objects and node
//! transforms. Everything is `f64` so that time-driven formulas and the
//! synthesized clock share one precision.

pub use nalgebra::{UnitQuaternion, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f64>;

/// Linear RGB color, each channel nominally in `0.0..=1.0`
pub type Color = Vector3<f64>;

/// Position, rotation and scale of an engine object
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// Position in world space
    pub position: Vec3,

    /// Orientation
    pub rotation: Quat,

    /// Per-axis scale factors
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Pose {
    /// Create an identity pose
    pub fn identity() -> Self {
        Self::default()
    }
}

/// Math constants
pub mod constants {
    /// Full turn in radians
    pub const TAU: f64 = std::f64::consts::TAU;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Color, Quat, Vec3};

    /// Convert a full-turn fraction (`1.0 == 360°`) to radians
    pub fn turns_to_rad(turns: f64) -> f64 {
        turns * constants::TAU
    }

    /// Orientation from Euler angles applied in intrinsic X, then Y, then Z order
    ///
    /// Equivalent to the rotation matrix `Rx(x) * Ry(y) * Rz(z)`. nalgebra's own
    /// `from_euler_angles` composes in the opposite (ZYX) order, so the axes are
    /// combined explicitly here.
    pub fn euler_xyz(x: f64, y: f64, z: f64) -> Quat {
        Quat::from_axis_angle(&Vec3::x_axis(), x)
            * Quat::from_axis_angle(&Vec3::y_axis(), y)
            * Quat::from_axis_angle(&Vec3::z_axis(), z)
    }

    /// Rotation that points the local +Z axis along `direction`
    ///
    /// Returns `None` for a zero-length direction. When `direction` is parallel
    /// to +Y the up vector falls back to +Z.
    pub fn face_towards(direction: &Vec3) -> Option<Quat> {
        let length = direction.norm();
        if length <= f64::EPSILON {
            return None;
        }
        let dir = direction / length;
        let up = if dir.cross(&Vec3::y()).norm() <= 1e-9 {
            Vec3::z()
        } else {
            Vec3::y()
        };
        Some(Quat::face_towards(&dir, &up))
    }

    /// Build a color from a packed `0xRRGGBB` integer
    pub fn color_from_hex(hex: u32) -> Color {
        let channel = |shift: u32| f64::from((hex >> shift) & 0xff) / 255.0;
        Color::new(channel(16), channel(8), channel(0))
    }
}
