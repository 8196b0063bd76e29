use crate::constants::MIN_SCALE;
use crate::ease::clamp01;
use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, orientation and scale snapshot of a scene node.
///
/// Poses built through [`Pose::new`] or passed through [`Pose::sanitized`]
/// always carry a unit quaternion and finite, positive scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
        .sanitized()
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY, Vec3::ONE)
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self.sanitized()
    }

    pub fn with_euler(self, euler: Vec3) -> Self {
        self.with_rotation(Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z))
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self.sanitized()
    }

    /// Replace non-finite or degenerate components with their neutral values.
    pub fn sanitized(self) -> Self {
        let position = if self.position.is_finite() {
            self.position
        } else {
            Vec3::ZERO
        };
        let rotation = if self.rotation.is_finite() && self.rotation.length_squared() > 1e-12 {
            self.rotation.normalize()
        } else {
            Quat::IDENTITY
        };
        let fix = |s: f32| {
            if !s.is_finite() {
                1.0
            } else {
                s.abs().max(MIN_SCALE)
            }
        };
        let scale = Vec3::new(fix(self.scale.x), fix(self.scale.y), fix(self.scale.z));
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Interpolate with position/scale lerp and rotation slerp. The endpoints
    /// are returned unchanged at `t <= 0` and `t >= 1`.
    pub fn lerp(a: &Pose, b: &Pose, t: f32) -> Pose {
        let t = clamp01(t);
        if t <= 0.0 {
            return *a;
        }
        if t >= 1.0 {
            return *b;
        }
        Pose {
            position: a.position.lerp(b.position, t),
            rotation: a.rotation.slerp(b.rotation, t),
            scale: a.scale.lerp(b.scale, t),
        }
        .sanitized()
    }

    /// Translate by `delta` and pre-multiply `spin` onto the orientation.
    pub fn offset(&self, delta: Vec3, spin: Quat) -> Pose {
        Pose {
            position: self.position + delta,
            rotation: spin * self.rotation,
            scale: self.scale,
        }
        .sanitized()
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn approx_eq(&self, other: &Pose, eps: f32) -> bool {
        self.position.abs_diff_eq(other.position, eps)
            && self.scale.abs_diff_eq(other.scale, eps)
            && (self.rotation.dot(other.rotation).abs() - 1.0).abs() <= eps
    }
}
