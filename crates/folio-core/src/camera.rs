//! Perspective camera and screen rays.

use crate::constants::{CAMERA_FOVY_DEG, CAMERA_Z, CAMERA_ZFAR, CAMERA_ZNEAR, DIR_EPSILON};
use crate::ease::clamp01;
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy_radians: CAMERA_FOVY_DEG.to_radians(),
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }
}

/// A world-space ray with a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

impl Camera {
    /// Copy with degenerate values replaced: coincident eye/target, an up
    /// vector parallel to the view direction, non-finite or out-of-range
    /// lens parameters.
    pub fn sanitized(&self) -> Camera {
        let d = Camera::default();
        let eye = if self.eye.is_finite() { self.eye } else { d.eye };
        let mut target = if self.target.is_finite() {
            self.target
        } else {
            d.target
        };
        if (target - eye).length_squared() < DIR_EPSILON {
            target = eye - Vec3::Z;
        }
        let fwd = (target - eye).normalize_or_zero();
        let mut up = if self.up.is_finite() {
            self.up.normalize_or_zero()
        } else {
            Vec3::ZERO
        };
        if up == Vec3::ZERO || fwd.cross(up).length_squared() < DIR_EPSILON {
            up = if fwd.cross(Vec3::Y).length_squared() < DIR_EPSILON {
                Vec3::Z
            } else {
                Vec3::Y
            };
        }
        let fovy = if self.fovy_radians.is_finite() {
            self.fovy_radians
                .clamp(1.0_f32.to_radians(), 170.0_f32.to_radians())
        } else {
            d.fovy_radians
        };
        let aspect = if self.aspect.is_finite() && self.aspect > 0.0 {
            self.aspect
        } else {
            1.0
        };
        let znear = if self.znear.is_finite() && self.znear > 0.0 {
            self.znear
        } else {
            d.znear
        };
        let zfar = if self.zfar.is_finite() && self.zfar > znear {
            self.zfar
        } else {
            znear + d.zfar
        };
        Camera {
            eye,
            target,
            up,
            aspect,
            fovy_radians: fovy,
            znear,
            zfar,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        let c = self.sanitized();
        Mat4::perspective_rh(c.fovy_radians, c.aspect, c.znear, c.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        let c = self.sanitized();
        Mat4::look_at_rh(c.eye, c.target, c.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        let c = self.sanitized();
        (c.target - c.eye).normalize_or_zero()
    }

    /// Unit vector pointing to screen right.
    pub fn right(&self) -> Vec3 {
        let c = self.sanitized();
        let r = self.forward().cross(c.up).normalize_or_zero();
        if r == Vec3::ZERO {
            Vec3::X
        } else {
            r
        }
    }

    /// Match the aspect ratio to a surface; ignores empty surfaces.
    pub fn set_aspect_from(&mut self, size: Vec2) {
        if size.x > 0.0 && size.y > 0.0 && size.is_finite() {
            self.aspect = size.x / size.y;
        }
    }

    /// World-space ray through a pixel of a surface of `size` pixels.
    pub fn screen_ray(&self, px: Vec2, size: Vec2) -> Ray {
        let c = self.sanitized();
        let w = size.x.max(1.0);
        let h = size.y.max(1.0);
        let ndc_x = (2.0 * px.x / w) - 1.0;
        let ndc_y = 1.0 - (2.0 * px.y / h);
        let inv = self.view_projection().inverse();
        let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let far: Vec3 = p_far.truncate() / p_far.w;
        let dir = (far - c.eye).normalize_or_zero();
        Ray {
            origin: c.eye,
            dir: if dir == Vec3::ZERO || !dir.is_finite() {
                self.forward()
            } else {
                dir
            },
        }
    }
}

/// Blendable camera placement used by timeline-driven dolly stages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraKey {
    pub eye: Vec3,
    pub target: Vec3,
    pub fovy_radians: f32,
}

impl CameraKey {
    pub fn new(eye: Vec3, target: Vec3, fovy_deg: f32) -> Self {
        Self {
            eye,
            target,
            fovy_radians: fovy_deg.to_radians(),
        }
    }

    pub fn lerp(a: &CameraKey, b: &CameraKey, t: f32) -> CameraKey {
        let t = clamp01(t);
        CameraKey {
            eye: a.eye.lerp(b.eye, t),
            target: a.target.lerp(b.target, t),
            fovy_radians: a.fovy_radians + (b.fovy_radians - a.fovy_radians) * t,
        }
    }

    pub fn apply(&self, camera: &mut Camera) {
        camera.eye = self.eye;
        camera.target = self.target;
        camera.fovy_radians = self.fovy_radians;
    }
}
