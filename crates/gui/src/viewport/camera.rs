use glam::{EulerRot, Mat4, Vec3, Vec4};

/// Look sensitivity in radians per pixel of pointer motion
pub const LOOK_SENSITIVITY: f32 = 0.002;

/// Something the movement controller can steer: translation relative to the
/// current heading, vertical position, and look rotation.
pub trait CameraRig {
    /// Move along the horizontal right vector
    fn move_right(&mut self, distance: f32);
    /// Move along the horizontal forward vector (pitch is ignored)
    fn move_forward(&mut self, distance: f32);
    fn height(&self) -> f32;
    fn set_height(&mut self, y: f32);
    /// Rotate the view; pitch is clamped to straight up / straight down
    fn look(&mut self, yaw_delta: f32, pitch_delta: f32);
}

/// First-person perspective camera. At yaw = pitch = 0 it looks down -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstPersonCamera {
    pub position: Vec3,
    /// Rotation about +Y (radians)
    pub yaw: f32,
    /// Rotation about the local X axis (radians)
    pub pitch: f32,
    /// Vertical field of view (radians)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl FirstPersonCamera {
    pub fn new(position: Vec3, fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: fov_degrees.to_radians(),
            near,
            far,
        }
    }

    /// Camera orientation as a rotation matrix
    fn rotation(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Viewing direction in world space
    pub fn look_direction(&self) -> Vec3 {
        self.rotation().transform_vector3(Vec3::NEG_Z)
    }

    /// Horizontal forward vector (ignores pitch)
    pub fn forward_vector(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Horizontal right vector
    pub fn right_vector(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * self.rotation()).inverse()
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Project a world point to pixel coordinates (origin top-left) in a
    /// viewport of the given size. `None` when the point is behind the eye.
    pub fn project(&self, point: Vec3, viewport: [f32; 2]) -> Option<[f32; 2]> {
        let [w, h] = viewport;
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        let p = self.view_projection(w / h) * Vec4::new(point.x, point.y, point.z, 1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        Some([(ndc.x + 1.0) * 0.5 * w, (1.0 - ndc.y) * 0.5 * h])
    }
}

impl CameraRig for FirstPersonCamera {
    fn move_right(&mut self, distance: f32) {
        self.position += self.right_vector() * distance;
    }

    fn move_forward(&mut self, distance: f32) {
        self.position += self.forward_vector() * distance;
    }

    fn height(&self) -> f32 {
        self.position.y
    }

    fn set_height(&mut self, y: f32) {
        self.position.y = y;
    }

    fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta)
            .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);
    }
}
