//! Fly-through camera with switchable projection

use glam::{Mat4, Vec3};

/// How the camera projects the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective using the camera's field of view
    Perspective,
    /// Orthographic box with the given half-height in world units
    Orthographic { half_height: f32 },
}

impl Projection {
    /// Orthographic box used by the viewer's `O` key
    pub const ORTHOGRAPHIC: Self = Self::Orthographic { half_height: 10.0 };
}

/// Camera for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Normalized viewing direction
    pub direction: Vec3,
    /// World up vector
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Active projection
    pub projection: Projection,
    /// Yaw angle in radians (rotation around Y axis)
    yaw: f32,
    /// Pitch angle in radians (rotation around X axis)
    pitch: f32,
}

impl Camera {
    /// Largest pitch mouse look can reach
    pub const MAX_PITCH_DEGREES: f32 = 89.0;

    /// Create a new camera with default settings
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 80.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
            aspect: 1000.0 / 800.0,
            projection: Projection::Perspective,
            yaw: -90.0_f32.to_radians(),
            pitch: 0.0,
        }
    }

    /// Create a camera at `position` looking along `direction`
    ///
    /// `direction` need not be normalized.
    pub fn looking_along(position: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize_or(Vec3::NEG_Z);
        let mut camera = Self::new();
        camera.position = position;
        camera.direction = direction;

        // Derive yaw and pitch so mouse look continues from this direction
        camera.yaw = direction.z.atan2(direction.x);
        camera.pitch = direction.y.clamp(-1.0, 1.0).asin();

        camera
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction, self.up)
    }

    /// Get the projection matrix for the active projection
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
            }
            Projection::Orthographic { half_height } => {
                let half_width = half_height * self.aspect;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Update aspect ratio
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Rotate camera using mouse delta; `sensitivity` is radians per unit
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32, sensitivity: f32) {
        self.yaw += delta_x * sensitivity;
        self.pitch -= delta_y * sensitivity;

        let max_pitch = Self::MAX_PITCH_DEGREES.to_radians();
        self.pitch = self.pitch.clamp(-max_pitch, max_pitch);

        self.direction = Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize();
    }

    /// Get the right vector
    pub fn right(&self) -> Vec3 {
        self.direction.cross(self.up).normalize()
    }

    /// Get the camera-relative up vector
    pub fn up_vector(&self) -> Vec3 {
        self.right().cross(self.direction).normalize()
    }

    /// Current pitch in radians
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Current yaw in radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looking_along_normalizes() {
        let camera = Camera::looking_along(Vec3::new(0.0, 5.0, 12.0), Vec3::new(0.0, -0.5, -2.0));
        assert!((camera.direction.length() - 1.0).abs() < 1e-5);
        assert!(camera.direction.abs_diff_eq(Vec3::new(0.0, -0.5, -2.0).normalize(), 1e-5));
    }

    #[test]
    fn test_rotate_zero_keeps_direction() {
        let mut camera =
            Camera::looking_along(Vec3::ZERO, Vec3::new(0.3, -0.4, -1.0));
        let before = camera.direction;
        camera.rotate(0.0, 0.0, 0.01);
        assert!(camera.direction.abs_diff_eq(before, 1e-5));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::new();
        camera.rotate(0.0, -10_000.0, 0.01);
        assert!(camera.pitch() <= Camera::MAX_PITCH_DEGREES.to_radians() + 1e-6);
        assert!(camera.direction.y > 0.99);

        camera.rotate(0.0, 20_000.0, 0.01);
        assert!(camera.pitch() >= -Camera::MAX_PITCH_DEGREES.to_radians() - 1e-6);
    }

    #[test]
    fn test_axes_are_orthonormal() {
        let camera = Camera::looking_along(Vec3::ZERO, Vec3::new(1.0, -0.5, -1.0));
        let right = camera.right();
        let up = camera.up_vector();
        assert!(right.dot(camera.direction).abs() < 1e-5);
        assert!(up.dot(camera.direction).abs() < 1e-5);
        assert!(up.dot(right).abs() < 1e-5);
        assert!(up.y > 0.0);
    }

    #[test]
    fn test_orthographic_projection_ignores_depth_for_xy() {
        let mut camera = Camera::new();
        camera.projection = Projection::ORTHOGRAPHIC;
        camera.aspect = 1.0;
        let proj = camera.projection_matrix();
        let near = proj.project_point3(Vec3::new(5.0, 5.0, -1.0));
        let far = proj.project_point3(Vec3::new(5.0, 5.0, -50.0));
        assert!((near.x - far.x).abs() < 1e-5);
        assert!((near.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_orthographic_width_follows_aspect() {
        let mut camera = Camera::new();
        camera.projection = Projection::ORTHOGRAPHIC;
        camera.set_aspect(1000, 800);
        let proj = camera.projection_matrix();

        // Edges of the box land on the edges of clip space
        let corner = proj.project_point3(Vec3::new(12.5, 10.0, -1.0));
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_perspective_projection_shrinks_with_depth() {
        let camera = Camera::new();
        let proj = camera.projection_matrix();
        let near = proj.project_point3(Vec3::new(1.0, 0.0, -2.0));
        let far = proj.project_point3(Vec3::new(1.0, 0.0, -20.0));
        assert!(far.x.abs() < near.x.abs());
    }

    #[test]
    fn test_set_aspect_guards_zero_height() {
        let mut camera = Camera::new();
        camera.set_aspect(1000, 0);
        assert_eq!(camera.aspect, 1000.0);
    }
}
