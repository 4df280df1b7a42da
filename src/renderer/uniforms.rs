//! Uniform blocks shared with `shader.wgsl`
//!
//! Field order and padding follow WGSL uniform layout rules; the size tests
//! below pin them.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

use super::Camera;
use super::material::Material;

/// Per-frame data: camera and liquid animation parameters
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GlobalUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    view_position: [f32; 3],
    /// Animation time in seconds
    time: f32,
    ripple_amplitude: f32,
    ripple_speed: f32,
    ripple_frequency: f32,
    _padding: f32,
}

impl GlobalUniform {
    pub fn new() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            view_position: [0.0; 3],
            time: 0.0,
            ripple_amplitude: 0.0,
            ripple_speed: 0.0,
            ripple_frequency: 0.0,
            _padding: 0.0,
        }
    }

    pub fn set_view(&mut self, view: Mat4) {
        self.view = view.to_cols_array_2d();
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection.to_cols_array_2d();
    }

    pub fn set_view_position(&mut self, position: Vec3) {
        self.view_position = position.into();
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub fn set_ripple_amplitude(&mut self, amplitude: f32) {
        self.ripple_amplitude = amplitude;
    }

    /// Set ripple phase speed and radial frequency
    pub fn set_ripple_params(&mut self, speed: f32, frequency: f32) {
        self.ripple_speed = speed;
        self.ripple_frequency = frequency;
    }

    /// Copy view, projection and eye position from a camera
    pub fn set_camera(&mut self, camera: &Camera) {
        self.set_view(camera.view_matrix());
        self.set_projection(camera.projection_matrix());
        self.set_view_position(camera.position);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.projection)
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn ripple_amplitude(&self) -> f32 {
        self.ripple_amplitude
    }
}

impl Default for GlobalUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-draw data: transform, surface color, material and shading flags
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    diffuse: [f32; 3],
    shininess: f32,
    specular: [f32; 3],
    _padding0: f32,
    uv_scale: [f32; 2],
    use_texture: u32,
    use_lighting: u32,
    is_liquid: u32,
    _padding1: [u32; 3],
}

impl ObjectUniform {
    /// Lit, untextured white object with the default material
    pub fn from_transform(model: Mat4) -> Self {
        let mut uniform = Self {
            color: [1.0; 4],
            uv_scale: [1.0; 2],
            use_lighting: 1,
            ..Self::zeroed()
        };
        uniform.set_transform(model);
        uniform.set_material(&Material::default());
        uniform
    }

    /// Set the model matrix and derive the normal matrix from it
    pub fn set_transform(&mut self, model: Mat4) {
        let normal_matrix = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            model
        };
        self.model = model.to_cols_array_2d();
        self.normal_matrix = normal_matrix.to_cols_array_2d();
    }

    /// Draw with a solid RGBA color instead of a texture
    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color.into();
        self.use_texture = 0;
        self
    }

    /// Sample the bound texture with the given UV repeat
    #[must_use]
    pub fn with_texture(mut self, uv_scale: Vec2) -> Self {
        self.uv_scale = uv_scale.into();
        self.use_texture = 1;
        self
    }

    #[must_use]
    pub fn with_lighting(mut self, lit: bool) -> Self {
        self.use_lighting = u32::from(lit);
        self
    }

    /// Shade as the animated liquid surface
    #[must_use]
    pub fn with_liquid(mut self, liquid: bool) -> Self {
        self.is_liquid = u32::from(liquid);
        self
    }

    pub fn set_material(&mut self, material: &Material) {
        self.diffuse = material.diffuse_color.into();
        self.specular = material.specular_color.into();
        self.shininess = material.shininess;
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn normal_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.normal_matrix)
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }

    pub fn uses_texture(&self) -> bool {
        self.use_texture != 0
    }

    pub fn uses_lighting(&self) -> bool {
        self.use_lighting != 0
    }

    pub fn is_liquid(&self) -> bool {
        self.is_liquid != 0
    }
}

impl Default for ObjectUniform {
    fn default() -> Self {
        Self::from_transform(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 160);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 208);
    }

    #[test]
    fn test_normal_matrix_undoes_nonuniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 0.5, 1.0));
        let uniform = ObjectUniform::from_transform(model);
        let n = uniform.normal_matrix().transform_vector3(Vec3::Y);
        assert!(n.normalize().abs_diff_eq(Vec3::Y, 1e-6));
        assert!((n.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_transform_keeps_finite_normals() {
        let uniform = ObjectUniform::from_transform(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)));
        assert!(uniform.normal_matrix().is_finite());
    }

    #[test]
    fn test_color_and_texture_are_exclusive() {
        let textured = ObjectUniform::default().with_texture(Vec2::new(16.0, 16.0));
        assert!(textured.uses_texture());

        let colored = textured.with_color(Vec4::new(0.2, 0.45, 0.9, 0.7));
        assert!(!colored.uses_texture());
        assert_eq!(colored.color().w, 0.7);
    }

    #[test]
    fn test_flags() {
        let uniform = ObjectUniform::default();
        assert!(uniform.uses_lighting());
        assert!(!uniform.is_liquid());

        let liquid = uniform.with_liquid(true).with_lighting(false);
        assert!(liquid.is_liquid());
        assert!(!liquid.uses_lighting());
    }

    #[test]
    fn test_global_setters() {
        let mut globals = GlobalUniform::new();
        globals.set_time(1.5);
        globals.set_ripple_amplitude(0.1);
        globals.set_ripple_params(3.0, 22.0);
        assert_eq!(globals.time(), 1.5);
        assert_eq!(globals.ripple_amplitude(), 0.1);

        let camera = Camera::looking_along(Vec3::new(0.0, 5.0, 12.0), Vec3::new(0.0, -0.5, -2.0));
        globals.set_camera(&camera);
        assert_eq!(globals.view(), camera.view_matrix());
        assert_eq!(globals.projection(), camera.projection_matrix());
    }
}
