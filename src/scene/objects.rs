//! The mug scene's draw list and material table

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::renderer::{Material, MaterialLibrary, ObjectUniform, Shape, ShapeParts};

/// Scale, Euler rotation in degrees, and position of a scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Vec3,
    /// Rotation about X, Y and Z in degrees
    pub rotation_degrees: Vec3,
    pub position: Vec3,
}

impl Transform {
    pub const fn new(scale: Vec3, rotation_degrees: Vec3, position: Vec3) -> Self {
        Self {
            scale,
            rotation_degrees,
            position,
        }
    }

    /// Model matrix: translate * rotZ * rotY * rotX * scale
    pub fn matrix(&self) -> Mat4 {
        let rotation = self.rotation_degrees;
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_z(rotation.z.to_radians())
            * Mat4::from_rotation_y(rotation.y.to_radians())
            * Mat4::from_rotation_x(rotation.x.to_radians())
            * Mat4::from_scale(self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ONE, Vec3::ZERO, Vec3::ZERO)
    }
}

/// How an object gets its base color
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    /// Sample a loaded texture, repeated `uv_scale` times
    Texture { tag: &'static str, uv_scale: Vec2 },
    /// Solid RGBA color; alpha below 1 draws translucent
    Color(Vec4),
}

/// One entry of the draw list
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: &'static str,
    pub shape: Shape,
    pub parts: ShapeParts,
    pub transform: Transform,
    pub surface: Surface,
    /// Tag in the material library
    pub material: &'static str,
    pub lighting: bool,
    /// Shade as the animated liquid surface
    pub liquid: bool,
}

impl SceneObject {
    fn new(
        name: &'static str,
        shape: Shape,
        parts: ShapeParts,
        transform: Transform,
        surface: Surface,
        material: &'static str,
    ) -> Self {
        Self {
            name,
            shape,
            parts,
            transform,
            surface,
            material,
            lighting: true,
            liquid: false,
        }
    }

    fn liquid(mut self) -> Self {
        self.liquid = true;
        self
    }

    /// Drawn after opaque objects with blending
    pub fn is_translucent(&self) -> bool {
        matches!(self.surface, Surface::Color(color) if color.w < 1.0)
    }

    /// Texture tag, if the object is textured
    pub fn texture_tag(&self) -> Option<&'static str> {
        match self.surface {
            Surface::Texture { tag, .. } => Some(tag),
            Surface::Color(_) => None,
        }
    }

    /// Per-draw uniforms; a missing material keeps the default one
    pub fn object_uniform(&self, materials: &MaterialLibrary) -> ObjectUniform {
        let mut uniform = ObjectUniform::from_transform(self.transform.matrix())
            .with_lighting(self.lighting)
            .with_liquid(self.liquid);

        uniform = match self.surface {
            Surface::Texture { uv_scale, .. } => uniform.with_texture(uv_scale),
            Surface::Color(color) => uniform.with_color(color),
        };

        match materials.find(self.material) {
            Some(material) => uniform.set_material(material),
            None => log::warn!("Material '{}' not found for {}", self.material, self.name),
        }

        uniform
    }
}

fn transform(scale: [f32; 3], rotation_degrees: [f32; 3], position: [f32; 3]) -> Transform {
    Transform::new(
        Vec3::from_array(scale),
        Vec3::from_array(rotation_degrees),
        Vec3::from_array(position),
    )
}

/// The mug on its saucer, in draw order
pub fn mug_scene_objects() -> Vec<SceneObject> {
    let parts = ShapeParts::new;
    vec![
        SceneObject::new(
            "tabletop",
            Shape::Plane,
            ShapeParts::ALL,
            transform([20.0, 1.0, 10.0], [0.0; 3], [0.0; 3]),
            Surface::Texture {
                tag: "stone",
                uv_scale: Vec2::new(16.0, 16.0),
            },
            "tabletop",
        ),
        SceneObject::new(
            "saucer",
            Shape::Cylinder,
            ShapeParts::ALL,
            transform([2.6, 0.02, 2.6], [0.0; 3], [0.0; 3]),
            Surface::Color(Vec4::new(1.0, 0.97, 0.88, 1.0)),
            "ceramic",
        ),
        SceneObject::new(
            "saucer_rim",
            Shape::Cylinder,
            parts(false, true, true),
            transform([2.6, 0.03, 2.6], [0.0; 3], [0.0, 0.03, 0.0]),
            Surface::Color(Vec4::new(0.98, 0.95, 0.86, 1.0)),
            "ceramic_rim",
        ),
        // Upside down so the wide end is the rim
        SceneObject::new(
            "mug_outer",
            Shape::TaperedCylinder,
            parts(true, false, true),
            transform([1.5, 2.0, 1.5], [180.0, 0.0, 0.0], [0.0, 2.10, 0.0]),
            Surface::Texture {
                tag: "grass",
                uv_scale: Vec2::new(2.0, 1.0),
            },
            "mug_glaze",
        ),
        SceneObject::new(
            "mug_inner",
            Shape::TaperedCylinder,
            parts(false, false, true),
            transform([1.46, 1.96, 1.46], [180.0, 0.0, 0.0], [0.0, 2.11, 0.0]),
            Surface::Texture {
                tag: "grass",
                uv_scale: Vec2::ONE,
            },
            "mug_glaze",
        ),
        SceneObject::new(
            "straw",
            Shape::Cylinder,
            ShapeParts::ALL,
            transform([0.08, 2.96, 0.08], [-32.25, 150.0, 0.0], [-0.45, 0.25, -0.12]),
            Surface::Color(Vec4::new(0.96, 0.96, 0.92, 1.0)),
            "straw",
        ),
        SceneObject::new(
            "liquid",
            Shape::Cylinder,
            parts(true, false, false),
            transform([1.30, 0.01, 1.30], [0.5, 0.0, 0.3], [0.0, 1.78, 0.0]),
            Surface::Color(Vec4::new(0.2, 0.45, 0.9, 0.7)),
            "liquid",
        )
        .liquid(),
        SceneObject::new(
            "mug_bottom",
            Shape::Cylinder,
            parts(true, true, false),
            transform([1.0, 0.1, 1.0], [0.0; 3], [0.0, 0.06, 0.0]),
            Surface::Texture {
                tag: "grass",
                uv_scale: Vec2::ONE,
            },
            "mug_glaze",
        ),
    ]
}

/// Materials referenced by [`mug_scene_objects`]
pub fn mug_materials() -> MaterialLibrary {
    MaterialLibrary::new()
        .with("tabletop", Material::grey(1.0, 0.4, 32.0))
        .with("ceramic", Material::grey(0.6, 1.0, 128.0))
        .with("ceramic_rim", Material::grey(0.55, 1.0, 128.0))
        .with("mug_glaze", Material::grey(1.0, 0.25, 24.0))
        .with("straw", Material::grey(1.0, 0.35, 32.0))
        .with(
            "liquid",
            Material::new(Vec3::new(1.0, 0.95, 0.8), Vec3::ONE, 96.0),
        )
}
