//! Rendering module
//!
//! wgpu renderer for the scene: primitive meshes, textures, Phong materials
//! and lights, and a spotlight shadow map.

mod camera;
mod context;
mod lights;
mod material;
mod mesh;
mod shadow;
mod texture;
mod uniforms;

pub use camera::{Camera, Projection};
pub use context::{DrawItem, Renderer};
pub use lights::{
    DirectionalLight, GpuDirectionalLight, GpuPointLight, GpuSpotLight, LightColors,
    LightManager, LightStorage, MAX_POINT_LIGHTS, PointLight, SpotLight,
};
pub use material::{Material, MaterialLibrary};
pub use mesh::{CylinderSections, Mesh, Shape, ShapeMeshes, ShapeParts, Vertex};
pub use shadow::{ShadowConfig, ShadowMap, ShadowUniform, spot_light_matrix};
pub use texture::{
    MAX_TEXTURE_SLOTS, Texture, TextureError, TextureSlots, decode_image, mip_chain,
};
pub use uniforms::{GlobalUniform, ObjectUniform};
