//! A lit, shadowed 3D mug scene rendered with wgpu
//!
//! This crate provides:
//! - A winit application loop with frame timing and input tracking
//! - Textured primitive meshes with Phong lighting
//! - A spotlight shadow map following the camera
//! - An animated liquid surface with ripples and a meniscus
//! - A fly camera with perspective and orthographic projection

pub mod core;
pub mod input;
pub mod renderer;
pub mod scene;

// Re-exports for convenience
pub use glam;
pub use wgpu;
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{
        DebugInfo, Engine, EngineConfig, EngineContext, FrameStats, Game, ViewerConfig,
    };
    pub use crate::input::{Input, InputMapper, ViewerAction};
    pub use crate::renderer::{
        Camera, Material, MaterialLibrary, Mesh, Projection, Renderer, ShadowConfig, Vertex,
    };
    pub use crate::scene::{MugScene, ViewController};
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
    pub use winit::keyboard::KeyCode;
}
