//! The mug scene
//!
//! Builds the draw list, lights and textures, and drives them each frame
//! from the [`ViewController`].

mod objects;
mod view;

use std::path::PathBuf;

use glam::Vec3;

pub use objects::{SceneObject, Surface, Transform, mug_materials, mug_scene_objects};
pub use view::{
    DEFAULT_RIPPLE_AMPLITUDE, MAX_RIPPLE_AMPLITUDE, START_DIRECTION, START_POSITION,
    ViewController,
};

use crate::core::{EngineContext, Game};
use crate::renderer::{
    DirectionalLight, DrawItem, LightColors, LightManager, MaterialLibrary, PointLight,
    ShapeMeshes, SpotLight,
};

/// Image files loaded at startup and the tags objects refer to them by
pub const SCENE_TEXTURES: [(&str, &str); 2] = [("stone.png", "stone"), ("grass.png", "grass")];

/// Ripple phase speed
pub const RIPPLE_SPEED: f32 = 3.0;
/// Ripple radial frequency
pub const RIPPLE_FREQUENCY: f32 = 22.0;
/// Animation time runs at half of wall-clock time
const TIME_SCALE: f32 = 0.5;

/// The scene's fixed light rig
///
/// The spotlight starts at the camera and follows it every frame.
pub fn mug_scene_lights() -> LightManager {
    let mut lights = LightManager::new();
    lights.set_directional_light(DirectionalLight::new(
        Vec3::new(-0.2, -1.0, -0.3),
        LightColors::grey(0.15, 0.3, 1.0),
    ));
    lights.add_point_light(
        PointLight::new(Vec3::new(2.0, 6.0, 2.0), LightColors::grey(0.08, 0.35, 0.35))
            .with_attenuation(1.0, 0.0, 0.0),
    );
    lights.set_spot_light(
        SpotLight::new(START_POSITION, START_DIRECTION, LightColors::grey(0.02, 1.1, 1.1))
            .with_angles(18.0, 26.0)
            .with_attenuation(1.0, 0.045, 0.008),
    );
    lights
}

/// Slot to bind for a texture tag
///
/// A tag that did not load falls back to slot 0; with nothing loaded at all
/// the draw gets the white texture.
pub fn resolve_texture_slot(found: Option<usize>, loaded: usize) -> Option<usize> {
    found.or((loaded > 0).then_some(0))
}

/// GPU state for one draw list entry
struct PreparedDraw {
    _buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture: Option<usize>,
}

/// The mug on the table, as a [`Game`]
pub struct MugScene {
    texture_dir: PathBuf,
    view: ViewController,
    lights: LightManager,
    materials: MaterialLibrary,
    objects: Vec<SceneObject>,
    meshes: ShapeMeshes,
    draws: Vec<PreparedDraw>,
}

impl MugScene {
    /// Create the scene; textures are read from `texture_dir` on init
    pub fn new(texture_dir: impl Into<PathBuf>) -> Self {
        Self {
            texture_dir: texture_dir.into(),
            view: ViewController::new(),
            lights: mug_scene_lights(),
            materials: mug_materials(),
            objects: mug_scene_objects(),
            meshes: ShapeMeshes::new(),
            draws: Vec::new(),
        }
    }

    /// Light every object, or draw them all with flat base colors
    pub fn with_lighting(mut self, lit: bool) -> Self {
        for object in &mut self.objects {
            object.lighting = lit;
        }
        self
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }
}

impl Game for MugScene {
    fn init(&mut self, ctx: &mut EngineContext) {
        let Some(renderer) = ctx.renderer_mut() else {
            log::error!("Scene initialized without a renderer");
            return;
        };

        for (file, tag) in SCENE_TEXTURES {
            let path = self.texture_dir.join(file);
            if let Err(e) = renderer.load_texture(&path, tag) {
                log::warn!("Failed to load texture {}: {e}", path.display());
            }
        }

        for mesh in self.meshes.iter_mut() {
            renderer.upload_mesh(mesh);
        }

        self.draws = self
            .objects
            .iter()
            .map(|object| {
                let uniform = object.object_uniform(&self.materials);
                let (buffer, bind_group) = renderer.create_object_bind_group(&uniform);
                let texture = object.texture_tag().and_then(|tag| {
                    let found = renderer.texture_slot(tag);
                    if found.is_none() {
                        log::warn!("Texture '{tag}' not loaded, {} uses a fallback", object.name);
                    }
                    resolve_texture_slot(found, renderer.texture_count())
                });
                PreparedDraw {
                    _buffer: buffer,
                    bind_group,
                    texture,
                }
            })
            .collect();

        renderer
            .globals_mut()
            .set_ripple_params(RIPPLE_SPEED, RIPPLE_FREQUENCY);

        log::info!(
            "Scene ready: {} objects, {} materials, {} textures, {} lights",
            self.draws.len(),
            self.materials.len(),
            renderer.texture_count(),
            self.lights.light_count()
        );
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        self.view.update(&ctx.input, ctx.time.delta_seconds());
        if self.view.quit_requested() {
            ctx.quit();
            return;
        }

        let time = ctx.time.elapsed_seconds() * TIME_SCALE;
        let Some(renderer) = ctx.renderer_mut() else {
            return;
        };

        renderer.globals_mut().set_time(time);
        if let Some(spot) = self.lights.spot_mut() {
            self.view.apply(renderer.globals_mut(), spot);
            renderer.update_shadow(spot.position, spot.direction);
        }
        renderer.set_lights(&self.lights.build_storage());
    }

    fn render(&mut self, ctx: &mut EngineContext) {
        let Some(renderer) = ctx.renderer() else {
            return;
        };

        let items: Vec<DrawItem<'_>> = self
            .objects
            .iter()
            .zip(&self.draws)
            .map(|(object, draw)| DrawItem {
                mesh: self.meshes.get(object.shape),
                parts: object.parts,
                object: &draw.bind_group,
                texture: draw.texture,
                translucent: object.is_translucent(),
            })
            .collect();

        renderer.render_frame(&items);
    }

    fn on_resize(&mut self, _ctx: &mut EngineContext, width: u32, height: u32) {
        self.view.set_aspect(width, height);
    }

    fn shutdown(&mut self, _ctx: &mut EngineContext) {
        log::info!("Shutting down scene");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MAX_POINT_LIGHTS;

    #[test]
    fn test_texture_fallback() {
        assert_eq!(resolve_texture_slot(Some(1), 2), Some(1));
        assert_eq!(resolve_texture_slot(None, 2), Some(0));
        assert_eq!(resolve_texture_slot(None, 0), None);
    }

    #[test]
    fn test_scene_textures_cover_object_tags() {
        for object in mug_scene_objects() {
            if let Some(tag) = object.texture_tag() {
                assert!(SCENE_TEXTURES.iter().any(|(_, t)| *t == tag));
            }
        }
    }

    #[test]
    fn test_light_rig() {
        let storage = mug_scene_lights().build_storage();

        assert_eq!(storage.directional.active, 1);
        assert_eq!(storage.directional.specular, [1.0; 3]);

        assert_eq!(storage.points[0].active, 1);
        assert_eq!(storage.points[0].position, [2.0, 6.0, 2.0]);
        assert_eq!(
            (storage.points[0].constant, storage.points[0].linear, storage.points[0].quadratic),
            (1.0, 0.0, 0.0)
        );
        assert!((1..MAX_POINT_LIGHTS).all(|i| storage.points[i].active == 0));

        assert_eq!(storage.spot.active, 1);
        assert_eq!(storage.spot.diffuse, [1.1; 3]);
        assert_eq!(storage.spot.position, START_POSITION.to_array());
    }

    #[test]
    fn test_unlit_scene_flags_every_draw() {
        let scene = MugScene::new("textures").with_lighting(false);
        for object in &scene.objects {
            assert!(!object.object_uniform(&scene.materials).uses_lighting());
        }

        let lit = MugScene::new("textures");
        assert!(lit.objects.iter().all(|o| o.lighting));
    }

    #[test]
    fn test_new_scene_is_not_prepared() {
        let scene = MugScene::new("textures");
        assert!(scene.draws.is_empty());
        assert_eq!(scene.objects.len(), 8);
        assert_eq!(scene.view().ripple_amplitude(), DEFAULT_RIPPLE_AMPLITUDE);
    }
}
