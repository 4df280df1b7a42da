//! Phong light set: one directional light, a few point lights, one spotlight
//!
//! The GPU structs mirror the WGSL `Lights` block field for field.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Number of point light slots in the GPU block
pub const MAX_POINT_LIGHTS: usize = 5;

/// GPU-compatible directional light
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuDirectionalLight {
    pub direction: [f32; 3],
    /// Non-zero when the light contributes
    pub active: u32,
    pub ambient: [f32; 3],
    _pad0: f32,
    pub diffuse: [f32; 3],
    _pad1: f32,
    pub specular: [f32; 3],
    _pad2: f32,
}

/// GPU-compatible point light
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 3],
    pub active: u32,
    pub ambient: [f32; 3],
    /// Constant attenuation
    pub constant: f32,
    pub diffuse: [f32; 3],
    /// Linear attenuation
    pub linear: f32,
    pub specular: [f32; 3],
    /// Quadratic attenuation
    pub quadratic: f32,
}

/// GPU-compatible spotlight
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuSpotLight {
    pub position: [f32; 3],
    pub active: u32,
    pub direction: [f32; 3],
    /// Cosine of the inner cone angle
    pub cut_off: f32,
    pub ambient: [f32; 3],
    /// Cosine of the outer cone angle
    pub outer_cut_off: f32,
    pub diffuse: [f32; 3],
    pub constant: f32,
    pub specular: [f32; 3],
    pub linear: f32,
    pub quadratic: f32,
    _padding: [f32; 3],
}

/// Light block uploaded to the GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightStorage {
    pub directional: GpuDirectionalLight,
    pub points: [GpuPointLight; MAX_POINT_LIGHTS],
    pub spot: GpuSpotLight,
}

impl Default for LightStorage {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Ambient, diffuse and specular intensities of one light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightColors {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl LightColors {
    /// White light with the given scalar intensities
    #[must_use]
    pub fn grey(ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self {
            ambient: Vec3::splat(ambient),
            diffuse: Vec3::splat(diffuse),
            specular: Vec3::splat(specular),
        }
    }
}

/// Directional light (like the sun)
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Light direction (normalized)
    pub direction: Vec3,
    pub colors: LightColors,
}

impl DirectionalLight {
    /// Create a new directional light
    #[must_use]
    pub fn new(direction: Vec3, colors: LightColors) -> Self {
        Self {
            direction: direction.normalize_or(Vec3::NEG_Y),
            colors,
        }
    }

    /// Convert to GPU light
    #[must_use]
    pub fn to_gpu(&self) -> GpuDirectionalLight {
        GpuDirectionalLight {
            direction: self.direction.into(),
            active: 1,
            ambient: self.colors.ambient.into(),
            diffuse: self.colors.diffuse.into(),
            specular: self.colors.specular.into(),
            ..GpuDirectionalLight::zeroed()
        }
    }
}

/// Point light with distance attenuation
#[derive(Debug, Clone)]
pub struct PointLight {
    /// World position
    pub position: Vec3,
    pub colors: LightColors,
    /// Attenuation: constant, linear, quadratic
    pub attenuation: (f32, f32, f32),
}

impl PointLight {
    /// Create a new point light
    #[must_use]
    pub fn new(position: Vec3, colors: LightColors) -> Self {
        Self {
            position,
            colors,
            attenuation: (1.0, 0.09, 0.032),
        }
    }

    /// Set attenuation values
    #[must_use]
    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.attenuation = (constant, linear, quadratic);
        self
    }

    /// Convert to GPU light
    #[must_use]
    pub fn to_gpu(&self) -> GpuPointLight {
        GpuPointLight {
            position: self.position.into(),
            active: 1,
            ambient: self.colors.ambient.into(),
            constant: self.attenuation.0,
            diffuse: self.colors.diffuse.into(),
            linear: self.attenuation.1,
            specular: self.colors.specular.into(),
            quadratic: self.attenuation.2,
        }
    }
}

/// Spot light
#[derive(Debug, Clone)]
pub struct SpotLight {
    /// World position
    pub position: Vec3,
    /// Light direction
    pub direction: Vec3,
    pub colors: LightColors,
    /// Inner cone angle in radians
    pub inner_angle: f32,
    /// Outer cone angle in radians
    pub outer_angle: f32,
    /// Attenuation
    pub attenuation: (f32, f32, f32),
}

impl SpotLight {
    /// Create a new spot light
    #[must_use]
    pub fn new(position: Vec3, direction: Vec3, colors: LightColors) -> Self {
        Self {
            position,
            direction: direction.normalize_or(Vec3::NEG_Z),
            colors,
            inner_angle: 25.0_f32.to_radians(),
            outer_angle: 35.0_f32.to_radians(),
            attenuation: (1.0, 0.09, 0.032),
        }
    }

    /// Set cone angles
    #[must_use]
    pub fn with_angles(mut self, inner_degrees: f32, outer_degrees: f32) -> Self {
        self.inner_angle = inner_degrees.to_radians();
        self.outer_angle = outer_degrees.to_radians();
        self
    }

    /// Set attenuation values
    #[must_use]
    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.attenuation = (constant, linear, quadratic);
        self
    }

    /// Move the light and aim it
    pub fn set_pose(&mut self, position: Vec3, direction: Vec3) {
        self.position = position;
        self.direction = direction.normalize_or(self.direction);
    }

    /// Convert to GPU light
    #[must_use]
    pub fn to_gpu(&self) -> GpuSpotLight {
        GpuSpotLight {
            position: self.position.into(),
            active: 1,
            direction: self.direction.into(),
            cut_off: self.inner_angle.cos(),
            ambient: self.colors.ambient.into(),
            outer_cut_off: self.outer_angle.cos(),
            diffuse: self.colors.diffuse.into(),
            constant: self.attenuation.0,
            specular: self.colors.specular.into(),
            linear: self.attenuation.1,
            quadratic: self.attenuation.2,
            _padding: [0.0; 3],
        }
    }
}

/// Light manager holding the scene's light set
#[derive(Debug, Default)]
pub struct LightManager {
    pub directional: Option<DirectionalLight>,
    /// Point lights; only the first [`MAX_POINT_LIGHTS`] reach the GPU
    pub point_lights: Vec<PointLight>,
    pub spot: Option<SpotLight>,
}

impl LightManager {
    /// Create a new light manager
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directional light
    pub fn set_directional_light(&mut self, light: DirectionalLight) {
        self.directional = Some(light);
    }

    /// Add a point light
    pub fn add_point_light(&mut self, light: PointLight) {
        if self.point_lights.len() >= MAX_POINT_LIGHTS {
            log::warn!("Point light ignored, all {MAX_POINT_LIGHTS} slots in use");
            return;
        }
        self.point_lights.push(light);
    }

    /// Set the spotlight
    pub fn set_spot_light(&mut self, light: SpotLight) {
        self.spot = Some(light);
    }

    /// Mutable access to the spotlight
    pub fn spot_mut(&mut self) -> Option<&mut SpotLight> {
        self.spot.as_mut()
    }

    /// Get total number of lights
    #[must_use]
    pub fn light_count(&self) -> usize {
        usize::from(self.directional.is_some())
            + self.point_lights.len()
            + usize::from(self.spot.is_some())
    }

    /// Build GPU light storage from current lights
    ///
    /// Unused slots stay zeroed with `active == 0`.
    #[must_use]
    pub fn build_storage(&self) -> LightStorage {
        let mut storage = LightStorage::default();

        if let Some(light) = &self.directional {
            storage.directional = light.to_gpu();
        }
        for (slot, light) in storage.points.iter_mut().zip(&self.point_lights) {
            *slot = light.to_gpu();
        }
        if let Some(light) = &self.spot {
            storage.spot = light.to_gpu();
        }

        storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<GpuDirectionalLight>(), 64);
        assert_eq!(std::mem::size_of::<GpuPointLight>(), 64);
        assert_eq!(std::mem::size_of::<GpuSpotLight>(), 96);
        assert_eq!(std::mem::size_of::<LightStorage>(), 480);
    }

    #[test]
    fn test_unused_slots_inactive() {
        let mut lights = LightManager::new();
        lights.add_point_light(PointLight::new(Vec3::new(2.0, 6.0, 2.0), LightColors::grey(0.08, 0.35, 0.35)));

        let storage = lights.build_storage();
        assert_eq!(storage.directional.active, 0);
        assert_eq!(storage.points[0].active, 1);
        assert_eq!(storage.points[0].position, [2.0, 6.0, 2.0]);
        assert!(storage.points[1..].iter().all(|p| p.active == 0));
        assert_eq!(storage.spot.active, 0);
    }

    #[test]
    fn test_point_light_overflow_ignored() {
        let mut lights = LightManager::new();
        for i in 0..MAX_POINT_LIGHTS + 2 {
            lights.add_point_light(PointLight::new(Vec3::splat(i as f32), LightColors::grey(0.0, 1.0, 1.0)));
        }
        assert_eq!(lights.point_lights.len(), MAX_POINT_LIGHTS);
        assert_eq!(lights.light_count(), MAX_POINT_LIGHTS);
    }

    #[test]
    fn test_spot_cutoffs_are_cosines() {
        let spot = SpotLight::new(Vec3::ZERO, Vec3::NEG_Z, LightColors::grey(0.02, 1.1, 1.1))
            .with_angles(18.0, 26.0)
            .with_attenuation(1.0, 0.045, 0.008);
        let gpu = spot.to_gpu();

        assert!((gpu.cut_off - 18.0_f32.to_radians().cos()).abs() < 1e-6);
        assert!((gpu.outer_cut_off - 26.0_f32.to_radians().cos()).abs() < 1e-6);
        assert!(gpu.cut_off > gpu.outer_cut_off);
        assert_eq!((gpu.constant, gpu.linear, gpu.quadratic), (1.0, 0.045, 0.008));
    }

    #[test]
    fn test_spot_pose_normalizes_direction() {
        let mut spot = SpotLight::new(Vec3::ZERO, Vec3::NEG_Z, LightColors::grey(0.0, 1.0, 1.0));
        spot.set_pose(Vec3::new(0.0, 5.0, 12.0), Vec3::new(0.0, -0.5, -2.0));
        assert!((spot.direction.length() - 1.0).abs() < 1e-5);

        // Zero direction keeps the previous aim
        let before = spot.direction;
        spot.set_pose(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(spot.direction, before);
    }

    #[test]
    fn test_directional_normalized() {
        let light = DirectionalLight::new(Vec3::new(-0.2, -1.0, -0.3), LightColors::grey(0.15, 0.3, 1.0));
        assert!((light.direction.length() - 1.0).abs() < 1e-5);
        let gpu = light.to_gpu();
        assert_eq!(gpu.active, 1);
        assert_eq!(gpu.ambient, [0.15; 3]);
    }
}
