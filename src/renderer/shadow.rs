//! Shadow mapping for the spotlight
//!
//! A depth-only pass renders the scene from the spotlight into a square depth
//! texture; the main pass compares against it with a comparison sampler.

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

/// Shadow map configuration
#[derive(Debug, Clone)]
pub struct ShadowConfig {
    /// Shadow map resolution (width and height)
    pub resolution: u32,
    /// Vertical field of view of the light frustum in degrees
    pub fov_degrees: f32,
    /// Near plane for shadow camera
    pub near: f32,
    /// Far plane for shadow camera
    pub far: f32,
    /// Depth bias in normalized depth units, subtracted before comparing
    pub bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            resolution: 2048,
            fov_degrees: 48.0,
            near: 0.05,
            far: 80.0,
            bias: 0.00002,
        }
    }
}

impl ShadowConfig {
    /// Set the shadow map resolution, at least one texel
    #[must_use]
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution.max(1);
        self
    }
}

/// Shadow uniform data for shader
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniform {
    /// Light space matrix
    pub light_space_matrix: [[f32; 4]; 4],
    /// Shadow bias
    pub bias: f32,
    /// One texel in shadow map UV units, for PCF offsets
    pub texel_size: f32,
    _padding: [f32; 2],
}

impl ShadowUniform {
    fn new(matrix: Mat4, config: &ShadowConfig) -> Self {
        Self {
            light_space_matrix: matrix.to_cols_array_2d(),
            bias: config.bias,
            texel_size: 1.0 / config.resolution.max(1) as f32,
            _padding: [0.0; 2],
        }
    }
}

/// View-projection of a spotlight at `position` aiming along `direction`
///
/// Uses world up unless the light points almost straight up or down, in
/// which case +Z is used.
#[must_use]
pub fn spot_light_matrix(config: &ShadowConfig, position: Vec3, direction: Vec3) -> Mat4 {
    let direction = direction.normalize_or(Vec3::NEG_Y);
    let up = if direction.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };

    let projection =
        Mat4::perspective_rh(config.fov_degrees.to_radians(), 1.0, config.near, config.far);
    let view = Mat4::look_at_rh(position, position + direction, up);

    projection * view
}

/// Shadow map for a single light
pub struct ShadowMap {
    /// Depth texture for shadow map
    pub texture: wgpu::Texture,
    /// Texture view for rendering
    pub depth_view: wgpu::TextureView,
    /// Sampler for shadow sampling
    pub sampler: wgpu::Sampler,
    /// Light space matrix (view-projection from light's perspective)
    pub light_space_matrix: Mat4,
    /// Configuration
    pub config: ShadowConfig,
    /// Uniform buffer for shadow data
    pub uniform_buffer: wgpu::Buffer,
}

impl ShadowMap {
    /// Create a new shadow map
    #[must_use]
    pub fn new(device: &wgpu::Device, config: ShadowConfig) -> Self {
        let size = wgpu::Extent3d {
            width: config.resolution,
            height: config.resolution,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let depth_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let uniform = ShadowUniform::new(Mat4::IDENTITY, &config);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shadow_uniform_buffer"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        log::debug!(
            "Shadow map {}x{}",
            config.resolution,
            config.resolution
        );

        Self {
            texture,
            depth_view,
            sampler,
            light_space_matrix: Mat4::IDENTITY,
            config,
            uniform_buffer,
        }
    }

    /// Aim the shadow camera along the spotlight
    pub fn update_for_spot_light(&mut self, queue: &wgpu::Queue, position: Vec3, direction: Vec3) {
        self.light_space_matrix = spot_light_matrix(&self.config, position, direction);

        let uniform = ShadowUniform::new(self.light_space_matrix, &self.config);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Get bind group layout for shadow map sampling
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_bind_group_layout"),
            entries: &[
                // Shadow map texture
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Shadow sampler (comparison sampler)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
                // Shadow uniform (light space matrix, bias)
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    /// Create bind group for shadow sampling
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.depth_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Layout for the depth pass, which only needs the light matrix
    pub fn pass_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_pass_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    /// Bind group for the depth pass
    pub fn create_pass_bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_pass_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: self.uniform_buffer.as_entire_binding(),
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<ShadowUniform>(), 80);
    }

    #[test]
    fn test_point_ahead_lands_in_center() {
        let config = ShadowConfig::default();
        let position = Vec3::new(0.0, 5.0, 12.0);
        let direction = Vec3::new(0.0, -0.5, -2.0).normalize();
        let matrix = spot_light_matrix(&config, position, direction);

        let clip = matrix.project_point3(position + direction * 10.0);
        assert!(clip.x.abs() < 1e-4);
        assert!(clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn test_farther_points_have_greater_depth() {
        let config = ShadowConfig::default();
        let matrix = spot_light_matrix(&config, Vec3::ZERO, Vec3::NEG_Z);
        let near = matrix.project_point3(Vec3::new(0.0, 0.0, -2.0));
        let far = matrix.project_point3(Vec3::new(0.0, 0.0, -20.0));
        assert!(far.z > near.z);
    }

    #[test]
    fn test_point_outside_cone_is_off_map() {
        let config = ShadowConfig::default();
        let matrix = spot_light_matrix(&config, Vec3::ZERO, Vec3::NEG_Z);
        // 45 degrees off axis is outside a 48 degree frustum
        let clip = matrix.project_point3(Vec3::new(5.0, 0.0, -5.0));
        assert!(clip.x > 1.0);
    }

    #[test]
    fn test_vertical_direction_stays_finite() {
        let config = ShadowConfig::default();
        let down = spot_light_matrix(&config, Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
        let up = spot_light_matrix(&config, Vec3::ZERO, Vec3::Y);
        assert!(down.is_finite());
        assert!(up.is_finite());

        let clip = down.project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
    }

    #[test]
    fn test_with_resolution_clamps() {
        assert_eq!(ShadowConfig::default().with_resolution(0).resolution, 1);
        assert_eq!(ShadowConfig::default().with_resolution(1024).resolution, 1024);
    }
}
