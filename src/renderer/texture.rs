//! Texture loading, GPU upload, and the tagged texture slot table

use std::path::Path;

use image::imageops::FilterType;
use image::RgbaImage;
use wgpu::util::DeviceExt;

/// Number of texture slots the scene can register
pub const MAX_TEXTURE_SLOTS: usize = 16;

/// Errors that can occur during texture loading
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// The image file could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The bytes are not a decodable image
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),
    /// Only RGB and RGBA images are accepted
    #[error("images with {0} channels are not supported")]
    UnsupportedChannels(u8),
    /// The tag is already registered
    #[error("texture tag '{0}' is already registered")]
    DuplicateTag(String),
    /// All slots are taken
    #[error("all {MAX_TEXTURE_SLOTS} texture slots are in use")]
    SlotsExhausted,
}

/// A GPU texture with its view and sampler
#[derive(Debug)]
pub struct Texture {
    /// The GPU texture
    pub texture: wgpu::Texture,
    /// Texture view for binding
    pub view: wgpu::TextureView,
    /// Sampler for texture filtering
    pub sampler: wgpu::Sampler,
    /// Texture dimensions
    pub size: wgpu::Extent3d,
}

impl Texture {
    /// Load a texture from an image file
    ///
    /// The image is flipped vertically so V grows upward like the mesh UVs.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded, or if the
    /// image is neither RGB nor RGBA
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
        label: Option<&str>,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let img = decode_image(&bytes)?;

        log::info!(
            "Loaded image {}: width {}, height {}, channels {}",
            path.display(),
            img.width(),
            img.height(),
            img.color().channel_count()
        );

        Ok(Self::from_image(device, queue, &img, label))
    }

    /// Create a mipmapped texture from a `DynamicImage`
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
    ) -> Self {
        Self::from_levels(device, queue, &mip_chain(img.to_rgba8()), label)
    }

    /// Upload `levels` as the mip chain of one texture, largest first
    fn from_levels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        levels: &[RgbaImage],
        label: Option<&str>,
    ) -> Self {
        let (width, height) = levels.first().map_or((1, 1), RgbaImage::dimensions);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let data: Vec<u8> = levels
            .iter()
            .flat_map(|level| level.as_raw().iter().copied())
            .collect();

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label,
                size,
                mip_level_count: levels.len().max(1) as u32,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            size,
        }
    }

    /// Create a 1x1 white texture for untextured draws
    #[must_use]
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = RgbaImage::from_pixel(1, 1, image::Rgba([255; 4]));
        Self::from_levels(device, queue, &[white], Some("white_texture"))
    }

    /// Create a bind group layout for textures
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                // Texture view
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    /// Create a bind group for this texture
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("texture_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

/// Decode an image, reject channel counts other than 3 or 4, and flip it
/// vertically
pub fn decode_image(bytes: &[u8]) -> Result<image::DynamicImage, TextureError> {
    let img = image::load_from_memory(bytes)?;
    match img.color().channel_count() {
        3 | 4 => Ok(img.flipv()),
        channels => Err(TextureError::UnsupportedChannels(channels)),
    }
}

/// Halve `base` repeatedly down to 1x1
///
/// Level `n` has size `max(dim >> n, 1)`, the layout wgpu expects for a full
/// mip chain.
pub fn mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let mut levels = vec![base];
    while let Some(last) = levels.last() {
        let (width, height) = last.dimensions();
        if width <= 1 && height <= 1 {
            break;
        }
        let next = image::imageops::resize(
            last,
            (width / 2).max(1),
            (height / 2).max(1),
            FilterType::Triangle,
        );
        levels.push(next);
    }
    levels
}

/// Fixed-capacity table of textures keyed by tag
///
/// Slots are assigned in registration order and never reused.
#[derive(Debug)]
pub struct TextureSlots<T> {
    slots: Vec<(String, T)>,
}

impl<T> TextureSlots<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(MAX_TEXTURE_SLOTS),
        }
    }

    /// Register `value` under `tag` and return its slot
    ///
    /// # Errors
    ///
    /// Fails if the tag exists or every slot is taken
    pub fn register(&mut self, tag: impl Into<String>, value: T) -> Result<usize, TextureError> {
        let tag = tag.into();
        if self.find_slot(&tag).is_some() {
            return Err(TextureError::DuplicateTag(tag));
        }
        if self.slots.len() >= MAX_TEXTURE_SLOTS {
            return Err(TextureError::SlotsExhausted);
        }
        self.slots.push((tag, value));
        Ok(self.slots.len() - 1)
    }

    /// Slot index of a tag
    pub fn find_slot(&self, tag: &str) -> Option<usize> {
        self.slots.iter().position(|(t, _)| t == tag)
    }

    /// Value in a slot
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).map(|(_, v)| v)
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T> Default for TextureSlots<T> {
    fn default() -> Self {
        Self::new()
    }
}
