//! GPU textures and the wgpu implementation of [`TextureFactory`].
//!
//! Power-of-two images are uploaded with a full mip chain, built on the CPU,
//! and sampled with repeat wrapping. Any other size gets a single level and
//! clamp-to-edge wrapping, since wrapping and mipmapping are not guaranteed
//! for such textures on every backend (WebGL in particular).

use image::{DynamicImage, GenericImageView, imageops::FilterType};

use crate::{render::TextureHandle, resources::texture::TextureFactory};

/// How an image of a given size is uploaded and sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingPolicy {
    pub mip_level_count: u32,
    pub address_mode: wgpu::AddressMode,
    pub mipmap_filter: wgpu::MipmapFilterMode,
}

pub fn sampling_policy(width: u32, height: u32) -> SamplingPolicy {
    if width.is_power_of_two() && height.is_power_of_two() {
        SamplingPolicy {
            mip_level_count: width.max(height).ilog2() + 1,
            address_mode: wgpu::AddressMode::Repeat,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
        }
    } else {
        SamplingPolicy {
            mip_level_count: 1,
            address_mode: wgpu::AddressMode::ClampToEdge,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        }
    }
}

/// A GPU texture with a view and sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Uploads `img`, sRGB unless it is a normal map.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &DynamicImage,
        label: Option<&str>,
        is_normal_map: bool,
    ) -> Self {
        let (width, height) = img.dimensions();
        let width = width.max(1);
        let height = height.max(1);
        let policy = sampling_policy(width, height);

        let format = if is_normal_map {
            wgpu::TextureFormat::Rgba8Unorm
        } else {
            wgpu::TextureFormat::Rgba8UnormSrgb
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: policy.mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in mip_chain(img, policy.mip_level_count).iter().enumerate() {
            let (level_width, level_height) = level.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                },
                level,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * level_width),
                    rows_per_image: Some(level_height),
                },
                wgpu::Extent3d {
                    width: level_width,
                    height: level_height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: policy.address_mode,
            address_mode_v: policy.address_mode,
            address_mode_w: policy.address_mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: policy.mipmap_filter,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// RGBA8 levels from full size down, each half the size of the previous one.
fn mip_chain(img: &DynamicImage, levels: u32) -> Vec<image::RgbaImage> {
    let base = img.to_rgba8();
    let mut chain = Vec::with_capacity(levels as usize);
    let (width, height) = base.dimensions();
    chain.push(base);
    for level in 1..levels {
        let level_width = (width >> level).max(1);
        let level_height = (height >> level).max(1);
        let next = image::imageops::resize(&chain[0], level_width, level_height, FilterType::Triangle);
        chain.push(next);
    }
    chain
}

/// Owns every texture created during loading; handles index into it.
pub struct GpuTextures {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: Vec<Texture>,
}

impl GpuTextures {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            textures: Vec::new(),
        }
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl TextureFactory for GpuTextures {
    fn create_texture(&mut self, image: &DynamicImage, label: &str, is_normal_map: bool) -> TextureHandle {
        let texture = Texture::from_image(&self.device, &self.queue, image, Some(label), is_normal_map);
        self.textures.push(texture);
        TextureHandle((self.textures.len() - 1) as u32)
    }
}
