use std::collections::HashMap;

use image::{DynamicImage, GenericImageView};
use vista_ngin::{
    data_structures::mesh::{AttributeBinding, IndexedMesh},
    render::{RenderBackend, ShaderProgram, TextureHandle, UniformSlot, UniformValue, uniforms},
    resources::texture::TextureFactory,
};

/// Every uniform the scene core knows about.
pub const ALL_UNIFORMS: [&str; 12] = [
    uniforms::WORLD,
    uniforms::VIEW,
    uniforms::PROJECTION,
    uniforms::CAMERA_POSITION,
    uniforms::COLOR_SAMPLER,
    uniforms::NORMAL_SAMPLER,
    uniforms::ORM_SAMPLER,
    uniforms::HAS_NORMAL_MAP,
    uniforms::HAS_ORM_MAP,
    uniforms::NORMAL_SCALE,
    uniforms::ROUGHNESS_FACTOR,
    uniforms::METALNESS_FACTOR,
];

pub const ALL_ATTRIBUTES: [&str; 5] = ["aPos", "aNormal", "aColor", "aTexCoord", "aTangent"];

/// A linked program that resolves a fixed set of names.
#[derive(Default)]
pub struct FakeShader {
    uniforms: HashMap<String, u32>,
    attributes: HashMap<String, u32>,
}

impl FakeShader {
    pub fn new(uniforms: &[&str], attributes: &[&str]) -> Self {
        Self {
            uniforms: uniforms
                .iter()
                .enumerate()
                .map(|(slot, name)| (name.to_string(), slot as u32))
                .collect(),
            attributes: attributes
                .iter()
                .enumerate()
                .map(|(slot, name)| (name.to_string(), slot as u32))
                .collect(),
        }
    }

    /// Resolves every uniform and attribute name.
    pub fn complete() -> Self {
        Self::new(&ALL_UNIFORMS, &ALL_ATTRIBUTES)
    }
}

impl ShaderProgram for FakeShader {
    fn attribute_slot(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    fn uniform_slot(&self, name: &str) -> Option<UniformSlot> {
        self.uniforms.get(name).copied().map(UniformSlot)
    }
}

#[derive(Clone, Debug)]
pub struct DrawCall {
    pub mesh: String,
    pub index_count: usize,
    pub attributes: Vec<AttributeBinding>,
}

/// Records everything the scene core asks the graphics layer to do.
#[derive(Default)]
pub struct RecordingBackend {
    pub uniforms: Vec<(UniformSlot, UniformValue)>,
    pub bound_textures: Vec<(u32, TextureHandle)>,
    pub draws: Vec<DrawCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every value uploaded to `name`, in upload order.
    pub fn values_of(&self, shader: &dyn ShaderProgram, name: &str) -> Vec<UniformValue> {
        let Some(slot) = shader.uniform_slot(name) else {
            return Vec::new();
        };
        self.uniforms
            .iter()
            .filter(|(s, _)| *s == slot)
            .map(|(_, value)| *value)
            .collect()
    }

    pub fn last_value_of(&self, shader: &dyn ShaderProgram, name: &str) -> Option<UniformValue> {
        self.values_of(shader, name).last().copied()
    }

    pub fn units_bound(&self) -> Vec<u32> {
        self.bound_textures.iter().map(|(unit, _)| *unit).collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn set_uniform(&mut self, slot: UniformSlot, value: UniformValue) {
        self.uniforms.push((slot, value));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.bound_textures.push((unit, texture));
    }

    fn draw_indexed(&mut self, mesh: &IndexedMesh, attributes: &[AttributeBinding]) {
        self.draws.push(DrawCall {
            mesh: mesh.name().to_string(),
            index_count: mesh.index_count(),
            attributes: attributes.to_vec(),
        });
    }
}

#[derive(Clone, Debug)]
pub struct CreatedTexture {
    pub label: String,
    pub is_normal_map: bool,
    pub dimensions: (u32, u32),
    pub first_pixel: [u8; 4],
}

/// Hands out sequential handles and remembers what was uploaded.
#[derive(Default)]
pub struct RecordingTextures {
    pub created: Vec<CreatedTexture>,
}

impl RecordingTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&CreatedTexture> {
        self.created.get(handle.0 as usize)
    }
}

impl TextureFactory for RecordingTextures {
    fn create_texture(&mut self, image: &DynamicImage, label: &str, is_normal_map: bool) -> TextureHandle {
        self.created.push(CreatedTexture {
            label: label.to_string(),
            is_normal_map,
            dimensions: image.dimensions(),
            first_pixel: image.get_pixel(0, 0).0,
        });
        TextureHandle(self.created.len() as u32 - 1)
    }
}

/// PNG bytes of a `width` x `height` image filled with `rgba`.
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("failed to encode test png");
    bytes.into_inner()
}

pub fn assert_matrix_eq(actual: cgmath::Matrix4<f32>, expected: cgmath::Matrix4<f32>) {
    let actual: [[f32; 4]; 4] = actual.into();
    let expected: [[f32; 4]; 4] = expected.into();
    for col in 0..4 {
        for row in 0..4 {
            assert!(
                (actual[col][row] - expected[col][row]).abs() < 1e-5,
                "matrices differ at column {col}, row {row}: {actual:?} != {expected:?}"
            );
        }
    }
}
