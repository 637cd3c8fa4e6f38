//! Contracts with the graphics layer.
//!
//! Shader compilation, texture storage and the actual draw calls belong to the
//! host renderer. This module describes the narrow surface the scene core
//! needs from it:
//!
//! - [`ShaderProgram`] resolves attribute and uniform names to slots
//! - [`RenderBackend`] accepts uniform uploads, texture bindings and indexed draws
//!
//! [`draw_renderables`] is the one draw routine shared by every entity kind.

use cgmath::Matrix4;

use crate::data_structures::{mesh::AttributeBinding, mesh::IndexedMesh, scene_graph::Renderable};

/// Opaque handle of an uploaded texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Location of a uniform inside a linked shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformSlot(pub u32);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Bool(bool),
    Float(f32),
    Vec3([f32; 3]),
    Mat4(Matrix4<f32>),
}

/// Uniform and attribute names shared with the shaders.
pub mod uniforms {
    pub const WORLD: &str = "mWorld";
    pub const VIEW: &str = "mView";
    pub const PROJECTION: &str = "mProj";
    pub const CAMERA_POSITION: &str = "camPos";

    pub const COLOR_SAMPLER: &str = "uColorSampler";
    pub const NORMAL_SAMPLER: &str = "uNormalSampler";
    pub const ORM_SAMPLER: &str = "uOrmSampler";
    pub const HAS_NORMAL_MAP: &str = "uHasNormalMap";
    pub const HAS_ORM_MAP: &str = "uHasOrmMap";
    pub const NORMAL_SCALE: &str = "uNormalScale";
    pub const ROUGHNESS_FACTOR: &str = "uRoughFactor";
    pub const METALNESS_FACTOR: &str = "uMetalFactor";
}

/// A compiled and linked shader program.
///
/// A program that failed to compile or link should still implement this
/// trait; it simply resolves no slots.
pub trait ShaderProgram {
    fn attribute_slot(&self, name: &str) -> Option<u32>;

    fn uniform_slot(&self, name: &str) -> Option<UniformSlot>;
}

/// The draw-call layer. The program passed alongside is assumed to be in use.
pub trait RenderBackend {
    fn set_uniform(&mut self, slot: UniformSlot, value: UniformValue);

    /// Binds `texture` to texture unit `unit`.
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    fn draw_indexed(&mut self, mesh: &IndexedMesh, attributes: &[AttributeBinding]);
}

/// Uploads `value` to the uniform called `name`, if the program has one.
pub fn set_uniform(
    backend: &mut dyn RenderBackend,
    shader: &dyn ShaderProgram,
    name: &str,
    value: UniformValue,
) {
    match shader.uniform_slot(name) {
        Some(slot) => backend.set_uniform(slot, value),
        None => log::trace!("Shader has no uniform named {name}, skipping upload."),
    }
}

/// Draws every renderable with `owner_world × model_space_matrix`.
pub fn draw_renderables(
    renderables: &[Renderable],
    owner_world: &Matrix4<f32>,
    backend: &mut dyn RenderBackend,
    shader: &dyn ShaderProgram,
) {
    let world_slot = shader.uniform_slot(uniforms::WORLD);
    if world_slot.is_none() {
        log::debug!("Shader has no {} uniform; meshes are drawn untransformed.", uniforms::WORLD);
    }
    for renderable in renderables {
        if let Some(slot) = world_slot {
            backend.set_uniform(slot, UniformValue::Mat4(renderable.final_matrix(owner_world)));
        }
        renderable.material.apply(backend, shader);
        let attributes = renderable.mesh.attribute_bindings(shader);
        backend.draw_indexed(&renderable.mesh, &attributes);
    }
}
