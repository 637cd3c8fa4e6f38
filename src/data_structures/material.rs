//! Materials and their fixed-slot binding protocol.
//!
//! Every shader samples the same three texture units:
//!
//! | unit | sampler          | present          |
//! |------|------------------|------------------|
//! | 0    | `uColorSampler`  | always           |
//! | 1    | `uNormalSampler` | `uHasNormalMap`  |
//! | 2    | `uOrmSampler`    | `uHasOrmMap`     |
//!
//! Optional maps are announced through boolean uniforms, so a unit that still
//! holds a previous material's texture is never sampled.

use crate::render::{
    RenderBackend, ShaderProgram, TextureHandle, UniformValue, set_uniform, uniforms,
};

pub const COLOR_UNIT: u32 = 0;
pub const NORMAL_UNIT: u32 = 1;
pub const ORM_UNIT: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalMap {
    pub texture: TextureHandle,
    pub scale: f32,
}

/// Occlusion (r), roughness (g) and metalness (b) packed into one texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrmMap {
    pub texture: TextureHandle,
    pub roughness_factor: f32,
    pub metalness_factor: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    color: TextureHandle,
    normal: Option<NormalMap>,
    orm: Option<OrmMap>,
}

impl Material {
    pub fn new(name: &str, color: TextureHandle) -> Self {
        Self {
            name: name.to_string(),
            color,
            normal: None,
            orm: None,
        }
    }

    pub fn with_normal_map(mut self, normal: Option<NormalMap>) -> Self {
        self.normal = normal;
        self
    }

    pub fn with_orm_map(mut self, orm: Option<OrmMap>) -> Self {
        self.orm = orm;
        self
    }

    pub fn color_texture(&self) -> TextureHandle {
        self.color
    }

    pub fn normal_map(&self) -> Option<&NormalMap> {
        self.normal.as_ref()
    }

    pub fn orm_map(&self) -> Option<&OrmMap> {
        self.orm.as_ref()
    }

    /// Points the samplers of `shader` at their fixed units. Needed once per program.
    pub fn setup_sampler_slots(backend: &mut dyn RenderBackend, shader: &dyn ShaderProgram) {
        set_uniform(backend, shader, uniforms::COLOR_SAMPLER, UniformValue::Int(COLOR_UNIT as i32));
        set_uniform(backend, shader, uniforms::NORMAL_SAMPLER, UniformValue::Int(NORMAL_UNIT as i32));
        set_uniform(backend, shader, uniforms::ORM_SAMPLER, UniformValue::Int(ORM_UNIT as i32));
    }

    pub fn apply(&self, backend: &mut dyn RenderBackend, shader: &dyn ShaderProgram) {
        backend.bind_texture(COLOR_UNIT, self.color);

        match &self.normal {
            Some(normal) => {
                set_uniform(backend, shader, uniforms::HAS_NORMAL_MAP, UniformValue::Bool(true));
                backend.bind_texture(NORMAL_UNIT, normal.texture);
                set_uniform(backend, shader, uniforms::NORMAL_SCALE, UniformValue::Float(normal.scale));
            }
            None => set_uniform(backend, shader, uniforms::HAS_NORMAL_MAP, UniformValue::Bool(false)),
        }

        match &self.orm {
            Some(orm) => {
                set_uniform(backend, shader, uniforms::HAS_ORM_MAP, UniformValue::Bool(true));
                backend.bind_texture(ORM_UNIT, orm.texture);
                set_uniform(
                    backend,
                    shader,
                    uniforms::ROUGHNESS_FACTOR,
                    UniformValue::Float(orm.roughness_factor),
                );
                set_uniform(
                    backend,
                    shader,
                    uniforms::METALNESS_FACTOR,
                    UniformValue::Float(orm.metalness_factor),
                );
            }
            None => set_uniform(backend, shader, uniforms::HAS_ORM_MAP, UniformValue::Bool(false)),
        }
    }
}
