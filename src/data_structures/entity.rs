//! Placeable things that own loaded geometry.
//!
//! Loading is asynchronous; an entity tracks it with an explicit [`LoadState`]
//! and draws nothing until its renderables are [`LoadState::Ready`].

use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::{
    config::AssetSource,
    data_structures::scene_graph::Renderable,
    render::{RenderBackend, ShaderProgram, draw_renderables},
    resources::{ModelSource, load_renderables, texture::TextureFactory},
    transform::TransformComponent,
};

#[derive(Debug, Default)]
pub enum LoadState<T> {
    #[default]
    Loading,
    Ready(T),
    /// A required resource could not be loaded. The entity stays unloaded.
    Failed(anyhow::Error),
}

impl<T> LoadState<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        match self {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

fn finish(
    state: &mut LoadState<Vec<Renderable>>,
    name: &str,
    result: anyhow::Result<Vec<Renderable>>,
) {
    *state = match result {
        Ok(renderables) => {
            log::info!("{name} loaded with {} renderables.", renderables.len());
            LoadState::Ready(renderables)
        }
        Err(e) => {
            log::error!("Failed to load {name}: {e:#}");
            LoadState::Failed(e)
        }
    };
}

fn draw_if_ready(
    state: &LoadState<Vec<Renderable>>,
    world: &Matrix4<f32>,
    backend: &mut dyn RenderBackend,
    shader: &dyn ShaderProgram,
) {
    if let LoadState::Ready(renderables) = state {
        draw_renderables(renderables, world, backend, shader);
    }
}

/// A movable prop.
#[derive(Debug)]
pub struct Model {
    source: ModelSource,
    pub transform: TransformComponent,
    state: LoadState<Vec<Renderable>>,
}

impl Model {
    pub fn new(source: ModelSource, position: impl Into<Vector3<f32>>) -> Self {
        Self {
            source,
            transform: TransformComponent::new(position),
            state: LoadState::Loading,
        }
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn state(&self) -> &LoadState<Vec<Renderable>> {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    /// Stores the outcome of a load started elsewhere.
    pub fn finish_loading(&mut self, result: anyhow::Result<Vec<Renderable>>) {
        finish(&mut self.state, self.source.name(), result);
    }

    /// Loads the model's assets. A failure is kept in [`Self::state`] rather
    /// than returned.
    pub async fn load(&mut self, assets: &AssetSource, textures: &mut dyn TextureFactory) {
        let result = load_renderables(&self.source, assets, textures).await;
        self.finish_loading(result);
    }

    pub fn render(&self, backend: &mut dyn RenderBackend, shader: &dyn ShaderProgram) {
        draw_if_ready(&self.state, &self.transform.world_matrix(), backend, shader);
    }
}

/// A first-person item held in front of the camera.
///
/// `transform` is relative to the camera placement last passed to
/// [`ViewModel::follow`] (identity before the first call).
#[derive(Debug)]
pub struct ViewModel {
    source: ModelSource,
    pub transform: TransformComponent,
    anchor: Matrix4<f32>,
    state: LoadState<Vec<Renderable>>,
}

impl ViewModel {
    pub fn new(source: ModelSource, offset: impl Into<Vector3<f32>>) -> Self {
        Self {
            source,
            transform: TransformComponent::new(offset),
            anchor: Matrix4::identity(),
            state: LoadState::Loading,
        }
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn state(&self) -> &LoadState<Vec<Renderable>> {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    /// `camera_placement × local`.
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.transform.relative_to(&self.anchor)
    }

    pub fn follow(&mut self, camera_placement: &Matrix4<f32>) {
        self.anchor = *camera_placement;
    }

    pub fn finish_loading(&mut self, result: anyhow::Result<Vec<Renderable>>) {
        finish(&mut self.state, self.source.name(), result);
    }

    pub async fn load(&mut self, assets: &AssetSource, textures: &mut dyn TextureFactory) {
        let result = load_renderables(&self.source, assets, textures).await;
        self.finish_loading(result);
    }

    pub fn render(&self, backend: &mut dyn RenderBackend, shader: &dyn ShaderProgram) {
        draw_if_ready(&self.state, &self.world_matrix(), backend, shader);
    }
}
