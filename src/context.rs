//! The scene state one frame loop works on.
//!
//! Camera, controller and entities are owned here and handed to the update and
//! render steps explicitly; nothing lives in module-level state.

use crate::{
    camera::{Camera, CameraController},
    config::EngineConfig,
    data_structures::{
        entity::{Model, ViewModel},
        material::Material,
    },
    input::InputState,
    render::{RenderBackend, ShaderProgram},
    resources::texture::TextureFactory,
};

#[derive(Debug)]
pub struct Context {
    pub config: EngineConfig,
    pub camera: Camera,
    pub controller: CameraController,
    pub models: Vec<Model>,
    pub view_model: Option<ViewModel>,
}

impl Context {
    pub fn new(config: EngineConfig, aspect: f32) -> Self {
        Self {
            camera: Camera::new(&config.camera, aspect),
            controller: CameraController::from_config(&config.camera),
            config,
            models: Vec::new(),
            view_model: None,
        }
    }

    pub fn add_model(&mut self, model: Model) -> &mut Model {
        self.models.push(model);
        let last = self.models.len() - 1;
        &mut self.models[last]
    }

    pub fn set_view_model(&mut self, view_model: ViewModel) {
        self.view_model = Some(view_model);
    }

    /// Loads every entity that is still loading, one after the other. Failed
    /// loads are logged and leave the entity unloaded.
    pub async fn load_all(&mut self, textures: &mut dyn TextureFactory) {
        let assets = &self.config.assets;
        for model in self.models.iter_mut().filter(|m| !m.is_loaded() && m.state().error().is_none()) {
            model.load(assets, textures).await;
        }
        if let Some(view_model) = self.view_model.as_mut().filter(|v| !v.is_loaded() && v.state().error().is_none()) {
            view_model.load(assets, textures).await;
        }
    }

    /// Applies this frame's input to the camera and re-anchors the view model.
    pub fn update(&mut self, input: &mut InputState) {
        self.controller.update_camera(&mut self.camera, input);
        if let Some(view_model) = self.view_model.as_mut() {
            view_model.follow(&self.camera.placement_matrix());
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera.resize(width, height);
        }
    }

    /// Assigns the fixed sampler units of a freshly linked program.
    pub fn prepare_shader(&self, backend: &mut dyn RenderBackend, shader: &dyn ShaderProgram) {
        Material::setup_sampler_slots(backend, shader);
    }

    pub fn render(&self, backend: &mut dyn RenderBackend, shader: &dyn ShaderProgram) {
        self.camera.bind(backend, shader);
        for model in &self.models {
            model.render(backend, shader);
        }
        if let Some(view_model) = &self.view_model {
            view_model.render(backend, shader);
        }
    }
}
