//! vista-ngin
//!
//! The asset-ingestion and composition core of a small real-time 3D viewer.
//! It turns OBJ and glTF assets into indexed geometry and flat lists of
//! renderables with baked placement matrices, and provides the transform and
//! first-person camera math that feeds the world, view and projection matrices.
//!
//! High-level modules
//! - `camera`: first-person camera, projection, controller and GPU uniform
//! - `config`: engine, camera and asset-root configuration
//! - `context`: the per-frame scene context (camera + entities)
//! - `data_structures`: meshes, materials, scene graph, entities, GPU textures
//! - `error`: typed asset loading failures
//! - `input`: per-frame input state fed from winit events
//! - `render`: contracts with the shader and draw-call layer
//! - `resources`: asset fetching, OBJ parsing, glTF scene loading
//! - `transform`: position/rotation/scale shared by every placeable entity
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod input;
pub mod render;
pub mod resources;
pub mod transform;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
pub use winit::keyboard::KeyCode;

/// Installs the logging backend: `env_logger` natively, the browser console
/// on wasm32. Safe to call more than once.
pub fn init_logger() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {e}").into());
        }
    }
}
