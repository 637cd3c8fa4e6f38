//! Engine configuration.
//!
//! Everything here has a sensible `Default`; [`EngineConfig::from_env`] only
//! relocates the asset root so the same binary can run against different
//! asset folders.

use std::{f32::consts::FRAC_PI_4, path::PathBuf};

use cgmath::{Rad, Vector3};

/// Environment variable that overrides the asset root.
pub const ASSET_ROOT_ENV: &str = "VISTA_ASSETS";

#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    pub assets: AssetSource,
    pub camera: CameraConfig,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let assets = match std::env::var(ASSET_ROOT_ENV) {
            Ok(root) if !root.is_empty() => AssetSource::new(root),
            _ => AssetSource::default(),
        };
        Self {
            assets,
            ..Default::default()
        }
    }
}

/// Where assets are fetched from.
///
/// On native targets `root` is a directory; on wasm32 it is a path prefix
/// joined against the page origin.
#[derive(Clone, Debug)]
pub struct AssetSource {
    root: PathBuf,
}

impl AssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn resolve(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }
}

impl Default for AssetSource {
    fn default() -> Self {
        Self::new("./assets")
    }
}

/// Returns `name` relative to the folder that contains `file_name`.
///
/// Used for resources referenced from inside another asset (e.g. a glTF
/// buffer next to its `.gltf`).
pub fn sibling_path(file_name: &str, name: &str) -> String {
    match file_name.rfind('/') {
        Some(idx) => format!("{}/{}", &file_name[..idx], name),
        None => name.to_string(),
    }
}

/// First-person camera tuning.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fov_y: Rad<f32>,
    pub near: f32,
    pub far: f32,
    pub start_position: Vector3<f32>,
    /// World units per frame while a movement key is held.
    pub move_speed: f32,
    /// Radians per frame while an arrow key is held.
    pub rotation_speed: f32,
    /// Radians per pixel of pointer movement.
    pub mouse_sensitivity: f32,
    /// Pitch stays within `±(π/2 - pitch_epsilon)`.
    pub pitch_epsilon: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y: Rad(FRAC_PI_4),
            near: 0.1,
            far: 1000.0,
            start_position: Vector3::new(0.0, 0.0, 0.0),
            move_speed: 0.05,
            rotation_speed: 0.01,
            mouse_sensitivity: 0.002,
            pitch_epsilon: 0.01,
        }
    }
}
