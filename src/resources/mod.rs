use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix};

use crate::{
    config::AssetSource,
    data_structures::{
        material::{Material, NormalMap, OrmMap},
        scene_graph::{Renderable, build_renderables},
    },
    error::LoadError,
    resources::texture::{TextureFactory, texture_from_bytes},
};

/**
 * This module contains all logic for loading meshes, scenes and textures from external files.
 */
pub mod mesh;
pub mod obj;
pub mod scene;
pub mod texture;

/// What a model is loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelSource {
    /// A folder `objects/<name>/` holding `model.obj`, `color.png` and
    /// optionally `normal.png` and `orm.png`.
    Obj(String),
    /// A `.gltf`/`.glb` scene asset.
    Gltf(String),
}

impl ModelSource {
    pub fn name(&self) -> &str {
        match self {
            ModelSource::Obj(name) | ModelSource::Gltf(name) => name,
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str, assets: &AssetSource) -> Result<reqwest::Url, LoadError> {
    let fetch_error = |reason: String| LoadError::Fetch {
        path: file_name.to_string(),
        source: std::io::Error::other(reason),
    };
    let window = web_sys::window().ok_or_else(|| fetch_error("no window".to_string()))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| fetch_error("no page origin".to_string()))?;
    let root = assets.root().to_string_lossy();
    let root = root.trim_start_matches("./").trim_matches('/');
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, root))
        .map_err(|e| fetch_error(e.to_string()))?;
    base.join(file_name).map_err(|e| fetch_error(e.to_string()))
}

pub async fn load_string(file_name: &str, assets: &AssetSource) -> Result<String, LoadError> {
    let data = load_binary(file_name, assets).await?;
    String::from_utf8(data).map_err(|e| LoadError::Fetch {
        path: file_name.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}

pub async fn load_binary(file_name: &str, assets: &AssetSource) -> Result<Vec<u8>, LoadError> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name, assets)?;
        let fetch_error = |e: reqwest::Error| LoadError::Fetch {
            path: file_name.to_string(),
            source: std::io::Error::other(e),
        };
        let response = reqwest::get(url)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;
        response.bytes().await.map_err(fetch_error)?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(assets.resolve(file_name))
        .await
        .map_err(|source| LoadError::Fetch {
            path: file_name.to_string(),
            source,
        })?;

    Ok(data)
}

/// Loads whatever `source` points at into renderables relative to the model's origin.
pub async fn load_renderables(
    source: &ModelSource,
    assets: &AssetSource,
    textures: &mut dyn TextureFactory,
) -> anyhow::Result<Vec<Renderable>> {
    match source {
        ModelSource::Obj(name) => load_model_obj(name, assets, textures).await,
        ModelSource::Gltf(file_name) => {
            let roots = scene::load_scene_gltf(file_name, assets, textures).await?;
            Ok(build_renderables(roots))
        }
    }
}

/// Loads an OBJ model folder. The geometry and colour map are required; the
/// normal and ORM maps are optional and only logged when missing.
pub async fn load_model_obj(
    name: &str,
    assets: &AssetSource,
    textures: &mut dyn TextureFactory,
) -> anyhow::Result<Vec<Renderable>> {
    let folder = format!("objects/{name}");
    let model_file = format!("{folder}/model.obj");
    let color_file = format!("{folder}/color.png");
    let normal_file = format!("{folder}/normal.png");
    let orm_file = format!("{folder}/orm.png");

    // Fetch everything at once, decode afterwards.
    let (obj_text, color, normal, orm) = futures::join!(
        load_string(&model_file, assets),
        load_binary(&color_file, assets),
        load_binary(&normal_file, assets),
        load_binary(&orm_file, assets),
    );

    let mesh = obj::ObjParser::default().parse(&model_file, &obj_text?);
    let color = texture_from_bytes(&color?, &color_file, None, false, textures)?;

    let normal = optional_texture(normal, &normal_file, true, textures, name).map(|texture| NormalMap {
        texture,
        scale: 1.0,
    });
    let orm = optional_texture(orm, &orm_file, false, textures, name).map(|texture| OrmMap {
        texture,
        roughness_factor: 1.0,
        metalness_factor: 1.0,
    });

    let material = Material::new(name, color)
        .with_normal_map(normal)
        .with_orm_map(orm);

    Ok(vec![Renderable::new(
        Arc::new(mesh),
        Arc::new(material),
        Matrix4::identity(),
    )])
}

fn optional_texture(
    fetched: Result<Vec<u8>, LoadError>,
    file_name: &str,
    is_normal_map: bool,
    textures: &mut dyn TextureFactory,
    model_name: &str,
) -> Option<crate::render::TextureHandle> {
    let texture = fetched.and_then(|bytes| texture_from_bytes(&bytes, file_name, None, is_normal_map, textures));
    match texture {
        Ok(texture) => Some(texture),
        Err(e) => {
            log::warn!("Optional map {file_name} for {model_name} unavailable, skipping it: {e}");
            None
        }
    }
}
