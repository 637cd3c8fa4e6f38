//! glTF scene assets into load-time [`SceneNode`] trees.

use std::{collections::HashMap, sync::Arc};

use base64::{Engine, prelude::BASE64_STANDARD};
use cgmath::{Matrix4, Quaternion, Vector3};
use image::ImageFormat;

use crate::{
    config::{AssetSource, sibling_path},
    data_structures::{
        material::{Material, NormalMap, OrmMap},
        mesh::{AttributeBuffer, AttributeSemantic},
        scene_graph::{LocalTransform, Primitive, SceneNode},
    },
    error::LoadError,
    render::TextureHandle,
    resources::{
        load_binary,
        texture::{TextureFactory, color_factor_to_srgb, solid_color_texture, texture_from_bytes},
    },
};

const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Reads the glTF (or glb) file `file_name` and returns the root nodes of its
/// default scene, or of its first scene when none is marked as default.
pub async fn load_scene_gltf(
    file_name: &str,
    assets: &AssetSource,
    textures: &mut dyn TextureFactory,
) -> anyhow::Result<Vec<SceneNode>> {
    let bytes = load_binary(file_name, assets).await?;
    let gltf = gltf::Gltf::from_slice(&bytes).map_err(|source| LoadError::Gltf {
        path: file_name.to_string(),
        source,
    })?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        let (data, path) = match buffer.source() {
            gltf::buffer::Source::Bin => (gltf.blob.clone(), file_name.to_string()),
            gltf::buffer::Source::Uri(uri) => match load_uri(file_name, uri, assets).await? {
                UriData::Embedded(data) => (Some(data), file_name.to_string()),
                UriData::External { data, path } => (Some(data), path),
            },
        };
        let data = data.ok_or_else(|| LoadError::MissingBuffer {
            path: file_name.to_string(),
            index: buffer.index(),
        })?;
        if data.len() < buffer.length() {
            return Err(LoadError::TruncatedBuffer {
                path,
                index: buffer.index(),
                expected: buffer.length(),
                actual: data.len(),
            }
            .into());
        }
        buffer_data.push(data);
    }

    // Load materials
    let mut images = ImageCache::new(file_name, &buffer_data);
    let mut materials = HashMap::new();
    for material in gltf.materials() {
        let Some(index) = material.index() else {
            continue;
        };
        let material = load_material(&material, &mut images, assets, textures).await?;
        materials.insert(index, Arc::new(material));
    }

    let default_material = Arc::new(Material::new(
        "default",
        solid_color_texture(WHITE, "default material", false, textures),
    ));
    let converter = NodeConverter {
        file_name,
        buffer_data: &buffer_data,
        materials: &materials,
        default_material,
    };

    let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) else {
        log::warn!("{file_name} contains no scene.");
        return Ok(Vec::new());
    };
    Ok(scene.nodes().map(|node| converter.convert(&node)).collect())
}

async fn load_material(
    material: &gltf::Material<'_>,
    images: &mut ImageCache<'_>,
    assets: &AssetSource,
    textures: &mut dyn TextureFactory,
) -> anyhow::Result<Material> {
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}#{}", images.file_name, material.index().unwrap_or_default()));
    let pbr = material.pbr_metallic_roughness();

    let color = match pbr.base_color_texture() {
        Some(info) => images.get(&info.texture().source(), false, assets, textures).await?,
        None => solid_color_texture(
            color_factor_to_srgb(pbr.base_color_factor()),
            &name,
            false,
            textures,
        ),
    };

    let mut normal = None;
    if let Some(info) = material.normal_texture() {
        match images.get(&info.texture().source(), true, assets, textures).await {
            Ok(texture) => {
                normal = Some(NormalMap {
                    texture,
                    scale: info.scale(),
                })
            }
            Err(e) => log::warn!("Normal map of material {name} unavailable, skipping it: {e}"),
        }
    }

    let mut orm = None;
    if let Some(info) = pbr.metallic_roughness_texture() {
        match images.get(&info.texture().source(), false, assets, textures).await {
            Ok(texture) => {
                orm = Some(OrmMap {
                    texture,
                    roughness_factor: pbr.roughness_factor(),
                    metalness_factor: pbr.metallic_factor(),
                })
            }
            Err(e) => log::warn!("Metallic-roughness map of material {name} unavailable, skipping it: {e}"),
        }
    }

    Ok(Material::new(&name, color)
        .with_normal_map(normal)
        .with_orm_map(orm))
}

/// Uploads every image at most once per colour space.
struct ImageCache<'a> {
    file_name: &'a str,
    buffer_data: &'a [Vec<u8>],
    uploaded: HashMap<(usize, bool), TextureHandle>,
}

impl<'a> ImageCache<'a> {
    fn new(file_name: &'a str, buffer_data: &'a [Vec<u8>]) -> Self {
        Self {
            file_name,
            buffer_data,
            uploaded: HashMap::new(),
        }
    }

    async fn get(
        &mut self,
        image: &gltf::Image<'_>,
        is_normal_map: bool,
        assets: &AssetSource,
        textures: &mut dyn TextureFactory,
    ) -> Result<TextureHandle, LoadError> {
        let key = (image.index(), is_normal_map);
        if let Some(&texture) = self.uploaded.get(&key) {
            return Ok(texture);
        }
        let texture = match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                let label = format!("{}#image{}", self.file_name, image.index());
                let bytes = self
                    .buffer_data
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(view.offset()..view.offset() + view.length()))
                    .ok_or_else(|| LoadError::MissingBuffer {
                        path: self.file_name.to_string(),
                        index: view.buffer().index(),
                    })?;
                texture_from_bytes(
                    bytes,
                    &label,
                    ImageFormat::from_mime_type(mime_type),
                    is_normal_map,
                    textures,
                )?
            }
            gltf::image::Source::Uri { uri, mime_type } => {
                let format = mime_type.and_then(ImageFormat::from_mime_type);
                match load_uri(self.file_name, uri, assets).await? {
                    UriData::Embedded(bytes) => {
                        let label = format!("{}#image{}", self.file_name, image.index());
                        texture_from_bytes(&bytes, &label, format, is_normal_map, textures)?
                    }
                    UriData::External { data, path } => {
                        texture_from_bytes(&data, &path, format, is_normal_map, textures)?
                    }
                }
            }
        };
        self.uploaded.insert(key, texture);
        Ok(texture)
    }
}

enum UriData {
    /// Decoded from a `data:` URI.
    Embedded(Vec<u8>),
    /// Fetched from `path`, next to the scene file.
    External { data: Vec<u8>, path: String },
}

async fn load_uri(file_name: &str, uri: &str, assets: &AssetSource) -> Result<UriData, LoadError> {
    if let Some(rest) = uri.strip_prefix("data:") {
        return decode_data_uri(file_name, rest).map(UriData::Embedded);
    }
    let decoded = urlencoding::decode(uri).map_err(|e| LoadError::Fetch {
        path: sibling_path(file_name, uri),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
    })?;
    let path = sibling_path(file_name, &decoded);
    let data = load_binary(&path, assets).await?;
    Ok(UriData::External { data, path })
}

/// Payload of a `data:[<media type>][;base64],<data>` URI.
fn decode_data_uri(file_name: &str, rest: &str) -> Result<Vec<u8>, LoadError> {
    let malformed = |reason: String| LoadError::DataUri {
        path: file_name.to_string(),
        reason,
    };
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| malformed("no ',' before the payload".to_string()))?;
    if header.ends_with(";base64") {
        BASE64_STANDARD.decode(payload).map_err(|e| malformed(e.to_string()))
    } else {
        Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned())
    }
}

struct NodeConverter<'a> {
    file_name: &'a str,
    buffer_data: &'a [Vec<u8>],
    materials: &'a HashMap<usize, Arc<Material>>,
    default_material: Arc<Material>,
}

impl NodeConverter<'_> {
    fn convert(&self, node: &gltf::Node<'_>) -> SceneNode {
        let mut scene_node = SceneNode::new(local_transform(node.transform()));
        scene_node.name = node.name().map(str::to_string);
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if let Some(primitive) = self.convert_primitive(&mesh, &primitive) {
                    scene_node.primitives.push(primitive);
                }
            }
        }
        for child in node.children() {
            scene_node.children.push(self.convert(&child));
        }
        scene_node
    }

    fn convert_primitive(&self, mesh: &gltf::Mesh<'_>, primitive: &gltf::Primitive<'_>) -> Option<Primitive> {
        let name = format!(
            "{}/{}#{}",
            self.file_name,
            mesh.name().unwrap_or("mesh"),
            primitive.index()
        );
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("{name}: only triangle lists are supported, got {:?}.", primitive.mode());
            return None;
        }

        let reader = primitive.reader(|buffer| self.buffer_data.get(buffer.index()).map(Vec::as_slice));
        let Some(positions) = reader.read_positions() else {
            log::warn!("{name}: primitive has no positions, skipping it.");
            return None;
        };

        let mut attributes = vec![AttributeBuffer::new(
            AttributeSemantic::Position,
            3,
            positions.flatten().collect(),
        )];
        if let Some(normals) = reader.read_normals() {
            attributes.push(AttributeBuffer::new(AttributeSemantic::Normal, 3, normals.flatten().collect()));
        }
        if let Some(uvs) = reader.read_tex_coords(0) {
            attributes.push(AttributeBuffer::new(
                AttributeSemantic::TexCoord,
                2,
                uvs.into_f32().flatten().collect(),
            ));
        }
        if let Some(tangents) = reader.read_tangents() {
            attributes.push(AttributeBuffer::new(AttributeSemantic::Tangent, 4, tangents.flatten().collect()));
        }
        let indices = reader.read_indices().map(|indices| indices.into_u32().collect());

        let material = primitive
            .material()
            .index()
            .and_then(|index| self.materials.get(&index))
            .cloned()
            .unwrap_or_else(|| self.default_material.clone());

        Some(Primitive {
            name,
            attributes,
            indices,
            material,
        })
    }
}

fn local_transform(transform: gltf::scene::Transform) -> LocalTransform {
    match transform {
        gltf::scene::Transform::Matrix { matrix } => LocalTransform::Matrix(Matrix4::from(matrix)),
        gltf::scene::Transform::Decomposed {
            translation,
            rotation: [x, y, z, w],
            scale,
        } => LocalTransform::Trs {
            translation: Vector3::from(translation),
            rotation: Quaternion::new(w, x, y, z),
            scale: Vector3::from(scale),
        },
    }
}
