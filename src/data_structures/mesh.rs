//! Indexed triangle-list geometry.
//!
//! An [`IndexedMesh`] either stores interleaved vertices in one of the fixed
//! [`VertexLayout`]s (what the OBJ parser emits) or one buffer per attribute
//! (what scene assets provide). It never changes after construction.

use crate::render::ShaderProgram;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    Position,
    Normal,
    Color,
    TexCoord,
    Tangent,
}

impl AttributeSemantic {
    /// Name of the matching vertex input in the shaders.
    pub fn shader_name(self) -> &'static str {
        match self {
            AttributeSemantic::Position => "aPos",
            AttributeSemantic::Normal => "aNormal",
            AttributeSemantic::Color => "aColor",
            AttributeSemantic::TexCoord => "aTexCoord",
            AttributeSemantic::Tangent => "aTangent",
        }
    }
}

/// Interleaved vertex layouts, in float order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    /// position (3), normal (3), uv (2)
    #[default]
    PositionNormalUv,
    /// position (3), normal (3), color (3), uv (2)
    PositionNormalColorUv,
}

impl VertexLayout {
    /// Floats per vertex.
    pub const fn stride(self) -> usize {
        match self {
            VertexLayout::PositionNormalUv => 8,
            VertexLayout::PositionNormalColorUv => 11,
        }
    }

    /// `(semantic, offset in floats, component count)` for every attribute.
    pub fn attributes(self) -> &'static [(AttributeSemantic, usize, usize)] {
        match self {
            VertexLayout::PositionNormalUv => &[
                (AttributeSemantic::Position, 0, 3),
                (AttributeSemantic::Normal, 3, 3),
                (AttributeSemantic::TexCoord, 6, 2),
            ],
            VertexLayout::PositionNormalColorUv => &[
                (AttributeSemantic::Position, 0, 3),
                (AttributeSemantic::Normal, 3, 3),
                (AttributeSemantic::Color, 6, 3),
                (AttributeSemantic::TexCoord, 9, 2),
            ],
        }
    }
}

/// One vertex attribute stored on its own.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeBuffer {
    pub semantic: AttributeSemantic,
    /// Floats per vertex, e.g. 2 for uvs or 4 for tangents.
    pub components: usize,
    pub data: Vec<f32>,
}

impl AttributeBuffer {
    pub fn new(semantic: AttributeSemantic, components: usize, data: Vec<f32>) -> Self {
        Self {
            semantic,
            components,
            data,
        }
    }

    pub fn vertex_count(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.data.len() / self.components
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum VertexData {
    Interleaved { layout: VertexLayout, data: Vec<f32> },
    Separate(Vec<AttributeBuffer>),
}

/// Where the shader finds one attribute. Offsets and strides are in floats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeBinding {
    pub slot: u32,
    pub semantic: AttributeSemantic,
    /// Index into the mesh's vertex buffers (always 0 for interleaved data).
    pub buffer: usize,
    pub components: usize,
    pub stride: usize,
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexedMesh {
    name: String,
    vertices: VertexData,
    indices: Vec<u32>,
}

impl IndexedMesh {
    pub fn interleaved(
        name: impl Into<String>,
        layout: VertexLayout,
        data: Vec<f32>,
        indices: Vec<u32>,
    ) -> Self {
        Self {
            name: name.into(),
            vertices: VertexData::Interleaved { layout, data },
            indices,
        }
    }

    /// Without an index list the attributes are drawn as a plain triangle list.
    pub fn from_attributes(
        name: impl Into<String>,
        attributes: Vec<AttributeBuffer>,
        indices: Option<Vec<u32>>,
    ) -> Self {
        let mut mesh = Self {
            name: name.into(),
            vertices: VertexData::Separate(attributes),
            indices: Vec::new(),
        };
        mesh.indices = match indices {
            Some(indices) => indices,
            None => (0..mesh.vertex_count() as u32).collect(),
        };
        mesh
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_data(&self) -> &VertexData {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        match &self.vertices {
            VertexData::Interleaved { layout, data } => data.len() / layout.stride(),
            VertexData::Separate(buffers) => buffers
                .iter()
                .find(|b| b.semantic == AttributeSemantic::Position)
                .or(buffers.first())
                .map_or(0, AttributeBuffer::vertex_count),
        }
    }

    pub fn attribute(&self, semantic: AttributeSemantic) -> Option<&AttributeBuffer> {
        match &self.vertices {
            VertexData::Separate(buffers) => buffers.iter().find(|b| b.semantic == semantic),
            VertexData::Interleaved { .. } => None,
        }
    }

    /// Floats of vertex `index`, in the mesh's interleaved layout.
    pub fn vertex(&self, index: usize) -> Option<&[f32]> {
        match &self.vertices {
            VertexData::Interleaved { layout, data } => {
                let stride = layout.stride();
                data.get(index * stride..(index + 1) * stride)
            }
            VertexData::Separate(_) => None,
        }
    }

    /// Resolves every attribute the shader consumes. Attributes the shader
    /// doesn't declare are left out.
    pub fn attribute_bindings(&self, shader: &dyn ShaderProgram) -> Vec<AttributeBinding> {
        match &self.vertices {
            VertexData::Interleaved { layout, .. } => layout
                .attributes()
                .iter()
                .filter_map(|&(semantic, offset, components)| {
                    shader
                        .attribute_slot(semantic.shader_name())
                        .map(|slot| AttributeBinding {
                            slot,
                            semantic,
                            buffer: 0,
                            components,
                            stride: layout.stride(),
                            offset,
                        })
                })
                .collect(),
            VertexData::Separate(buffers) => buffers
                .iter()
                .enumerate()
                .filter_map(|(buffer, attribute)| {
                    shader
                        .attribute_slot(attribute.semantic.shader_name())
                        .map(|slot| AttributeBinding {
                            slot,
                            semantic: attribute.semantic,
                            buffer,
                            components: attribute.components,
                            stride: attribute.components,
                            offset: 0,
                        })
                })
                .collect(),
        }
    }
}
