use std::mem;

use wgpu::util::DeviceExt;

use crate::data_structures::mesh::{AttributeSemantic, IndexedMesh, VertexData, VertexLayout};

/// `@location` each attribute is bound to in the WGSL shaders.
pub fn shader_location(semantic: AttributeSemantic) -> wgpu::ShaderLocation {
    match semantic {
        AttributeSemantic::Position => 0,
        AttributeSemantic::Normal => 1,
        AttributeSemantic::TexCoord => 2,
        AttributeSemantic::Color => 3,
        AttributeSemantic::Tangent => 4,
    }
}

fn float_format(components: usize) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

static POSITION_NORMAL_UV: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

static POSITION_NORMAL_COLOR_UV: [wgpu::VertexAttribute; 4] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 3 => Float32x3, 2 => Float32x2];

impl VertexLayout {
    pub fn desc(self) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: (self.stride() * mem::size_of::<f32>()) as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: match self {
                VertexLayout::PositionNormalUv => &POSITION_NORMAL_UV,
                VertexLayout::PositionNormalColorUv => &POSITION_NORMAL_COLOR_UV,
            },
        }
    }
}

/// An [`IndexedMesh`] uploaded to vertex and index buffers.
///
/// Interleaved meshes occupy a single vertex buffer, meshes with separate
/// attributes one buffer per attribute (in the mesh's attribute order).
#[derive(Debug)]
pub struct GpuMesh {
    pub name: String,
    pub vertex_buffers: Vec<wgpu::Buffer>,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    array_strides: Vec<wgpu::BufferAddress>,
    attributes: Vec<Vec<wgpu::VertexAttribute>>,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, mesh: &IndexedMesh, label: &str) -> Self {
        let mut vertex_buffers = Vec::new();
        let mut array_strides = Vec::new();
        let mut attributes = Vec::new();

        let mut push_buffer = |data: &[f32], stride: usize, attrs: Vec<wgpu::VertexAttribute>| {
            vertex_buffers.push(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Vertex Buffer {}", label, vertex_buffers.len())),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            }));
            array_strides.push((stride * mem::size_of::<f32>()) as wgpu::BufferAddress);
            attributes.push(attrs);
        };

        match mesh.vertex_data() {
            VertexData::Interleaved { layout, data } => {
                push_buffer(data, layout.stride(), layout.desc().attributes.to_vec());
            }
            VertexData::Separate(buffers) => {
                for buffer in buffers {
                    let Some(format) = float_format(buffer.components) else {
                        log::warn!(
                            "{label}: {:?} has {} components per vertex, leaving it out.",
                            buffer.semantic,
                            buffer.components
                        );
                        continue;
                    };
                    let attribute = wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: shader_location(buffer.semantic),
                        format,
                    };
                    push_buffer(&buffer.data, buffer.components, vec![attribute]);
                }
            }
        }

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", label)),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: mesh.name().to_string(),
            vertex_buffers,
            index_buffer,
            num_elements: mesh.index_count() as u32,
            array_strides,
            attributes,
        }
    }

    /// Layouts of [`Self::vertex_buffers`], in the same order.
    pub fn buffer_layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.array_strides
            .iter()
            .zip(&self.attributes)
            .map(|(&array_stride, attributes)| wgpu::VertexBufferLayout {
                array_stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            })
            .collect()
    }

    /// Binds the buffers and issues the indexed draw.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        for (slot, buffer) in self.vertex_buffers.iter().enumerate() {
            render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
        }
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.num_elements, 0, 0..1);
    }
}
