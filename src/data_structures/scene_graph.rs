//! Load-time scene graph and its flattening into renderables.
//!
//! A scene asset arrives as a tree of [`SceneNode`]s. The tree only lives for
//! the duration of a load: [`build_renderables`] walks it depth first,
//! accumulating each node's local matrix onto its parent's, and emits one
//! [`Renderable`] per mesh primitive with the accumulated matrix baked in.

use std::sync::Arc;

use cgmath::{Matrix4, Quaternion, Rad, SquareMatrix, Vector3};

use crate::data_structures::{
    material::Material,
    mesh::{AttributeBuffer, IndexedMesh},
};

/// A node's transform relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocalTransform {
    Matrix(Matrix4<f32>),
    Trs {
        translation: Vector3<f32>,
        rotation: Quaternion<f32>,
        scale: Vector3<f32>,
    },
}

impl LocalTransform {
    /// `T · Rx(pitch) · Ry(yaw) · Rz(roll) · S`, composed up front.
    pub fn from_euler(
        translation: Vector3<f32>,
        pitch: f32,
        yaw: f32,
        roll: f32,
        scale: Vector3<f32>,
    ) -> Self {
        LocalTransform::Matrix(
            Matrix4::from_translation(translation)
                * Matrix4::from_angle_x(Rad(pitch))
                * Matrix4::from_angle_y(Rad(yaw))
                * Matrix4::from_angle_z(Rad(roll))
                * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z),
        )
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        match self {
            LocalTransform::Matrix(matrix) => *matrix,
            LocalTransform::Trs {
                translation,
                rotation,
                scale,
            } => {
                Matrix4::from_translation(*translation)
                    * Matrix4::from(*rotation)
                    * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
            }
        }
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        LocalTransform::Matrix(Matrix4::identity())
    }
}

/// Geometry of one draw call plus the material it is drawn with.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub name: String,
    pub attributes: Vec<AttributeBuffer>,
    /// `None` draws the attributes as a plain triangle list.
    pub indices: Option<Vec<u32>>,
    pub material: Arc<Material>,
}

#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    pub name: Option<String>,
    pub local: LocalTransform,
    pub primitives: Vec<Primitive>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(local: LocalTransform) -> Self {
        Self {
            local,
            ..Default::default()
        }
    }

    pub fn with_primitive(mut self, primitive: Primitive) -> Self {
        self.primitives.push(primitive);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A mesh, its material and where it sits relative to its asset's root.
#[derive(Clone, Debug)]
pub struct Renderable {
    pub mesh: Arc<IndexedMesh>,
    pub material: Arc<Material>,
    /// Product of every ancestor's local matrix, baked at load time.
    pub model_space_matrix: Matrix4<f32>,
}

impl Renderable {
    pub fn new(mesh: Arc<IndexedMesh>, material: Arc<Material>, model_space_matrix: Matrix4<f32>) -> Self {
        Self {
            mesh,
            material,
            model_space_matrix,
        }
    }

    /// Matrix uploaded when the owning entity sits at `owner_world`.
    pub fn final_matrix(&self, owner_world: &Matrix4<f32>) -> Matrix4<f32> {
        owner_world * self.model_space_matrix
    }
}

/// Flattens `roots` into renderables in document order.
pub fn build_renderables(roots: Vec<SceneNode>) -> Vec<Renderable> {
    let mut renderables = Vec::new();
    for root in roots {
        visit(root, Matrix4::identity(), &mut renderables);
    }
    renderables
}

fn visit(node: SceneNode, parent: Matrix4<f32>, out: &mut Vec<Renderable>) {
    let node_matrix = parent * node.local.to_matrix();
    for primitive in node.primitives {
        let mesh = IndexedMesh::from_attributes(primitive.name, primitive.attributes, primitive.indices);
        out.push(Renderable::new(Arc::new(mesh), primitive.material, node_matrix));
    }
    for child in node.children {
        visit(child, node_matrix, out);
    }
}
