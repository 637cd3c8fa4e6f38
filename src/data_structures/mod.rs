//! Scene data structures.
//!
//! - `mesh` holds indexed triangle geometry and its attribute layouts
//! - `material` holds materials and the texture-unit binding protocol
//! - `scene_graph` turns a load-time node tree into flat renderables
//! - `entity` holds placeable models and their load state
//! - `texture` uploads decoded images to the GPU

pub mod entity;
pub mod material;
pub mod mesh;
pub mod scene_graph;
pub mod texture;
