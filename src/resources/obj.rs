//! Wavefront OBJ geometry parser.
//!
//! Only geometry is read: `v`, `vn`, `vt` and `f`. Everything else (groups,
//! `usemtl`, smoothing, ...) is ignored. Faces are fan-triangulated from their
//! first corner, which assumes convex, planar polygons.
//!
//! Corners that share the same `(position, uv, normal)` reference share one
//! emitted vertex. Malformed input is handled best effort: a bad attribute line
//! keeps its slot so later indices stay valid, and a face that cannot be
//! resolved is skipped with a warning.

use std::collections::HashMap;

use crate::data_structures::mesh::{IndexedMesh, VertexLayout};

const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];
const DEFAULT_UV: [f32; 2] = [0.0, 0.0];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Parses `text` into the position/normal/uv layout.
pub fn parse_obj(text: &str) -> IndexedMesh {
    ObjParser::default().parse("obj", text)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ObjParser {
    layout: VertexLayout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct VertexKey {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

#[derive(Default)]
struct ParseState {
    // `None` marks a line that could not be read.
    positions: Vec<Option<[f32; 3]>>,
    normals: Vec<Option<[f32; 3]>>,
    uvs: Vec<Option<[f32; 2]>>,
    vertices: Vec<f32>,
    indices: Vec<u32>,
    cache: HashMap<VertexKey, u32>,
}

impl ObjParser {
    pub fn new(layout: VertexLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn parse(&self, name: &str, text: &str) -> IndexedMesh {
        let mut state = ParseState::default();
        for (line_idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(directive) = parts.next() else {
                continue;
            };
            match directive {
                "v" => state.positions.push(self.read_floats(parts, line_idx)),
                "vn" => state.normals.push(self.read_floats(parts, line_idx)),
                // Image rows run top to bottom, OBJ uvs bottom to top.
                "vt" => {
                    let uv: Option<[f32; 2]> = self.read_floats(parts, line_idx);
                    state.uvs.push(uv.map(|[u, v]| [u, 1.0 - v]));
                }
                "f" => self.push_face(&mut state, parts, line_idx),
                _ => (),
            }
        }
        log::debug!(
            "Parsed {name}: {} vertices, {} triangles.",
            state.vertices.len() / self.layout.stride(),
            state.indices.len() / 3
        );
        IndexedMesh::interleaved(name, self.layout, state.vertices, state.indices)
    }

    fn read_floats<'a, const N: usize>(
        &self,
        mut parts: impl Iterator<Item = &'a str>,
        line_idx: usize,
    ) -> Option<[f32; N]> {
        let mut values = [0.0; N];
        for value in values.iter_mut() {
            match parts.next().and_then(|p| p.parse::<f32>().ok()) {
                Some(v) if !v.is_nan() => *value = v,
                _ => {
                    log::warn!("Line {}: expected {N} numbers, the entry is ignored.", line_idx + 1);
                    return None;
                }
            }
        }
        Some(values)
    }

    fn push_face<'a>(
        &self,
        state: &mut ParseState,
        corners: impl Iterator<Item = &'a str>,
        line_idx: usize,
    ) {
        let mut keys = Vec::new();
        for corner in corners {
            let mut refs = corner.split('/');
            let position = resolve_index(refs.next(), state.positions.len())
                .filter(|&i| state.positions[i].is_some());
            let uv = resolve_index(refs.next(), state.uvs.len()).filter(|&i| state.uvs[i].is_some());
            let normal =
                resolve_index(refs.next(), state.normals.len()).filter(|&i| state.normals[i].is_some());
            let Some(position) = position else {
                log::warn!(
                    "Line {}: face corner `{corner}` has no valid position, skipping the face.",
                    line_idx + 1
                );
                return;
            };
            keys.push(VertexKey {
                position,
                uv,
                normal,
            });
        }
        if keys.len() < 3 {
            log::warn!("Line {}: face has fewer than 3 corners, skipping it.", line_idx + 1);
            return;
        }

        let corners: Vec<u32> = keys.into_iter().map(|key| self.vertex_index(state, key)).collect();
        for i in 1..corners.len() - 1 {
            state
                .indices
                .extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
        }
    }

    fn vertex_index(&self, state: &mut ParseState, key: VertexKey) -> u32 {
        if let Some(&index) = state.cache.get(&key) {
            return index;
        }
        let index = (state.vertices.len() / self.layout.stride()) as u32;
        let position = state.positions[key.position].unwrap_or_default();
        let normal = key
            .normal
            .and_then(|i| state.normals[i])
            .unwrap_or(DEFAULT_NORMAL);
        let uv = key.uv.and_then(|i| state.uvs[i]).unwrap_or(DEFAULT_UV);

        state.vertices.extend_from_slice(&position);
        state.vertices.extend_from_slice(&normal);
        if self.layout == VertexLayout::PositionNormalColorUv {
            state.vertices.extend_from_slice(&WHITE);
        }
        state.vertices.extend_from_slice(&uv);
        state.cache.insert(key, index);
        index
    }
}

/// Resolves a 1-based or negative (relative to the end) OBJ index against a
/// list that currently holds `len` entries.
fn resolve_index(raw: Option<&str>, len: usize) -> Option<usize> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let index: i64 = raw.parse().ok()?;
    let resolved = match index {
        0 => return None,
        i if i > 0 => i - 1,
        i => len as i64 + i,
    };
    (0..len as i64)
        .contains(&resolved)
        .then_some(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_positive_and_negative_indices() {
        assert_eq!(resolve_index(Some("1"), 4), Some(0));
        assert_eq!(resolve_index(Some("4"), 4), Some(3));
        assert_eq!(resolve_index(Some("-1"), 4), Some(3));
        assert_eq!(resolve_index(Some("-4"), 4), Some(0));
    }

    #[test]
    fn rejects_missing_zero_and_out_of_range() {
        assert_eq!(resolve_index(None, 4), None);
        assert_eq!(resolve_index(Some(""), 4), None);
        assert_eq!(resolve_index(Some("0"), 4), None);
        assert_eq!(resolve_index(Some("5"), 4), None);
        assert_eq!(resolve_index(Some("-5"), 4), None);
        assert_eq!(resolve_index(Some("x"), 4), None);
    }
}
