// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the flattened mesh handed to the graphics device layer.

use super::{BoundingBox, Vertex};
use strata_core::asset::Asset;

/// A flattened triangle-list mesh.
///
/// The mesh keeps three views in sync: the interleaved [`Vertex`] buffer, a flat
/// `[x, y, z, x, y, z, ..]` position mirror used by bounding and export paths,
/// and the [`BoundingBox`]. Every mutation of vertex data goes through
/// [`Mesh::set_geometry`], which rebuilds the other two.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    positions: Vec<f32>,
    textures_path: String,
    bounding_box: BoundingBox,
}

impl Asset for Mesh {}

impl Mesh {
    /// Creates a mesh and computes its position mirror and bounds.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, textures_path: impl Into<String>) -> Self {
        let mut mesh = Self {
            textures_path: textures_path.into(),
            ..Self::default()
        };
        mesh.set_geometry(vertices, indices);
        mesh
    }

    /// Rebuilds a mesh from persisted buffers.
    ///
    /// The stored box corners are not trusted: bounds are recomputed from the
    /// decoded vertices so culling never runs on stale data.
    pub(crate) fn from_persisted(
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures_path: String,
    ) -> Self {
        let mut mesh = Self {
            textures_path,
            ..Self::default()
        };
        mesh.set_geometry(vertices, indices);
        mesh
    }

    /// Replaces the vertex and index buffers, then recomputes derived data.
    pub fn set_geometry(&mut self, vertices: Vec<Vertex>, indices: Vec<u32>) {
        self.positions = Self::mirror_positions(&vertices);
        self.bounding_box = BoundingBox::from_vertices(&vertices);
        self.vertices = vertices;
        self.indices = indices;
    }

    /// Sets the texture path referenced by this mesh.
    pub fn set_textures_path(&mut self, path: impl Into<String>) {
        self.textures_path = path.into();
    }

    /// Clears every buffer. The bounding box becomes the invalid empty box.
    pub fn release(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.positions.clear();
        self.bounding_box = BoundingBox::EMPTY;
    }

    fn mirror_positions(vertices: &[Vertex]) -> Vec<f32> {
        vertices.iter().flat_map(|v| v.position.to_array()).collect()
    }

    /// The interleaved vertex buffer.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The triangle-list index buffer.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The flat position mirror, three floats per vertex.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// The texture path this mesh samples, empty when none was resolved.
    pub fn textures_path(&self) -> &str {
        &self.textures_path
    }

    /// The bounds of the current vertex data.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    /// Number of vertices in the vertex buffer.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of complete triangles in the index buffer.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// The vertex buffer as raw bytes, ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The index buffer as raw bytes, ready for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
