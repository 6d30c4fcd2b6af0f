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

//! Defines the interleaved vertex record uploaded to the GPU.

use std::mem::{offset_of, size_of};
use strata_core::math::{Vec2, Vec3, Vec4};

/// The number of bone influences a single vertex can carry.
pub const MAX_BONE_INFLUENCES: usize = 4;

/// The number of distinct vertices a mesh can address through the 16-bit
/// [`Vertex::vertex_index`].
pub const MAX_MESH_VERTICES: usize = u16::MAX as usize + 1;

/// One interleaved vertex.
///
/// The layout is `#[repr(C)]` with an explicit trailing pad, so a `&[Vertex]` can be
/// reinterpreted as bytes with `bytemuck::cast_slice` and uploaded as is.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Model-space position.
    pub position: Vec3,
    /// Model-space normal.
    pub normal: Vec3,
    /// Texture coordinates.
    pub uv: Vec2,
    /// Bone weights, one per influence slot.
    pub blend_weights: Vec4,
    /// Bone-table indices stored as floats, one per influence slot.
    pub blend_indices: Vec4,
    /// Tangent for normal mapping.
    pub tangent: Vec3,
    /// Binormal (bitangent) for normal mapping.
    pub binormal: Vec3,
    /// Linear RGBA vertex color.
    pub color: Vec4,
    /// Position of this vertex in its mesh's vertex buffer.
    pub vertex_index: u16,
    _padding: u16,
}

impl Vertex {
    /// The color given to vertices whose source has no color stream.
    pub const DEFAULT_COLOR: Vec4 = Vec4::ONE;

    /// Creates a vertex at `position` with every optional attribute at its default.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Returns the size in bytes of one vertex in a vertex buffer.
    #[inline]
    pub const fn stride() -> u64 {
        size_of::<Self>() as u64
    }

    /// Describes where each attribute lives inside a vertex, in shader-location order.
    pub fn attribute_layout() -> [VertexAttributeDescriptor; 9] {
        use VertexFormat::*;
        let attr = |shader_location, format, offset: usize| VertexAttributeDescriptor {
            shader_location,
            format,
            offset: offset as u64,
        };
        [
            attr(0, Float32x3, offset_of!(Vertex, position)),
            attr(1, Float32x3, offset_of!(Vertex, normal)),
            attr(2, Float32x2, offset_of!(Vertex, uv)),
            attr(3, Float32x4, offset_of!(Vertex, blend_weights)),
            attr(4, Float32x4, offset_of!(Vertex, blend_indices)),
            attr(5, Float32x3, offset_of!(Vertex, tangent)),
            attr(6, Float32x3, offset_of!(Vertex, binormal)),
            attr(7, Float32x4, offset_of!(Vertex, color)),
            attr(8, Uint16, offset_of!(Vertex, vertex_index)),
        ]
    }

    /// Visits every float attribute in declaration order.
    ///
    /// The welding table hashes the sequence produced here, so two vertices are
    /// welded only when every attribute matches.
    pub fn for_each_component(&self, mut f: impl FnMut(f32)) {
        let arrays: [&[f32]; 8] = [
            &self.position.to_array(),
            &self.normal.to_array(),
            &self.uv.to_array(),
            &self.blend_weights.to_array(),
            &self.blend_indices.to_array(),
            &self.tangent.to_array(),
            &self.binormal.to_array(),
            &self.color.to_array(),
        ];
        arrays.iter().flat_map(|a| a.iter()).for_each(|v| f(*v));
    }
}

impl Default for Vertex {
    /// A vertex at the origin with zero vectors, zero blend data and opaque white color.
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::ZERO,
            uv: Vec2::ZERO,
            blend_weights: Vec4::ZERO,
            blend_indices: Vec4::ZERO,
            tangent: Vec3::ZERO,
            binormal: Vec3::ZERO,
            color: Self::DEFAULT_COLOR,
            vertex_index: 0,
            _padding: 0,
        }
    }
}

/// The data type of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
    /// One unsigned 16-bit integer.
    Uint16,
}

impl VertexFormat {
    /// Returns the size of the format in bytes.
    pub const fn size(self) -> u64 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
            VertexFormat::Uint16 => 2,
        }
    }
}

/// Where an attribute sits inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributeDescriptor {
    /// The shader input location the attribute binds to.
    pub shader_location: u32,
    /// The attribute's data type.
    pub format: VertexFormat,
    /// Byte offset from the start of the vertex.
    pub offset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(Vertex::stride(), 108);

        let layout = Vertex::attribute_layout();
        for pair in layout.windows(2) {
            assert_eq!(pair[0].offset + pair[0].format.size(), pair[1].offset);
        }
        let last = layout[layout.len() - 1];
        // Only the explicit u16 pad follows the last attribute.
        assert_eq!(last.offset + last.format.size() + 2, Vertex::stride());
    }

    #[test]
    fn test_default_vertex_is_opaque_white() {
        let v = Vertex::new(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(v.color, Vec4::ONE);
        assert_eq!(v.tangent, Vec3::ZERO);
        assert_eq!(v.blend_weights, Vec4::ZERO);
    }

    #[test]
    fn test_vertices_cast_to_bytes() {
        let vertices = [Vertex::default(); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len() as u64, 3 * Vertex::stride());
    }

    #[test]
    fn test_for_each_component_visits_all_floats() {
        let mut count = 0;
        Vertex::default().for_each_component(|_| count += 1);
        assert_eq!(count, 3 + 3 + 2 + 4 + 4 + 3 + 3 + 4);
    }
}
