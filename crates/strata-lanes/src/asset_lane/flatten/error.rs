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

//! Errors that fail the flattening of a geometry.

use super::AttributeStream;
use thiserror::Error;

/// Malformed input that stops one geometry from flattening.
///
/// Every variant names the geometry, so a batch can report which sibling failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlattenError {
    /// The geometry has polygons but no position stream.
    #[error("geometry '{geometry}' has polygons but no position stream")]
    MissingPositions {
        /// The failing geometry.
        geometry: String,
    },

    /// A corner referenced past the end of a stream.
    #[error("geometry '{geometry}': {stream} index {index} is out of range ({len} entries)")]
    AttributeIndexOutOfRange {
        /// The failing geometry.
        geometry: String,
        /// The stream that was indexed.
        stream: AttributeStream,
        /// The offending index.
        index: u32,
        /// Length of the stream.
        len: usize,
    },

    /// A polygon with fewer than three corners.
    #[error(
        "geometry '{geometry}': polygon {polygon} of group {group} has {corners} corners, at least 3 are required"
    )]
    DegeneratePolygon {
        /// The failing geometry.
        geometry: String,
        /// Primitive group index.
        group: usize,
        /// Polygon index inside the group.
        polygon: usize,
        /// Number of corners found.
        corners: usize,
    },

    /// A skin joint has no bone of the same name.
    #[error("geometry '{geometry}': skin joint '{bone}' is not in the bone table")]
    UnknownBone {
        /// The failing geometry.
        geometry: String,
        /// The unresolved joint name.
        bone: String,
    },

    /// The skin binding's tables do not line up with the geometry or with each other.
    #[error("geometry '{geometry}': skin binding does not match ({reason})")]
    SkinMismatch {
        /// The failing geometry.
        geometry: String,
        /// What did not line up.
        reason: String,
    },

    /// A mesh would need more vertices than a 16-bit vertex index can address.
    #[error("geometry '{geometry}': group {group} needs more than {limit} vertices")]
    VertexLimitExceeded {
        /// The failing geometry.
        geometry: String,
        /// Primitive group index.
        group: usize,
        /// The per-mesh ceiling.
        limit: usize,
    },
}

impl FlattenError {
    /// Name of the geometry that failed.
    pub fn geometry(&self) -> &str {
        match self {
            FlattenError::MissingPositions { geometry }
            | FlattenError::AttributeIndexOutOfRange { geometry, .. }
            | FlattenError::DegeneratePolygon { geometry, .. }
            | FlattenError::UnknownBone { geometry, .. }
            | FlattenError::SkinMismatch { geometry, .. }
            | FlattenError::VertexLimitExceeded { geometry, .. } => geometry,
        }
    }
}
