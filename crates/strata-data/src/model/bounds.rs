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

//! Computes mesh bounding volumes from flattened vertex data.

use super::Vertex;
use strata_core::math::{Aabb, Mat4, Vec3};

/// The axis-aligned bounds of a mesh in model local space.
///
/// A mesh without vertices gets a degenerate box at the origin that is flagged
/// invalid. Culling code must treat an invalid box as "always visible", which
/// [`BoundingBox::intersects`] does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Smallest coordinates on all axes.
    pub min: Vec3,
    /// Largest coordinates on all axes.
    pub max: Vec3,
    valid: bool,
}

impl BoundingBox {
    /// The box given to meshes with no vertices.
    pub const EMPTY: Self = Self {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
        valid: false,
    };

    /// Computes the component-wise min/max over `positions`.
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        match Aabb::from_points(positions) {
            Some(aabb) => Self {
                min: aabb.min,
                max: aabb.max,
                valid: true,
            },
            None => Self::EMPTY,
        }
    }

    /// Computes the bounds of a vertex slice.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        Self::from_positions(vertices.iter().map(|v| v.position))
    }

    /// Returns `false` for the degenerate box of an empty mesh.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns `true` when culling may test this box. Invalid boxes are never culled.
    #[inline]
    pub fn should_cull_test(&self) -> bool {
        self.valid
    }

    /// Returns the box as an [`Aabb`], or `None` when it is invalid.
    pub fn as_aabb(&self) -> Option<Aabb> {
        self.valid.then(|| Aabb {
            min: self.min,
            max: self.max,
        })
    }

    /// Returns `true` when `point` lies inside or on the box.
    pub fn contains(&self, point: Vec3) -> bool {
        self.valid && self.min.all_le(point) && point.all_le(self.max)
    }

    /// Tests the box against a culling volume. Invalid boxes always pass.
    pub fn intersects(&self, volume: &Aabb) -> bool {
        match self.as_aabb() {
            Some(aabb) => aabb.min.all_le(volume.max) && volume.min.all_le(aabb.max),
            None => true,
        }
    }

    /// Returns the union of two boxes. Invalid boxes contribute nothing.
    pub fn merge(&self, other: &BoundingBox) -> Self {
        match (self.valid, other.valid) {
            (true, true) => Self {
                min: self.min.min(other.min),
                max: self.max.max(other.max),
                valid: true,
            },
            (true, false) => *self,
            (false, _) => *other,
        }
    }

    /// Returns the box enclosing this one after `matrix` is applied.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        match self.as_aabb() {
            Some(aabb) => {
                let t = aabb.transform(matrix);
                Self {
                    min: t.min,
                    max: t.max,
                    valid: true,
                }
            }
            None => *self,
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}
