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

//! Provides geometric primitive shapes for spatial calculations.

use super::{Mat4, Vec3};

/// Represents an Axis-Aligned Bounding Box (AABB).
///
/// An AABB is a rectangular prism aligned with the coordinate axes, defined by its
/// minimum and maximum corner points. It is the volume the renderer culls meshes
/// against.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// An invalid `Aabb` where `min` components are positive infinity and `max` are negative infinity.
    ///
    /// Merging any valid `Aabb` into `INVALID` results in that valid `Aabb`.
    pub const INVALID: Self = Self {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Creates a new `Aabb` from two corner points, in any order.
    #[inline]
    pub fn from_min_max(min_pt: Vec3, max_pt: Vec3) -> Self {
        Self {
            min: min_pt.min(max_pt),
            max: min_pt.max(max_pt),
        }
    }

    /// Creates a degenerate `Aabb` containing a single point.
    #[inline]
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Creates an `Aabb` that tightly encloses a set of points.
    ///
    /// # Returns
    ///
    /// Returns `Some(Aabb)` if the iterator yields at least one point, otherwise `None`.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::from_point(first), |aabb, p| aabb.merged_with_point(p)))
    }

    /// Calculates the center point of the `Aabb`.
    #[inline]
    fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Calculates the half-extents (half the size on each axis) of the `Aabb`.
    #[inline]
    fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Checks if the `Aabb` is valid (i.e., `min` <= `max` on all axes).
    /// Degenerate boxes where `min == max` are considered valid.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.all_le(self.max)
    }

    /// Creates a new `Aabb` that encompasses both this `Aabb` and another one.
    #[inline]
    pub fn merge(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Creates a new `Aabb` that encompasses both this `Aabb` and an additional point.
    #[inline]
    fn merged_with_point(&self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Computes the bounding box that encloses this `Aabb` after an affine transformation.
    ///
    /// The center is transformed directly and the extents are projected onto the
    /// absolute values of the matrix's basis columns.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let center = matrix.transform_point(self.center());
        let half = self.half_extents();
        let abs_col = |i: usize| {
            let c = matrix.cols[i];
            Vec3::new(c.x.abs(), c.y.abs(), c.z.abs())
        };
        let extents = abs_col(0) * half.x + abs_col(1) * half.y + abs_col(2) * half.z;
        Self {
            min: center - extents,
            max: center + extents,
        }
    }
}

impl Default for Aabb {
    /// Returns the default `Aabb`, which is `Aabb::INVALID`.
    #[inline]
    fn default() -> Self {
        Self::INVALID
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, PI};

    #[test]
    fn test_aabb_from_min_max_orders_corners() {
        let aabb = Aabb::from_min_max(Vec3::new(4.0, 5.0, 6.0), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.min, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.max, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_aabb_from_points() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());

        let points = [
            Vec3::new(1.0, 5.0, -1.0),
            Vec3::new(0.0, 2.0, 3.0),
            Vec3::new(4.0, 8.0, 0.0),
        ];
        let aabb = Aabb::from_points(points).unwrap();

        assert_eq!(aabb.min, Vec3::new(0.0, 2.0, -1.0));
        assert_eq!(aabb.max, Vec3::new(4.0, 8.0, 3.0));
        assert!(points.iter().all(|p| aabb.min.all_le(*p) && p.all_le(aabb.max)));
    }

    #[test]
    fn test_aabb_validity() {
        assert!(!Aabb::INVALID.is_valid());
        assert!(Aabb::from_point(Vec3::ZERO).is_valid());
        assert_eq!(Aabb::default(), Aabb::INVALID);
    }

    #[test]
    fn test_aabb_merge_with_invalid_is_identity() {
        let aabb = Aabb::from_min_max(Vec3::ZERO, Vec3::ONE);
        assert_eq!(Aabb::INVALID.merge(&aabb), aabb);
        let p = Vec3::new(-1.0, 0.5, 2.0);
        assert_eq!(Aabb::INVALID.merged_with_point(p), Aabb::from_point(p));
    }

    #[test]
    fn test_aabb_transform_rotation_grows_extents() {
        let aabb = Aabb::from_min_max(Vec3::splat(-1.0), Vec3::splat(1.0));
        let rotated = aabb.transform(&Mat4::from_rotation_y(PI / 4.0));
        let sqrt2 = 2.0f32.sqrt();
        assert!(approx_eq(rotated.max.x, sqrt2));
        assert!(approx_eq(rotated.min.z, -sqrt2));
        assert!(approx_eq(rotated.max.y, 1.0));

        let moved = aabb.transform(&Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        assert!(approx_eq(moved.min.x, 9.0));
        assert!(approx_eq(moved.max.x, 11.0));
    }
}
