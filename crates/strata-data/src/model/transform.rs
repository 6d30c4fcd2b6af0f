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

//! The local placement of a model and its cached matrix.

use strata_core::math::{Mat4, Vec3};

/// The local placement of a model: position, Euler rotation in radians, and scale.
///
/// The three vectors are the source of truth. The matrix is derived from them and
/// cached; after editing the fields directly, call [`TransformInfo::refresh_matrix`]
/// (the owning model's `update_world` does this).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformInfo {
    /// The translation of the model.
    pub position: Vec3,
    /// The rotation of the model, as X/Y/Z Euler angles in radians.
    pub rotation: Vec3,
    /// The per-axis scale of the model.
    pub scale: Vec3,
    matrix: Mat4,
}

impl TransformInfo {
    /// Creates a transform and computes its matrix.
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        let mut transform = Self {
            position,
            rotation,
            scale,
            matrix: Mat4::IDENTITY,
        };
        transform.refresh_matrix();
        transform
    }

    /// Creates an identity transform: no translation, no rotation, unit scale.
    pub fn identity() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
    }

    /// Calculates the matrix in `Scale -> Rotate -> Translate` order without
    /// touching the cache.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Recomputes the cached matrix from the current fields and returns it.
    pub fn refresh_matrix(&mut self) -> Mat4 {
        self.matrix = self.to_mat4();
        self.matrix
    }

    /// The cached matrix.
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }
}

impl Default for TransformInfo {
    /// Returns the identity transform.
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::math::{approx_eq, FRAC_PI_2};

    #[test]
    fn test_identity_matrix() {
        assert_eq!(TransformInfo::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_refresh_picks_up_field_edits() {
        let mut t = TransformInfo::identity();
        t.position = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(t.matrix(), Mat4::IDENTITY);

        let m = t.refresh_matrix();
        assert_eq!(m.transform_point(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.matrix(), m);
    }

    #[test]
    fn test_rotation_is_applied_after_scale() {
        let t = TransformInfo::new(
            Vec3::ZERO,
            Vec3::new(0.0, FRAC_PI_2, 0.0),
            Vec3::new(3.0, 1.0, 1.0),
        );
        // X is scaled to 3 then rotated about Y onto -Z.
        let p = t.matrix().transform_point(Vec3::X);
        assert!(approx_eq(p.x, 0.0));
        assert!(approx_eq(p.z, -3.0));
    }
}
