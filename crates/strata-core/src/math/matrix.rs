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

//! Provides the column-major 4x4 matrix used for model, world and bind-pose transforms.

use super::{Vec3, Vec4};
use std::ops::Mul;

/// A 4x4 column-major matrix, used for 3D affine transformations.
///
/// The memory layout is column-major, which matches what graphics APIs expect
/// for uniform and instance buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[0]` is the first column, and so on.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Returns the matrix as a column-major array of arrays.
    #[inline]
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        [
            self.cols[0].to_array(),
            self.cols[1].to_array(),
            self.cols[2].to_array(),
            self.cols[3].to_array(),
        ]
    }

    /// Returns a row of the matrix as a `Vec4`.
    #[inline]
    pub fn get_row(&self, index: usize) -> Vec4 {
        Vec4 {
            x: self.cols[0].get(index),
            y: self.cols[1].get(index),
            z: self.cols[2].get(index),
            w: self.cols[3].get(index),
        }
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        Self {
            cols: [
                Vec4::new(1.0, 0.0, 0.0, 0.0),
                Vec4::new(0.0, 1.0, 0.0, 0.0),
                Vec4::new(0.0, 0.0, 1.0, 0.0),
                Vec4::new(v.x, v.y, v.z, 1.0),
            ],
        }
    }

    /// Creates a non-uniform scaling matrix.
    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            cols: [
                Vec4::new(scale.x, 0.0, 0.0, 0.0),
                Vec4::new(0.0, scale.y, 0.0, 0.0),
                Vec4::new(0.0, 0.0, scale.z, 0.0),
                Vec4::new(0.0, 0.0, 0.0, 1.0),
            ],
        }
    }

    /// Creates a matrix for a rotation around the X-axis.
    #[inline]
    pub fn from_rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            cols: [
                Vec4::new(1.0, 0.0, 0.0, 0.0),
                Vec4::new(0.0, c, s, 0.0),
                Vec4::new(0.0, -s, c, 0.0),
                Vec4::new(0.0, 0.0, 0.0, 1.0),
            ],
        }
    }

    /// Creates a matrix for a right-handed rotation around the Y-axis.
    #[inline]
    pub fn from_rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            cols: [
                Vec4::new(c, 0.0, -s, 0.0),
                Vec4::new(0.0, 1.0, 0.0, 0.0),
                Vec4::new(s, 0.0, c, 0.0),
                Vec4::new(0.0, 0.0, 0.0, 1.0),
            ],
        }
    }

    /// Creates a matrix for a rotation around the Z-axis.
    #[inline]
    pub fn from_rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            cols: [
                Vec4::new(c, s, 0.0, 0.0),
                Vec4::new(-s, c, 0.0, 0.0),
                Vec4::new(0.0, 0.0, 1.0, 0.0),
                Vec4::new(0.0, 0.0, 0.0, 1.0),
            ],
        }
    }

    /// Creates a rotation matrix from Euler angles in radians.
    ///
    /// The X rotation is applied first, then Y, then Z (`Rz * Ry * Rx`).
    #[inline]
    pub fn from_euler_xyz(angles: Vec3) -> Self {
        Self::from_rotation_z(angles.z) * Self::from_rotation_y(angles.y) * Self::from_rotation_x(angles.x)
    }

    /// Builds the standard `Scale -> Rotate -> Translate` matrix (`T * R * S`).
    #[inline]
    pub fn from_scale_rotation_translation(scale: Vec3, euler: Vec3, translation: Vec3) -> Self {
        Self::from_translation(translation) * Self::from_euler_xyz(euler) * Self::from_scale(scale)
    }

    /// Returns the transpose of this matrix.
    pub fn transpose(&self) -> Self {
        Self::from_cols(self.get_row(0), self.get_row(1), self.get_row(2), self.get_row(3))
    }

    /// Splits an affine `T * R * S` matrix back into scale, `Rz * Ry * Rx` Euler
    /// angles in radians, and translation.
    ///
    /// Shear is not representable and is lost. At gimbal lock (Y rotation of
    /// +/-90 degrees) the Z angle is reported as zero and folded into X.
    pub fn to_scale_euler_translation(&self) -> (Vec3, Vec3, Vec3) {
        let translation = self.cols[3].truncate();
        let axes = [
            self.cols[0].truncate(),
            self.cols[1].truncate(),
            self.cols[2].truncate(),
        ];
        let scale = Vec3::new(axes[0].length(), axes[1].length(), axes[2].length());

        // r[row][col] of the pure rotation.
        let mut r = [[0.0f32; 3]; 3];
        for (col, axis) in axes.iter().enumerate() {
            let s = if scale[col] > 0.0 { scale[col] } else { 1.0 };
            r[0][col] = axis.x / s;
            r[1][col] = axis.y / s;
            r[2][col] = axis.z / s;
        }

        let sin_y = (-r[2][0]).clamp(-1.0, 1.0);
        let y = sin_y.asin();
        let euler = if sin_y.abs() < 1.0 - 1e-6 {
            Vec3::new(r[2][1].atan2(r[2][2]), y, r[1][0].atan2(r[0][0]))
        } else {
            Vec3::new((sin_y * r[0][1]).atan2(r[1][1]), y, 0.0)
        };

        (scale, euler, translation)
    }

    /// Transforms a point (`w = 1`) by this matrix.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        (*self * Vec4::from_vec3(p, 1.0)).truncate()
    }
}

impl Default for Mat4 {
    /// Returns the 4x4 identity matrix.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;
    /// Multiplies this matrix by another `Mat4`. Note that matrix multiplication is not commutative.
    #[inline]
    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result_cols = [Vec4::ZERO; 4];
        for (c_idx, target_col) in result_cols.iter_mut().enumerate() {
            let col_from_rhs = rhs.cols[c_idx];
            *target_col = Vec4 {
                x: self.get_row(0).dot(col_from_rhs),
                y: self.get_row(1).dot(col_from_rhs),
                z: self.get_row(2).dot(col_from_rhs),
                w: self.get_row(3).dot(col_from_rhs),
            };
        }
        Mat4 { cols: result_cols }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    /// Transforms a `Vec4` by this matrix.
    #[inline]
    fn mul(self, rhs: Vec4) -> Self::Output {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, FRAC_PI_2};

    fn vec3_approx_eq(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    #[test]
    fn test_identity_leaves_points_unchanged() {
        let p = Vec3::new(1.0, -2.0, 3.5);
        assert_eq!(Mat4::IDENTITY.transform_point(p), p);
        assert_eq!(Mat4::default(), Mat4::IDENTITY);
    }

    #[test]
    fn test_translation_ignores_directions() {
        let m = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(m.transform_point(Vec3::ZERO), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!((m * Vec4::from_vec3(Vec3::X, 0.0)).truncate(), Vec3::X);
    }

    #[test]
    fn test_rotations_are_right_handed() {
        let rz = Mat4::from_rotation_z(FRAC_PI_2);
        assert!(vec3_approx_eq(rz.transform_point(Vec3::X), Vec3::Y));
        let rx = Mat4::from_rotation_x(FRAC_PI_2);
        assert!(vec3_approx_eq(rx.transform_point(Vec3::Y), Vec3::Z));
        let ry = Mat4::from_rotation_y(FRAC_PI_2);
        assert!(vec3_approx_eq(ry.transform_point(Vec3::Z), Vec3::X));
    }

    #[test]
    fn test_srt_applies_scale_then_rotation_then_translation() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Vec3::new(0.0, 0.0, FRAC_PI_2),
            Vec3::new(0.0, 0.0, 5.0),
        );
        // (1,0,0) -> scaled (2,0,0) -> rotated (0,2,0) -> translated (0,2,5)
        assert!(vec3_approx_eq(
            m.transform_point(Vec3::X),
            Vec3::new(0.0, 2.0, 5.0)
        ));
    }

    #[test]
    fn test_decompose_recovers_components() {
        let scale = Vec3::new(2.0, 1.0, 0.5);
        let euler = Vec3::new(0.3, -0.7, 1.2);
        let translation = Vec3::new(4.0, -1.0, 9.0);
        let m = Mat4::from_scale_rotation_translation(scale, euler, translation);

        let (s, e, t) = m.to_scale_euler_translation();
        assert!(vec3_approx_eq(s, scale));
        assert!(vec3_approx_eq(e, euler));
        assert!(vec3_approx_eq(t, translation));
    }

    #[test]
    fn test_decompose_at_gimbal_lock_rebuilds_same_matrix() {
        let m = Mat4::from_euler_xyz(Vec3::new(0.4, FRAC_PI_2, 0.0));
        let (s, e, t) = m.to_scale_euler_translation();
        let rebuilt = Mat4::from_scale_rotation_translation(s, e, t);
        for p in [Vec3::X, Vec3::Y, Vec3::Z] {
            assert!(vec3_approx_eq(rebuilt.transform_point(p), m.transform_point(p)));
        }
    }

    #[test]
    fn test_transpose() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.transpose().get_row(3), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn test_cols_array_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.to_cols_array_2d()[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
