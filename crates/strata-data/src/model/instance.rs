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

//! Per-instance placement data for instanced draws.
//!
//! Every [`InstanceInfo`] in a model draws the model's own meshes again with a
//! different placement. [`InstanceRaw`] is the packed form written into an
//! instance vertex buffer.

use strata_core::math::{Mat4, Vec3};

/// A named placement of the owning model's geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceInfo {
    /// Name of the placement. Names are not required to be unique.
    pub name: String,
    /// Translation of the instance.
    pub position: Vec3,
    /// X/Y/Z Euler rotation in radians.
    pub rotation: Vec3,
    /// Uniform scale.
    pub scale: f32,
    /// Which texture layer or atlas slot the instance samples.
    pub texture_sampler_index: u32,
}

impl InstanceInfo {
    /// Creates an instance at `position` with no rotation, unit scale and sampler 0.
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            ..Self::default()
        }
    }

    /// Sets the rotation (radians).
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the uniform scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the texture sampler index.
    pub fn with_texture_sampler_index(mut self, index: u32) -> Self {
        self.texture_sampler_index = index;
        self
    }

    /// The placement matrix, `T * R * S`.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }

    /// Packs the instance for an instance vertex buffer.
    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_mat4().to_cols_array_2d(),
            texture_sampler_index: self.texture_sampler_index,
            _padding: [0; 3],
        }
    }
}

impl Default for InstanceInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
            texture_sampler_index: 0,
        }
    }
}

/// GPU layout of one instance: a column-major model matrix and the sampler slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
    /// Texture layer or atlas slot.
    pub texture_sampler_index: u32,
    _padding: [u32; 3],
}
