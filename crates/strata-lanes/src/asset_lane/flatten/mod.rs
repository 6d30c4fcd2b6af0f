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

//! The geometry flattener: parsed, indexed, per-stream geometry in; flat,
//! interleaved, renderer-ready [`Model`](strata_data::model::Model)s out.

mod error;
mod flattener_lane;
mod source;
mod weld;

pub use error::*;
pub use flattener_lane::*;
pub use source::*;

use serde::{Deserialize, Serialize};

/// Knobs of the flattener, read from the `[import]` table of the pipeline config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenSettings {
    /// Weld identical vertices instead of emitting one vertex per corner.
    pub optimize: bool,
    /// The source is Z-up. Convert it to Y-up with `(x, y, z) -> (x, z, -y)`.
    pub z_up: bool,
    /// Welding tolerance. Zero welds bit-identical vertices only.
    pub weld_epsilon: f32,
}

impl Default for FlattenSettings {
    fn default() -> Self {
        Self {
            optimize: true,
            z_up: false,
            weld_epsilon: 0.0,
        }
    }
}

/// Everything the flattener reads for one geometry. All of it is borrowed.
#[derive(Debug, Clone, Copy)]
pub struct FlattenInput<'a> {
    /// The geometry to flatten.
    pub geometry: &'a SourceGeometry,
    /// Skin binding, for skinned geometry.
    pub skin: Option<&'a SkinBinding>,
    /// Bones the skin's joints resolve against.
    pub bones: BoneTable<'a>,
    /// Texture path resolution for the primitive groups' materials.
    pub materials: Option<&'a MaterialLibrary>,
    /// Animation channels to attach to a skinned model.
    pub animations: &'a [AnimationTrack],
}

impl<'a> FlattenInput<'a> {
    /// An input with no skin, materials or animation.
    pub fn new(geometry: &'a SourceGeometry) -> Self {
        Self {
            geometry,
            skin: None,
            bones: BoneTable::default(),
            materials: None,
            animations: &[],
        }
    }

    /// Binds the geometry to a skeleton.
    pub fn with_skin(mut self, skin: &'a SkinBinding, bones: BoneTable<'a>) -> Self {
        self.skin = Some(skin);
        self.bones = bones;
        self
    }

    /// Sets the material library.
    pub fn with_materials(mut self, materials: &'a MaterialLibrary) -> Self {
        self.materials = Some(materials);
        self
    }

    /// Sets the animation channels.
    pub fn with_animations(mut self, animations: &'a [AnimationTrack]) -> Self {
        self.animations = animations;
        self
    }
}
