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

//! The shapes a scene parser hands to the flattener.
//!
//! These borrow nothing from the parser. Streams are plain vectors, polygons
//! address them by index, and bones are addressed by their slot in the parser's
//! bone arena.

use ahash::AHashMap;
use std::fmt;
use strata_core::{
    asset::BoneId,
    math::{Mat4, Vec2, Vec3, Vec4},
};
use strata_data::model::Keyframe;

/// Identifies one attribute stream of a [`SourceGeometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeStream {
    /// Vertex positions.
    Position,
    /// Vertex normals.
    Normal,
    /// Texture coordinates.
    Uv,
    /// Tangents.
    Tangent,
    /// Binormals.
    Binormal,
    /// Vertex colors.
    Color,
}

impl fmt::Display for AttributeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeStream::Position => "position",
            AttributeStream::Normal => "normal",
            AttributeStream::Uv => "uv",
            AttributeStream::Tangent => "tangent",
            AttributeStream::Binormal => "binormal",
            AttributeStream::Color => "color",
        };
        f.write_str(name)
    }
}

/// The de-indexed attribute arrays of a geometry. Only `positions` is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStreams {
    /// Positions, also the key for skin influences.
    pub positions: Vec<Vec3>,
    /// Normals.
    pub normals: Vec<Vec3>,
    /// Texture coordinates.
    pub uvs: Vec<Vec2>,
    /// Tangents.
    pub tangents: Vec<Vec3>,
    /// Binormals.
    pub binormals: Vec<Vec3>,
    /// RGBA colors.
    pub colors: Vec<Vec4>,
}

/// One polygon corner: an index into each attribute stream.
///
/// `None` means the corner has no value for that stream and the vertex gets the
/// attribute's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Corner {
    /// Index into `positions`.
    pub position: u32,
    /// Index into `normals`.
    pub normal: Option<u32>,
    /// Index into `uvs`.
    pub uv: Option<u32>,
    /// Index into `tangents`.
    pub tangent: Option<u32>,
    /// Index into `binormals`.
    pub binormal: Option<u32>,
    /// Index into `colors`.
    pub color: Option<u32>,
}

impl Corner {
    /// A corner that only references a position.
    pub fn new(position: u32) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Sets the normal index.
    pub fn with_normal(mut self, index: u32) -> Self {
        self.normal = Some(index);
        self
    }

    /// Sets the texture coordinate index.
    pub fn with_uv(mut self, index: u32) -> Self {
        self.uv = Some(index);
        self
    }

    /// Sets the tangent index.
    pub fn with_tangent(mut self, index: u32) -> Self {
        self.tangent = Some(index);
        self
    }

    /// Sets the binormal index.
    pub fn with_binormal(mut self, index: u32) -> Self {
        self.binormal = Some(index);
        self
    }

    /// Sets the color index.
    pub fn with_color(mut self, index: u32) -> Self {
        self.color = Some(index);
        self
    }
}

/// A polygon with three or more corners, in winding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    /// The corners.
    pub corners: Vec<Corner>,
}

impl Polygon {
    /// Creates a polygon from its corners.
    pub fn new(corners: Vec<Corner>) -> Self {
        Self { corners }
    }

    /// Creates a polygon whose corners only reference positions.
    pub fn from_positions(indices: &[u32]) -> Self {
        Self::new(indices.iter().copied().map(Corner::new).collect())
    }
}

/// Polygons sharing one material. Each group becomes one mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveGroup {
    /// Material name, resolved to a texture path through a [`MaterialLibrary`].
    pub material: String,
    /// The polygons.
    pub polygons: Vec<Polygon>,
}

impl PrimitiveGroup {
    /// Creates a group.
    pub fn new(material: impl Into<String>, polygons: Vec<Polygon>) -> Self {
        Self {
            material: material.into(),
            polygons,
        }
    }

    /// Sum of corner counts over every polygon.
    pub fn corner_count(&self) -> usize {
        self.polygons.iter().map(|p| p.corners.len()).sum()
    }
}

/// A parsed geometry node: streams, primitive groups and the node's transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceGeometry {
    /// Node name. The flattened model takes it, and errors report it.
    pub name: String,
    /// Attribute streams.
    pub streams: AttributeStreams,
    /// Primitive groups, one mesh each.
    pub groups: Vec<PrimitiveGroup>,
    /// The node's local transform.
    pub node_transform: Mat4,
}

impl SourceGeometry {
    /// Creates a geometry with an identity node transform.
    pub fn new(name: impl Into<String>, streams: AttributeStreams, groups: Vec<PrimitiveGroup>) -> Self {
        Self {
            name: name.into(),
            streams,
            groups,
            node_transform: Mat4::IDENTITY,
        }
    }
}

/// One joint's pull on a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexInfluence {
    /// Index into [`SkinBinding::joint_names`].
    pub joint: u32,
    /// Blend weight.
    pub weight: f32,
}

impl VertexInfluence {
    /// Creates an influence.
    pub fn new(joint: u32, weight: f32) -> Self {
        Self { joint, weight }
    }
}

/// Binds a geometry's positions to the joints of a skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinBinding {
    /// Joint names, resolved against the bone table by name.
    pub joint_names: Vec<String>,
    /// Influences of each position, parallel to `AttributeStreams::positions`.
    pub influences: Vec<Vec<VertexInfluence>>,
    /// Transform applied to the geometry before skinning.
    pub bind_shape_matrix: Mat4,
    /// Inverse bind matrix of each joint, parallel to `joint_names`.
    pub inverse_bind_matrices: Vec<Mat4>,
}

/// A bone in the parser's arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    /// Parent bone, `None` for a root.
    pub parent: Option<BoneId>,
    /// Bind-pose transform in model space.
    pub world_transform: Mat4,
}

/// The parser's bone arena together with the parallel name slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoneTable<'a> {
    /// The bones. A [`BoneId`] indexes this slice.
    pub bones: &'a [Bone],
    /// `names[i]` names `bones[i]`.
    pub names: &'a [String],
}

impl<'a> BoneTable<'a> {
    /// Creates a table from parallel slices.
    pub fn new(bones: &'a [Bone], names: &'a [String]) -> Self {
        Self { bones, names }
    }

    /// Number of bones.
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Returns `true` when the table has no bones.
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// The keyframes of one named bone, as read from an animation library.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTrack {
    /// The animated bone.
    pub bone_name: String,
    /// Keys in any order.
    pub keyframes: Vec<Keyframe>,
}

/// The material -> effect -> image -> path chain of a scene.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    material_effects: AHashMap<String, String>,
    effect_images: AHashMap<String, String>,
    image_paths: AHashMap<String, String>,
}

impl MaterialLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a material to the effect it instantiates.
    pub fn insert_material(&mut self, material: impl Into<String>, effect: impl Into<String>) {
        self.material_effects.insert(material.into(), effect.into());
    }

    /// Maps an effect to the image it samples.
    pub fn insert_effect(&mut self, effect: impl Into<String>, image: impl Into<String>) {
        self.effect_images.insert(effect.into(), image.into());
    }

    /// Maps an image to its file path.
    pub fn insert_image(&mut self, image: impl Into<String>, path: impl Into<String>) {
        self.image_paths.insert(image.into(), path.into());
    }

    /// Follows the chain from `material` to a texture path.
    pub fn resolve_texture_path(&self, material: &str) -> Option<&str> {
        let effect = self.material_effects.get(material)?;
        let image = self.effect_images.get(effect)?;
        self.image_paths.get(image).map(String::as_str)
    }
}
