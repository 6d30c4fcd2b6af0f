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

//! Stable, serializable mirrors of the model types.
//!
//! The live types carry caches and runtime state that must never reach disk. Each
//! record holds exactly the persisted fields, in persisted order, and converts
//! to and from its live counterpart. Derived data is rebuilt on the way back.
//!
//! Text decoders see the records through [`Deserialize`] impls that demand the
//! persisted field list exactly: every field, in declaration order, nothing else.

use super::{BoundingBox, InstanceInfo, Mesh, Model, TransformInfo, Vertex};
use bincode::{Decode, Encode};
use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::fmt;
use strata_core::math::{Vec2, Vec3};

/// Reads the next map entry, which must be `expected`.
fn next_field<'de, A, T>(map: &mut A, expected: &'static str) -> Result<T, A::Error>
where
    A: MapAccess<'de>,
    T: Deserialize<'de>,
{
    match map.next_key::<String>()? {
        Some(key) if key == expected => map.next_value(),
        Some(key) => Err(de::Error::custom(format_args!(
            "expected field `{expected}`, found `{key}`"
        ))),
        None => Err(de::Error::missing_field(expected)),
    }
}

/// Implements [`Deserialize`] for a record, accepting its fields only in the
/// listed order and rejecting any extra entry.
macro_rules! ordered_record {
    ($record:ident { $($field:ident),+ $(,)? }) => {
        impl<'de> Deserialize<'de> for $record {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                const FIELDS: &[&str] = &[$(stringify!($field)),+];

                struct RecordVisitor;

                impl<'de> Visitor<'de> for RecordVisitor {
                    type Value = $record;

                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "struct {} with fields {:?}", stringify!($record), FIELDS)
                    }

                    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<$record, A::Error> {
                        $(let $field = next_field(&mut map, stringify!($field))?;)+
                        if let Some(extra) = map.next_key::<String>()? {
                            return Err(de::Error::unknown_field(&extra, FIELDS));
                        }
                        Ok($record { $($field),+ })
                    }
                }

                deserializer.deserialize_struct(stringify!($record), FIELDS, RecordVisitor)
            }
        }
    };
}

/// The persisted fields of a [`Vertex`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Encode, Decode)]
pub struct VertexRecord {
    /// Position.
    pub position: Vec3,
    /// Normal.
    pub normal: Vec3,
    /// Texture coordinates.
    pub uv: Vec2,
    /// Welding index.
    pub vertex_index: u16,
}

ordered_record!(VertexRecord { position, normal, uv, vertex_index });

impl From<&Vertex> for VertexRecord {
    fn from(v: &Vertex) -> Self {
        Self {
            position: v.position,
            normal: v.normal,
            uv: v.uv,
            vertex_index: v.vertex_index,
        }
    }
}

impl From<VertexRecord> for Vertex {
    /// Fields that are not persisted take their defaults (white color, zero blend data).
    fn from(r: VertexRecord) -> Self {
        let mut vertex = Vertex::new(r.position);
        vertex.normal = r.normal;
        vertex.uv = r.uv;
        vertex.vertex_index = r.vertex_index;
        vertex
    }
}

/// The persisted corners of a [`BoundingBox`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Encode, Decode)]
pub struct BoundingBoxRecord {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

ordered_record!(BoundingBoxRecord { min, max });

impl From<&BoundingBox> for BoundingBoxRecord {
    fn from(b: &BoundingBox) -> Self {
        Self {
            min: b.min,
            max: b.max,
        }
    }
}

/// The persisted fields of a [`Mesh`].
#[derive(Debug, Clone, PartialEq, Serialize, Encode, Decode)]
pub struct MeshRecord {
    /// Vertex buffer.
    pub vertices: Vec<VertexRecord>,
    /// Triangle-list index buffer.
    pub indices: Vec<u32>,
    /// Texture reference.
    pub textures_path: String,
    /// Bounds at the time of encoding.
    pub bounding_box: BoundingBoxRecord,
}

ordered_record!(MeshRecord { vertices, indices, textures_path, bounding_box });

impl From<&Mesh> for MeshRecord {
    fn from(m: &Mesh) -> Self {
        Self {
            vertices: m.vertices().iter().map(VertexRecord::from).collect(),
            indices: m.indices().to_vec(),
            textures_path: m.textures_path().to_owned(),
            bounding_box: m.bounding_box().into(),
        }
    }
}

impl From<MeshRecord> for Mesh {
    fn from(r: MeshRecord) -> Self {
        Mesh::from_persisted(
            r.vertices.into_iter().map(Vertex::from).collect(),
            r.indices,
            r.textures_path,
        )
    }
}

/// The persisted fields of a [`TransformInfo`]. The matrix is rebuilt on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Encode, Decode)]
pub struct TransformRecord {
    /// Translation.
    pub position: Vec3,
    /// Euler rotation in radians.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

ordered_record!(TransformRecord { position, rotation, scale });

impl From<&TransformInfo> for TransformRecord {
    fn from(t: &TransformInfo) -> Self {
        Self {
            position: t.position,
            rotation: t.rotation,
            scale: t.scale,
        }
    }
}

impl From<TransformRecord> for TransformInfo {
    fn from(r: TransformRecord) -> Self {
        TransformInfo::new(r.position, r.rotation, r.scale)
    }
}

/// The persisted fields of an [`InstanceInfo`].
#[derive(Debug, Clone, PartialEq, Serialize, Encode, Decode)]
pub struct InstanceRecord {
    /// Placement name.
    pub name: String,
    /// Translation.
    pub position: Vec3,
    /// Euler rotation in radians.
    pub rotation: Vec3,
    /// Uniform scale.
    pub scale: f32,
    /// Texture layer or atlas slot.
    pub texture_sampler_index: u32,
}

ordered_record!(InstanceRecord { name, position, rotation, scale, texture_sampler_index });

impl From<&InstanceInfo> for InstanceRecord {
    fn from(i: &InstanceInfo) -> Self {
        Self {
            name: i.name.clone(),
            position: i.position,
            rotation: i.rotation,
            scale: i.scale,
            texture_sampler_index: i.texture_sampler_index,
        }
    }
}

impl From<InstanceRecord> for InstanceInfo {
    fn from(r: InstanceRecord) -> Self {
        InstanceInfo {
            name: r.name,
            position: r.position,
            rotation: r.rotation,
            scale: r.scale,
            texture_sampler_index: r.texture_sampler_index,
        }
    }
}

/// The persisted fields of a [`Model`], LOD children included.
#[derive(Debug, Clone, PartialEq, Serialize, Encode, Decode)]
pub struct ModelRecord {
    /// Model name.
    pub name: String,
    /// Name of the geometry this model instances, empty when none.
    pub instanced_geo_name: String,
    /// Local transform.
    pub transform: TransformRecord,
    /// Instance table.
    pub instances: Vec<InstanceRecord>,
    /// LOD table, finest first.
    pub lods: Vec<ModelRecord>,
    /// Meshes.
    pub meshes: Vec<MeshRecord>,
}

ordered_record!(ModelRecord { name, instanced_geo_name, transform, instances, lods, meshes });

impl From<&Model> for ModelRecord {
    fn from(m: &Model) -> Self {
        Self {
            name: m.name().to_owned(),
            instanced_geo_name: m.instance_geometry_name().to_owned(),
            transform: m.transform().into(),
            instances: m.instances().iter().map(InstanceRecord::from).collect(),
            lods: m.lods().iter().map(ModelRecord::from).collect(),
            meshes: m.meshes().iter().map(MeshRecord::from).collect(),
        }
    }
}

impl From<ModelRecord> for Model {
    fn from(r: ModelRecord) -> Self {
        Model::from_persisted(
            r.name,
            r.instanced_geo_name,
            r.transform.into(),
            r.instances.into_iter().map(InstanceInfo::from).collect(),
            r.lods.into_iter().map(Model::from).collect(),
            r.meshes.into_iter().map(Mesh::from).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelState, Skeleton};
    use strata_core::{asset::BoneId, math::Vec4};

    fn skinned_vertex(x: f32) -> Vertex {
        let mut v = Vertex::new(Vec3::new(x, 1.0, 2.0));
        v.normal = Vec3::Z;
        v.uv = Vec2::new(0.25, 0.75);
        v.blend_weights = Vec4::new(1.0, 0.0, 0.0, 0.0);
        v.tangent = Vec3::X;
        v.color = Vec4::new(1.0, 0.0, 0.0, 1.0);
        v.vertex_index = 7;
        v
    }

    #[test]
    fn test_vertex_record_drops_runtime_attributes() {
        let restored = Vertex::from(VertexRecord::from(&skinned_vertex(3.0)));
        assert_eq!(restored.position, Vec3::new(3.0, 1.0, 2.0));
        assert_eq!(restored.normal, Vec3::Z);
        assert_eq!(restored.uv, Vec2::new(0.25, 0.75));
        assert_eq!(restored.vertex_index, 7);
        assert_eq!(restored.blend_weights, Vec4::ZERO);
        assert_eq!(restored.tangent, Vec3::ZERO);
        assert_eq!(restored.color, Vertex::DEFAULT_COLOR);
    }

    #[test]
    fn test_mesh_record_rebuilds_mirror_and_validity() {
        let mesh = Mesh::new(
            vec![skinned_vertex(0.0), skinned_vertex(4.0)],
            vec![0, 1, 0],
            "t.png",
        );
        let restored = Mesh::from(MeshRecord::from(&mesh));
        assert_eq!(restored.positions(), mesh.positions());
        assert_eq!(restored.bounding_box(), mesh.bounding_box());

        let empty = Mesh::from(MeshRecord::from(&Mesh::default()));
        assert!(!empty.bounding_box().is_valid());
    }

    #[test]
    fn test_stale_box_is_recomputed_on_decode() {
        let mesh = Mesh::new(vec![skinned_vertex(0.0), skinned_vertex(2.0)], vec![0, 1, 0], "");
        let mut record = MeshRecord::from(&mesh);
        record.bounding_box = BoundingBoxRecord {
            min: Vec3::splat(100.0),
            max: Vec3::splat(101.0),
        };

        let restored = Mesh::from(record);
        assert_eq!(restored.bounding_box(), mesh.bounding_box());
        for vertex in restored.vertices() {
            assert!(restored.bounding_box().contains(vertex.position));
        }
    }

    #[test]
    fn test_model_record_keeps_only_persisted_state() {
        let mut lod = Model::new("lod0");
        lod.add_instance(InstanceInfo::new("a", Vec3::ONE));

        let mut model = Model::new("hero");
        model.set_instance_geometry_name("hero_geo");
        model.set_transform(TransformInfo::new(Vec3::X, Vec3::ZERO, Vec3::ONE));
        model.add_lods([lod]);
        let mut skeleton = Skeleton::new();
        skeleton.push("root", BoneId(0));
        model.set_skeleton(skeleton, Default::default());

        let restored = Model::from(ModelRecord::from(&model));
        assert_eq!(restored.name(), "hero");
        assert_eq!(restored.instance_geometry_name(), "hero_geo");
        assert_eq!(restored.transform(), model.transform());
        assert_eq!(restored.lods_count(), 1);
        assert_eq!(restored.lod_at(0).unwrap().instances_count(), 1);
        assert!(restored.skeleton().is_empty());
        assert_eq!(restored.state(), ModelState::Populated);
        assert_eq!(ModelRecord::from(&restored), ModelRecord::from(&model));
    }
}
