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

//! Defines the lane that flattens parsed geometry into models.

use super::{
    weld::WeldTable, AttributeStream, BoneTable, Corner, FlattenError, FlattenInput,
    FlattenSettings, MaterialLibrary, PrimitiveGroup, SkinBinding, SourceGeometry,
};
use ahash::AHashMap;
use strata_core::{
    asset::BoneId,
    math::{Mat4, Vec3, Vec4},
};
use strata_data::model::{
    AnimationContainer, BindPose, Keyframe, Mesh, Model, Skeleton, TransformInfo, Vertex,
    MAX_BONE_INFLUENCES, MAX_MESH_VERTICES,
};

/// Maps a Z-up vector into Y-up space.
#[inline]
fn z_up_to_y_up(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, -v.y)
}

/// Re-expresses a Z-up transform in Y-up space (`C * m * C^T`).
fn z_up_matrix_to_y_up(m: &Mat4) -> Mat4 {
    let c = Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, -1.0, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::W,
    );
    c * *m * c.transpose()
}

/// A skin binding resolved against the bone table.
struct ResolvedSkin {
    /// `(weights, indices)` per source position.
    blends: Vec<(Vec4, Vec4)>,
    skeleton: Skeleton,
    bind_pose: BindPose,
}

/// Converts parsed geometry into flat, interleaved meshes.
///
/// Each primitive group of the source becomes one [`Mesh`]. Every polygon corner
/// resolves its per-stream indices into one [`Vertex`], polygons are fanned into
/// triangles, and, with `optimize` set, identical vertices are welded through a
/// hash table.
///
/// The lane holds only its settings, so one instance can flatten geometries on
/// several threads at once.
#[derive(Debug, Clone, Default)]
pub struct GeometryFlattenerLane {
    settings: FlattenSettings,
}

impl GeometryFlattenerLane {
    /// Creates a lane with the given settings.
    pub fn new(settings: FlattenSettings) -> Self {
        Self { settings }
    }

    /// The settings this lane flattens with.
    pub fn settings(&self) -> &FlattenSettings {
        &self.settings
    }

    /// Flattens one geometry.
    ///
    /// Any malformed input fails the whole geometry; no partial model is returned.
    /// Geometry without polygons is not an error and yields a model with empty meshes.
    pub fn flatten(&self, input: &FlattenInput<'_>) -> Result<Model, FlattenError> {
        let geometry = input.geometry;
        let has_corners = geometry.groups.iter().any(|g| !g.polygons.is_empty());
        if has_corners && geometry.streams.positions.is_empty() {
            return Err(FlattenError::MissingPositions {
                geometry: geometry.name.clone(),
            });
        }

        let skin = input
            .skin
            .map(|skin| self.resolve_skin(geometry, skin, &input.bones))
            .transpose()?;

        let meshes = geometry
            .groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                self.flatten_group(geometry, index, group, skin.as_ref(), input.materials)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let node_transform = if self.settings.z_up {
            z_up_matrix_to_y_up(&geometry.node_transform)
        } else {
            geometry.node_transform
        };
        let (scale, rotation, position) = node_transform.to_scale_euler_translation();

        let mut model = Model::new(geometry.name.clone());
        model.set_transform(TransformInfo::new(position, rotation, scale));
        model.set_meshes(meshes);

        if let Some(skin) = skin {
            model.set_skeleton(skin.skeleton, skin.bind_pose);
            for track in input.animations {
                if model.skeleton().find(&track.bone_name).is_none() {
                    log::warn!(
                        "Skipping animation track for unknown bone '{}' in '{}'",
                        track.bone_name,
                        geometry.name
                    );
                    continue;
                }
                let keyframes = track
                    .keyframes
                    .iter()
                    .map(|k| Keyframe {
                        time: k.time,
                        transform: self.convert_matrix(&k.transform),
                    })
                    .collect();
                model.insert_animation_container(
                    track.bone_name.clone(),
                    AnimationContainer::new(keyframes),
                );
            }
        } else if !input.animations.is_empty() {
            log::debug!(
                "Ignoring {} animation tracks for unskinned geometry '{}'",
                input.animations.len(),
                geometry.name
            );
        }

        model.update_world();

        log::debug!(
            "Flattened '{}': {} meshes, {} vertices, {} triangles",
            geometry.name,
            model.meshes().len(),
            model.meshes().iter().map(Mesh::vertex_count).sum::<usize>(),
            model.meshes().iter().map(Mesh::triangle_count).sum::<usize>(),
        );

        Ok(model)
    }

    /// Flattens several geometries. A failure only affects its own entry.
    pub fn flatten_batch(&self, inputs: &[FlattenInput<'_>]) -> Vec<Result<Model, FlattenError>> {
        inputs
            .iter()
            .map(|input| {
                let result = self.flatten(input);
                if let Err(e) = &result {
                    log::warn!("Failed to flatten geometry: {e}");
                }
                result
            })
            .collect()
    }

    fn convert_matrix(&self, m: &Mat4) -> Mat4 {
        if self.settings.z_up {
            z_up_matrix_to_y_up(m)
        } else {
            *m
        }
    }

    fn convert_vector(&self, v: Vec3) -> Vec3 {
        if self.settings.z_up {
            z_up_to_y_up(v)
        } else {
            v
        }
    }

    fn resolve_skin(
        &self,
        geometry: &SourceGeometry,
        skin: &SkinBinding,
        bones: &BoneTable<'_>,
    ) -> Result<ResolvedSkin, FlattenError> {
        let mismatch = |reason: String| FlattenError::SkinMismatch {
            geometry: geometry.name.clone(),
            reason,
        };

        if bones.bones.len() != bones.names.len() {
            return Err(mismatch(format!(
                "bone table has {} bones but {} names",
                bones.bones.len(),
                bones.names.len()
            )));
        }
        let positions = geometry.streams.positions.len();
        if skin.influences.len() != positions {
            return Err(mismatch(format!(
                "{} influence lists for {} positions",
                skin.influences.len(),
                positions
            )));
        }
        if skin.inverse_bind_matrices.len() != skin.joint_names.len() {
            return Err(mismatch(format!(
                "{} inverse bind matrices for {} joints",
                skin.inverse_bind_matrices.len(),
                skin.joint_names.len()
            )));
        }

        let bone_slots: AHashMap<&str, usize> = bones
            .names
            .iter()
            .enumerate()
            .map(|(slot, name)| (name.as_str(), slot))
            .collect();
        let joint_to_bone = skin
            .joint_names
            .iter()
            .map(|joint| {
                bone_slots
                    .get(joint.as_str())
                    .copied()
                    .ok_or_else(|| FlattenError::UnknownBone {
                        geometry: geometry.name.clone(),
                        bone: joint.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut truncated = 0usize;
        let mut blends = Vec::with_capacity(positions);
        for (position, influences) in skin.influences.iter().enumerate() {
            if let Some(bad) = influences
                .iter()
                .find(|i| i.joint as usize >= joint_to_bone.len())
            {
                return Err(mismatch(format!(
                    "position {position} references joint {} of {}",
                    bad.joint,
                    joint_to_bone.len()
                )));
            }

            let mut sorted = influences.clone();
            sorted.sort_by(|a, b| b.weight.total_cmp(&a.weight));
            if sorted.len() > MAX_BONE_INFLUENCES {
                truncated += 1;
            }

            let mut weights = [0.0f32; MAX_BONE_INFLUENCES];
            let mut indices = [0.0f32; MAX_BONE_INFLUENCES];
            for (slot, influence) in sorted.iter().take(MAX_BONE_INFLUENCES).enumerate() {
                weights[slot] = influence.weight;
                indices[slot] = joint_to_bone[influence.joint as usize] as f32;
            }
            blends.push((
                Vec4::new(weights[0], weights[1], weights[2], weights[3]),
                Vec4::new(indices[0], indices[1], indices[2], indices[3]),
            ));
        }
        if truncated > 0 {
            log::debug!(
                "'{}': {truncated} positions had more than {MAX_BONE_INFLUENCES} influences, kept the heaviest",
                geometry.name
            );
        }

        let mut skeleton = Skeleton::new();
        for (slot, name) in bones.names.iter().enumerate() {
            skeleton.push(name.clone(), BoneId::from(slot));
        }

        let mut bind_pose = BindPose {
            matrices: vec![Mat4::IDENTITY; bones.len()],
            positions: bones
                .bones
                .iter()
                .map(|b| {
                    let origin = self.convert_vector(b.world_transform.cols[3].truncate());
                    Vec4::from_vec3(origin, 1.0)
                })
                .collect(),
        };
        for (joint, &bone) in joint_to_bone.iter().enumerate() {
            let skinning = skin.inverse_bind_matrices[joint] * skin.bind_shape_matrix;
            bind_pose.matrices[bone] = self.convert_matrix(&skinning);
        }

        Ok(ResolvedSkin {
            blends,
            skeleton,
            bind_pose,
        })
    }

    fn flatten_group(
        &self,
        geometry: &SourceGeometry,
        group_index: usize,
        group: &PrimitiveGroup,
        skin: Option<&ResolvedSkin>,
        materials: Option<&MaterialLibrary>,
    ) -> Result<Mesh, FlattenError> {
        let corner_count = group.corner_count();
        let mut vertices: Vec<Vertex> = Vec::with_capacity(corner_count.min(MAX_MESH_VERTICES));
        let mut indices: Vec<u32> = Vec::with_capacity(corner_count * 3);
        let mut weld = self
            .settings
            .optimize
            .then(|| WeldTable::new(self.settings.weld_epsilon));
        let mut corner_ids: Vec<u32> = Vec::new();

        for (polygon_index, polygon) in group.polygons.iter().enumerate() {
            if polygon.corners.len() < 3 {
                return Err(FlattenError::DegeneratePolygon {
                    geometry: geometry.name.clone(),
                    group: group_index,
                    polygon: polygon_index,
                    corners: polygon.corners.len(),
                });
            }

            corner_ids.clear();
            for corner in &polygon.corners {
                let vertex = self.build_vertex(geometry, corner, skin)?;
                let id = emit_vertex(&mut vertices, weld.as_mut(), vertex).ok_or_else(|| {
                    FlattenError::VertexLimitExceeded {
                        geometry: geometry.name.clone(),
                        group: group_index,
                        limit: MAX_MESH_VERTICES,
                    }
                })?;
                corner_ids.push(id);
            }

            // Fan around the first corner, keeping the source winding.
            for i in 1..corner_ids.len() - 1 {
                indices.extend_from_slice(&[corner_ids[0], corner_ids[i], corner_ids[i + 1]]);
            }
        }

        let textures_path = match materials.and_then(|m| m.resolve_texture_path(&group.material)) {
            Some(path) => path.to_owned(),
            None => {
                if !group.material.is_empty() {
                    log::warn!(
                        "No texture found for material '{}' of '{}'",
                        group.material,
                        geometry.name
                    );
                }
                String::new()
            }
        };

        Ok(Mesh::new(vertices, indices, textures_path))
    }

    fn build_vertex(
        &self,
        geometry: &SourceGeometry,
        corner: &Corner,
        skin: Option<&ResolvedSkin>,
    ) -> Result<Vertex, FlattenError> {
        let streams = &geometry.streams;
        let position = fetch(geometry, AttributeStream::Position, &streams.positions, Some(corner.position))?
            .unwrap_or(Vec3::ZERO);

        let mut vertex = Vertex::new(self.convert_vector(position));
        if let Some(normal) = fetch(geometry, AttributeStream::Normal, &streams.normals, corner.normal)? {
            vertex.normal = self.convert_vector(normal);
        }
        if let Some(uv) = fetch(geometry, AttributeStream::Uv, &streams.uvs, corner.uv)? {
            vertex.uv = uv;
        }
        if let Some(tangent) = fetch(geometry, AttributeStream::Tangent, &streams.tangents, corner.tangent)? {
            vertex.tangent = self.convert_vector(tangent);
        }
        if let Some(binormal) = fetch(geometry, AttributeStream::Binormal, &streams.binormals, corner.binormal)? {
            vertex.binormal = self.convert_vector(binormal);
        }
        if let Some(color) = fetch(geometry, AttributeStream::Color, &streams.colors, corner.color)? {
            vertex.color = color;
        }
        if let Some(skin) = skin {
            let (weights, indices) = skin.blends[corner.position as usize];
            vertex.blend_weights = weights;
            vertex.blend_indices = indices;
        }
        Ok(vertex)
    }
}

/// Looks up `index` in a stream. `None` in gives `None` out.
fn fetch<T: Copy>(
    geometry: &SourceGeometry,
    stream: AttributeStream,
    values: &[T],
    index: Option<u32>,
) -> Result<Option<T>, FlattenError> {
    let Some(index) = index else {
        return Ok(None);
    };
    values
        .get(index as usize)
        .copied()
        .map(Some)
        .ok_or_else(|| FlattenError::AttributeIndexOutOfRange {
            geometry: geometry.name.clone(),
            stream,
            index,
            len: values.len(),
        })
}

/// Appends `vertex` unless the weld table already holds an equal one, and returns
/// its index. `None` when the mesh is full.
fn emit_vertex(vertices: &mut Vec<Vertex>, weld: Option<&mut WeldTable>, mut vertex: Vertex) -> Option<u32> {
    let next = vertices.len();
    if let Some(weld) = weld {
        if let Some(existing) = weld.find_or_insert(&vertex, next as u32) {
            return Some(existing);
        }
    }
    if next >= MAX_MESH_VERTICES {
        return None;
    }
    vertex.vertex_index = next as u16;
    vertices.push(vertex);
    Some(next as u32)
}
