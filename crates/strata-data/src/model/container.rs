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

//! Defines the [`Model`] container, the aggregate the pipeline hands to the renderer.

use super::{
    AnimationClock, AnimationContainer, BindPose, BoundingBox, InstanceInfo, InstanceRaw, Mesh,
    ModelError, ModelTable, Skeleton, TransformInfo,
};
use std::collections::BTreeMap;
use strata_core::{asset::Asset, math::Mat4};

/// Where a model is in its lifecycle.
///
/// There is no terminal state: mutating a `Released` model populates it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelState {
    /// Freshly constructed, nothing assigned yet.
    #[default]
    Unpopulated,
    /// Something has been assigned through a mutator.
    Populated,
    /// [`Model::release`] emptied the buffers.
    Released,
}

/// A processed model: meshes, placement, instance table and LOD table.
///
/// The model exclusively owns its meshes and its LOD children, which are full
/// models themselves. Dropping a model drops all of them.
///
/// Persisted fields are the name, instanced-geometry name, transform, instances,
/// LODs and meshes. The world matrix, skeleton, bind pose, animation channels and
/// clock are runtime state and are rebuilt after loading.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    name: String,
    instanced_geo_name: String,
    transform: TransformInfo,
    instances: Vec<InstanceInfo>,
    lods: Vec<Model>,
    meshes: Vec<Mesh>,

    world: Mat4,
    skeleton: Skeleton,
    bind_pose: BindPose,
    animation_containers: BTreeMap<String, AnimationContainer>,
    clock: AnimationClock,
    state: ModelState,
}

impl Asset for Model {}

impl Model {
    /// Creates an unpopulated model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn from_persisted(
        name: String,
        instanced_geo_name: String,
        transform: TransformInfo,
        instances: Vec<InstanceInfo>,
        lods: Vec<Model>,
        meshes: Vec<Mesh>,
    ) -> Self {
        let state = if meshes.is_empty() && instances.is_empty() && lods.is_empty() {
            ModelState::Unpopulated
        } else {
            ModelState::Populated
        };
        let world = transform.matrix();
        Self {
            name,
            instanced_geo_name,
            transform,
            instances,
            lods,
            meshes,
            world,
            state,
            ..Self::default()
        }
    }

    fn populate(&mut self) {
        self.state = ModelState::Populated;
    }

    // --- Instance table ---

    /// Appends a placement. Names may repeat; instances are addressed by position.
    pub fn add_instance(&mut self, info: InstanceInfo) {
        self.instances.push(info);
        self.populate();
    }

    /// The placements, in insertion order.
    pub fn instances(&self) -> &[InstanceInfo] {
        &self.instances
    }

    /// Number of placements.
    pub fn instances_count(&self) -> usize {
        self.instances.len()
    }

    /// Returns the placement at `index`.
    pub fn instance_at(&self, index: usize) -> Result<&InstanceInfo, ModelError> {
        let len = self.instances.len();
        self.instances
            .get(index)
            .ok_or_else(|| self.out_of_range(ModelTable::Instances, index, len))
    }

    /// Returns the placement at `index` for editing.
    pub fn instance_at_mut(&mut self, index: usize) -> Result<&mut InstanceInfo, ModelError> {
        let len = self.instances.len();
        if index >= len {
            return Err(self.out_of_range(ModelTable::Instances, index, len));
        }
        self.populate();
        Ok(&mut self.instances[index])
    }

    /// Packs every placement for an instance vertex buffer.
    pub fn instance_buffer(&self) -> Vec<InstanceRaw> {
        self.instances.iter().map(InstanceInfo::to_raw).collect()
    }

    // --- LOD table ---

    /// Appends LOD variants, taking ownership of them.
    ///
    /// The children are not re-validated. Index 0 must hold the finest variant,
    /// which is what [`Model::select_lod`] assumes.
    pub fn add_lods(&mut self, lods: impl IntoIterator<Item = Model>) {
        self.lods.extend(lods);
        self.populate();
    }

    /// The LOD variants, finest first.
    pub fn lods(&self) -> &[Model] {
        &self.lods
    }

    /// Number of LOD variants.
    pub fn lods_count(&self) -> usize {
        self.lods.len()
    }

    /// Returns the LOD variant at `index`.
    pub fn lod_at(&self, index: usize) -> Result<&Model, ModelError> {
        let len = self.lods.len();
        self.lods
            .get(index)
            .ok_or_else(|| self.out_of_range(ModelTable::Lods, index, len))
    }

    /// Picks the model to draw at `distance` from the camera.
    ///
    /// Below `step` the model itself is drawn. Each further `step` moves one
    /// entry down the LOD table, clamped to the coarsest variant.
    pub fn select_lod(&self, distance: f32, step: f32) -> &Model {
        if self.lods.is_empty() || step <= 0.0 || distance < step {
            return self;
        }
        let slot = ((distance / step) as usize).saturating_sub(1);
        &self.lods[slot.min(self.lods.len() - 1)]
    }

    // --- Meshes ---

    /// The meshes, in flattening order.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Returns the mesh at `index`.
    pub fn mesh_at(&self, index: usize) -> Result<&Mesh, ModelError> {
        let len = self.meshes.len();
        self.meshes
            .get(index)
            .ok_or_else(|| self.out_of_range(ModelTable::Meshes, index, len))
    }

    /// Replaces the meshes.
    pub fn set_meshes(&mut self, meshes: Vec<Mesh>) {
        self.meshes = meshes;
        self.populate();
    }

    /// Appends one mesh.
    pub fn push_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
        self.populate();
    }

    /// The union of every mesh's bounds, in model space.
    pub fn bounds(&self) -> BoundingBox {
        self.meshes
            .iter()
            .fold(BoundingBox::EMPTY, |acc, m| acc.merge(m.bounding_box()))
    }

    // --- Placement ---

    /// The model's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the model.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.populate();
    }

    /// Name of the geometry this model is the instancing template for, if any.
    pub fn instance_geometry_name(&self) -> &str {
        &self.instanced_geo_name
    }

    /// Marks this model as the instancing template for the named geometry.
    pub fn set_instance_geometry_name(&mut self, name: impl Into<String>) {
        self.instanced_geo_name = name.into();
        self.populate();
    }

    /// The local transform.
    pub fn transform(&self) -> &TransformInfo {
        &self.transform
    }

    /// Replaces the local transform.
    pub fn set_transform(&mut self, transform: TransformInfo) {
        self.transform = transform;
        self.populate();
    }

    /// The world matrix computed by the last `update_world` call.
    pub fn world(&self) -> Mat4 {
        self.world
    }

    /// Recomputes the world matrix from the local transform alone.
    pub fn update_world(&mut self) {
        self.update_world_with_parent(&Mat4::IDENTITY);
    }

    /// Recomputes the world matrix as `parent * T * R * S` and propagates it to
    /// the LOD children, which share this model's placement.
    pub fn update_world_with_parent(&mut self, parent: &Mat4) {
        self.world = *parent * self.transform.refresh_matrix();
        let world = self.world;
        for lod in &mut self.lods {
            lod.update_world_with_parent(&world);
        }
    }

    // --- Skinning runtime state ---

    /// The bones this model's blend indices refer to.
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// The inverse bind matrices and bone origins.
    pub fn bind_pose(&self) -> &BindPose {
        &self.bind_pose
    }

    /// Binds a skeleton and its rest pose.
    pub fn set_skeleton(&mut self, skeleton: Skeleton, bind_pose: BindPose) {
        self.skeleton = skeleton;
        self.bind_pose = bind_pose;
        self.populate();
    }

    /// Returns `true` when vertices carry blend data.
    pub fn is_skinned(&self) -> bool {
        !self.skeleton.is_empty()
    }

    /// Stores the animation channel of one bone, replacing any previous one.
    pub fn insert_animation_container(
        &mut self,
        bone_name: impl Into<String>,
        container: AnimationContainer,
    ) -> Option<AnimationContainer> {
        self.populate();
        self.animation_containers.insert(bone_name.into(), container)
    }

    /// Returns the animation channel of a bone.
    pub fn animation_container(&self, bone_name: &str) -> Option<&AnimationContainer> {
        self.animation_containers.get(bone_name)
    }

    /// Iterates the animation channels by bone name.
    pub fn animation_containers(&self) -> impl Iterator<Item = (&str, &AnimationContainer)> {
        self.animation_containers
            .iter()
            .map(|(name, c)| (name.as_str(), c))
    }

    /// The playback clock.
    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// The playback clock, for advancing.
    pub fn clock_mut(&mut self) -> &mut AnimationClock {
        self.populate();
        &mut self.clock
    }

    // --- Lifecycle ---

    /// Where the model is in its lifecycle.
    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Empties every mesh buffer, the instance table, the LOD table and the
    /// skinning state. The name and transform are kept.
    ///
    /// Returns `false` when the model was already released and nothing has been
    /// assigned since, in which case nothing changes. Every mutator moves a
    /// released model back to [`ModelState::Populated`].
    pub fn release(&mut self) -> bool {
        if self.state == ModelState::Released {
            return false;
        }
        log::debug!(
            "Releasing model '{}' ({} meshes, {} instances, {} LODs)",
            self.name,
            self.meshes.len(),
            self.instances.len(),
            self.lods.len()
        );
        for mesh in &mut self.meshes {
            mesh.release();
        }
        self.meshes.clear();
        self.instances.clear();
        self.lods.clear();
        self.skeleton = Skeleton::default();
        self.bind_pose = BindPose::default();
        self.animation_containers.clear();
        self.clock.reset();
        self.state = ModelState::Released;
        true
    }

    fn out_of_range(&self, table: ModelTable, index: usize, len: usize) -> ModelError {
        ModelError::OutOfRange {
            model: self.name.clone(),
            table,
            index,
            len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Vertex;
    use strata_core::{
        asset::BoneId,
        math::{approx_eq, Vec3},
    };

    fn triangle_mesh(offset: f32) -> Mesh {
        let vertices = [
            Vec3::new(offset, 0.0, 0.0),
            Vec3::new(offset + 1.0, 0.0, 0.0),
            Vec3::new(offset, 1.0, 0.0),
        ]
        .into_iter()
        .map(Vertex::new)
        .collect();
        Mesh::new(vertices, vec![0, 1, 2], "")
    }

    fn populated(name: &str) -> Model {
        let mut model = Model::new(name);
        model.set_meshes(vec![triangle_mesh(0.0)]);
        model
    }

    #[test]
    fn test_state_machine() {
        let mut model = Model::new("crate");
        assert_eq!(model.state(), ModelState::Unpopulated);

        model.set_meshes(vec![triangle_mesh(0.0)]);
        assert_eq!(model.state(), ModelState::Populated);

        assert!(model.release());
        assert_eq!(model.state(), ModelState::Released);

        // Released is not terminal.
        model.add_instance(InstanceInfo::default());
        assert_eq!(model.state(), ModelState::Populated);
    }

    #[test]
    fn test_add_instance_then_out_of_range_access() {
        let mut model = Model::new("rock");
        model.add_instance(InstanceInfo::new("rock_a", Vec3::ZERO));
        assert_eq!(model.instances_count(), 1);
        assert_eq!(model.instance_at(0).unwrap().name, "rock_a");

        let err = model.instance_at(5).unwrap_err();
        assert_eq!(
            err,
            ModelError::OutOfRange {
                model: "rock".into(),
                table: ModelTable::Instances,
                index: 5,
                len: 1,
            }
        );
        assert!(model.instance_at_mut(1).is_err());
    }

    #[test]
    fn test_instance_names_may_repeat() {
        let mut model = Model::new("fence");
        model.add_instance(InstanceInfo::new("post", Vec3::ZERO));
        model.add_instance(InstanceInfo::new("post", Vec3::X));
        assert_eq!(model.instances_count(), 2);
        assert_eq!(model.instance_buffer().len(), 2);
    }

    #[test]
    fn test_add_lods_keeps_order() {
        let lod_a = populated("tree_lod0");
        let lod_b = populated("tree_lod1");
        let expected_a = lod_a.clone();

        let mut model = Model::new("tree");
        model.add_lods([lod_a, lod_b]);

        assert_eq!(model.lods_count(), 2);
        assert_eq!(model.lod_at(0).unwrap(), &expected_a);
        assert_eq!(model.lod_at(1).unwrap().name(), "tree_lod1");
        assert!(matches!(
            model.lod_at(2),
            Err(ModelError::OutOfRange {
                table: ModelTable::Lods,
                ..
            })
        ));
    }

    #[test]
    fn test_select_lod_by_distance() {
        let mut model = populated("tree");
        model.add_lods([populated("lod0"), populated("lod1")]);

        assert_eq!(model.select_lod(5.0, 10.0).name(), "tree");
        assert_eq!(model.select_lod(12.0, 10.0).name(), "lod0");
        assert_eq!(model.select_lod(25.0, 10.0).name(), "lod1");
        assert_eq!(model.select_lod(500.0, 10.0).name(), "lod1");
        assert_eq!(Model::new("bare").select_lod(500.0, 10.0).name(), "bare");
    }

    #[test]
    fn test_update_world_composes_parent() {
        let mut model = populated("lamp");
        model.add_lods([populated("lamp_lod0")]);
        model.set_transform(TransformInfo::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::ZERO,
            Vec3::splat(2.0),
        ));

        model.update_world_with_parent(&Mat4::from_translation(Vec3::new(0.0, 10.0, 0.0)));
        let p = model.world().transform_point(Vec3::X);
        assert!(approx_eq(p.x, 3.0));
        assert!(approx_eq(p.y, 10.0));

        // The LOD child has an identity transform, so it inherits the parent's world.
        assert_eq!(model.lod_at(0).unwrap().world(), model.world());

        model.update_world();
        assert!(approx_eq(model.world().transform_point(Vec3::ZERO).y, 0.0));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut model = populated("barrel");
        model.add_instance(InstanceInfo::default());
        model.add_lods([populated("barrel_lod0")]);

        assert!(model.release());
        assert!(model.meshes().is_empty());
        assert!(model.instances().is_empty());
        assert!(model.lods().is_empty());
        assert_eq!(model.name(), "barrel");

        let after_first = model.clone();
        assert!(!model.release());
        assert_eq!(model, after_first);
    }

    #[test]
    fn test_runtime_state_bound_after_release_is_released_again() {
        let mut model = populated("golem");
        assert!(model.release());

        let mut skeleton = Skeleton::new();
        skeleton.push("root", BoneId(0));
        model.set_skeleton(skeleton, BindPose::default());
        assert_eq!(model.state(), ModelState::Populated);
        assert!(model.release());
        assert!(!model.is_skinned());

        model.insert_animation_container("root", AnimationContainer::default());
        assert!(model.release());
        assert!(model.animation_container("root").is_none());

        model.clock_mut().advance(2.0);
        assert!(model.release());
        assert_eq!(*model.clock(), AnimationClock::default());
        assert!(!model.release());
    }

    #[test]
    fn test_bounds_union_over_meshes() {
        let mut model = Model::new("pair");
        model.set_meshes(vec![triangle_mesh(0.0), triangle_mesh(5.0), Mesh::default()]);
        let bounds = model.bounds();
        assert!(bounds.is_valid());
        assert_eq!(bounds.min, Vec3::ZERO);
        assert_eq!(bounds.max, Vec3::new(6.0, 1.0, 0.0));
        assert!(!Model::new("empty").bounds().is_valid());
    }
}
