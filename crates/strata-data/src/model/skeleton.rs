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

//! Skeleton and animation state attached to a skinned model at runtime.
//!
//! None of this is persisted. A loader re-binds it from the external bone and
//! animation sources after decoding a model.

use strata_core::{
    asset::BoneId,
    math::{Mat4, Vec4},
};

/// The bones a skinned model references, as handles into the parser's bone arena.
///
/// `bone_names[i]` names `bones[i]`, and a vertex blend index `i` refers to slot `i`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skeleton {
    bones: Vec<BoneId>,
    bone_names: Vec<String>,
}

impl Skeleton {
    /// Creates an empty skeleton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a bone and returns its slot.
    pub fn push(&mut self, name: impl Into<String>, bone: BoneId) -> usize {
        self.bones.push(bone);
        self.bone_names.push(name.into());
        self.bones.len() - 1
    }

    /// Looks a bone up by name.
    pub fn find(&self, name: &str) -> Option<BoneId> {
        self.bone_names
            .iter()
            .position(|n| n == name)
            .map(|slot| self.bones[slot])
    }

    /// The bone handles, in slot order.
    pub fn bones(&self) -> &[BoneId] {
        &self.bones
    }

    /// The bone names, in slot order.
    pub fn bone_names(&self) -> &[String] {
        &self.bone_names
    }

    /// Number of bones.
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Returns `true` when the skeleton has no bones.
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// Rest-state transforms the skinning deformation is computed against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BindPose {
    /// Inverse bind matrix per skeleton slot.
    pub matrices: Vec<Mat4>,
    /// Bind-pose origin of each bone, in model space.
    pub positions: Vec<Vec4>,
}

/// One sampled bone transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Time of the key in seconds.
    pub time: f32,
    /// Bone-local transform at that time.
    pub transform: Mat4,
}

/// The keyframes of one bone's animation channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationContainer {
    keyframes: Vec<Keyframe>,
}

impl AnimationContainer {
    /// Creates a container from keys, sorted by time.
    pub fn new(mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keyframes }
    }

    /// The keys, in ascending time order.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Time of the last key, or zero for an empty channel.
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }
}

/// Playback timing for a model, including cross-fade ("overlap") between clips.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimationClock {
    /// Current playback time in seconds.
    pub animation_time: f32,
    /// Playback time before the last advance.
    pub last_animation_time: f32,
    /// Length of the current overlap window in seconds.
    pub frame_overlap: f32,
    /// Whether an overlap window is active.
    pub overlapping: bool,
    /// Playback time at which the active overlap started.
    pub overlapping_start_time: f32,
}

impl AnimationClock {
    /// Moves the clock forward, closing the overlap window once it has elapsed.
    pub fn advance(&mut self, delta_seconds: f32) {
        self.last_animation_time = self.animation_time;
        self.animation_time += delta_seconds;
        if self.overlapping
            && self.animation_time - self.overlapping_start_time >= self.frame_overlap
        {
            self.overlapping = false;
        }
    }

    /// Opens an overlap window of `duration` seconds starting now.
    pub fn begin_overlap(&mut self, duration: f32) {
        self.frame_overlap = duration;
        self.overlapping = true;
        self.overlapping_start_time = self.animation_time;
    }

    /// Rewinds to time zero and cancels any overlap.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::math::approx_eq;

    #[test]
    fn test_skeleton_lookup_by_name() {
        let mut skeleton = Skeleton::new();
        skeleton.push("hips", BoneId(4));
        skeleton.push("spine", BoneId(7));
        assert_eq!(skeleton.find("spine"), Some(BoneId(7)));
        assert_eq!(skeleton.find("head"), None);
        assert_eq!(skeleton.len(), 2);
    }

    #[test]
    fn test_animation_container_sorts_keys() {
        let key = |time| Keyframe {
            time,
            transform: Mat4::IDENTITY,
        };
        let channel = AnimationContainer::new(vec![key(1.0), key(0.0), key(0.5)]);
        let times: Vec<f32> = channel.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert_eq!(channel.duration(), 1.0);
    }

    #[test]
    fn test_overlap_window_closes() {
        let mut clock = AnimationClock::default();
        clock.advance(1.0);
        clock.begin_overlap(0.25);
        clock.advance(0.1);
        assert!(clock.overlapping);
        clock.advance(0.2);
        assert!(!clock.overlapping);
        assert!(approx_eq(clock.last_animation_time, 1.1));
    }
}
