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

//! Provides the foundational contracts for assets produced by the content pipeline.
//!
//! The pipeline never owns the scene parser's data. Skeleton bones, for example,
//! live in an arena owned by the parser and are referenced through [`BoneId`]
//! handles, so reloading the source bone table cannot leave dangling references
//! inside a processed model.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// A marker trait for types that can be produced and cached by the pipeline.
///
/// The supertraits allow a processed asset to be built on a worker thread and
/// handed to the thread that owns the graphics device.
///
/// # Examples
///
/// ```
/// use strata_core::asset::Asset;
///
/// struct Heightfield {
///     samples: Vec<f32>,
/// }
///
/// impl Asset for Heightfield {}
/// ```
pub trait Asset: Send + Sync + 'static {}

/// A stable index into a bone arena owned by the scene parser.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode,
)]
pub struct BoneId(pub u32);

impl BoneId {
    /// Returns the arena slot this handle points to.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for BoneId {
    fn from(index: usize) -> Self {
        Self(index as u32)
    }
}
