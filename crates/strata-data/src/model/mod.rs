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

//! The renderer-ready model representation.
//!
//! A [`Model`] owns its [`Mesh`]es and LOD children outright and carries its
//! [`InstanceInfo`] placements by value. Only the fields mirrored by the
//! [`ModelRecord`] family are persisted; skeleton and animation state is runtime only.

mod bounds;
mod container;
mod error;
mod instance;
mod mesh;
mod records;
mod skeleton;
mod transform;
mod vertex;

pub use bounds::*;
pub use container::*;
pub use error::*;
pub use instance::*;
pub use mesh::*;
pub use records::*;
pub use skeleton::*;
pub use transform::*;
pub use vertex::*;
