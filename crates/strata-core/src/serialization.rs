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

//! Defines [`SerializationGoal`], the intent a caller states when persisting a model.
//!
//! Callers do not pick a file format. They say what matters (load speed, size,
//! readability, stability) and the model archive maps that onto a strategy.

use serde::{Deserialize, Serialize};

/// The caller's priority for a serialization operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializationGoal {
    /// Shortest decode time. The payload is compact binary.
    #[default]
    FastestLoad,

    /// Smallest payload on disk.
    SmallestFileSize,

    /// Text output that can be read and diffed by people.
    HumanReadableDebug,

    /// A payload decoupled from in-memory layouts so future versions can still read it.
    LongTermStability,
}
