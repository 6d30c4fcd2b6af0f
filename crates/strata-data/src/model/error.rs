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

//! Errors raised by positional model accessors.

use std::fmt;
use thiserror::Error;

/// Which positional table of a model an access went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTable {
    /// The instance table.
    Instances,
    /// The LOD table.
    Lods,
    /// The mesh list.
    Meshes,
}

impl fmt::Display for ModelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTable::Instances => write!(f, "instance"),
            ModelTable::Lods => write!(f, "LOD"),
            ModelTable::Meshes => write!(f, "mesh"),
        }
    }
}

/// An error raised by a [`Model`](super::Model) accessor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An index-based accessor was given an index past the end of its table.
    #[error("{table} index {index} is out of range for model '{model}' ({len} entries)")]
    OutOfRange {
        /// Name of the model that was accessed.
        model: String,
        /// The table that was accessed.
        table: ModelTable,
        /// The requested index.
        index: usize,
        /// The table length at the time of the access.
        len: usize,
    },
}
