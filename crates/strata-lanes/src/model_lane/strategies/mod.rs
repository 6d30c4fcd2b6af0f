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

//! Defines the contract every model serialization strategy fulfils.

mod bincode_lane;
mod ron_lane;

pub use bincode_lane::*;
pub use ron_lane::*;

use strata_data::model::Model;
use thiserror::Error;

/// An error raised while encoding or decoding a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The bytes are not a model in the expected format: bad header, unknown
    /// strategy, truncated payload or trailing bytes.
    #[error("model format mismatch: {0}")]
    FormatMismatch(String),
    /// The model could not be encoded.
    #[error("model encoding failed: {0}")]
    Encode(String),
}

/// A way of turning a [`Model`] into a payload and back.
///
/// Only the persisted field set travels: name, instanced-geometry name,
/// transform, instances, LODs and meshes. Decoders rebuild derived state and
/// never return a partially decoded model.
pub trait ModelSerializationStrategy: Send + Sync {
    /// The unique, versioned id written to the [`ModelHeader`](super::ModelHeader).
    fn get_strategy_id(&self) -> &'static str;

    /// Encodes a model into a payload.
    fn serialize(&self, model: &Model) -> Result<Vec<u8>, CodecError>;

    /// Decodes a payload produced by [`serialize`](Self::serialize).
    ///
    /// The payload must be consumed entirely.
    fn deserialize(&self, data: &[u8]) -> Result<Model, CodecError>;
}
