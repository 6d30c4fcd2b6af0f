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

//! The compact binary model strategy.

use super::{CodecError, ModelSerializationStrategy};
use bincode::config;
use strata_data::model::{Model, ModelRecord};

/// Encodes models as bincode-packed [`ModelRecord`]s.
///
/// This is the primary format: small, fast to decode, and unreadable by people.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeModelLane;

impl BincodeModelLane {
    /// The strategy id of this lane.
    pub const STRATEGY_ID: &'static str = "ST_MODEL_BIN_V1";

    /// Upper bound on the memory a single decode may claim.
    ///
    /// Length prefixes are checked against it before anything is allocated, so a
    /// corrupt prefix fails the decode instead of exhausting memory.
    pub const DECODE_LIMIT_BYTES: usize = 1 << 30;

    /// Creates the lane.
    pub fn new() -> Self {
        Self
    }
}

impl ModelSerializationStrategy for BincodeModelLane {
    fn get_strategy_id(&self) -> &'static str {
        Self::STRATEGY_ID
    }

    fn serialize(&self, model: &Model) -> Result<Vec<u8>, CodecError> {
        bincode::encode_to_vec(ModelRecord::from(model), config::standard())
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn deserialize(&self, data: &[u8]) -> Result<Model, CodecError> {
        let (record, read): (ModelRecord, usize) =
            bincode::decode_from_slice(
                data,
                config::standard().with_limit::<{ BincodeModelLane::DECODE_LIMIT_BYTES }>(),
            )
            .map_err(|e| CodecError::FormatMismatch(e.to_string()))?;
        if read != data.len() {
            return Err(CodecError::FormatMismatch(format!(
                "{} trailing bytes after the model payload",
                data.len() - read
            )));
        }
        Ok(Model::from(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::math::Vec3;
    use strata_data::model::{InstanceInfo, Mesh, Vertex};

    fn sample_model() -> Model {
        let mut model = Model::new("crate");
        model.set_meshes(vec![Mesh::new(
            vec![
                Vertex::new(Vec3::ZERO),
                Vertex::new(Vec3::X),
                Vertex::new(Vec3::Y),
            ],
            vec![0, 1, 2],
            "textures/crate.png",
        )]);
        model.add_instance(InstanceInfo::new("crate_01", Vec3::new(3.0, 0.0, 0.0)));
        model
    }

    #[test]
    fn test_round_trip_is_stable() {
        let lane = BincodeModelLane::new();
        let first = lane.serialize(&sample_model()).unwrap();
        let decoded = lane.deserialize(&first).unwrap();
        assert_eq!(lane.serialize(&decoded).unwrap(), first);
        assert_eq!(decoded.meshes()[0].textures_path(), "textures/crate.png");
        assert_eq!(decoded.instances()[0].name, "crate_01");
    }

    #[test]
    fn test_truncated_and_trailing_payloads_are_rejected() {
        let lane = BincodeModelLane::new();
        let bytes = lane.serialize(&sample_model()).unwrap();

        assert!(matches!(
            lane.deserialize(&bytes[..bytes.len() - 4]),
            Err(CodecError::FormatMismatch(_))
        ));

        let mut trailing = bytes.clone();
        trailing.extend_from_slice(&[0, 0]);
        assert!(matches!(
            lane.deserialize(&trailing),
            Err(CodecError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_hostile_length_prefix_is_rejected() {
        // The name's length prefix announces far more bytes than exist.
        let mut bytes = vec![0xFD];
        bytes.extend_from_slice(&(u64::MAX / 2).to_le_bytes());
        assert!(matches!(
            BincodeModelLane::new().deserialize(&bytes),
            Err(CodecError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_oversized_but_truncated_table_is_rejected() {
        let mut bytes = BincodeModelLane::new().serialize(&Model::new("m")).unwrap();
        // The payload ends with the three empty table lengths. Keep the instance
        // table and announce a huge LOD table with nothing behind it.
        let instances_at = bytes.len() - 3;
        bytes.truncate(instances_at + 1);
        bytes.push(0xFC);
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            BincodeModelLane::new().deserialize(&bytes),
            Err(CodecError::FormatMismatch(_))
        ));
    }
}
