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

//! The human-readable model strategy.

use super::{CodecError, ModelSerializationStrategy};
use strata_data::model::{Model, ModelRecord};

/// Encodes models as pretty-printed RON, for debug dumps and diffs.
///
/// Decoding is as strict as the binary lane: each record must list exactly its
/// persisted fields, in persisted order.
#[derive(Debug, Default, Clone, Copy)]
pub struct RonModelLane;

impl RonModelLane {
    /// The strategy id of this lane.
    pub const STRATEGY_ID: &'static str = "ST_MODEL_RON_V1";

    /// Creates the lane.
    pub fn new() -> Self {
        Self
    }
}

impl ModelSerializationStrategy for RonModelLane {
    fn get_strategy_id(&self) -> &'static str {
        Self::STRATEGY_ID
    }

    fn serialize(&self, model: &Model) -> Result<Vec<u8>, CodecError> {
        let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(&ModelRecord::from(model), pretty_config)
            .map(|s| s.into_bytes())
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn deserialize(&self, data: &[u8]) -> Result<Model, CodecError> {
        let record: ModelRecord = ron::de::from_bytes(data)
            .map_err(|e| CodecError::FormatMismatch(e.to_string()))?;
        Ok(Model::from(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::math::Vec3;
    use strata_data::model::TransformInfo;

    #[test]
    fn test_output_is_readable_and_round_trips() {
        let mut model = Model::new("signpost");
        model.set_instance_geometry_name("signpost_geo");
        model.set_transform(TransformInfo::new(
            Vec3::new(1.5, 0.0, -2.0),
            Vec3::ZERO,
            Vec3::ONE,
        ));

        let lane = RonModelLane::new();
        let bytes = lane.serialize(&model).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains("signpost_geo"));
        assert!(text.contains("instanced_geo_name"));

        let decoded = lane.deserialize(&bytes).unwrap();
        assert_eq!(decoded.transform(), model.transform());
        assert_eq!(lane.serialize(&decoded).unwrap(), bytes);
    }

    const TRANSFORM: &str = "(position: (x: 0.0, y: 0.0, z: 0.0), \
        rotation: (x: 0.0, y: 0.0, z: 0.0), scale: (x: 1.0, y: 1.0, z: 1.0))";

    #[test]
    fn test_hand_written_record_decodes() {
        let text = format!(
            "(name: \"m\", instanced_geo_name: \"\", transform: {TRANSFORM}, \
             instances: [], lods: [], meshes: [])"
        );
        let model = RonModelLane::new().deserialize(text.as_bytes()).unwrap();
        assert_eq!(model.name(), "m");
        assert_eq!(model.transform().scale, Vec3::ONE);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let text = format!(
            "(name: \"m\", instanced_geo_name: \"\", transform: {TRANSFORM}, \
             instances: [], lods: [], meshes: [], future_field: 42)"
        );
        assert!(matches!(
            RonModelLane::new().deserialize(text.as_bytes()),
            Err(CodecError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_reordered_fields_are_rejected() {
        let text = format!(
            "(meshes: [], lods: [], instances: [], transform: {TRANSFORM}, \
             instanced_geo_name: \"\", name: \"swapped\")"
        );
        assert!(matches!(
            RonModelLane::new().deserialize(text.as_bytes()),
            Err(CodecError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let text = format!("(name: \"m\", instanced_geo_name: \"\", transform: {TRANSFORM})");
        assert!(matches!(
            RonModelLane::new().deserialize(text.as_bytes()),
            Err(CodecError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_garbage_is_a_format_mismatch() {
        let lane = RonModelLane::new();
        assert!(matches!(
            lane.deserialize(b"(name: 12"),
            Err(CodecError::FormatMismatch(_))
        ));
    }
}
