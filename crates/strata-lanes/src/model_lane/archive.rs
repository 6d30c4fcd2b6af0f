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

//! Goal-driven model persistence.

use super::{
    BincodeModelLane, CodecError, ModelFile, ModelHeader, ModelSerializationStrategy, RonModelLane,
};
use ahash::AHashMap;
use strata_core::serialization::SerializationGoal;
use strata_data::model::Model;

/// Saves models according to a [`SerializationGoal`] and loads them back by the
/// strategy id recorded in their header.
pub struct ModelArchive {
    strategies: AHashMap<String, Box<dyn ModelSerializationStrategy>>,
}

impl ModelArchive {
    /// Creates an archive with the built-in binary and RON strategies registered.
    pub fn new() -> Self {
        let mut archive = Self {
            strategies: AHashMap::new(),
        };
        archive.register(Box::new(BincodeModelLane::new()));
        archive.register(Box::new(RonModelLane::new()));
        archive
    }

    /// Adds a strategy, replacing any registered under the same id.
    pub fn register(&mut self, strategy: Box<dyn ModelSerializationStrategy>) {
        self.strategies
            .insert(strategy.get_strategy_id().to_string(), strategy);
    }

    /// The strategy id chosen for `goal`.
    pub fn strategy_id_for(goal: SerializationGoal) -> &'static str {
        match goal {
            SerializationGoal::FastestLoad | SerializationGoal::SmallestFileSize => {
                BincodeModelLane::STRATEGY_ID
            }
            SerializationGoal::HumanReadableDebug | SerializationGoal::LongTermStability => {
                RonModelLane::STRATEGY_ID
            }
        }
    }

    fn strategy(&self, id: &str) -> Result<&dyn ModelSerializationStrategy, CodecError> {
        self.strategies
            .get(id)
            .map(|s| &**s)
            .ok_or_else(|| CodecError::FormatMismatch(format!("unknown strategy '{id}'")))
    }

    /// Encodes a model into a file with the strategy that best serves `goal`.
    pub fn save(&self, model: &Model, goal: SerializationGoal) -> Result<ModelFile, CodecError> {
        let strategy = self.strategy(Self::strategy_id_for(goal))?;
        let payload = strategy.serialize(model)?;
        let header = ModelHeader::new(strategy.get_strategy_id(), payload.len() as u64)?;
        log::debug!(
            "Encoded model '{}' with {} ({} payload bytes)",
            model.name(),
            strategy.get_strategy_id(),
            payload.len()
        );
        Ok(ModelFile { header, payload })
    }

    /// Decodes a model file with the strategy named in its header.
    pub fn load(&self, file: &ModelFile) -> Result<Model, CodecError> {
        let id = file.header.strategy_id()?;
        let model = self.strategy(id)?.deserialize(&file.payload)?;
        log::debug!("Decoded model '{}' with {}", model.name(), id);
        Ok(model)
    }

    /// Encodes a model straight to file bytes.
    pub fn encode(&self, model: &Model, goal: SerializationGoal) -> Result<Vec<u8>, CodecError> {
        self.save(model, goal).map(|file| file.to_bytes())
    }

    /// Decodes a model from file bytes.
    pub fn decode(&self, bytes: &[u8]) -> Result<Model, CodecError> {
        self.load(&ModelFile::from_bytes(bytes)?)
    }
}

impl Default for ModelArchive {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_mapping() {
        assert_eq!(
            ModelArchive::strategy_id_for(SerializationGoal::FastestLoad),
            "ST_MODEL_BIN_V1"
        );
        assert_eq!(
            ModelArchive::strategy_id_for(SerializationGoal::HumanReadableDebug),
            "ST_MODEL_RON_V1"
        );
    }

    #[test]
    fn test_header_names_the_strategy_used() {
        let archive = ModelArchive::new();
        let model = Model::new("empty");
        let file = archive
            .save(&model, SerializationGoal::HumanReadableDebug)
            .unwrap();
        assert_eq!(file.header.strategy_id().unwrap(), RonModelLane::STRATEGY_ID);
        assert_eq!(file.header.payload_length, file.payload.len() as u64);
        assert_eq!(archive.load(&file).unwrap().name(), "empty");
    }

    #[test]
    fn test_unknown_strategy_is_a_format_mismatch() {
        let archive = ModelArchive::new();
        let file = ModelFile {
            header: ModelHeader::new("ST_MODEL_XML_V9", 0).unwrap(),
            payload: Vec::new(),
        };
        assert!(matches!(
            archive.load(&file),
            Err(CodecError::FormatMismatch(_))
        ));
    }
}
