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

//! Pipeline configuration, read from a `Strata.toml` manifest.
//!
//! ```toml
//! [import]
//! optimize = true
//! z_up = false
//! weld_epsilon = 0.0
//!
//! [output]
//! goal = "fastest_load"
//! ```
//!
//! Every key is optional. Missing keys take their defaults.

use crate::asset_lane::{FlattenSettings, GeometryFlattenerLane};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strata_core::serialization::SerializationGoal;
use thiserror::Error;

/// An error raised while loading a [`PipelineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The manifest exists but could not be read.
    #[error("failed to read '{}'", path.display())]
    Io {
        /// The manifest path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The manifest is not valid TOML or has the wrong shape.
    #[error("failed to parse pipeline config")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but is out of range.
    #[error("weld_epsilon must be finite and non-negative, got {0}")]
    InvalidWeldEpsilon(f32),
}

/// The `[output]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// What saved models should optimize for.
    pub goal: SerializationGoal,
}

/// The whole pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Flattener settings.
    pub import: FlattenSettings,
    /// Encoding settings.
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// The conventional manifest name.
    pub const FILE_NAME: &'static str = "Strata.toml";

    /// Parses a manifest from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses the manifest at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded pipeline config from '{}'", path.display());
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the default configuration.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::info!(
                "No '{}' found. Using default pipeline configuration.",
                path.display()
            );
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let epsilon = self.import.weld_epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ConfigError::InvalidWeldEpsilon(epsilon));
        }
        Ok(())
    }

    /// A flattener lane configured from the `[import]` table.
    pub fn flattener(&self) -> GeometryFlattenerLane {
        GeometryFlattenerLane::new(self.import)
    }
}
