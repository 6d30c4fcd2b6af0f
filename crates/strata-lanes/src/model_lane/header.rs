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

//! Defines the container format of Strata model files.

use super::CodecError;

/// Identifies a Strata model file ("STRATMDL").
pub const MODEL_MAGIC_BYTES: [u8; 8] = *b"STRATMDL";
/// The header layout version this crate reads and writes.
pub const MODEL_FORMAT_VERSION: u8 = 1;
const STRATEGY_ID_LEN: usize = 32;

/// The fixed-size header at the start of every model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHeader {
    /// Must equal [`MODEL_MAGIC_BYTES`].
    pub magic_bytes: [u8; 8],
    /// Version of the header layout.
    pub format_version: u8,
    /// Null-padded UTF-8 id of the strategy that wrote the payload, e.g. `"ST_MODEL_BIN_V1"`.
    pub strategy_id: [u8; STRATEGY_ID_LEN],
    /// Length of the payload that follows, in bytes.
    pub payload_length: u64,
}

// The header is written by hand rather than through serde so its layout never
// depends on an encoder's configuration.
impl ModelHeader {
    /// The total size of the header in bytes.
    pub const SIZE: usize = 8 + 1 + STRATEGY_ID_LEN + 8;

    /// Creates a current-version header.
    pub fn new(strategy_id: &str, payload_length: u64) -> Result<Self, CodecError> {
        let id = strategy_id.as_bytes();
        if id.is_empty() || id.len() > STRATEGY_ID_LEN {
            return Err(CodecError::Encode(format!(
                "strategy id '{strategy_id}' must be 1 to {STRATEGY_ID_LEN} bytes"
            )));
        }
        let mut padded = [0u8; STRATEGY_ID_LEN];
        padded[..id.len()].copy_from_slice(id);
        Ok(Self {
            magic_bytes: MODEL_MAGIC_BYTES,
            format_version: MODEL_FORMAT_VERSION,
            strategy_id: padded,
            payload_length,
        })
    }

    /// The strategy id without its null padding.
    pub fn strategy_id(&self) -> Result<&str, CodecError> {
        std::str::from_utf8(&self.strategy_id)
            .map(|s| s.trim_end_matches('\0'))
            .map_err(|_| CodecError::FormatMismatch("strategy id is not valid UTF-8".into()))
    }

    /// Writes the header in its on-disk layout. Integers are little-endian.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.magic_bytes);
        bytes[8] = self.format_version;
        bytes[9..9 + STRATEGY_ID_LEN].copy_from_slice(&self.strategy_id);
        bytes[9 + STRATEGY_ID_LEN..].copy_from_slice(&self.payload_length.to_le_bytes());
        bytes
    }

    /// Parses and validates a header from the beginning of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < Self::SIZE {
            return Err(CodecError::FormatMismatch(format!(
                "{} bytes is too short for a {}-byte model header",
                bytes.len(),
                Self::SIZE
            )));
        }

        let mut magic_bytes = [0u8; 8];
        magic_bytes.copy_from_slice(&bytes[0..8]);
        if magic_bytes != MODEL_MAGIC_BYTES {
            return Err(CodecError::FormatMismatch(
                "invalid magic bytes; not a Strata model file".into(),
            ));
        }

        let format_version = bytes[8];
        if format_version != MODEL_FORMAT_VERSION {
            return Err(CodecError::FormatMismatch(format!(
                "unsupported model format version {format_version}"
            )));
        }

        let mut strategy_id = [0u8; STRATEGY_ID_LEN];
        strategy_id.copy_from_slice(&bytes[9..9 + STRATEGY_ID_LEN]);

        let mut length = [0u8; 8];
        length.copy_from_slice(&bytes[9 + STRATEGY_ID_LEN..Self::SIZE]);

        Ok(Self {
            magic_bytes,
            format_version,
            strategy_id,
            payload_length: u64::from_le_bytes(length),
        })
    }
}

/// A whole model file in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFile {
    /// The parsed header.
    pub header: ModelHeader,
    /// The payload, exactly `header.payload_length` bytes.
    pub payload: Vec<u8>,
}

impl ModelFile {
    /// Concatenates header and payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ModelHeader::SIZE + self.payload.len());
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Splits raw file bytes into header and payload.
    ///
    /// The payload must be exactly as long as the header says: a shorter file is
    /// truncated and a longer one has trailing garbage, and both are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let header = ModelHeader::from_bytes(bytes)?;
        let payload = &bytes[ModelHeader::SIZE..];
        if payload.len() as u64 != header.payload_length {
            return Err(CodecError::FormatMismatch(format!(
                "header announces {} payload bytes but {} follow",
                header.payload_length,
                payload.len()
            )));
        }
        Ok(Self {
            header,
            payload: payload.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = ModelHeader::new("ST_MODEL_BIN_V1", 42).unwrap();
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), 49);
        assert_eq!(&bytes[0..8], b"STRATMDL");
        assert_eq!(bytes[8], MODEL_FORMAT_VERSION);
        assert_eq!(&bytes[41..49], &42u64.to_le_bytes());
        assert_eq!(ModelHeader::from_bytes(&bytes).unwrap(), header);
        assert_eq!(header.strategy_id().unwrap(), "ST_MODEL_BIN_V1");
    }

    #[test]
    fn test_header_rejects_bad_input() {
        let good = ModelHeader::new("X", 0).unwrap().to_bytes();

        assert!(ModelHeader::from_bytes(&good[..10]).is_err());

        let mut bad_magic = good;
        bad_magic[0] = b'K';
        assert!(matches!(
            ModelHeader::from_bytes(&bad_magic),
            Err(CodecError::FormatMismatch(_))
        ));

        let mut bad_version = good;
        bad_version[8] = 99;
        assert!(matches!(
            ModelHeader::from_bytes(&bad_version),
            Err(CodecError::FormatMismatch(_))
        ));

        assert!(matches!(
            ModelHeader::new(&"x".repeat(33), 0),
            Err(CodecError::Encode(_))
        ));
    }

    #[test]
    fn test_file_payload_length_must_match() {
        let file = ModelFile {
            header: ModelHeader::new("X", 3).unwrap(),
            payload: vec![1, 2, 3],
        };
        let bytes = file.to_bytes();
        assert_eq!(ModelFile::from_bytes(&bytes).unwrap(), file);

        assert!(ModelFile::from_bytes(&bytes[..bytes.len() - 1]).is_err());

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(ModelFile::from_bytes(&trailing).is_err());
    }
}
