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

//! Lanes that persist [`Model`](strata_data::model::Model)s.
//!
//! A model file is a fixed-size [`ModelHeader`] followed by a payload. The header
//! names the strategy that produced the payload, and [`ModelArchive`] uses that
//! name to pick the decoder.

mod archive;
mod header;
mod strategies;

pub use archive::*;
pub use header::*;
pub use strategies::*;
