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

//! Vertex welding.

use ahash::AHashMap;
use strata_data::model::Vertex;

/// Maps vertex attribute keys to the index of the first vertex emitted with them.
///
/// With an epsilon of zero the key is the exact bit pattern of every float
/// attribute. Otherwise each component is snapped to a multiple of the epsilon
/// first, and the first vertex of a cluster is the one kept.
#[derive(Debug, Default)]
pub(crate) struct WeldTable {
    epsilon: f32,
    seen: AHashMap<Vec<u32>, u32>,
}

impl WeldTable {
    pub(crate) fn new(epsilon: f32) -> Self {
        Self {
            epsilon: if epsilon.is_finite() && epsilon > 0.0 { epsilon } else { 0.0 },
            seen: AHashMap::new(),
        }
    }

    fn key(&self, vertex: &Vertex) -> Vec<u32> {
        let mut key = Vec::with_capacity(26);
        vertex.for_each_component(|c| {
            let c = if self.epsilon > 0.0 {
                (c / self.epsilon).round()
            } else {
                c
            };
            // +0.0 and -0.0 weld together.
            let c = if c == 0.0 { 0.0 } else { c };
            key.push(c.to_bits());
        });
        key
    }

    /// Returns the index of an equal vertex seen earlier, or records `next_index`
    /// for this vertex and returns `None`.
    pub(crate) fn find_or_insert(&mut self, vertex: &Vertex, next_index: u32) -> Option<u32> {
        let key = self.key(vertex);
        match self.seen.get(&key) {
            Some(index) => Some(*index),
            None => {
                self.seen.insert(key, next_index);
                None
            }
        }
    }
}
