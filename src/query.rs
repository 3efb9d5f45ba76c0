// Copyright 2024 Saptak Santra
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

//! Query results.
//!
//! A query only ever caches *which entities* match a signature
//! (`World`'s `query_cache`, keyed by the OR-combined bitmask and tagged
//! with `world_version`). It never caches the values themselves: a
//! [`QueryRow`] resolves `get` against the live [`ComponentRegistry`] on
//! every call, so a direct `update_value` between two reads of the same
//! query is visible without needing to invalidate anything.

use crate::entity::EntityId;
use crate::registry::ComponentRegistry;

/// One matched entity from a query, with lazy, always-live access to its
/// component values.
pub struct QueryRow<'w> {
    entity: EntityId,
    registry: &'w ComponentRegistry,
}

impl<'w> QueryRow<'w> {
    pub(crate) fn new(entity: EntityId, registry: &'w ComponentRegistry) -> Self {
        Self { entity, registry }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// The current value of component type `ty` for this row's entity, or
    /// `None` if the entity does not carry `ty` (it was not part of the
    /// query's required set) or it was never written.
    pub fn get(&self, ty: std::any::TypeId) -> Option<&'w [f64]> {
        self.registry.column(&ty)?.get_value(self.entity).ok()
    }
}
