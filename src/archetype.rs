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

//! Archetype: the set of entities sharing one exact component-type
//! signature.
//!
//! Unlike a byte-blob archetype that owns its own columns, this archetype
//! holds no component data at all - only the signature, the dense list of
//! member entities, and the index map needed for O(1) removal. Actual
//! values live in the world-owned [`crate::registry::ComponentRegistry`];
//! every entry an archetype's type set implies is present there for every
//! one of its entities (invariant A1).

use std::any::TypeId;

use rustc_hash::FxHashMap;

use crate::entity::EntityId;

/// The set of component types that defines an archetype. Order is not
/// significant; two archetypes with the same types in different order are
/// the same archetype, identified by `signature()`, an OR-combined bitmask.
pub type ArchetypeSignature = Vec<TypeId>;

/// A group of entities sharing an exact component-type signature.
#[derive(Debug)]
pub struct Archetype {
    signature: u64,
    component_types: ArchetypeSignature,
    entities: Vec<EntityId>,
    index_map: FxHashMap<EntityId, usize>,
}

impl Archetype {
    pub fn new(signature: u64, component_types: ArchetypeSignature) -> Self {
        Self {
            signature,
            component_types,
            entities: Vec::new(),
            index_map: FxHashMap::default(),
        }
    }

    /// The bitmask signature this archetype is keyed by.
    pub fn signature(&self) -> u64 {
        self.signature
    }

    /// The component types present on every entity in this archetype.
    pub fn component_types(&self) -> &[TypeId] {
        &self.component_types
    }

    pub fn has_type(&self, ty: &TypeId) -> bool {
        self.component_types.contains(ty)
    }

    /// Add `entity` to this archetype. The caller is responsible for
    /// ensuring the entity is not already a member of another archetype;
    /// membership is exclusive at the `World` level, not enforced here.
    pub fn add_entity(&mut self, entity: EntityId) {
        let index = self.entities.len();
        self.entities.push(entity);
        self.index_map.insert(entity, index);
    }

    /// Remove `entity` from this archetype via swap-with-last. Returns
    /// `true` if the entity was a member. If the removed row was not the
    /// last one, the entity that used to occupy the last row now occupies
    /// the vacated row - callers that track per-entity row indices outside
    /// this archetype must re-read `index_of` for the swapped entity.
    pub fn remove_entity(&mut self, entity: EntityId) -> bool {
        let Some(&index) = self.index_map.get(&entity) else {
            return false;
        };

        let last = self.entities.len() - 1;
        self.entities.swap(index, last);
        self.entities.pop();
        self.index_map.remove(&entity);

        if index < self.entities.len() {
            let moved = self.entities[index];
            self.index_map.insert(moved, index);
        }

        true
    }

    pub fn index_of(&self, entity: EntityId) -> Option<usize> {
        self.index_map.get(&entity).copied()
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
