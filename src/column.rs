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

//! Per-component-type dense storage.
//!
//! A [`ComponentColumn`] is the single source of truth for one component
//! type's values across the whole world: a [`StableNumericColumn`] addressed
//! by row, plus the entity<->row mapping that makes the row stable under
//! removal (swap-with-last) and reusable (a LIFO free list of rows vacated
//! by prior removals).

use rustc_hash::FxHashMap;

use crate::entity::EntityId;
use crate::error::{EcsError, Result};
use crate::numeric_column::StableNumericColumn;

const INITIAL_CAPACITY: usize = 8;

/// Dense storage for every entity carrying a given component type.
#[derive(Debug)]
pub struct ComponentColumn {
    data: StableNumericColumn,
    entity_to_row: FxHashMap<EntityId, usize>,
    row_to_entity: Vec<EntityId>,
    free_rows: Vec<usize>,
    size: usize,
}

impl ComponentColumn {
    /// Create an empty column for a `dims`-dimensional component type.
    pub fn new(dims: usize) -> Self {
        Self {
            data: StableNumericColumn::new(INITIAL_CAPACITY, dims),
            entity_to_row: FxHashMap::default(),
            row_to_entity: Vec::new(),
            free_rows: Vec::new(),
            size: 0,
        }
    }

    /// Number of entities currently stored.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Backing row capacity (>= `size()`).
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn dims(&self) -> usize {
        self.data.dims()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entity_to_row.contains_key(&entity)
    }

    /// Add a row for `entity`. Rejects an entity already present (C2).
    /// `values` must have length equal to the column's dimension (C3), or be
    /// `None` to fall back to the caller-supplied default.
    pub fn add(&mut self, entity: EntityId, values: &[f64]) -> Result<usize> {
        if self.entity_to_row.contains_key(&entity) {
            return Err(EcsError::InvalidState);
        }
        if values.len() != self.data.dims() {
            return Err(EcsError::InvalidDimension {
                expected: self.data.dims(),
                got: values.len(),
            });
        }

        let row = if let Some(row) = self.free_rows.pop() {
            row
        } else {
            let row = self.size;
            if row >= self.data.capacity() {
                self.data.ensure_capacity(row + 1);
            }
            row
        };

        self.data.write(row, values)?;
        self.entity_to_row.insert(entity, row);
        if row < self.row_to_entity.len() {
            self.row_to_entity[row] = entity;
        } else {
            self.row_to_entity.resize(row + 1, entity);
            self.row_to_entity[row] = entity;
        }
        self.size += 1;
        Ok(row)
    }

    /// Remove `entity`'s row, if present. A no-op (returns `false`) if the
    /// entity has no row in this column - callers are expected to check
    /// presence via the archetype's type set first, so this path is mostly
    /// defensive.
    ///
    /// Internally this is swap-with-last: unless the removed row is already
    /// the last live row, the last live row's contents are copied down into
    /// the vacated row and its owner is retargeted to that row, keeping the
    /// live rows packed into `[0, size)`. The vacated last row is then
    /// pushed onto the free list for reuse by a future `add`.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let Some(row) = self.entity_to_row.remove(&entity) else {
            return false;
        };

        let last = self.size - 1;
        if row != last {
            let moved_entity = *self
                .row_to_entity
                .get(last)
                .expect("invariant violation: last row has no tracked owner (C1)");
            let last_values = self.data.read(last).to_vec();
            self.data
                .write(row, &last_values)
                .expect("row within capacity after swap");
            self.entity_to_row.insert(moved_entity, row);
            self.row_to_entity[row] = moved_entity;
        }

        self.free_rows.push(last);
        self.size -= 1;
        true
    }

    /// Overwrite `entity`'s stored value. Fails if the entity has no row
    /// (C-entity not present) or if `values` has the wrong dimension.
    pub fn update_value(&mut self, entity: EntityId, values: &[f64]) -> Result<()> {
        let row = *self.entity_to_row.get(&entity).ok_or(EcsError::NotFound)?;
        self.data.write(row, values)
    }

    /// Current value for `entity`, or `NotFound` if it has no row.
    pub fn get_value(&self, entity: EntityId) -> Result<&[f64]> {
        let row = *self.entity_to_row.get(&entity).ok_or(EcsError::NotFound)?;
        Ok(self.data.read(row))
    }

    pub fn row_of(&self, entity: EntityId) -> Option<usize> {
        self.entity_to_row.get(&entity).copied()
    }
}
