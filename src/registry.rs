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

//! Component registry: the world-owned map from component type to its
//! signature bit and its [`ComponentColumn`].
//!
//! Bits are assigned lazily, in first-seen order, starting at `1` (bit 0 is
//! reserved so a signature of `0` unambiguously means "no components").
//! Columns are likewise materialized lazily on first use so that
//! `World::create_entity`/`query` never require advance registration.

use std::any::TypeId;

use rustc_hash::FxHashMap;

use crate::column::ComponentColumn;
use crate::component::ComponentTypeId;
use crate::error::{EcsError, Result};

/// Owns every component type's signature bit and backing column.
#[derive(Default)]
pub struct ComponentRegistry {
    bits: FxHashMap<TypeId, u64>,
    next_bit: u32,
    columns: FxHashMap<TypeId, ComponentColumn>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            bits: FxHashMap::default(),
            next_bit: 0,
            columns: FxHashMap::default(),
        }
    }

    /// Register a component type, optionally supplying a pre-built column
    /// (e.g. pre-sized via [`ComponentColumn::new`] with extra spare
    /// capacity) to back it instead of a freshly constructed one.
    ///
    /// If the type is not yet known, the bit is assigned and `column` is
    /// installed (or a fresh default-capacity column, if `None`). If the
    /// type is already known, supplying `Some(column)` is rejected with
    /// `AlreadyRegistered` - a world has exactly one column per component
    /// type for its lifetime, so a second explicit column can never be
    /// swapped in. Supplying `None` for an already-known type is a no-op
    /// success, matching the idempotent re-registration every call site
    /// that only cares "has this type been seen" relies on.
    pub fn register(&mut self, ty: &ComponentTypeId, column: Option<ComponentColumn>) -> Result<()> {
        self.bit_of(ty)?;
        if self.columns.contains_key(&ty.type_id()) {
            return if column.is_some() {
                Err(EcsError::AlreadyRegistered)
            } else {
                Ok(())
            };
        }
        self.columns
            .insert(ty.type_id(), column.unwrap_or_else(|| ComponentColumn::new(ty.dimensions())));
        Ok(())
    }

    /// The signature bit for `ty`, assigning one lazily if not yet seen.
    /// Errors once all 64 bits have been handed out.
    pub fn bit_of(&mut self, ty: &ComponentTypeId) -> Result<u64> {
        if let Some(bit) = self.bits.get(&ty.type_id()) {
            return Ok(*bit);
        }
        if self.next_bit >= 64 {
            return Err(EcsError::InvalidArgument(format!(
                "component registry exhausted: cannot assign a signature bit to {}, \
                 64 component types are already registered",
                ty.name()
            )));
        }
        let bit = 1u64 << self.next_bit;
        self.next_bit += 1;
        self.bits.insert(ty.type_id(), bit);
        Ok(bit)
    }

    /// OR-combined signature for a set of component types, assigning bits
    /// lazily for any not yet seen.
    pub fn compute_signature(&mut self, types: &[ComponentTypeId]) -> Result<u64> {
        let mut signature = 0u64;
        for ty in types {
            signature |= self.bit_of(ty)?;
        }
        Ok(signature)
    }

    /// The column for `ty`, materializing it (with a signature bit) if this
    /// is the first time it has been seen.
    pub fn column_mut_or_insert(&mut self, ty: &ComponentTypeId) -> Result<&mut ComponentColumn> {
        self.bit_of(ty)?;
        Ok(self
            .columns
            .entry(ty.type_id())
            .or_insert_with(|| ComponentColumn::new(ty.dimensions())))
    }

    /// The column for `ty`, if it has ever been registered or written to.
    /// Does not auto-create - used by read paths like `query` that must not
    /// silently materialize storage for a type nobody asked for.
    pub fn column(&self, ty: &TypeId) -> Option<&ComponentColumn> {
        self.columns.get(ty)
    }

    pub fn column_mut(&mut self, ty: &TypeId) -> Option<&mut ComponentColumn> {
        self.columns.get_mut(ty)
    }

    pub fn is_registered(&self, ty: &TypeId) -> bool {
        self.bits.contains_key(ty)
    }

    pub fn registered_count(&self) -> usize {
        self.bits.len()
    }
}
