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

//! System trait and the scheduler's per-system bookkeeping.
//!
//! Systems run in ascending priority order, lower first, ties broken by
//! registration order. A disabled system is skipped entirely (its
//! `update` is not called); a system erroring is fatal to the whole
//! `update_systems` call - there is no partial-failure recovery, matching
//! the reference scheduler's unguarded iteration.

use crate::error::Result;
use crate::world::World;

/// A unit of per-tick behavior attached to a `World`.
///
/// Only `update` is required; the rest have no-op defaults so a system
/// that needs no setup/teardown/reset logic can implement just the one
/// method.
pub trait System {
    /// Called once, the moment the system is registered.
    fn initialize(&mut self, _world: &mut World) -> Result<()> {
        Ok(())
    }

    /// Called every tick the system is enabled, in priority order.
    fn update(&mut self, world: &mut World) -> Result<()>;

    /// Called when the system is removed from the world (not currently
    /// exposed as a public `World` operation, but part of the trait so a
    /// future `remove_system` can call it without a breaking change).
    fn shutdown(&mut self, _world: &mut World) -> Result<()> {
        Ok(())
    }

    /// Reset any internal state the system accumulated, without removing
    /// it from the scheduler.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    /// Display name used in diagnostics. Defaults to the Rust type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

pub type BoxedSystem = Box<dyn System>;

/// A registered system plus the scheduling metadata the teacher's scheduler
/// keeps alongside it.
pub struct SystemEntry {
    pub priority: f64,
    pub enabled: bool,
    pub name: String,
    pub group: Option<String>,
    pub system: BoxedSystem,
}

impl SystemEntry {
    pub fn new(system: BoxedSystem, priority: f64, name: String, group: Option<String>) -> Self {
        Self {
            priority,
            enabled: true,
            name,
            group,
            system,
        }
    }
}
