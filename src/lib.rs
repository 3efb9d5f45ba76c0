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

//! Archetype ECS core
//!
//! Signature-grouped archetype storage, a stable-handle numeric component
//! column, a cached query path, an ordered/grouped system scheduler, and a
//! double-buffered event bus.

pub mod archetype;
pub mod column;
pub mod component;
pub mod entity;
pub mod error;
pub mod event_bus;
pub mod numeric_column;
pub mod prelude;
pub mod query;
pub mod registry;
pub mod system;
pub mod world;

pub use archetype::Archetype;
pub use column::ComponentColumn;
pub use component::{Component, ComponentTypeId, ComponentValue};
pub use entity::EntityId;
pub use error::{EcsError, Result};
pub use event_bus::{Event, EventBus, SubscriptionId};
pub use numeric_column::StableNumericColumn;
pub use query::QueryRow;
pub use registry::ComponentRegistry;
pub use system::{BoxedSystem, System, SystemEntry};
pub use world::World;
