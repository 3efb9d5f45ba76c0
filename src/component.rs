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

//! Component trait, type identity, and component values.
//!
//! A component type describes a fixed-dimension record of `f64` fields. The
//! type itself carries no data (it is a marker, typically a zero-sized
//! struct); per-world storage for it lives in a [`crate::column::ComponentColumn`]
//! owned by the [`crate::registry::ComponentRegistry`].

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::{smallvec, SmallVec};

/// Inline capacity for component value tuples before spilling to the heap.
/// Covers the common 1-4 dimensional cases (scalars, 2D/3D vectors, quaternions).
pub const INLINE_DIMENSIONS: usize = 4;

/// A component type: a fixed-dimension record of `f64` fields.
///
/// Implement this for a zero-sized marker type to register it with a world.
/// `DIMENSIONS` must be >= 1.
pub trait Component: 'static {
    /// Number of `f64` lanes stored per entity for this component.
    const DIMENSIONS: usize;

    /// Default value assigned to an entity when none is supplied. A tuple of
    /// zeros unless overridden.
    fn default_value() -> SmallVec<[f64; INLINE_DIMENSIONS]> {
        smallvec![0.0; Self::DIMENSIONS]
    }
}

/// Type-erased handle identifying a registered component type within a
/// world. Carries enough information (dimension, default constructor) for
/// the registry to lazily materialize a column the first time the type is
/// seen, without requiring the caller to register it up front.
#[derive(Clone, Copy)]
pub struct ComponentTypeId {
    type_id: TypeId,
    dims: usize,
    default_ctor: fn() -> SmallVec<[f64; INLINE_DIMENSIONS]>,
    name: &'static str,
}

impl ComponentTypeId {
    /// Build the handle for component type `T`.
    pub fn of<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            dims: T::DIMENSIONS,
            default_ctor: T::default_value,
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn default_value(&self) -> SmallVec<[f64; INLINE_DIMENSIONS]> {
        (self.default_ctor)()
    }
}

impl PartialEq for ComponentTypeId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentTypeId {}

impl Hash for ComponentTypeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTypeId")
            .field("name", &self.name)
            .field("dims", &self.dims)
            .finish()
    }
}

/// A value to store for one entity's component: either a bare scalar
/// (accepted for 1-dimensional components) or an explicit tuple.
#[derive(Debug, Clone)]
pub enum ComponentValue {
    Scalar(f64),
    Tuple(SmallVec<[f64; INLINE_DIMENSIONS]>),
}

impl ComponentValue {
    pub fn as_slice(&self) -> SmallVec<[f64; INLINE_DIMENSIONS]> {
        match self {
            ComponentValue::Scalar(v) => smallvec![*v],
            ComponentValue::Tuple(t) => t.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ComponentValue::Scalar(_) => 1,
            ComponentValue::Tuple(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<f64> for ComponentValue {
    fn from(v: f64) -> Self {
        ComponentValue::Scalar(v)
    }
}

impl From<&[f64]> for ComponentValue {
    fn from(v: &[f64]) -> Self {
        ComponentValue::Tuple(SmallVec::from_slice(v))
    }
}

impl From<Vec<f64>> for ComponentValue {
    fn from(v: Vec<f64>) -> Self {
        ComponentValue::Tuple(SmallVec::from_vec(v))
    }
}

// Tuple conveniences for the common low-arity cases; written out explicitly
// rather than via a generic macro since `ComponentValue` only ever wraps
// `f64` lanes, so there is no arity-independent generic to factor out.
impl From<(f64,)> for ComponentValue {
    fn from((a,): (f64,)) -> Self {
        ComponentValue::Tuple(smallvec![a])
    }
}

impl From<(f64, f64)> for ComponentValue {
    fn from((a, b): (f64, f64)) -> Self {
        ComponentValue::Tuple(smallvec![a, b])
    }
}

impl From<(f64, f64, f64)> for ComponentValue {
    fn from((a, b, c): (f64, f64, f64)) -> Self {
        ComponentValue::Tuple(smallvec![a, b, c])
    }
}

impl From<(f64, f64, f64, f64)> for ComponentValue {
    fn from((a, b, c, d): (f64, f64, f64, f64)) -> Self {
        ComponentValue::Tuple(smallvec![a, b, c, d])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;
    impl Component for Position {
        const DIMENSIONS: usize = 2;
    }

    struct Mass;
    impl Component for Mass {
        const DIMENSIONS: usize = 1;
    }

    #[test]
    fn type_id_equality_ignores_metadata() {
        let a = ComponentTypeId::of::<Position>();
        let b = ComponentTypeId::of::<Position>();
        assert_eq!(a, b);
        let c = ComponentTypeId::of::<Mass>();
        assert_ne!(a, c);
    }

    #[test]
    fn default_value_is_zero_tuple() {
        assert_eq!(Position::default_value().as_slice(), &[0.0, 0.0]);
        assert_eq!(Mass::default_value().as_slice(), &[0.0]);
    }

    #[test]
    fn scalar_value_widens_to_one_tuple() {
        let v: ComponentValue = 4.0.into();
        assert_eq!(v.as_slice().as_slice(), &[4.0]);
    }

    #[test]
    fn tuple_value_from_literal_tuple() {
        let v: ComponentValue = (1.0, 2.0).into();
        assert_eq!(v.as_slice().as_slice(), &[1.0, 2.0]);
    }
}
