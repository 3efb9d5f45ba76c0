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

//! Error types

use std::fmt;

/// ECS error type
#[derive(Debug, Clone, PartialEq)]
pub enum EcsError {
    /// Unknown entity id, missing component row, or missing subscription.
    NotFound,

    /// Attempt to add a component already present on an entity, or to add a
    /// row for an entity already present in a column.
    InvalidState,

    /// A value's length does not match the component's dimension.
    InvalidDimension { expected: usize, got: usize },

    /// Attempt to override an already-registered component instance.
    AlreadyRegistered,

    /// Argument shape/value is invalid for the requested operation (e.g. a
    /// matrix assignment whose shape does not match the column's shape, or a
    /// component registry that has exhausted its 64-bit signature space).
    InvalidArgument(String),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::NotFound => write!(f, "not found"),
            EcsError::InvalidState => write!(f, "invalid state"),
            EcsError::InvalidDimension { expected, got } => {
                write!(f, "expected value with {expected} dimensions, got {got}")
            }
            EcsError::AlreadyRegistered => write!(f, "component type already registered"),
            EcsError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
