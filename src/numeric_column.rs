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

//! Stable numeric column: a resizable (capacity, dims) matrix of `f64`
//! addressed by row index, with amortized-doubling growth.
//!
//! The "stable handle" requirement in the source design (callers may hold a
//! reference across growth) falls out of the Rust API shape for free: the
//! matrix's backing `Vec<f64>` is never exposed directly, only through
//! `&StableNumericColumn` / row indices, so there is nothing for a caller to
//! hold that `ensure_capacity` could invalidate other than the struct
//! itself, which does not move when its buffer reallocates.

use crate::error::{EcsError, Result};

/// Growth factor applied when a column outgrows its capacity.
pub const GROWTH_FACTOR: f64 = 1.5;

/// Sentinel value for an absent row.
pub const SENTINEL: f64 = f64::NAN;

/// A (capacity, dims) matrix of `f64`, row-major, grown by amortized doubling.
#[derive(Debug, Clone)]
pub struct StableNumericColumn {
    dims: usize,
    rows: usize,
    data: Vec<f64>,
}

impl StableNumericColumn {
    /// Create a column with `capacity` rows of `dims` lanes, filled with the
    /// sentinel.
    pub fn new(capacity: usize, dims: usize) -> Self {
        Self {
            dims,
            rows: capacity,
            data: vec![SENTINEL; capacity * dims],
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Underlying matrix row count (not the number of live entities).
    pub fn capacity(&self) -> usize {
        self.rows
    }

    /// Current contents of `row`, valid until the next mutation of this column.
    pub fn read(&self, row: usize) -> &[f64] {
        let start = row * self.dims;
        &self.data[start..start + self.dims]
    }

    /// Current contents of rows `[lo, hi)`, as one contiguous slice.
    pub fn read_range(&self, lo: usize, hi: usize) -> &[f64] {
        &self.data[lo * self.dims..hi * self.dims]
    }

    /// Replace the contents of `row`. Fails if `row >= capacity()`.
    pub fn write(&mut self, row: usize, values: &[f64]) -> Result<()> {
        if row >= self.rows {
            return Err(EcsError::InvalidArgument(format!(
                "row {row} is out of bounds for capacity {}",
                self.rows
            )));
        }
        if values.len() != self.dims {
            return Err(EcsError::InvalidDimension {
                expected: self.dims,
                got: values.len(),
            });
        }
        let start = row * self.dims;
        self.data[start..start + self.dims].copy_from_slice(values);
        Ok(())
    }

    /// Grow so that `capacity() >= min_rows`, new rows filled with the
    /// sentinel. The new capacity is `max(min_rows, capacity * 1.5)`. A
    /// no-op if already large enough.
    pub fn ensure_capacity(&mut self, min_rows: usize) {
        if min_rows <= self.rows {
            return;
        }
        let grown = ((self.rows as f64) * GROWTH_FACTOR).ceil() as usize;
        let new_rows = min_rows.max(grown);
        let mut new_data = vec![SENTINEL; new_rows * self.dims];
        new_data[..self.data.len()].copy_from_slice(&self.data);
        self.data = new_data;
        self.rows = new_rows;
    }

    /// Shrink to exactly `new_rows`, discarding rows `>= new_rows`. A no-op
    /// if `new_rows >= capacity()`.
    pub fn shrink_to(&mut self, new_rows: usize) {
        if new_rows >= self.rows {
            return;
        }
        self.data.truncate(new_rows * self.dims);
        self.rows = new_rows;
    }
}

macro_rules! impl_scalar_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl std::ops::$trait<f64> for &StableNumericColumn {
            type Output = StableNumericColumn;
            fn $method(self, rhs: f64) -> StableNumericColumn {
                StableNumericColumn {
                    dims: self.dims,
                    rows: self.rows,
                    data: self.data.iter().map(|v| v $op rhs).collect(),
                }
            }
        }
    };
}

impl_scalar_op!(Add, add, +);
impl_scalar_op!(Sub, sub, -);
impl_scalar_op!(Mul, mul, *);
impl_scalar_op!(Div, div, /);

impl std::ops::Add<&StableNumericColumn> for &StableNumericColumn {
    type Output = Result<StableNumericColumn>;

    /// Elementwise sum of two same-shape columns. Ufunc-style batch
    /// operation: convenient for systems that want to treat a column as a
    /// plain numeric matrix, not load-bearing for the ECS contract itself.
    fn add(self, rhs: &StableNumericColumn) -> Result<StableNumericColumn> {
        if self.dims != rhs.dims || self.rows != rhs.rows {
            return Err(EcsError::InvalidArgument(
                "mismatched column shapes".to_string(),
            ));
        }
        Ok(StableNumericColumn {
            dims: self.dims,
            rows: self.rows,
            data: self
                .data
                .iter()
                .zip(rhs.data.iter())
                .map(|(a, b)| a + b)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_column_is_all_sentinel() {
        let col = StableNumericColumn::new(3, 2);
        for row in 0..3 {
            assert!(col.read(row).iter().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut col = StableNumericColumn::new(2, 2);
        col.write(0, &[1.0, 2.0]).unwrap();
        assert_eq!(col.read(0), &[1.0, 2.0]);
    }

    #[test]
    fn write_rejects_wrong_dimension() {
        let mut col = StableNumericColumn::new(2, 2);
        assert_eq!(
            col.write(0, &[1.0]),
            Err(EcsError::InvalidDimension {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn write_rejects_out_of_bounds_row() {
        let mut col = StableNumericColumn::new(2, 2);
        assert!(col.write(5, &[1.0, 2.0]).is_err());
    }

    #[test]
    fn ensure_capacity_grows_by_amortized_doubling() {
        let mut col = StableNumericColumn::new(2, 1);
        col.write(0, &[1.0]).unwrap();
        col.write(1, &[2.0]).unwrap();
        col.ensure_capacity(3);
        // max(3, ceil(2 * 1.5)) == 3
        assert_eq!(col.capacity(), 3);
        assert_eq!(col.read(0), &[1.0]);
        assert_eq!(col.read(1), &[2.0]);
        assert!(col.read(2)[0].is_nan());
    }

    #[test]
    fn ensure_capacity_is_noop_when_already_big_enough() {
        let mut col = StableNumericColumn::new(10, 1);
        col.ensure_capacity(4);
        assert_eq!(col.capacity(), 10);
    }

    #[test]
    fn shrink_to_discards_trailing_rows() {
        let mut col = StableNumericColumn::new(4, 1);
        col.write(0, &[1.0]).unwrap();
        col.write(1, &[2.0]).unwrap();
        col.shrink_to(2);
        assert_eq!(col.capacity(), 2);
        assert_eq!(col.read(0), &[1.0]);
        assert_eq!(col.read(1), &[2.0]);
    }

    #[test]
    fn scalar_mul_produces_new_column() {
        let mut col = StableNumericColumn::new(1, 2);
        col.write(0, &[2.0, 3.0]).unwrap();
        let doubled = &col * 2.0;
        assert_eq!(doubled.read(0), &[4.0, 6.0]);
        // original untouched
        assert_eq!(col.read(0), &[2.0, 3.0]);
    }
}
