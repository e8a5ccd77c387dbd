// Copyright 2025 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use float_cmp::approx_eq;
use smallvec::SmallVec;

use crate::common::Result;
use crate::{eval_err, subset_err};

/// Per-dimension lengths of a collection, outermost dimension first.
pub type Size = SmallVec<[usize; 4]>;

#[derive(PartialEq, Clone, Debug)]
pub enum Value {
    Number(f64),
    Matrix(Matrix),
}

impl Value {
    pub fn as_number(&self) -> Result<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Matrix(m) => eval_err!(
                ExpectedNumber,
                format!("expected a number, found a matrix of size {:?}", m.size())
            ),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::Matrix(m)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Matrix(m) => {
                let data: Vec<String> = m.data.iter().map(|n| format!("{n}")).collect();
                let size: Vec<String> = m.size.iter().map(|n| format!("{n}")).collect();
                write!(f, "matrix(size: [{}], data: [{}])", size.join(", "), data.join(", "))
            }
        }
    }
}

/// Matrix is dense, row-major storage: the last dimension varies fastest.
#[derive(PartialEq, Clone, Debug)]
pub struct Matrix {
    size: Size,
    strides: SmallVec<[usize; 4]>,
    data: Vec<f64>,
}

fn row_major_strides(size: &[usize]) -> SmallVec<[usize; 4]> {
    let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, size.len());
    // Build strides from right to left for row-major order
    for i in (0..size.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * size[i + 1];
    }
    strides
}

impl Matrix {
    pub fn new(size: &[usize], data: Vec<f64>) -> Result<Self> {
        let expected: usize = size.iter().product();
        if data.len() != expected {
            return subset_err!(
                MismatchedDimensions,
                format!(
                    "size {:?} needs {} elements, got {}",
                    size,
                    expected,
                    data.len()
                )
            );
        }
        Ok(Matrix {
            size: Size::from_slice(size),
            strides: row_major_strides(size),
            data,
        })
    }

    pub fn zeros(size: &[usize]) -> Self {
        let len = size.iter().product();
        Matrix {
            size: Size::from_slice(size),
            strides: row_major_strides(size),
            data: vec![0.0; len],
        }
    }

    /// from_rows builds a 2-dimensional matrix; every row must have the
    /// same length.
    pub fn from_rows(rows: &[&[f64]]) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != cols) {
            return subset_err!(MismatchedDimensions, "ragged rows".to_owned());
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(&[rows.len(), cols], data)
    }

    pub fn size(&self) -> &[usize] {
        &self.size
    }

    pub fn ndim(&self) -> usize {
        self.size.len()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// offset of a 0-based position; the caller ensures it is in bounds.
    pub(crate) fn offset(&self, position: &[usize]) -> usize {
        position
            .iter()
            .zip(self.strides.iter())
            .map(|(p, stride)| p * stride)
            .sum()
    }

    /// get returns the element at a 0-based position, or None if the
    /// position has the wrong rank or is out of bounds.
    pub fn get(&self, position: &[usize]) -> Option<f64> {
        if position.len() != self.size.len()
            || position.iter().zip(self.size.iter()).any(|(p, n)| p >= n)
        {
            return None;
        }
        Some(self.data[self.offset(position)])
    }
}

/// IndexSpec is the 0-based specification for a single dimension, as
/// produced by lowering and consumed by the subset runtime.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum IndexSpec {
    Scalar(f64),
    /// half-open in the direction of `step`: `end` itself is never
    /// included.
    Range { start: f64, end: f64, step: f64 },
}

fn as_integer(n: f64, what: &str) -> Result<i64> {
    if !n.is_finite() || !approx_eq!(f64, n, n.round()) {
        return subset_err!(ExpectedInteger, format!("{what} must be an integer, got {n}"));
    }
    Ok(n.round() as i64)
}

fn as_position(n: i64, len: usize) -> Result<usize> {
    match usize::try_from(n) {
        Ok(p) if p < len => Ok(p),
        Ok(p) => subset_err!(
            IndexOutOfRange,
            format!("position {p} out of range for size {len}")
        ),
        Err(_) => subset_err!(IndexOutOfRange, format!("negative position {n}")),
    }
}

impl IndexSpec {
    pub fn is_scalar(&self) -> bool {
        matches!(self, IndexSpec::Scalar(_))
    }

    /// positions expands this specification into the 0-based positions
    /// it addresses, in iteration order.
    pub fn positions(&self) -> Result<Vec<usize>> {
        self.positions_within(usize::MAX)
    }

    /// positions_within is `positions` for a dimension of length `len`:
    /// expansion stops with `IndexOutOfRange` at the first position
    /// `>= len`, so the result never holds more than `len` entries.
    pub fn positions_within(&self, len: usize) -> Result<Vec<usize>> {
        match *self {
            IndexSpec::Scalar(n) => Ok(vec![as_position(as_integer(n, "index")?, len)?]),
            IndexSpec::Range { start, end, step } => {
                let start = as_integer(start, "range start")?;
                let end = as_integer(end, "range end")?;
                let step = as_integer(step, "range step")?;
                if step == 0 {
                    return subset_err!(ZeroStep, "range step must not be zero".to_owned());
                }

                let mut positions = Vec::new();
                let mut next = Some(start);
                while let Some(i) = next {
                    if (step > 0 && i >= end) || (step < 0 && i <= end) {
                        break;
                    }
                    positions.push(as_position(i, len)?);
                    // past i64 is past `end` too
                    next = i.checked_add(step);
                }
                Ok(positions)
            }
        }
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSpec::Scalar(n) => write!(f, "{n}"),
            IndexSpec::Range { start, end, step } => write!(f, "[{start}, {end}, {step}]"),
        }
    }
}

/// Index is the index object handed to the subset runtime: one
/// specification per dimension, in dimension order.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct Index(SmallVec<[IndexSpec; 4]>);

impl Index {
    pub fn new(specs: impl IntoIterator<Item = IndexSpec>) -> Self {
        Index(specs.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// is_scalar is true when every dimension addresses a single position.
    pub fn is_scalar(&self) -> bool {
        self.0.iter().all(|spec| spec.is_scalar())
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexSpec> {
        self.0.iter()
    }

    pub fn specs(&self) -> &[IndexSpec] {
        &self.0
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let specs: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "index({})", specs.join(", "))
    }
}
