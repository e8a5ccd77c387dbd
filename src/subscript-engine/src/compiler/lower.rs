// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::ast::{Expr, IndexExpr};
use crate::common::Result;
use crate::value::IndexSpec;

/// Step used for ranges written without one (`a:b`).
pub(crate) const DEFAULT_STEP: f64 = 1.0;

// How far a range's inclusive 1-based upper bound moves to become the
// bound the half-open 0-based range stops at.
const ASCENDING_END_SHIFT: f64 = 0.0;
const DESCENDING_END_SHIFT: f64 = 2.0;

/// zero_based_scalar turns a user-facing 1-based position into the
/// 0-based position the runtime expects.
pub fn zero_based_scalar(one_based: f64) -> IndexSpec {
    IndexSpec::Scalar(one_based - 1.0)
}

/// zero_based_range turns an inclusive 1-based `start:step:end` into
/// `[start - 1, end - (step > 0 ? 0 : 2), step]`.
pub fn zero_based_range(start: f64, end: f64, step: f64) -> IndexSpec {
    let shift = if step > 0.0 {
        ASCENDING_END_SHIFT
    } else {
        DESCENDING_END_SHIFT
    };
    IndexSpec::Range {
        start: start - 1.0,
        end: end - shift,
        step,
    }
}

/// LoweredIndex is one dimension of a subscript after lowering: the
/// source expressions to evaluate, and whether they form a range or a
/// single position.  The 1-based to 0-based shift is applied to the
/// evaluated values by `evaluate`.
#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq)]
pub enum LoweredIndex<'a> {
    Scalar(&'a Expr),
    Range {
        start: &'a Expr,
        end: &'a Expr,
        step: Option<&'a Expr>,
    },
}

impl<'a> LoweredIndex<'a> {
    /// evaluate computes the 0-based specification, using `eval` for
    /// each source expression.  For ranges the step is evaluated first,
    /// then start, then end.
    pub fn evaluate<E>(&self, mut eval: E) -> Result<IndexSpec>
    where
        E: FnMut(&'a Expr) -> Result<f64>,
    {
        match *self {
            LoweredIndex::Scalar(expr) => Ok(zero_based_scalar(eval(expr)?)),
            LoweredIndex::Range { start, end, step } => {
                let step = match step {
                    Some(step) => eval(step)?,
                    None => DEFAULT_STEP,
                };
                let start = eval(start)?;
                let end = eval(end)?;
                Ok(zero_based_range(start, end, step))
            }
        }
    }
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq)]
pub struct LoweredDim<'a> {
    axis: usize,
    binds_end: bool,
    index: LoweredIndex<'a>,
}

impl<'a> LoweredDim<'a> {
    /// axis is the position of this dimension in the subscript, and so
    /// the entry of the size vector `end` resolves to.
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// binds_end is true when the dimension mentions the end symbol
    /// and must be evaluated in a scope where it is bound.
    pub fn binds_end(&self) -> bool {
        self.binds_end
    }

    pub fn index(&self) -> &LoweredIndex<'a> {
        &self.index
    }
}

pub(crate) fn lower_dimension<'a>(
    axis: usize,
    dim: &'a IndexExpr,
    end_symbol: &str,
) -> LoweredDim<'a> {
    let binds_end = dim.references(end_symbol);
    let index = match dim {
        IndexExpr::Range(start, end, step, _) => LoweredIndex::Range {
            start,
            end,
            step: step.as_ref(),
        },
        IndexExpr::Expr(expr) => LoweredIndex::Scalar(expr),
    };
    LoweredDim {
        axis,
        binds_end,
        index,
    }
}
