// Copyright 2025 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use log::trace;

use crate::common::Result;
use crate::subset_err;
use crate::value::{Index, Matrix, Size, Value};

/// SubsetRuntime is what an emitted subset procedure calls into once
/// the target and index have been evaluated.
pub trait SubsetRuntime {
    /// size returns the length of every dimension of `value`.
    fn size(&self, value: &Value) -> Result<Size>;

    /// subset_get reads the positions addressed by `index`.
    fn subset_get(&self, value: &Value, index: &Index) -> Result<Value>;

    /// subset_set writes `replacement` into the positions addressed by
    /// `index` and returns the updated object.
    fn subset_set(&self, value: Value, index: &Index, replacement: Value) -> Result<Value>;
}

/// DenseRuntime implements subsetting for `Value::Matrix`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DenseRuntime;

/// Positions addressed by an index, one list per dimension, checked
/// against the matrix bounds.
fn resolve(matrix: &Matrix, index: &Index) -> Result<Vec<Vec<usize>>> {
    if index.len() != matrix.ndim() {
        return subset_err!(
            MismatchedDimensions,
            format!(
                "{} dimension(s) indexed, matrix has {}",
                index.len(),
                matrix.ndim()
            )
        );
    }

    let mut all = Vec::with_capacity(index.len());
    for (spec, &len) in index.iter().zip(matrix.size().iter()) {
        all.push(spec.positions_within(len)?);
    }
    Ok(all)
}

/// for_each_position calls `f` with every combination of positions,
/// last dimension varying fastest.
fn for_each_position<F>(positions: &[Vec<usize>], mut f: F)
where
    F: FnMut(&[usize]),
{
    if positions.iter().any(|p| p.is_empty()) {
        return;
    }
    let mut counters = vec![0usize; positions.len()];
    let mut current: Vec<usize> = positions.iter().map(|p| p[0]).collect();
    loop {
        f(&current);

        // increment from the right, like an odometer
        let mut dim = positions.len();
        loop {
            if dim == 0 {
                return;
            }
            dim -= 1;
            counters[dim] += 1;
            if counters[dim] < positions[dim].len() {
                current[dim] = positions[dim][counters[dim]];
                break;
            }
            counters[dim] = 0;
            current[dim] = positions[dim][0];
        }
    }
}

fn expect_matrix<'a>(value: &'a Value, op: &str) -> Result<&'a Matrix> {
    match value {
        Value::Matrix(m) => Ok(m),
        Value::Number(n) => subset_err!(NotIndexable, format!("cannot {op} scalar {n}")),
    }
}

impl SubsetRuntime for DenseRuntime {
    fn size(&self, value: &Value) -> Result<Size> {
        let matrix = expect_matrix(value, "query the size of")?;
        trace!("size query: {:?}", matrix.size());
        Ok(Size::from_slice(matrix.size()))
    }

    fn subset_get(&self, value: &Value, index: &Index) -> Result<Value> {
        let matrix = expect_matrix(value, "subset")?;
        let positions = resolve(matrix, index)?;

        if index.is_scalar() {
            let position: Vec<usize> = positions.iter().map(|p| p[0]).collect();
            return Ok(Value::Number(matrix.data()[matrix.offset(&position)]));
        }

        let size: Vec<usize> = positions.iter().map(|p| p.len()).collect();
        let mut data = Vec::with_capacity(size.iter().product());
        for_each_position(&positions, |position| {
            data.push(matrix.data()[matrix.offset(position)]);
        });
        Ok(Value::Matrix(Matrix::new(&size, data)?))
    }

    fn subset_set(&self, value: Value, index: &Index, replacement: Value) -> Result<Value> {
        let mut matrix = match value {
            Value::Matrix(m) => m,
            Value::Number(n) => {
                return subset_err!(NotIndexable, format!("cannot assign into scalar {n}"));
            }
        };
        let positions = resolve(&matrix, index)?;
        let count: usize = positions.iter().map(|p| p.len()).product();

        let mut offsets = Vec::with_capacity(count);
        for_each_position(&positions, |position| offsets.push(matrix.offset(position)));

        match replacement {
            Value::Number(n) => {
                let data = matrix.data_mut();
                for off in offsets {
                    data[off] = n;
                }
            }
            Value::Matrix(src) => {
                if src.data().len() != count {
                    return subset_err!(
                        BadReplacement,
                        format!(
                            "replacement has {} element(s), index addresses {}",
                            src.data().len(),
                            count
                        )
                    );
                }
                let data = matrix.data_mut();
                for (off, n) in offsets.into_iter().zip(src.data().iter()) {
                    data[off] = *n;
                }
            }
        }

        Ok(Value::Matrix(matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;
    use crate::value::IndexSpec;

    fn a_3x4() -> Value {
        let data = (1..=12).map(|n| n as f64).collect();
        Value::Matrix(Matrix::new(&[3, 4], data).unwrap())
    }

    fn range(start: f64, end: f64, step: f64) -> IndexSpec {
        IndexSpec::Range { start, end, step }
    }

    #[test]
    fn test_size() {
        let size = DenseRuntime.size(&a_3x4()).unwrap();
        assert_eq!(&[3, 4], size.as_slice());

        let err = DenseRuntime.size(&Value::Number(1.0)).unwrap_err();
        assert_eq!(ErrorCode::NotIndexable, err.code);
    }

    #[test]
    fn test_get_scalar() {
        let index = Index::new([IndexSpec::Scalar(1.0), IndexSpec::Scalar(2.0)]);
        assert_eq!(
            Value::Number(7.0),
            DenseRuntime.subset_get(&a_3x4(), &index).unwrap()
        );
    }

    #[test]
    fn test_get_row_slice() {
        // second row, first three columns
        let index = Index::new([IndexSpec::Scalar(1.0), range(0.0, 3.0, 1.0)]);
        let expected = Matrix::new(&[1, 3], vec![5.0, 6.0, 7.0]).unwrap();
        assert_eq!(
            Value::Matrix(expected),
            DenseRuntime.subset_get(&a_3x4(), &index).unwrap()
        );
    }

    #[test]
    fn test_get_reversed_column() {
        let index = Index::new([range(2.0, -1.0, -1.0), IndexSpec::Scalar(0.0)]);
        let expected = Matrix::new(&[3, 1], vec![9.0, 5.0, 1.0]).unwrap();
        assert_eq!(
            Value::Matrix(expected),
            DenseRuntime.subset_get(&a_3x4(), &index).unwrap()
        );
    }

    #[test]
    fn test_get_errors() {
        let index = Index::new([IndexSpec::Scalar(3.0), IndexSpec::Scalar(0.0)]);
        let err = DenseRuntime.subset_get(&a_3x4(), &index).unwrap_err();
        assert_eq!(ErrorCode::IndexOutOfRange, err.code);

        let index = Index::new([IndexSpec::Scalar(0.0)]);
        let err = DenseRuntime.subset_get(&a_3x4(), &index).unwrap_err();
        assert_eq!(ErrorCode::MismatchedDimensions, err.code);

        let err = DenseRuntime
            .subset_get(&Value::Number(2.0), &index)
            .unwrap_err();
        assert_eq!(ErrorCode::NotIndexable, err.code);
    }

    #[test]
    fn test_huge_range_on_small_matrix() {
        let v = Value::Matrix(Matrix::new(&[3], vec![1.0, 2.0, 3.0]).unwrap());
        let index = Index::new([range(0.0, 1e10, 1.0)]);

        let err = DenseRuntime.subset_get(&v, &index).unwrap_err();
        assert_eq!(ErrorCode::IndexOutOfRange, err.code);

        let err = DenseRuntime
            .subset_set(v, &index, Value::Number(0.0))
            .unwrap_err();
        assert_eq!(ErrorCode::IndexOutOfRange, err.code);

        let index = Index::new([range(0.0, 1e19, 5e18)]);
        let err = DenseRuntime.subset_get(&a_3x4(), &index).unwrap_err();
        assert_eq!(ErrorCode::MismatchedDimensions, err.code);
        let index = Index::new([IndexSpec::Scalar(0.0), range(0.0, 1e19, 5e18)]);
        let err = DenseRuntime.subset_get(&a_3x4(), &index).unwrap_err();
        assert_eq!(ErrorCode::IndexOutOfRange, err.code);
    }

    #[test]
    fn test_set_broadcast_and_matrix() {
        let index = Index::new([range(0.0, 3.0, 1.0), IndexSpec::Scalar(3.0)]);
        let updated = DenseRuntime
            .subset_set(a_3x4(), &index, Value::Number(0.0))
            .unwrap();
        let Value::Matrix(m) = updated else {
            panic!("expected matrix");
        };
        assert_eq!(Some(0.0), m.get(&[0, 3]));
        assert_eq!(Some(0.0), m.get(&[2, 3]));
        assert_eq!(Some(11.0), m.get(&[2, 2]));

        let index = Index::new([IndexSpec::Scalar(0.0), range(1.0, 3.0, 1.0)]);
        let src = Matrix::new(&[2], vec![-1.0, -2.0]).unwrap();
        let updated = DenseRuntime
            .subset_set(a_3x4(), &index, Value::Matrix(src))
            .unwrap();
        let Value::Matrix(m) = updated else {
            panic!("expected matrix");
        };
        assert_eq!(&[1.0, -1.0, -2.0, 4.0], &m.data()[0..4]);
    }

    #[test]
    fn test_set_bad_replacement() {
        let index = Index::new([IndexSpec::Scalar(0.0), range(0.0, 4.0, 1.0)]);
        let src = Matrix::new(&[3], vec![1.0, 2.0, 3.0]).unwrap();
        let err = DenseRuntime
            .subset_set(a_3x4(), &index, Value::Matrix(src))
            .unwrap_err();
        assert_eq!(ErrorCode::BadReplacement, err.code);
    }
}
