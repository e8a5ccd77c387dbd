// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

// Re-export all common types from subscript-core
pub use subscript_core::common::*;

// Macros for error creation - these need to stay in subscript-engine
// as they use crate-local paths

#[macro_export]
macro_rules! eval_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Evaluation,
            ErrorCode::$code,
            Some($str),
        ))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Evaluation, ErrorCode::$code, None))
    }};
}

#[macro_export]
macro_rules! subset_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Subset, ErrorCode::$code, Some($str)))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Subset, ErrorCode::$code, None))
    }};
}

#[macro_export]
macro_rules! config_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Config,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[test]
fn test_error_macros() {
    let err: Result<()> = eval_err!(UnknownVariable, "end".to_owned());
    let err = err.unwrap_err();
    assert_eq!(ErrorKind::Evaluation, err.kind);
    assert_eq!(ErrorCode::UnknownVariable, err.code);
    assert_eq!(Some("end".to_owned()), err.details);

    let err: Result<()> = subset_err!(ZeroStep);
    assert_eq!(ErrorKind::Subset, err.unwrap_err().kind);

    let err: Result<()> = config_err!(BadConfig, "empty".to_owned());
    assert_eq!(ErrorCode::BadConfig, err.unwrap_err().code);
}
