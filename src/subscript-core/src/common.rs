// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::borrow::Borrow;
use std::fmt;
use std::{error, result};

use serde::{Deserialize, Serialize};

/// The name of a variable or function as it appears in an expression.
///
/// Names are case sensitive and are never rewritten; `end` and `End`
/// are different symbols.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ident(String);

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Ident(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident(name.to_owned())
    }
}

impl From<String> for Ident {
    fn from(name: String) -> Self {
        Ident(name)
    }
}

impl Borrow<str> for Ident {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Ident {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError, // will never be produced
    Generic,
    BadConfig,
    UnknownVariable,
    UnknownFunction,
    BadFunctionArgs,
    ExpectedNumber,
    ExpectedInteger,
    NotIndexable,
    MismatchedDimensions,
    IndexOutOfRange,
    ZeroStep,
    BadReplacement,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            Generic => "generic",
            BadConfig => "bad_config",
            UnknownVariable => "unknown_variable",
            UnknownFunction => "unknown_function",
            BadFunctionArgs => "bad_function_args",
            ExpectedNumber => "expected_number",
            ExpectedInteger => "expected_integer",
            NotIndexable => "not_indexable",
            MismatchedDimensions => "mismatched_dimensions",
            IndexOutOfRange => "index_out_of_range",
            ZeroStep => "zero_step",
            BadReplacement => "bad_replacement",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Evaluation,
    Subset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl From<Box<dyn std::error::Error>> for Error {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        Error {
            kind: ErrorKind::Evaluation,
            code: ErrorCode::Generic,
            details: Some(err.to_string()),
        }
    }
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Config => "ConfigError",
            ErrorKind::Evaluation => "EvaluationError",
            ErrorKind::Subset => "SubsetError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Evaluation,
        ErrorCode::UnknownVariable,
        Some("end".to_owned()),
    );
    assert_eq!("EvaluationError{unknown_variable: end}", format!("{err}"));

    let err = Error::new(ErrorKind::Subset, ErrorCode::ZeroStep, None);
    assert_eq!("SubsetError{zero_step}", format!("{err}"));
    assert_eq!(None, err.get_details());
}

#[test]
fn test_ident_is_case_sensitive() {
    let a = Ident::from("end");
    let b = Ident::new("End".to_string());
    assert_ne!(a, b);
    assert_eq!(a, "end");
    assert_eq!("End", b.as_str());
    assert_eq!("end", a.to_string());
}
