// Copyright 2019 The Model Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

pub mod ast;
pub mod common;
pub mod compiler;
pub mod config;
pub mod interpreter;
pub mod runtime;
pub mod scope;
pub mod value;

pub use self::ast::{Expr, IndexExpr, Loc, SubscriptExpr};
pub use self::common::{Error, ErrorCode, ErrorKind, Ident, Result};
pub use self::compiler::{Definitions, Strategy, SubsetProgram};
pub use self::config::Config;
pub use self::interpreter::Interpreter;
pub use self::runtime::{DenseRuntime, SubsetRuntime};
pub use self::scope::{ScopeId, Scopes};
pub use self::value::{Index, IndexSpec, Matrix, Size, Value};
