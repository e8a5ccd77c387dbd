// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Lowering of subscript expressions into subset programs.
//!
//! A `SubsetProgram` is the executable form of `target[dims...]`: the
//! target to evaluate, the 0-based producer for every dimension, and
//! (for assignments) the replacement value.  Programs borrow the AST
//! they were lowered from and never modify it, so a node can be
//! compiled any number of times.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::ast::{Expr, SubscriptExpr};
use crate::common::{Ident, Result};
use crate::config::Config;
use crate::value::Value;

mod lower;
pub mod pretty;

pub use lower::{LoweredDim, LoweredIndex, zero_based_range, zero_based_scalar};

pub type Function = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// Definitions are the functions and constants globally available to
/// compiled programs, along with the active configuration.
#[derive(Clone, Default)]
pub struct Definitions {
    functions: HashMap<Ident, Function>,
    constants: HashMap<Ident, Value>,
    config: Config,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Definitions {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn define_fn<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.functions.insert(Ident::from(name), Rc::new(f));
    }

    pub fn define_const(&mut self, name: &str, value: Value) {
        self.constants.insert(Ident::from(name), value);
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants.get(name)
    }
}

/// Strategy says whether a program needs the target's size vector.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Strategy {
    /// no dimension mentions the end symbol: evaluate the target and
    /// subset it directly
    Direct,
    /// evaluate the target once, query its size, and bind the end
    /// symbol per dimension from that single size vector
    ShapeAware,
}

#[cfg_attr(feature = "debug-derive", derive(Debug))]
#[derive(Clone, PartialEq)]
pub struct SubsetProgram<'a> {
    target: &'a Expr,
    dims: Vec<LoweredDim<'a>>,
    replacement: Option<&'a Expr>,
    end_symbol: Ident,
    strategy: Strategy,
}

impl<'a> SubsetProgram<'a> {
    pub fn target(&self) -> &'a Expr {
        self.target
    }

    pub fn dims(&self) -> &[LoweredDim<'a>] {
        &self.dims
    }

    pub fn replacement(&self) -> Option<&'a Expr> {
        self.replacement
    }

    /// is_set is true for the assignment form.
    pub fn is_set(&self) -> bool {
        self.replacement.is_some()
    }

    pub fn end_symbol(&self) -> &Ident {
        &self.end_symbol
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

impl SubscriptExpr {
    /// compile lowers this subscript into a read of the addressed
    /// positions.
    pub fn compile<'a>(&'a self, defs: &Definitions) -> SubsetProgram<'a> {
        self.compile_subset(defs, None)
    }

    /// compile_subset lowers this subscript into a subset program.  With
    /// a `replacement` the program writes it into the addressed
    /// positions and yields the updated object; without one it reads
    /// them.
    pub fn compile_subset<'a>(
        &'a self,
        defs: &Definitions,
        replacement: Option<&'a Expr>,
    ) -> SubsetProgram<'a> {
        let end_symbol = Ident::from(defs.config().end_symbol.as_str());

        let dims: Vec<LoweredDim<'a>> = self
            .dimensions()
            .iter()
            .enumerate()
            .map(|(axis, dim)| lower::lower_dimension(axis, dim, end_symbol.as_str()))
            .collect();

        let strategy = if dims.iter().any(|dim| dim.binds_end()) {
            Strategy::ShapeAware
        } else {
            Strategy::Direct
        };

        debug!(
            "compiled {} ({} dimension(s), {:?}, {})",
            self,
            dims.len(),
            strategy,
            if replacement.is_some() { "set" } else { "get" }
        );

        SubsetProgram {
            target: self.target(),
            dims,
            replacement,
            end_symbol,
            strategy,
        }
    }
}
