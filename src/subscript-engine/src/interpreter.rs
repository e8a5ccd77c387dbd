// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use log::trace;
use smallvec::SmallVec;

use crate::ast::{BinaryOp, Expr, SubscriptExpr, UnaryOp};
use crate::common::{Ident, Result};
use crate::compiler::{Definitions, LoweredDim, Strategy, SubsetProgram};
use crate::runtime::SubsetRuntime;
use crate::scope::{ScopeId, Scopes};
use crate::value::{Index, IndexSpec, Size, Value};
use crate::{eval_err, subset_err};

/// Interpreter evaluates expressions and runs subset programs against a
/// subset runtime.
pub struct Interpreter<'a> {
    defs: &'a Definitions,
    runtime: &'a dyn SubsetRuntime,
    scopes: Scopes,
}

impl<'a> Interpreter<'a> {
    pub fn new(defs: &'a Definitions, runtime: &'a dyn SubsetRuntime) -> Self {
        Interpreter {
            defs,
            runtime,
            scopes: Scopes::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        self.scopes.root()
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut Scopes {
        &mut self.scopes
    }

    /// set binds a variable in the root scope.
    pub fn set(&mut self, name: &str, value: Value) {
        let root = self.scopes.root();
        self.scopes.set(root, Ident::from(name), value);
    }

    /// get looks a variable up from the root scope.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.get(self.scopes.root(), name)
    }

    pub fn eval(&mut self, expr: &Expr, scope: ScopeId) -> Result<Value> {
        match expr {
            Expr::Const(_, n, _) => Ok(Value::Number(*n)),
            Expr::Var(id, loc) => {
                if let Some(value) = self.scopes.get(scope, id.as_str()) {
                    return Ok(value.clone());
                }
                match self.defs.constant(id.as_str()) {
                    Some(value) => Ok(value.clone()),
                    None => eval_err!(UnknownVariable, format!("{id}@{loc}")),
                }
            }
            Expr::App(func, args, loc) => {
                let Some(f) = self.defs.function(func.as_str()).cloned() else {
                    return eval_err!(UnknownFunction, format!("{func}@{loc}"));
                };
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, scope))
                    .collect::<Result<Vec<_>>>()?;
                f(&args)
            }
            Expr::Op1(op, r, _) => {
                let r = self.eval(r, scope)?.as_number()?;
                Ok(Value::Number(match op {
                    UnaryOp::Positive => r,
                    UnaryOp::Negative => -r,
                }))
            }
            Expr::Op2(op, l, r, _) => {
                let l = self.eval(l, scope)?.as_number()?;
                let r = self.eval(r, scope)?.as_number()?;
                Ok(Value::Number(match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Exp => l.powf(r),
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Mod => l.rem_euclid(r),
                }))
            }
            Expr::Subscript(subscript) => {
                let program = subscript.compile(self.defs);
                self.run(&program, scope)
            }
        }
    }

    /// run executes a subset program in `scope`: the target is evaluated
    /// exactly once, its size is queried only if some dimension uses the
    /// end symbol, dimensions are evaluated in order, and the runtime is
    /// called once.
    pub fn run(&mut self, program: &SubsetProgram, scope: ScopeId) -> Result<Value> {
        let object = self.eval(program.target(), scope)?;

        let size = match program.strategy() {
            Strategy::Direct => None,
            Strategy::ShapeAware => Some(self.runtime.size(&object)?),
        };

        let mut specs: SmallVec<[IndexSpec; 4]> = SmallVec::with_capacity(program.dims().len());
        for dim in program.dims() {
            let spec = if dim.binds_end() {
                let len = dimension_len(size.as_ref(), dim)?;
                self.eval_with_end(dim, program.end_symbol(), len, scope)?
            } else {
                self.eval_dim(dim, scope)?
            };
            specs.push(spec);
        }
        let index = Index::new(specs);
        trace!("subset {} {}", program.target(), index);

        match program.replacement() {
            Some(replacement) => {
                let replacement = self.eval(replacement, scope)?;
                self.runtime.subset_set(object, &index, replacement)
            }
            None => self.runtime.subset_get(&object, &index),
        }
    }

    /// assign writes `replacement` into the positions `subscript`
    /// addresses.  When the target is a named variable the updated
    /// object is stored back under that name in `scope`.
    pub fn assign(
        &mut self,
        subscript: &SubscriptExpr,
        replacement: &Expr,
        scope: ScopeId,
    ) -> Result<Value> {
        let program = subscript.compile_subset(self.defs, Some(replacement));
        let updated = self.run(&program, scope)?;
        if let Some(name) = subscript.target_name() {
            self.scopes.set(scope, name.clone(), updated.clone());
        }
        Ok(updated)
    }

    fn eval_dim(&mut self, dim: &LoweredDim, scope: ScopeId) -> Result<IndexSpec> {
        dim.index()
            .evaluate(|expr| self.eval(expr, scope)?.as_number())
    }

    /// eval_with_end evaluates one dimension in a scope derived from
    /// `scope` where the end symbol is bound to `len`.  The derived scope
    /// is dropped again whether or not evaluation succeeds.
    fn eval_with_end(
        &mut self,
        dim: &LoweredDim,
        end_symbol: &Ident,
        len: usize,
        scope: ScopeId,
    ) -> Result<IndexSpec> {
        let derived = self.scopes.derive(scope);
        self.scopes
            .set(derived, end_symbol.clone(), Value::Number(len as f64));
        let spec = self.eval_dim(dim, derived);
        self.scopes.discard(derived);
        spec
    }
}

fn dimension_len(size: Option<&Size>, dim: &LoweredDim) -> Result<usize> {
    match size.and_then(|size| size.get(dim.axis())) {
        Some(len) => Ok(*len),
        None => subset_err!(
            MismatchedDimensions,
            format!(
                "no size for dimension {} (target has {} dimension(s))",
                dim.axis(),
                size.map(|size| size.len()).unwrap_or(0)
            )
        ),
    }
}
