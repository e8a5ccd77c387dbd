// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use super::{Expr, IndexExpr, Loc, Visitor, print_eqn};
use crate::common::Ident;

/// SubscriptExpr is `target[dim0, dim1, ...]`: the object being indexed
/// and one entry per axis, in axis order.
///
/// The number of entries is not checked against the target's
/// dimensionality here; that is left to the subset runtime.
#[derive(PartialEq, Clone, Debug)]
pub struct SubscriptExpr {
    target: Box<Expr>,
    dimensions: Vec<IndexExpr>,
    loc: Loc,
}

impl SubscriptExpr {
    pub fn new(target: Expr, dimensions: Vec<IndexExpr>, loc: Loc) -> Self {
        SubscriptExpr {
            target: Box::new(target),
            dimensions,
            loc,
        }
    }

    pub fn target(&self) -> &Expr {
        &self.target
    }

    pub fn dimensions(&self) -> &[IndexExpr] {
        &self.dimensions
    }

    pub fn loc(&self) -> Loc {
        self.loc
    }

    /// target_name is the name of the indexed variable, for callers
    /// that need to store an updated object back (e.g. `a[2] = 1`).
    /// Only plain variable targets have a name.
    pub fn target_name(&self) -> Option<&Ident> {
        match self.target.as_ref() {
            Expr::Var(id, _) => Some(id),
            _ => None,
        }
    }

    /// find searches the target and then every dimension entry in
    /// order. The subscript itself is matched by `Expr::find` on the
    /// enclosing `Expr::Subscript`.
    pub fn find<P>(&self, predicate: &P) -> Vec<&Expr>
    where
        P: Fn(&Expr) -> bool,
    {
        let mut found = Vec::new();
        self.find_into(predicate, &mut found);
        found
    }

    pub(crate) fn find_into<'a, P>(&'a self, predicate: &P, found: &mut Vec<&'a Expr>)
    where
        P: Fn(&Expr) -> bool,
    {
        self.target.find_into(predicate, found);
        for dim in self.dimensions.iter() {
            dim.find_into(predicate, found);
        }
    }
}

impl fmt::Display for SubscriptExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the target needs the same parenthesization as when the
        // subscript is printed as part of a larger expression
        let target = match self.target.as_ref() {
            t @ (Expr::Op1(_, _, _) | Expr::Op2(_, _, _, _)) => format!("({})", print_eqn(t)),
            t => print_eqn(t),
        };
        let mut visitor = super::PrintVisitor {};
        let dims: Vec<String> = self
            .dimensions
            .iter()
            .map(|d| visitor.walk_index(d))
            .collect();
        write!(f, "{}[{}]", target, dims.join(", "))
    }
}
