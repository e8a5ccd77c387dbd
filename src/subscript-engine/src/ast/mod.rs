// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use crate::common::Ident;

mod subscript;

pub use subscript::SubscriptExpr;

/// Loc describes a location in an expression by the starting point and ending point.
/// Index expressions are typed by humans -- u16 is long enough.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Hash)]
pub struct Loc {
    pub start: u16,
    pub end: u16,
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl Loc {
    pub fn new(start: usize, end: usize) -> Self {
        Loc {
            start: start as u16,
            end: end as u16,
        }
    }

    /// union takes a second Loc and returns the inclusive range from the
    /// start of the earlier token to the end of the later token.
    pub fn union(&self, rhs: &Self) -> Self {
        Loc {
            start: self.start.min(rhs.start),
            end: self.end.max(rhs.end),
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum UnaryOp {
    Positive,
    Negative,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Exp,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    // higher the precedence, the tighter the binding.
    // e.g. Mul.precedence() > Add.precedence()
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Add => 4,
            BinaryOp::Sub => 4,
            BinaryOp::Exp => 6,
            BinaryOp::Mul => 5,
            BinaryOp::Div => 5,
            BinaryOp::Mod => 5,
        }
    }

    /// associative ops can drop parens around an equal-precedence right operand
    fn is_associative(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Mul)
    }

    fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Exp => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "mod",
        }
    }
}

/// Expr is a node of an expression tree as handed to us by the builder.
/// Nodes are immutable once built; lowering only ever borrows them.
#[derive(PartialEq, Clone, Debug)]
pub enum Expr {
    Const(String, f64, Loc),
    Var(Ident, Loc),
    App(Ident, Vec<Expr>, Loc),
    Op1(UnaryOp, Box<Expr>, Loc),
    Op2(BinaryOp, Box<Expr>, Box<Expr>, Loc),
    Subscript(Box<SubscriptExpr>),
}

/// IndexExpr is a single dimension entry of a subscript: either a
/// 1-based, end-inclusive range or a plain expression used as a
/// single position.
#[derive(PartialEq, Clone, Debug)]
pub enum IndexExpr {
    // start, end, optional step
    Range(Expr, Expr, Option<Expr>, Loc),
    Expr(Expr),
}

impl Expr {
    pub fn num(n: f64) -> Self {
        Expr::Const(format!("{n}"), n, Loc::default())
    }

    pub fn var(name: &str) -> Self {
        Expr::Var(Ident::from(name), Loc::default())
    }

    pub fn neg(expr: Expr) -> Self {
        Expr::Op1(UnaryOp::Negative, Box::new(expr), Loc::default())
    }

    pub fn op2(op: BinaryOp, l: Expr, r: Expr) -> Self {
        Expr::Op2(op, Box::new(l), Box::new(r), Loc::default())
    }

    pub fn app(func: &str, args: Vec<Expr>) -> Self {
        Expr::App(Ident::from(func), args, Loc::default())
    }

    pub fn subscript(target: Expr, dimensions: Vec<IndexExpr>) -> Self {
        Expr::Subscript(Box::new(SubscriptExpr::new(
            target,
            dimensions,
            Loc::default(),
        )))
    }

    pub fn get_loc(&self) -> Loc {
        match self {
            Expr::Const(_, _, loc) => *loc,
            Expr::Var(_, loc) => *loc,
            Expr::App(_, _, loc) => *loc,
            Expr::Op1(_, _, loc) => *loc,
            Expr::Op2(_, _, _, loc) => *loc,
            Expr::Subscript(subscript) => subscript.loc(),
        }
    }

    /// is_symbol is true for a variable reference with exactly this name.
    pub fn is_symbol(&self, name: &str) -> bool {
        matches!(self, Expr::Var(id, _) if id.as_str() == name)
    }

    /// find returns every node in this tree (including this one) for
    /// which `predicate` holds, in pre-order: a node comes before its
    /// children, and children are visited left to right.
    ///
    /// Only `Expr` nodes are candidates.  A range entry of a subscript is
    /// searched through (start, end, then step) but is never returned
    /// itself.
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
        if predicate(self) {
            found.push(self);
        }
        match self {
            Expr::Const(_, _, _) | Expr::Var(_, _) => {}
            Expr::App(_, args, _) => {
                for arg in args.iter() {
                    arg.find_into(predicate, found);
                }
            }
            Expr::Op1(_, r, _) => r.find_into(predicate, found),
            Expr::Op2(_, l, r, _) => {
                l.find_into(predicate, found);
                r.find_into(predicate, found);
            }
            Expr::Subscript(subscript) => subscript.find_into(predicate, found),
        }
    }
}

impl IndexExpr {
    pub fn range(start: Expr, end: Expr) -> Self {
        IndexExpr::Range(start, end, None, Loc::default())
    }

    pub fn range_step(start: Expr, step: Expr, end: Expr) -> Self {
        IndexExpr::Range(start, end, Some(step), Loc::default())
    }

    pub fn get_loc(&self) -> Loc {
        match self {
            IndexExpr::Range(_, _, _, loc) => *loc,
            IndexExpr::Expr(e) => e.get_loc(),
        }
    }

    /// find searches the expressions making up this dimension entry:
    /// start, end and step for a range, the expression itself otherwise.
    /// The range itself is not an `Expr` and never matches.
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
        match self {
            IndexExpr::Range(start, end, step, _) => {
                start.find_into(predicate, found);
                end.find_into(predicate, found);
                if let Some(step) = step {
                    step.find_into(predicate, found);
                }
            }
            IndexExpr::Expr(e) => e.find_into(predicate, found),
        }
    }

    /// references reports whether any expression in this entry is the
    /// symbol `name`.
    pub fn references(&self, name: &str) -> bool {
        !self.find(&|e: &Expr| e.is_symbol(name)).is_empty()
    }
}

/// Visitors walk Expr ASTs.
pub trait Visitor<T> {
    fn walk_index(&mut self, e: &IndexExpr) -> T;
    fn walk(&mut self, e: &Expr) -> T;
}

fn child_needs_parens(parent: &Expr, child: &Expr, is_rhs: bool) -> bool {
    match parent {
        // no children so doesn't matter
        Expr::Const(_, _, _) | Expr::Var(_, _) => false,
        // children are comma separated, so no ambiguity possible
        Expr::App(_, _, _) => false,
        // only the target of a subscript can be ambiguous
        Expr::Subscript(_) => matches!(child, Expr::Op1(_, _, _) | Expr::Op2(_, _, _, _)),
        Expr::Op1(_, _, _) => matches!(child, Expr::Op2(_, _, _, _)),
        Expr::Op2(parent_op, _, _, _) => match child {
            Expr::Const(_, _, _)
            | Expr::Var(_, _)
            | Expr::App(_, _, _)
            | Expr::Subscript(_)
            | Expr::Op1(_, _, _) => false,
            // 3 * 2 + 1
            Expr::Op2(child_op, _, _, _) => {
                // if we have `3 * (2 + 3)`, the parent's precedence
                // is higher than the child and we need enclosing parens
                let (parent, child) = (parent_op.precedence(), child_op.precedence());
                if parent != child {
                    return parent > child;
                }
                // `a - (b - c)` and `(a ^ b) ^ c`
                if *parent_op == BinaryOp::Exp {
                    !is_rhs
                } else {
                    is_rhs && !parent_op.is_associative()
                }
            }
        },
    }
}

fn paren_if_necessary(parent: &Expr, child: &Expr, is_rhs: bool, eqn: String) -> String {
    if child_needs_parens(parent, child, is_rhs) {
        format!("({eqn})")
    } else {
        eqn
    }
}

struct PrintVisitor {}

impl Visitor<String> for PrintVisitor {
    fn walk_index(&mut self, expr: &IndexExpr) -> String {
        match expr {
            IndexExpr::Range(start, end, None, _) => {
                format!("{}:{}", self.walk(start), self.walk(end))
            }
            IndexExpr::Range(start, end, Some(step), _) => format!(
                "{}:{}:{}",
                self.walk(start),
                self.walk(step),
                self.walk(end)
            ),
            IndexExpr::Expr(e) => self.walk(e),
        }
    }

    fn walk(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Const(s, _, _) => s.clone(),
            Expr::Var(id, _) => id.to_string(),
            Expr::App(func, args, _) => {
                let args: Vec<String> = args.iter().map(|e| self.walk(e)).collect();
                format!("{}({})", func, args.join(", "))
            }
            Expr::Subscript(subscript) => {
                let target = subscript.target();
                let target = paren_if_necessary(expr, target, false, self.walk(target));
                let args: Vec<String> = subscript
                    .dimensions()
                    .iter()
                    .map(|e| self.walk_index(e))
                    .collect();
                format!("{}[{}]", target, args.join(", "))
            }
            Expr::Op1(op, l, _) => {
                let l = paren_if_necessary(expr, l, false, self.walk(l));
                match op {
                    UnaryOp::Positive => format!("+{l}"),
                    UnaryOp::Negative => format!("-{l}"),
                }
            }
            Expr::Op2(op, l, r, _) => {
                let l = paren_if_necessary(expr, l, false, self.walk(l));
                let r = paren_if_necessary(expr, r, true, self.walk(r));
                format!("{} {} {}", l, op.symbol(), r)
            }
        }
    }
}

pub fn print_eqn(expr: &Expr) -> String {
    let mut visitor = PrintVisitor {};
    visitor.walk(expr)
}

pub fn print_index(expr: &IndexExpr) -> String {
    let mut visitor = PrintVisitor {};
    visitor.walk_index(expr)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", print_eqn(self))
    }
}

impl fmt::Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", print_index(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loc_basics() {
        let a = Loc { start: 3, end: 7 };
        assert_eq!(a, Loc::new(3, 7));

        let b = Loc { start: 4, end: 11 };
        assert_eq!(Loc::new(3, 11), a.union(&b));

        let c = Loc { start: 1, end: 5 };
        assert_eq!(Loc::new(1, 7), a.union(&c));
    }

    #[test]
    fn test_print_eqn() {
        assert_eq!(
            "a + b",
            print_eqn(&Expr::Op2(
                BinaryOp::Add,
                Box::new(Expr::Var(Ident::from("a"), Loc::new(1, 2))),
                Box::new(Expr::Var(Ident::from("b"), Loc::new(5, 6))),
                Loc::new(0, 7),
            ))
        );
        assert_eq!(
            "a + b * c",
            print_eqn(&Expr::op2(
                BinaryOp::Add,
                Expr::var("a"),
                Expr::op2(BinaryOp::Mul, Expr::var("b"), Expr::var("c")),
            ))
        );
        assert_eq!(
            "a * (b + c)",
            print_eqn(&Expr::op2(
                BinaryOp::Mul,
                Expr::var("a"),
                Expr::op2(BinaryOp::Add, Expr::var("b"), Expr::var("c")),
            ))
        );
        assert_eq!(
            "a - (b - c)",
            print_eqn(&Expr::op2(
                BinaryOp::Sub,
                Expr::var("a"),
                Expr::op2(BinaryOp::Sub, Expr::var("b"), Expr::var("c")),
            ))
        );
        assert_eq!(
            "a - b - c",
            print_eqn(&Expr::op2(
                BinaryOp::Sub,
                Expr::op2(BinaryOp::Sub, Expr::var("a"), Expr::var("b")),
                Expr::var("c"),
            ))
        );
        assert_eq!(
            "-(a + 1)",
            print_eqn(&Expr::neg(Expr::op2(
                BinaryOp::Add,
                Expr::var("a"),
                Expr::num(1.0)
            )))
        );
        assert_eq!(
            "f(x, 2)",
            print_eqn(&Expr::app("f", vec![Expr::var("x"), Expr::num(2.0)]))
        );
    }

    #[test]
    fn test_print_ranges() {
        assert_eq!(
            "1:3",
            print_index(&IndexExpr::range(Expr::num(1.0), Expr::num(3.0)))
        );
        assert_eq!(
            "5:-1:1",
            print_index(&IndexExpr::range_step(
                Expr::num(5.0),
                Expr::neg(Expr::num(1.0)),
                Expr::num(1.0)
            ))
        );
        assert_eq!(
            "2:end - 1",
            print_index(&IndexExpr::range(
                Expr::num(2.0),
                Expr::op2(BinaryOp::Sub, Expr::var("end"), Expr::num(1.0))
            ))
        );
    }

    #[test]
    fn test_find_pre_order() {
        // end - f(end, x)
        let expr = Expr::op2(
            BinaryOp::Sub,
            Expr::var("end"),
            Expr::app("f", vec![Expr::var("end"), Expr::var("x")]),
        );

        let vars = expr.find(&|e: &Expr| matches!(e, Expr::Var(_, _)));
        let names: Vec<String> = vars.iter().map(|e| e.to_string()).collect();
        assert_eq!(vec!["end", "end", "x"], names);

        // a node is reported before its children
        let all = expr.find(&|_: &Expr| true);
        assert_eq!(5, all.len());
        assert!(std::ptr::eq(all[0], &expr));
        assert_eq!("f(end, x)", all[2].to_string());
    }

    #[test]
    fn test_find_no_match_and_root_only() {
        let expr = Expr::op2(BinaryOp::Add, Expr::var("a"), Expr::num(1.0));

        assert!(expr.find(&|e: &Expr| e.is_symbol("end")).is_empty());

        let root_only = expr.find(&|e: &Expr| matches!(e, Expr::Op2(_, _, _, _)));
        assert_eq!(1, root_only.len());
        assert!(std::ptr::eq(root_only[0], &expr));
    }

    #[test]
    fn test_find_through_range() {
        // 5:-1:1 is stored as (start, end, step)
        let range = IndexExpr::range_step(Expr::num(5.0), Expr::var("s"), Expr::var("e"));
        let all = range.find(&|_: &Expr| true);
        let rendered: Vec<String> = all.iter().map(|e| e.to_string()).collect();
        assert_eq!(vec!["5", "e", "s"], rendered);
    }

    #[test]
    fn test_index_expr_references() {
        let plain = IndexExpr::range(Expr::num(1.0), Expr::num(3.0));
        assert!(!plain.references("end"));

        let step_only = IndexExpr::range_step(Expr::num(1.0), Expr::var("end"), Expr::num(9.0));
        assert!(step_only.references("end"));

        let scalar = IndexExpr::Expr(Expr::var("End"));
        assert!(!scalar.references("end"));
        assert!(scalar.references("End"));
    }
}
