// Copyright 2025 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Variable environments for evaluation.
//!
//! Scopes live in an arena and refer to their parent by index.  A
//! derived scope shadows names of its parent without touching the
//! parent's frame, which is how `end` is made visible to a single
//! dimension of a subscript and nothing else.

use std::collections::HashMap;

use log::trace;

use crate::common::Ident;
use crate::value::Value;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Frame {
    parent: Option<ScopeId>,
    vars: HashMap<Ident, Value>,
}

#[derive(Debug)]
pub struct Scopes {
    frames: Vec<Frame>,
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

impl Scopes {
    pub fn new() -> Self {
        Scopes {
            frames: vec![Frame {
                parent: None,
                vars: HashMap::new(),
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// derive creates an empty child of `parent`.
    pub fn derive(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.frames.len());
        trace!("deriving scope {} from {}", id.0, parent.0);
        self.frames.push(Frame {
            parent: Some(parent),
            vars: HashMap::new(),
        });
        id
    }

    /// set binds `name` in the frame `id` itself; parents are never
    /// written.
    pub fn set(&mut self, id: ScopeId, name: Ident, value: Value) {
        self.frames[id.0].vars.insert(name, value);
    }

    /// get looks `name` up in `id`, falling through to its parents.
    pub fn get(&self, id: ScopeId, name: &str) -> Option<&Value> {
        let mut current = Some(id);
        while let Some(ScopeId(i)) = current {
            let frame = &self.frames[i];
            if let Some(value) = frame.vars.get(name) {
                return Some(value);
            }
            current = frame.parent;
        }
        None
    }

    /// discard drops a derived scope once evaluation in it is done.
    /// Scopes are stack-like and meant to be discarded in the reverse
    /// order they were derived.  Discarding `id` also drops every scope
    /// derived after it; discarding the root or a scope that is already
    /// gone does nothing.
    pub fn discard(&mut self, id: ScopeId) {
        if id.0 != 0 && id.0 < self.frames.len() {
            trace!("discarding scope {} ({} live)", id.0, self.frames.len());
            self.frames.truncate(id.0);
        }
    }

    /// depth is the number of live frames, including the root.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_through_to_parent() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        scopes.set(root, Ident::from("a"), Value::Number(1.0));

        let child = scopes.derive(root);
        assert_eq!(Some(&Value::Number(1.0)), scopes.get(child, "a"));
        assert_eq!(None, scopes.get(child, "b"));
    }

    #[test]
    fn test_writes_stay_local() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        scopes.set(root, Ident::from("end"), Value::Number(10.0));

        let child = scopes.derive(root);
        scopes.set(child, Ident::from("end"), Value::Number(3.0));
        scopes.set(child, Ident::from("x"), Value::Number(7.0));

        assert_eq!(Some(&Value::Number(3.0)), scopes.get(child, "end"));
        assert_eq!(Some(&Value::Number(10.0)), scopes.get(root, "end"));
        assert_eq!(None, scopes.get(root, "x"));
    }

    #[test]
    fn test_siblings_do_not_see_each_other() {
        let mut scopes = Scopes::new();
        let root = scopes.root();

        let first = scopes.derive(root);
        scopes.set(first, Ident::from("end"), Value::Number(3.0));
        scopes.discard(first);
        assert_eq!(1, scopes.depth());

        let second = scopes.derive(root);
        assert_eq!(None, scopes.get(second, "end"));
        scopes.discard(second);
        assert_eq!(1, scopes.depth());
    }

    #[test]
    fn test_nested_shadowing() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        let outer = scopes.derive(root);
        scopes.set(outer, Ident::from("end"), Value::Number(4.0));
        let inner = scopes.derive(outer);
        scopes.set(inner, Ident::from("end"), Value::Number(2.0));

        assert_eq!(Some(&Value::Number(2.0)), scopes.get(inner, "end"));
        scopes.discard(inner);
        assert_eq!(Some(&Value::Number(4.0)), scopes.get(outer, "end"));
        scopes.discard(outer);
        assert_eq!(1, scopes.depth());
    }

    #[test]
    fn test_out_of_order_discard_drops_younger_scopes() {
        let mut scopes = Scopes::new();
        let root = scopes.root();
        let outer = scopes.derive(root);
        let inner = scopes.derive(outer);
        scopes.set(inner, Ident::from("end"), Value::Number(2.0));

        scopes.discard(outer);
        assert_eq!(1, scopes.depth());

        // already gone
        scopes.discard(inner);
        assert_eq!(1, scopes.depth());

        scopes.discard(root);
        assert_eq!(1, scopes.depth());

        let next = scopes.derive(root);
        assert_eq!(None, scopes.get(next, "end"));
    }
}
