// Copyright 2021 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::ast::print_eqn;

use super::{LoweredDim, LoweredIndex, Strategy, SubsetProgram};

fn pretty_index(index: &LoweredIndex) -> String {
    match index {
        LoweredIndex::Scalar(e) => format!("{} - 1", print_eqn(e)),
        LoweredIndex::Range { start, end, step } => {
            let step = step.map(print_eqn).unwrap_or_else(|| "1".to_owned());
            format!(
                "[{} - 1, {} - ({step} > 0 ? 0 : 2), {step}]",
                print_eqn(start),
                print_eqn(end)
            )
        }
    }
}

fn pretty_dim(dim: &LoweredDim, end_symbol: &str) -> String {
    let index = pretty_index(dim.index());
    if dim.binds_end() {
        format!("with {end_symbol} = size[{}] {{ {index} }}", dim.axis())
    } else {
        index
    }
}

/// pretty renders a subset program in its lowered, 0-based form.  It is
/// meant for debugging and is not parsed back.
pub fn pretty(program: &SubsetProgram) -> String {
    let dims: Vec<String> = program
        .dims()
        .iter()
        .map(|dim| pretty_dim(dim, program.end_symbol().as_str()))
        .collect();
    let replacement = program
        .replacement()
        .map(|r| format!(", {}", print_eqn(r)))
        .unwrap_or_default();

    match program.strategy() {
        Strategy::Direct => format!(
            "subset({}, index({}){})",
            print_eqn(program.target()),
            dims.join(", "),
            replacement
        ),
        Strategy::ShapeAware => format!(
            "let obj = {}; let size = size(obj); subset(obj, index({}){})",
            print_eqn(program.target()),
            dims.join(", "),
            replacement
        ),
    }
}
