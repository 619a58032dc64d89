// This file is part of ras, an assembler.
// Copyright 2022 Jeffrey Sharp
//
// SPDX-License-Identifier: GPL-3.0-or-later
//
// ras is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published
// by the Free Software Foundation, either version 3 of the License,
// or (at your option) any later version.
//
// ras is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with ras.  If not, see <http://www.gnu.org/licenses/>.

//! Abstract syntax tree node model.

/// A binary operator, derived directly from the operator token that
/// produced it rather than tagged by a separate node-type enum (closes the
/// node-type/opcode mismatch the reference parser has for `&&`/`||`).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinOp {
    Add, Sub, Mul, Div,
    Lt, Le, Gt, Ge, Eq, Ne,
    And, Or,
    Pow,
}

/// A statement or expression node.
///
/// Children are owned directly (`Box<Node>` / `Vec<Node>`); there is no
/// separate parent/next-sibling linked list as in the reference
/// implementation. A `Vec<Node>` block subsumes the `next`-chained
/// statement list and its `END_SCOPE` sentinel.
#[derive(Clone, Debug)]
pub enum Node {
    /// A placeholder produced in place of a node that failed to parse.
    Stub,

    /// A numeric literal.
    Digit(f64),

    /// A string literal.
    Str(String),

    /// A bare identifier reference.
    Id(String),

    /// A vector literal: `[e0, e1, ...]`.
    VectorLit(Vec<Node>),

    /// A matrix literal: `[e00, e01; e10, e11]`, row-major.
    MatrixLit { rows: usize, cols: usize, elems: Vec<Node> },

    /// A binary operator application.
    BinOp { op: BinOp, left: Box<Node>, right: Box<Node> },

    /// `lvalue = rvalue`.
    Assign { left: Box<Node>, right: Box<Node> },

    /// `name(args...)`.
    Call { name: String, args: Vec<Node> },

    /// `name[i]` or `name[i][j]`.
    Access { name: String, dims: Vec<Node> },

    /// A sequence of statements executed in order.
    Block(Vec<Node>),

    /// `if (cond) then [else else_]`.
    If { cond: Box<Node>, then: Box<Node>, else_: Option<Box<Node>> },

    /// `for (init; cond; step) body`.
    For { init: Box<Node>, cond: Box<Node>, step: Box<Node>, body: Box<Node> },

    /// `while (cond) body`.
    While { cond: Box<Node>, body: Box<Node> },

    Break,
    Continue,

    /// `return expr?`.
    Return(Option<Box<Node>>),

    /// `function name(params...) { body }` — evaluates to nothing; the
    /// parser registers the function as a side effect of parsing this node.
    FunctionDef { name: String, params: Vec<String>, body: Vec<Node> },

    /// `local a, b, ...` inside a function body.
    Local(Vec<String>),

    /// `include "path"` — parsed, not executed (see spec Non-goals).
    Include(String),
}

