// This file is part of ras, an assembler.
// Copyright (C) 2020 Jeffrey Sharp
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

//! Tree-walking evaluator.

use crate::function::{Function, FunctionBody, FunctionTable};
use crate::lang::ast::Node;
use crate::symbol::{Symbol, SymbolTable};
use crate::value::{self, Value};

/// The outcome of evaluating a statement.
///
/// Unlike the reference evaluator's shared mutable break/continue/return
/// counters (which only unwind one loop level when loops nest), this is
/// returned up the call stack directly, so nested loops and early returns
/// unwind correctly regardless of depth.
pub enum Flow {
    /// Normal completion, carrying whatever value the statement produced
    /// (`Value::Void` for statements that produce nothing printable).
    Value(Value),
    Break,
    Continue,
    Return(Value),
}

pub struct Interpreter {
    pub symbols:   SymbolTable,
    pub functions: FunctionTable,
}

impl Interpreter {
    pub fn new() -> Self {
        Self { symbols: SymbolTable::new(), functions: FunctionTable::new() }
    }

    /// Evaluates one top-level program fragment (a REPL line's worth of
    /// statements) and returns the value the driver should print, if any.
    pub fn eval_program(&mut self, stmts: &[Node]) -> Result<Option<Value>, String> {
        match self.eval_block(stmts)? {
            Flow::Value(Value::Void) => Ok(None),
            Flow::Value(v)           => Ok(Some(v)),
            Flow::Return(_)          => Err("`return` outside a function".to_string()),
            Flow::Break              => Err("`break` outside a loop".to_string()),
            Flow::Continue           => Err("`continue` outside a loop".to_string()),
        }
    }

    fn eval_block(&mut self, stmts: &[Node]) -> Result<Flow, String> {
        let mut last = Flow::Value(Value::Void);

        for stmt in stmts {
            last = self.eval(stmt)?;
            if !matches!(last, Flow::Value(_)) {
                return Ok(last);
            }
        }

        Ok(last)
    }

    fn truthy(v: &Value) -> Result<bool, String> {
        v.as_bool().ok_or_else(|| "`expr` must be a digit".to_string())
    }

    /// Evaluates any AST node, statement or expression alike.
    fn eval(&mut self, node: &Node) -> Result<Flow, String> {
        match node {
            Node::Stub => Ok(Flow::Value(Value::Void)),

            Node::Digit(d) => {
                self.symbols.set_ans(Value::Digit(*d));
                Ok(Flow::Value(Value::Digit(*d)))
            }

            Node::Str(s) => {
                let v = Value::Str(s.clone());
                self.symbols.set_ans(v.clone());
                Ok(Flow::Value(v))
            }

            Node::Id(name) => {
                let v = self.symbols.lookup_all(name)
                    .map(|sym| sym.val.clone())
                    .ok_or_else(|| format!("unknown variable `{}`", name))?;
                Ok(Flow::Value(v))
            }

            Node::VectorLit(elems) => {
                let mut data = Vec::with_capacity(elems.len());
                for e in elems {
                    data.push(self.eval_digit(e)?);
                }
                let v = Value::Vector(data);
                self.symbols.set_ans(v.clone());
                Ok(Flow::Value(v))
            }

            Node::MatrixLit { rows, cols, elems } => {
                let mut data = Vec::with_capacity(elems.len());
                for e in elems {
                    data.push(self.eval_digit(e)?);
                }
                let v = Value::Matrix { rows: *rows, cols: *cols, data };
                self.symbols.set_ans(v.clone());
                Ok(Flow::Value(v))
            }

            Node::BinOp { op, left, right } => {
                let a = self.eval_value(left)?;
                let b = self.eval_value(right)?;
                let c = value::apply(*op, &a, &b)?;
                self.symbols.set_ans(c.clone());
                Ok(Flow::Value(c))
            }

            Node::Assign { left, right } => {
                let v = self.eval_value(right)?;
                self.assign(left, v)?;
                Ok(Flow::Value(Value::Void))
            }

            Node::Access { name, dims } => {
                let v = self.access(name, dims)?;
                Ok(Flow::Value(v))
            }

            Node::Call { name, args } => self.call(name, args),

            Node::Block(stmts) => self.eval_block(stmts),

            Node::If { cond, then, else_ } => {
                let c = self.eval_value(cond)?;
                if Self::truthy(&c)? {
                    self.eval(then)
                } else if let Some(else_) = else_ {
                    self.eval(else_)
                } else {
                    Ok(Flow::Value(Value::Void))
                }
            }

            Node::While { cond, body } => self.eval_while(cond, body),

            Node::For { init, cond, step, body } => self.eval_for(init, cond, step, body),

            Node::Break    => Ok(Flow::Break),
            Node::Continue => Ok(Flow::Continue),

            Node::Return(expr) => {
                let v = match expr {
                    Some(e) => self.eval_value(e)?,
                    None    => Value::Void,
                };
                Ok(Flow::Return(v))
            }

            Node::FunctionDef { name, params, body } => {
                self.functions.insert(Function::user_defined(
                    name.clone(), params.clone(), body.clone(),
                ));
                Ok(Flow::Value(Value::Void))
            }

            Node::Local(names) => {
                for name in names {
                    self.symbols.insert(Symbol::new(name.clone()));
                }
                Ok(Flow::Value(Value::Void))
            }

            // `include` is parsed but not executed; see spec Non-goals.
            Node::Include(_) => Ok(Flow::Value(Value::Void)),
        }
    }

    /// Evaluates a node expecting a plain value, rejecting any
    /// break/continue/return that leaks out of an expression position.
    fn eval_value(&mut self, node: &Node) -> Result<Value, String> {
        match self.eval(node)? {
            Flow::Value(v) => Ok(v),
            _ => Err("`break`/`continue`/`return` cannot appear in an expression".to_string()),
        }
    }

    fn eval_digit(&mut self, node: &Node) -> Result<f64, String> {
        self.eval_value(node)?
            .as_digit()
            .ok_or_else(|| "nonnumerical value".to_string())
    }

    /// A loop's own "value" is whatever its body last produced on the
    /// iteration before the condition went false — nothing pops that value
    /// between iterations, so it is what a top-level `for`/`while`
    /// statement leaves behind to print, same as the reference
    /// interpreter's value stack would.
    fn eval_while(&mut self, cond: &Node, body: &Node) -> Result<Flow, String> {
        let mut last = Value::Void;
        loop {
            let c = self.eval_value(cond)?;
            if !Self::truthy(&c)? {
                return Ok(Flow::Value(last));
            }

            match self.eval(body)? {
                Flow::Value(v)        => { last = v; }
                Flow::Continue        => {}
                Flow::Break           => return Ok(Flow::Value(last)),
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
    }

    fn eval_for(&mut self, init: &Node, cond: &Node, step: &Node, body: &Node) -> Result<Flow, String> {
        self.eval(init)?;

        let mut last = Value::Void;
        loop {
            let c = self.eval_value(cond)?;
            if !Self::truthy(&c)? {
                return Ok(Flow::Value(last));
            }

            match self.eval(body)? {
                Flow::Value(v)        => { last = v; self.eval(step)?; }
                Flow::Continue        => { self.eval(step)?; }
                Flow::Break           => return Ok(Flow::Value(last)),
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
    }

    fn assign(&mut self, left: &Node, val: Value) -> Result<(), String> {
        match left {
            Node::Id(name) => {
                self.symbols.assign(name, val);
                Ok(())
            }
            Node::Access { name, dims } => self.assign_access(name, dims, val),
            _ => Err("rvalue assignment".to_string()),
        }
    }

    fn index_of(&mut self, dims: &[Node]) -> Result<Vec<usize>, String> {
        dims.iter()
            .map(|d| {
                let i = self.eval_digit(d)?;
                if i < 0.0 || i.fract() != 0.0 {
                    return Err("incompatible type for index".to_string());
                }
                Ok(i as usize)
            })
            .collect()
    }

    fn access(&mut self, name: &str, dims: &[Node]) -> Result<Value, String> {
        let idx = self.index_of(dims)?;
        let sym = self.symbols.lookup_all(name)
            .ok_or_else(|| format!("unknown variable `{}`", name))?;

        match (&sym.val, idx.as_slice()) {
            (Value::Vector(v), [i]) => v.get(*i)
                .copied()
                .map(Value::Digit)
                .ok_or_else(|| "index out of range".to_string()),
            (Value::Matrix { rows, cols, data }, [r, c]) => {
                if r >= rows || c >= cols {
                    return Err("index out of range".to_string());
                }
                Ok(Value::Digit(data[r * cols + c]))
            }
            (Value::Vector(_), _) | (Value::Matrix { .. }, _) => Err("invalid dimension".to_string()),
            _ => Err("id is not a vector or a matrix".to_string()),
        }
    }

    fn assign_access(&mut self, name: &str, dims: &[Node], val: Value) -> Result<(), String> {
        let d = val.as_digit().ok_or_else(|| "non-numerical value".to_string())?;
        let idx = self.index_of(dims)?;

        let sym = self.symbols.lookup_all_mut(name)
            .ok_or_else(|| format!("unknown variable `{}`", name))?;

        match (&mut sym.val, idx.as_slice()) {
            (Value::Vector(v), [i]) => {
                let slot = v.get_mut(*i).ok_or("index out of range")?;
                *slot = d;
                Ok(())
            }
            (Value::Matrix { rows, cols, data }, [r, c]) => {
                if r >= rows || c >= cols {
                    return Err("index out of range".to_string());
                }
                data[r * *cols + c] = d;
                Ok(())
            }
            (Value::Vector(_), _) | (Value::Matrix { .. }, _) => Err("invalid dimension".to_string()),
            _ => Err("id is not a vector or a matrix".to_string()),
        }
    }

    fn call(&mut self, name: &str, args: &[Node]) -> Result<Flow, String> {
        let function = self.functions.lookup(name)
            .ok_or_else(|| format!("unknown function `{}`", name))?;

        match &function.body {
            FunctionBody::Builtin(handler) => {
                let mut digits = Vec::with_capacity(args.len());
                for a in args {
                    digits.push(self.eval_digit(a)?);
                }

                let nargs = function.nargs;
                if digits.len() != nargs {
                    return Err(format!(
                        "`{}` expects {} argument(s), got {}", name, nargs, digits.len()
                    ));
                }

                let handler = *handler;
                let result = handler(&digits).map_err(|e| format!("in function `{}`: {}", name, e))?;
                self.symbols.set_ans(result.clone());
                Ok(Flow::Value(result))
            }

            FunctionBody::UserDefined { params, body } => {
                if args.len() != params.len() {
                    return Err(format!(
                        "`{}` expects {} argument(s), got {}", name, params.len(), args.len()
                    ));
                }

                let mut values = Vec::with_capacity(args.len());
                for a in args {
                    values.push(self.eval_value(a)?);
                }

                let param_scope: Vec<Symbol> = params.iter().cloned().zip(values)
                    .map(|(n, v)| Symbol::with_value(n, v))
                    .collect();

                let body = body.clone();

                self.symbols.push_scope(param_scope);
                let outcome = self.eval_block(&body);
                self.symbols.pop();

                match outcome? {
                    Flow::Value(_)  => Ok(Flow::Value(Value::Void)),
                    Flow::Return(v) => Ok(Flow::Value(v)),
                    Flow::Break | Flow::Continue =>
                        Err("`break`/`continue` outside a loop".to_string()),
                }
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ast::BinOp;

    fn run(interp: &mut Interpreter, stmts: Vec<Node>) -> Option<Value> {
        interp.eval_program(&stmts).unwrap()
    }

    #[test]
    fn literal_updates_ans() {
        let mut interp = Interpreter::new();
        run(&mut interp, vec![Node::Digit(3.0)]);
        assert_eq!(interp.symbols.lookup_top("ans").unwrap().val, Value::Digit(3.0));
    }

    #[test]
    fn assignment_does_not_update_ans() {
        let mut interp = Interpreter::new();
        interp.symbols.set_ans(Value::Digit(9.0));
        run(&mut interp, vec![Node::Assign {
            left: Box::new(Node::Id("x".into())),
            right: Box::new(Node::Digit(1.0)),
        }]);
        assert_eq!(interp.symbols.lookup_top("ans").unwrap().val, Value::Digit(9.0));
        assert_eq!(interp.symbols.lookup_all("x").unwrap().val, Value::Digit(1.0));
    }

    #[test]
    fn while_loop_counts_down() {
        let mut interp = Interpreter::new();
        interp.symbols.assign("n", Value::Digit(3.0));
        let stmts = vec![Node::While {
            cond: Box::new(Node::Id("n".into())),
            body: Box::new(Node::Assign {
                left: Box::new(Node::Id("n".into())),
                right: Box::new(Node::BinOp {
                    op: BinOp::Sub,
                    left: Box::new(Node::Id("n".into())),
                    right: Box::new(Node::Digit(1.0)),
                }),
            }),
        }];
        run(&mut interp, stmts);
        assert_eq!(interp.symbols.lookup_all("n").unwrap().val, Value::Digit(0.0));
    }

    #[test]
    fn for_loop_leaves_last_iteration_value_as_its_own_result() {
        // for (i = 0; i < 3; i = i + 1) { i }
        let mut interp = Interpreter::new();
        let stmts = vec![Node::For {
            init: Box::new(Node::Assign {
                left: Box::new(Node::Id("i".into())),
                right: Box::new(Node::Digit(0.0)),
            }),
            cond: Box::new(Node::BinOp {
                op: BinOp::Lt,
                left: Box::new(Node::Id("i".into())),
                right: Box::new(Node::Digit(3.0)),
            }),
            step: Box::new(Node::Assign {
                left: Box::new(Node::Id("i".into())),
                right: Box::new(Node::BinOp {
                    op: BinOp::Add,
                    left: Box::new(Node::Id("i".into())),
                    right: Box::new(Node::Digit(1.0)),
                }),
            }),
            body: Box::new(Node::Block(vec![Node::Id("i".into())])),
        }];
        let result = run(&mut interp, stmts);
        assert_eq!(result, Some(Value::Digit(2.0)));
    }

    #[test]
    fn break_exits_nested_while_without_leaking_past_outer_loop() {
        let mut interp = Interpreter::new();
        // while (1) { while (1) { break; } break; }
        let inner = Node::While {
            cond: Box::new(Node::Digit(1.0)),
            body: Box::new(Node::Break),
        };
        let outer = Node::While {
            cond: Box::new(Node::Digit(1.0)),
            body: Box::new(Node::Block(vec![inner, Node::Break])),
        };
        let result = interp.eval_program(&[outer]);
        assert!(result.is_ok());
    }

    #[test]
    fn user_defined_function_recursion_does_not_clobber_shared_scope() {
        let mut interp = Interpreter::new();
        // function fact(n) { if (n <= 1) { return 1; } return n * fact(n - 1); }
        let body = vec![
            Node::If {
                cond: Box::new(Node::BinOp {
                    op: BinOp::Le,
                    left: Box::new(Node::Id("n".into())),
                    right: Box::new(Node::Digit(1.0)),
                }),
                then: Box::new(Node::Return(Some(Box::new(Node::Digit(1.0))))),
                else_: None,
            },
            Node::Return(Some(Box::new(Node::BinOp {
                op: BinOp::Mul,
                left: Box::new(Node::Id("n".into())),
                right: Box::new(Node::Call {
                    name: "fact".into(),
                    args: vec![Node::BinOp {
                        op: BinOp::Sub,
                        left: Box::new(Node::Id("n".into())),
                        right: Box::new(Node::Digit(1.0)),
                    }],
                }),
            }))),
        ];

        interp.functions.insert(Function::user_defined(
            "fact".to_string(), vec!["n".to_string()], body,
        ));

        let result = run(&mut interp, vec![Node::Call {
            name: "fact".into(),
            args: vec![Node::Digit(5.0)],
        }]);

        assert_eq!(result, Some(Value::Digit(120.0)));
    }

    #[test]
    fn builtin_call_updates_ans_but_user_defined_does_not() {
        let mut interp = Interpreter::new();
        run(&mut interp, vec![Node::Call { name: "sqrt".into(), args: vec![Node::Digit(4.0)] }]);
        assert_eq!(interp.symbols.lookup_top("ans").unwrap().val, Value::Digit(2.0));

        interp.symbols.set_ans(Value::Digit(42.0));
        interp.functions.insert(Function::user_defined(
            "one".to_string(), vec![], vec![Node::Return(Some(Box::new(Node::Digit(7.0))))],
        ));
        run(&mut interp, vec![Node::Call { name: "one".into(), args: vec![] }]);
        assert_eq!(interp.symbols.lookup_top("ans").unwrap().val, Value::Digit(42.0));
    }

    #[test]
    fn vector_index_assignment() {
        let mut interp = Interpreter::new();
        interp.symbols.assign("v", Value::zero_vector(3));
        interp.assign(
            &Node::Access { name: "v".into(), dims: vec![Node::Digit(1.0)] },
            Value::Digit(9.0),
        ).unwrap();
        assert_eq!(interp.symbols.lookup_all("v").unwrap().val, Value::Vector(vec![0.0, 9.0, 0.0]));
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let mut interp = Interpreter::new();
        let result = interp.eval_program(&[Node::Return(None)]);
        assert!(result.is_err());
    }
}
