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

//! Built-in and user-defined callables.

use std::collections::HashMap;

use crate::lang::ast::Node;
use crate::value::Value;

/// Parameter names assigned to built-in handlers, matching the reference
/// table's `x1`..`x10` convention.
fn arg_name(i: usize) -> String {
    format!("x{}", i + 1)
}

pub type BuiltinHandler = fn(&[f64]) -> Result<Value, String>;

/// What a function does when called.
pub enum FunctionBody {
    /// A built-in, implemented directly in the interpreter.
    Builtin(BuiltinHandler),

    /// A user-defined function: its parsed body and formal parameter
    /// names. The captured scope is reconstructed fresh on each call
    /// (the reference implementation's single shared captured scope is
    /// not reentrant; see the registry's call-site comment).
    UserDefined { params: Vec<String>, body: Vec<Node> },
}

pub struct Function {
    pub name:  String,
    pub nargs: usize,
    pub body:  FunctionBody,
}

impl Function {
    pub fn builtin(name: &str, nargs: usize, handler: BuiltinHandler) -> Self {
        Self {
            name: name.to_string(),
            nargs,
            body: FunctionBody::Builtin(handler),
        }
    }

    pub fn user_defined(name: String, params: Vec<String>, body: Vec<Node>) -> Self {
        let nargs = params.len();
        Self { name, nargs, body: FunctionBody::UserDefined { params, body } }
    }

    /// Parameter names for this function, `x1..xN` for built-ins.
    pub fn param_names(&self) -> Vec<String> {
        match &self.body {
            FunctionBody::Builtin(_) => (0..self.nargs).map(arg_name).collect(),
            FunctionBody::UserDefined { params, .. } => params.clone(),
        }
    }
}

/// The process-wide function table: built-ins inserted at startup, plus
/// whatever the parser installs as it encounters `function` definitions.
pub struct FunctionTable {
    functions: HashMap<String, Function>,
}

impl FunctionTable {
    pub fn new() -> Self {
        let mut table = Self { functions: HashMap::new() };
        table.install_builtins();
        table
    }

    fn install_builtins(&mut self) {
        self.insert(Function::builtin("sin",    1, builtins::sin));
        self.insert(Function::builtin("cos",    1, builtins::cos));
        self.insert(Function::builtin("tan",    1, builtins::tan));
        self.insert(Function::builtin("ln",     1, builtins::ln));
        self.insert(Function::builtin("exp",    1, builtins::exp));
        self.insert(Function::builtin("sqrt",   1, builtins::sqrt));
        self.insert(Function::builtin("vector", 1, builtins::vector));
        self.insert(Function::builtin("matrix", 2, builtins::matrix));
    }

    pub fn lookup(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn insert(&mut self, function: Function) {
        self.functions.insert(function.name.clone(), function);
    }

    /// Removes `name`, first deleting any prior entry (the reference
    /// "redefine your function" behavior).
    pub fn delete(&mut self, name: &str) -> Option<Function> {
        self.functions.remove(name)
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in handler bodies. Each validates its argument count and kind
/// (all `Digit`, enforced by the evaluator before calling) except
/// `matrix`/`vector`, which allocate zero-filled aggregates sized by
/// their (digit) arguments.
mod builtins {
    use super::Value;

    pub fn sin(args: &[f64]) -> Result<Value, String> {
        Ok(Value::Digit(args[0].sin()))
    }

    pub fn cos(args: &[f64]) -> Result<Value, String> {
        Ok(Value::Digit(args[0].cos()))
    }

    pub fn tan(args: &[f64]) -> Result<Value, String> {
        Ok(Value::Digit(args[0].tan()))
    }

    pub fn ln(args: &[f64]) -> Result<Value, String> {
        if args[0] <= 0.0 {
            return Err("ln of a nonpositive number".to_string());
        }
        Ok(Value::Digit(args[0].ln()))
    }

    pub fn exp(args: &[f64]) -> Result<Value, String> {
        Ok(Value::Digit(args[0].exp()))
    }

    pub fn sqrt(args: &[f64]) -> Result<Value, String> {
        if args[0] < 0.0 {
            return Err("sqrt of a negative number".to_string());
        }
        Ok(Value::Digit(args[0].sqrt()))
    }

    pub fn vector(args: &[f64]) -> Result<Value, String> {
        let len = args[0];
        if len < 0.0 || len.fract() != 0.0 {
            return Err("vector length must be a nonnegative integer".to_string());
        }
        Ok(Value::zero_vector(len as usize))
    }

    pub fn matrix(args: &[f64]) -> Result<Value, String> {
        let (rows, cols) = (args[0], args[1]);
        if rows < 0.0 || cols < 0.0 || rows.fract() != 0.0 || cols.fract() != 0.0 {
            return Err("matrix dimensions must be nonnegative integers".to_string());
        }
        Ok(Value::zero_matrix(rows as usize, cols as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered_with_correct_arities() {
        let table = FunctionTable::new();
        assert_eq!(table.lookup("sin").unwrap().nargs, 1);
        assert_eq!(table.lookup("matrix").unwrap().nargs, 2);
        assert!(table.lookup("nope").is_none());
    }

    #[test]
    fn vector_builtin_allocates_zero_filled() {
        let v = builtins::vector(&[3.0]).unwrap();
        assert_eq!(v, Value::zero_vector(3));
    }

    #[test]
    fn matrix_builtin_allocates_zero_filled() {
        let m = builtins::matrix(&[2.0, 3.0]).unwrap();
        assert_eq!(m, Value::zero_matrix(2, 3));
    }

    #[test]
    fn ln_rejects_nonpositive_argument() {
        assert!(builtins::ln(&[0.0]).is_err());
    }

    #[test]
    fn user_defined_param_names_come_from_the_definition() {
        let f = Function::user_defined(
            "double".to_string(), vec!["n".to_string()], vec![],
        );
        assert_eq!(f.param_names(), vec!["n".to_string()]);
    }

    #[test]
    fn redefining_deletes_the_prior_entry() {
        let mut table = FunctionTable::new();
        table.insert(Function::user_defined("f".to_string(), vec![], vec![]));
        assert!(table.delete("f").is_some());
        assert!(table.lookup("f").is_none());
    }
}
