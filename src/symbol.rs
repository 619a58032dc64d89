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

//! Named bindings and the scope stack.

use std::collections::HashMap;

use crate::value::Value;

/// A single named binding. Its kind is whatever the current `Value`
/// variant is; reassignment simply replaces the payload, matching the
/// reference symbol's clean-then-set discipline (no separate destructor
/// bookkeeping is needed since `Value` owns its payload directly).
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub val:  Value,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), val: Value::Unknown }
    }

    pub fn with_value(name: impl Into<String>, val: Value) -> Self {
        Self { name: name.into(), val }
    }
}

/// The name of the distinguished symbol holding the most recent result.
pub const ANS: &str = "ans";

/// A single scope: a flat name→symbol map plus a link to its parent.
#[derive(Debug, Default)]
struct Scope {
    symbols: HashMap<String, Symbol>,
}

/// A stack of scopes, `global` at the bottom and `top` the active one.
///
/// Lookup has two flavors: [`lookup_top`](Self::lookup_top) searches only
/// the active scope; [`lookup_all`](Self::lookup_all) walks from `top`
/// down to `global`. Pushing installs a fresh empty scope (used when a
/// function call begins); the reference implementation instead swaps in a
/// function's own captured scope, which callers here do via
/// [`push_scope`](Self::push_scope).
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// Creates the table with just the global scope, seeding the
    /// distinguished `ans` symbol from the current working directory (a
    /// historical quirk of the original interpreter, preserved here).
    pub fn new() -> Self {
        let mut table = Self { scopes: vec![Scope::default()] };

        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| ".".to_string());

        table.global_mut().symbols.insert(
            ANS.to_string(),
            Symbol::with_value(ANS, Value::Str(cwd)),
        );

        table
    }

    fn global_mut(&mut self) -> &mut Scope {
        self.scopes.first_mut().expect("global scope always present")
    }

    fn top_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("a scope is always active")
    }

    /// Looks up `name` in the active scope only.
    pub fn lookup_top(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|s| s.symbols.get(name))
    }

    /// Looks up `name` from the active scope down to `global`.
    pub fn lookup_all(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|s| s.symbols.get(name))
    }

    pub fn lookup_all_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes.iter_mut().rev().find_map(|s| s.symbols.get_mut(name))
    }

    /// Inserts a symbol into the active scope, replacing any prior symbol
    /// of the same name.
    pub fn insert(&mut self, symbol: Symbol) {
        let name = symbol.name.clone();
        self.top_mut().symbols.insert(name, symbol);
    }

    /// Inserts a symbol directly into the global scope, bypassing `top`.
    pub fn insert_global(&mut self, symbol: Symbol) {
        let name = symbol.name.clone();
        self.global_mut().symbols.insert(name, symbol);
    }

    /// Sets `ans` in the global scope to `val`.
    pub fn set_ans(&mut self, val: Value) {
        self.global_mut().symbols.insert(ANS.to_string(), Symbol::with_value(ANS, val));
    }

    /// Assigns `val` to `name`, inserting it into the active scope if it
    /// is not already bound anywhere visible.
    pub fn assign(&mut self, name: &str, val: Value) {
        if let Some(sym) = self.lookup_all_mut(name) {
            sym.val = val;
        } else {
            self.insert(Symbol::with_value(name, val));
        }
    }

    /// Pushes a fresh, empty scope (e.g. a lexically-bare block).
    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pushes a prebuilt scope, used to install a function's captured
    /// parameter scope on call.
    pub fn push_scope(&mut self, scope_symbols: Vec<Symbol>) {
        let mut scope = Scope::default();
        for sym in scope_symbols {
            scope.symbols.insert(sym.name.clone(), sym);
        }
        self.scopes.push(scope);
    }

    /// Pops the active scope. Refuses to pop the global scope, mirroring
    /// the reference's `error(1, "pop global table")` guard.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ans_is_seeded_in_global_scope() {
        let table = SymbolTable::new();
        let ans = table.lookup_top(ANS).expect("ans should exist");
        assert!(matches!(ans.val, Value::Str(_)));
    }

    #[test]
    fn lookup_top_does_not_see_outer_scopes() {
        let mut table = SymbolTable::new();
        table.insert(Symbol::with_value("x", Value::Digit(1.0)));
        table.push();
        assert!(table.lookup_top("x").is_none());
        assert!(table.lookup_all("x").is_some());
    }

    #[test]
    fn assign_updates_existing_binding_in_outer_scope() {
        let mut table = SymbolTable::new();
        table.insert(Symbol::with_value("x", Value::Digit(1.0)));
        table.push();
        table.assign("x", Value::Digit(2.0));
        table.pop();
        assert_eq!(table.lookup_top("x").unwrap().val, Value::Digit(2.0));
    }

    #[test]
    fn cannot_pop_global_scope() {
        let mut table = SymbolTable::new();
        table.pop();
        assert_eq!(table.depth(), 1);
    }

    #[test]
    fn push_scope_installs_prebuilt_bindings() {
        let mut table = SymbolTable::new();
        table.push_scope(vec![Symbol::with_value("x1", Value::Digit(5.0))]);
        assert_eq!(table.lookup_top("x1").unwrap().val, Value::Digit(5.0));
    }
}
