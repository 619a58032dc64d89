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

//! Recursive-descent parser.

use crate::function::{Function, FunctionTable};
use crate::lang::ast::{BinOp, Node};
use crate::lang::lexer::Lexer;
use crate::lang::token::{Token, TokenKind};
use crate::message::{report, Error as MsgError, SourceMessage};
use crate::symbol::{Symbol, SymbolTable};
use crate::util::Location;

/// Flags threaded through statement parsing to reject control statements
/// outside the context that allows them. `None` means "top level"; `Some`
/// means somewhere inside a scope, loop body, or function body.
#[derive(Clone, Copy, Default)]
struct ScopeCtx {
    is_func:  bool,
    is_cycle: bool,
    is_cond:  bool,
}

/// Bundles the two tables a statement may read or mutate while it is being
/// parsed (a bare identifier inserts into the global scope the moment it
/// is seen; a `function` definition registers itself before its own body
/// is parsed, so a recursive call resolves). Passed by parameter rather
/// than stored as a struct field, so the parser never holds these tables
/// borrowed for longer than a single `parse_fragment` call — the driver
/// needs the same tables back in between fragments to evaluate them.
struct Env<'e> {
    symbols:   &'e mut SymbolTable,
    functions: &'e mut FunctionTable,
}

/// Builds an AST one top-level fragment at a time. Holds only the lexer
/// and lookahead token across calls; [`parse_fragment`](Self::parse_fragment)
/// borrows the symbol and function tables for the duration of that one
/// call only.
pub struct Parser<'a> {
    lexer:  Lexer<'a>,
    token:  Token,
    errors: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let mut lexer = Lexer::new(input);
        let token = lexer.next();
        Self { lexer, token, errors: 0 }
    }

    /// Parses everything up to, but not including, the next `EOL` (or up
    /// to `EOF`). The REPL driver calls this once per fragment; calling
    /// it again resumes right after the fragment just parsed, consuming
    /// the `EOL` that ended it.
    pub fn parse_fragment(
        &mut self,
        symbols:   &mut SymbolTable,
        functions: &mut FunctionTable,
    ) -> Vec<Node> {
        if self.token.kind == TokenKind::Eol {
            self.advance();
        }
        self.errors = 0;
        let mut env = Env { symbols, functions };
        self.stmts(None, &mut env)
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn at_eof(&self) -> bool {
        self.token.kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let next = self.lexer.next();
        std::mem::replace(&mut self.token, next)
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.token.kind == kind {
            self.advance();
            true
        } else {
            self.error_msg(format!("expected {}, found {}", kind, self.token.kind));
            self.sync();
            false
        }
    }

    fn error_msg(&mut self, msg: impl Into<String>) {
        self.errors += 1;
        report(&SourceMessage::new(MsgError(msg.into()), self.token.loc));
    }

    fn stub_error(&mut self, msg: impl Into<String>) -> Node {
        self.error_msg(msg);
        self.sync();
        Node::Stub
    }

    fn error_at(&mut self, loc: Location, msg: impl Into<String>) -> Node {
        self.errors += 1;
        report(&SourceMessage::new(MsgError(msg.into()), loc));
        self.sync();
        Node::Stub
    }

    fn sync(&mut self) {
        while !matches!(self.token.kind, TokenKind::Eol | TokenKind::Eof) {
            self.advance();
        }
    }

    fn at_eol_or_eof(&self) -> bool {
        matches!(self.token.kind, TokenKind::Eol | TokenKind::Eof)
    }

    // -- statements -----------------------------------------------------

    /// The loop at the heart of fragment parsing. At top level (`ctx ==
    /// None`) an unconsumed `EOL` ends the loop immediately, so one call
    /// may still gather several statements if they are not themselves
    /// separated by a line break. Inside a scope (`ctx == Some`), `EOL`
    /// tokens are consumed and parsing continues across lines until `EOF`
    /// or a closing `}`.
    fn stmts(&mut self, ctx: Option<ScopeCtx>, env: &mut Env) -> Vec<Node> {
        let mut out = Vec::new();
        loop {
            match self.token.kind {
                TokenKind::Eof => break,
                TokenKind::Eol if ctx.is_none() => break,
                TokenKind::Eol => { self.advance(); }
                TokenKind::RBrace if ctx.is_some() => break,
                _ => out.push(self.stmt(ctx, env)),
            }
        }
        out
    }

    fn stmt(&mut self, ctx: Option<ScopeCtx>, env: &mut Env) -> Node {
        match self.token.kind {
            TokenKind::Function => self.function_def(env),
            TokenKind::Local    => self.local_decl(ctx, env),
            TokenKind::If       => self.if_stmt(ctx, env),
            TokenKind::For      => self.for_stmt(ctx, env),
            TokenKind::While    => self.while_stmt(ctx, env),
            TokenKind::Break    => self.break_stmt(ctx),
            TokenKind::Continue => self.continue_stmt(ctx),
            TokenKind::Return   => self.return_stmt(ctx, env),
            TokenKind::Include  => self.include_stmt(),
            TokenKind::LBrace   => self.scope_stmt(ctx, env),
            TokenKind::Unknown  => self.stub_error("unrecognized input"),
            _                   => self.expr(env),
        }
    }

    fn function_def(&mut self, env: &mut Env) -> Node {
        self.advance();

        let name = match self.token.kind {
            TokenKind::Id => { let n = self.token.name().unwrap().to_string(); self.advance(); n }
            _ => return self.stub_error(format!("expected a function name, found {}", self.token.kind)),
        };

        if !self.expect(TokenKind::LParenth) { return Node::Stub; }

        let mut params = Vec::new();
        if self.token.kind != TokenKind::RParenth {
            loop {
                match self.token.kind {
                    TokenKind::Id => { params.push(self.token.name().unwrap().to_string()); self.advance(); }
                    _ => return self.stub_error(format!("expected a parameter name, found {}", self.token.kind)),
                }
                if self.token.kind == TokenKind::Comma { self.advance(); continue; }
                break;
            }
        }
        if !self.expect(TokenKind::RParenth) { return Node::Stub; }
        if !self.expect(TokenKind::LBrace)   { return Node::Stub; }

        // Installed with an empty body before the body is parsed, so a
        // recursive call inside the body resolves against the registry.
        env.functions.delete(&name);
        env.functions.insert(Function::user_defined(name.clone(), params.clone(), Vec::new()));

        let param_symbols: Vec<Symbol> = params.iter().map(Symbol::new).collect();
        env.symbols.push_scope(param_symbols);

        let errors_before = self.errors;
        let body = self.stmts(Some(ScopeCtx { is_func: true, ..Default::default() }), env);

        env.symbols.pop();

        let closed = self.expect(TokenKind::RBrace);

        if !closed || self.errors > errors_before {
            env.functions.delete(&name);
            self.error_msg("redefine your function");
            return Node::Stub;
        }

        env.functions.insert(Function::user_defined(name.clone(), params.clone(), body.clone()));
        Node::FunctionDef { name, params, body }
    }

    fn local_decl(&mut self, ctx: Option<ScopeCtx>, env: &mut Env) -> Node {
        self.advance();

        if !matches!(ctx, Some(c) if c.is_func) {
            return self.stub_error("`local` outside a function");
        }

        let mut names = Vec::new();
        loop {
            match self.token.kind {
                TokenKind::Id => { names.push(self.token.name().unwrap().to_string()); self.advance(); }
                _ => return self.stub_error(format!("expected a variable name, found {}", self.token.kind)),
            }
            if self.token.kind == TokenKind::Comma { self.advance(); continue; }
            break;
        }

        for name in &names {
            env.symbols.insert(Symbol::new(name.clone()));
        }

        Node::Local(names)
    }

    fn if_stmt(&mut self, ctx: Option<ScopeCtx>, env: &mut Env) -> Node {
        self.advance();
        if !self.expect(TokenKind::LParenth) { return Node::Stub; }
        let cond = self.or_expr(env);
        if !self.expect(TokenKind::RParenth) { return Node::Stub; }

        let inner = ScopeCtx { is_cond: true, ..ctx.unwrap_or_default() };
        let then = self.stmt(Some(inner), env);

        let else_ = if self.token.kind == TokenKind::Else {
            self.advance();
            Some(Box::new(self.stmt(Some(inner), env)))
        } else {
            None
        };

        Node::If { cond: Box::new(cond), then: Box::new(then), else_ }
    }

    fn for_stmt(&mut self, ctx: Option<ScopeCtx>, env: &mut Env) -> Node {
        self.advance();
        if !self.expect(TokenKind::LParenth) { return Node::Stub; }

        let init = if self.token.kind == TokenKind::Semicolon { Node::Stub } else { self.expr(env) };
        if !self.expect(TokenKind::Semicolon) { return Node::Stub; }

        // A missing condition clause means "loop forever".
        let cond = if self.token.kind == TokenKind::Semicolon { Node::Digit(1.0) } else { self.or_expr(env) };
        if !self.expect(TokenKind::Semicolon) { return Node::Stub; }

        let step = if self.token.kind == TokenKind::RParenth { Node::Stub } else { self.expr(env) };
        if !self.expect(TokenKind::RParenth) { return Node::Stub; }

        let inner = ScopeCtx { is_cycle: true, ..ctx.unwrap_or_default() };
        let body = self.stmt(Some(inner), env);

        Node::For { init: Box::new(init), cond: Box::new(cond), step: Box::new(step), body: Box::new(body) }
    }

    fn while_stmt(&mut self, ctx: Option<ScopeCtx>, env: &mut Env) -> Node {
        self.advance();
        if !self.expect(TokenKind::LParenth) { return Node::Stub; }
        let cond = self.or_expr(env);
        if !self.expect(TokenKind::RParenth) { return Node::Stub; }

        let inner = ScopeCtx { is_cycle: true, ..ctx.unwrap_or_default() };
        let body = self.stmt(Some(inner), env);

        Node::While { cond: Box::new(cond), body: Box::new(body) }
    }

    fn break_stmt(&mut self, ctx: Option<ScopeCtx>) -> Node {
        self.advance();
        if matches!(ctx, Some(c) if c.is_cycle) {
            Node::Break
        } else {
            self.stub_error("`break` outside a loop")
        }
    }

    fn continue_stmt(&mut self, ctx: Option<ScopeCtx>) -> Node {
        self.advance();
        if matches!(ctx, Some(c) if c.is_cycle) {
            Node::Continue
        } else {
            self.stub_error("`continue` outside a loop")
        }
    }

    fn return_stmt(&mut self, ctx: Option<ScopeCtx>, env: &mut Env) -> Node {
        self.advance();
        if !matches!(ctx, Some(c) if c.is_func) {
            return self.stub_error("`return` outside a function");
        }

        let value = if self.at_eol_or_eof() || self.token.kind == TokenKind::RBrace {
            None
        } else {
            Some(Box::new(self.sum_expr(env)))
        };

        Node::Return(value)
    }

    fn include_stmt(&mut self) -> Node {
        self.advance();
        match self.token.kind {
            TokenKind::Str => {
                let path = self.token.name().unwrap().to_string();
                self.advance();
                Node::Include(path)
            }
            _ => self.stub_error(format!("expected a file path, found {}", self.token.kind)),
        }
    }

    /// A bare `{...}` block is only meaningful as the body of an `if` or
    /// loop; elsewhere it would execute in a scope with no way to ever
    /// be revisited.
    fn scope_stmt(&mut self, ctx: Option<ScopeCtx>, env: &mut Env) -> Node {
        if !matches!(ctx, Some(c) if c.is_cycle || c.is_cond) {
            return self.stub_error("a bare `{...}` is only allowed inside `if`, `for`, or `while`");
        }

        self.advance();
        env.symbols.push();
        let body = self.stmts(ctx, env);
        env.symbols.pop();

        if !self.expect(TokenKind::RBrace) { return Node::Stub; }
        Node::Block(body)
    }

    // -- expressions ------------------------------------------------------

    fn expr(&mut self, env: &mut Env) -> Node {
        let lvalue = self.or_expr(env);

        if self.token.kind != TokenKind::Equality {
            return lvalue;
        }
        self.advance();
        let rhs = self.or_expr(env);

        match &lvalue {
            Node::Id(_) | Node::Access { .. } => {
                Node::Assign { left: Box::new(lvalue), right: Box::new(rhs) }
            }
            _ => {
                self.error_msg("rvalue assignment");
                lvalue
            }
        }
    }

    fn or_expr(&mut self, env: &mut Env) -> Node {
        let mut left = self.and_expr(env);
        while self.token.kind == TokenKind::Or {
            self.advance();
            let right = self.and_expr(env);
            left = Node::BinOp { op: BinOp::Or, left: Box::new(left), right: Box::new(right) };
        }
        left
    }

    fn and_expr(&mut self, env: &mut Env) -> Node {
        let mut left = self.rel_expr(env);
        while self.token.kind == TokenKind::And {
            self.advance();
            let right = self.rel_expr(env);
            left = Node::BinOp { op: BinOp::And, left: Box::new(left), right: Box::new(right) };
        }
        left
    }

    /// Relational operators are non-associative: at most one comparison
    /// per `rel_expr`.
    fn rel_expr(&mut self, env: &mut Env) -> Node {
        let left = self.sum_expr(env);

        let op = match self.token.kind {
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Le => BinOp::Le,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Ge => BinOp::Ge,
            TokenKind::Eq => BinOp::Eq,
            TokenKind::Ne => BinOp::Ne,
            _ => return left,
        };
        self.advance();
        let right = self.sum_expr(env);

        Node::BinOp { op, left: Box::new(left), right: Box::new(right) }
    }

    fn sum_expr(&mut self, env: &mut Env) -> Node {
        let mut left = self.mult_expr(env);
        loop {
            let op = match self.token.kind {
                TokenKind::Plus  => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.mult_expr(env);
            left = Node::BinOp { op, left: Box::new(left), right: Box::new(right) };
        }
        left
    }

    fn mult_expr(&mut self, env: &mut Env) -> Node {
        let mut left = self.exp_expr(env);
        loop {
            let op = match self.token.kind {
                TokenKind::Asterik => BinOp::Mul,
                TokenKind::Slash   => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.exp_expr(env);
            left = Node::BinOp { op, left: Box::new(left), right: Box::new(right) };
        }
        left
    }

    /// Left-associative, matching the reference grammar's left-folded `^`
    /// chain rather than the more usual right-associative convention.
    fn exp_expr(&mut self, env: &mut Env) -> Node {
        let mut left = self.term_expr(env);
        while self.token.kind == TokenKind::Caret {
            self.advance();
            let right = self.term_expr(env);
            left = Node::BinOp { op: BinOp::Pow, left: Box::new(left), right: Box::new(right) };
        }
        left
    }

    fn term_expr(&mut self, env: &mut Env) -> Node {
        if self.token.kind != TokenKind::LParenth {
            return self.term(env);
        }
        self.advance();
        let inner = self.or_expr(env);
        if !self.expect(TokenKind::RParenth) { return Node::Stub; }
        inner
    }

    fn term(&mut self, env: &mut Env) -> Node {
        match self.token.kind {
            TokenKind::Id => {
                let name = self.token.name().unwrap().to_string();
                let loc = self.token.loc;
                self.advance();
                self.token_id(name, loc, env)
            }
            TokenKind::Double => {
                let n = self.token.number().unwrap();
                self.advance();
                Node::Digit(n)
            }
            TokenKind::Str => {
                let s = self.token.name().unwrap().to_string();
                self.advance();
                Node::Str(s)
            }
            TokenKind::LBracket => {
                self.advance();
                self.matrix_literal(env)
            }
            _ => self.stub_error(format!("expected a value, found {}", self.token.kind)),
        }
    }

    /// A function call looks up the registry immediately; an access
    /// expression requires the symbol already exist; a bare reference
    /// auto-inserts an `Unknown`-kinded symbol into the global scope if
    /// it is not already bound anywhere.
    fn token_id(&mut self, name: String, loc: Location, env: &mut Env) -> Node {
        match self.token.kind {
            TokenKind::LParenth => { self.advance(); self.function_call(name, loc, env) }
            TokenKind::LBracket => self.access_node(name, loc, env),
            _ => {
                if env.symbols.lookup_all(&name).is_none() {
                    env.symbols.insert_global(Symbol::new(name.clone()));
                }
                Node::Id(name)
            }
        }
    }

    fn function_call(&mut self, name: String, loc: Location, env: &mut Env) -> Node {
        let nargs = match env.functions.lookup(&name) {
            Some(f) => f.nargs,
            None => return self.error_at(loc, format!("unknown function `{}`", name)),
        };

        let mut args = Vec::new();
        if self.token.kind != TokenKind::RParenth {
            loop {
                if self.at_eol_or_eof() {
                    return self.stub_error("unexpected end of line inside a function call");
                }
                args.push(self.or_expr(env));
                if self.token.kind == TokenKind::Comma { self.advance(); continue; }
                break;
            }
        }
        if !self.expect(TokenKind::RParenth) { return Node::Stub; }

        if args.len() != nargs {
            return self.error_at(loc, format!(
                "`{}` expects {} argument(s), found {}", name, nargs, args.len(),
            ));
        }

        Node::Call { name, args }
    }

    fn access_node(&mut self, name: String, loc: Location, env: &mut Env) -> Node {
        if env.symbols.lookup_all(&name).is_none() {
            return self.error_at(loc, format!("no such symbol `{}`", name));
        }

        let mut dims = Vec::new();
        while self.token.kind == TokenKind::LBracket {
            self.advance();
            dims.push(self.or_expr(env));
            if !self.expect(TokenKind::RBracket) { return Node::Stub; }
        }

        Node::Access { name, dims }
    }

    /// `,` extends the current row; `;` closes it and starts the next,
    /// checking that its width matches the first row's. If either
    /// dimension comes out to 1, the literal is a vector rather than a
    /// 1xN or Nx1 matrix.
    fn matrix_literal(&mut self, env: &mut Env) -> Node {
        if self.token.kind == TokenKind::RBracket {
            self.advance();
            return Node::VectorLit(Vec::new());
        }

        let mut elems = vec![self.or_expr(env)];
        let mut row = 1usize;
        let mut col = 1usize;
        let mut prev_col = 0usize;

        loop {
            match self.token.kind {
                TokenKind::Comma => {
                    self.advance();
                    col += 1;
                    elems.push(self.or_expr(env));
                }
                TokenKind::Semicolon => {
                    self.advance();
                    if prev_col != 0 && col != prev_col {
                        return self.stub_error("incompatible column count in matrix literal");
                    }
                    prev_col = col;
                    row += 1;
                    col = 1;
                    elems.push(self.or_expr(env));
                }
                TokenKind::RBracket => { self.advance(); break; }
                _ => return self.stub_error(format!("expected `,`, `;`, or `]`, found {}", self.token.kind)),
            }
        }

        if prev_col != 0 && col != prev_col {
            return self.stub_error("incompatible column count in matrix literal");
        }

        if row == 1 || col == 1 {
            Node::VectorLit(elems)
        } else {
            Node::MatrixLit { rows: row, cols: col, elems }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> (Vec<Node>, usize) {
        let mut symbols = SymbolTable::new();
        let mut functions = FunctionTable::new();
        let mut parser = Parser::new(src.as_bytes());
        let stmts = parser.parse_fragment(&mut symbols, &mut functions);
        (stmts, parser.errors())
    }

    #[test]
    fn arithmetic_precedence() {
        let (stmts, errors) = parse("1 + 2 * 3\n");
        assert_eq!(errors, 0);
        assert!(matches!(
            &stmts[0],
            Node::BinOp { op: BinOp::Add, right, .. } if matches!(**right, Node::BinOp { op: BinOp::Mul, .. })
        ));
    }

    #[test]
    fn assignment_to_rvalue_is_an_error() {
        let (stmts, errors) = parse("1 = 2\n");
        assert_eq!(errors, 1);
        assert!(matches!(stmts[0], Node::Digit(d) if d == 1.0));
    }

    #[test]
    fn vector_literal_is_single_row() {
        let (stmts, errors) = parse("[1, 2, 3]\n");
        assert_eq!(errors, 0);
        assert!(matches!(&stmts[0], Node::VectorLit(elems) if elems.len() == 3));
    }

    #[test]
    fn matrix_literal_tracks_rows_and_columns() {
        let (stmts, errors) = parse("[1, 2; 3, 4]\n");
        assert_eq!(errors, 0);
        assert!(matches!(&stmts[0], Node::MatrixLit { rows: 2, cols: 2, .. }));
    }

    #[test]
    fn mismatched_matrix_row_width_is_an_error() {
        let (_, errors) = parse("[1, 2; 3]\n");
        assert_eq!(errors, 1);
    }

    #[test]
    fn unknown_function_call_is_an_error() {
        let (_, errors) = parse("bogus(1)\n");
        assert_eq!(errors, 1);
    }

    #[test]
    fn access_to_undeclared_symbol_is_an_error() {
        let (_, errors) = parse("v[0]\n");
        assert_eq!(errors, 1);
    }

    #[test]
    fn break_outside_loop_is_an_error() {
        let (_, errors) = parse("break\n");
        assert_eq!(errors, 1);
    }

    #[test]
    fn local_outside_function_is_an_error() {
        let (_, errors) = parse("local x\n");
        assert_eq!(errors, 1);
    }

    #[test]
    fn recursive_function_definition_resolves_its_own_call() {
        let (stmts, errors) = parse(
            "function fact(n) {\n  if (n <= 1) { return 1 }\n  return n * fact(n - 1)\n}\n",
        );
        assert_eq!(errors, 0);
        assert!(matches!(&stmts[0], Node::FunctionDef { name, .. } if name == "fact"));
    }

    #[test]
    fn top_level_fragment_stops_before_unconsumed_eol() {
        let mut symbols = SymbolTable::new();
        let mut functions = FunctionTable::new();
        let mut parser = Parser::new("1\n2\n".as_bytes());

        let first = parser.parse_fragment(&mut symbols, &mut functions);
        assert_eq!(first.len(), 1);
        assert!(!parser.at_eof());

        let second = parser.parse_fragment(&mut symbols, &mut functions);
        assert_eq!(second.len(), 1);
        assert!(parser.at_eof());
    }

    #[test]
    fn non_associative_relational_operator() {
        let (stmts, errors) = parse("1 < 2\n");
        assert_eq!(errors, 0);
        assert!(matches!(stmts[0], Node::BinOp { op: BinOp::Lt, .. }));
    }

    #[test]
    fn multi_fragment_function_definition_spans_calls_sharing_state() {
        let mut symbols = SymbolTable::new();
        let mut functions = FunctionTable::new();
        let mut parser = Parser::new("function sq(x) { return x * x }\nsq(4)\n".as_bytes());

        let first = parser.parse_fragment(&mut symbols, &mut functions);
        assert!(matches!(&first[0], Node::FunctionDef { name, .. } if name == "sq"));
        assert_eq!(parser.errors(), 0);

        let second = parser.parse_fragment(&mut symbols, &mut functions);
        assert!(matches!(&second[0], Node::Call { name, .. } if name == "sq"));
        assert_eq!(parser.errors(), 0);
    }
}
