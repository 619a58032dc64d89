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

//! Interpreter session: wires the parser and evaluator together over one
//! continuous input buffer, one program fragment at a time.

use std::io::{self, Write};

use crate::interp::Interpreter;
use crate::lang::parser::Parser;
use crate::message::{report, Error as ErrorMsg};

/// One REPL run over a buffered program, from first byte to `EOF`.
///
/// The reference implementation streams characters straight from the
/// chosen `FILE*` (stdin or a named file); this rendition reads the whole
/// fragment source into memory up front (see the lexer's own doc comment)
/// and advances a single [`Parser`] across it fragment by fragment. The
/// parser is never kept borrowing the symbol/function tables between
/// fragments — each `parse_fragment` call borrows them for just that
/// call, so the interpreter can evaluate against the very same tables
/// in between without any duplication or hand-off step.
pub struct Session {
    interp: Interpreter,
}

impl Session {
    pub fn new() -> Self {
        Self { interp: Interpreter::new() }
    }

    /// Runs the fragment-at-a-time REPL loop over `source`, printing
    /// `prompt` before each fragment and the fragment's result (if any)
    /// after evaluating it. Returns once the input is exhausted.
    pub fn run(&mut self, source: &[u8], prompt: &str) -> io::Result<()> {
        let mut parser = Parser::new(source);
        let stdout = io::stdout();

        loop {
            {
                let mut out = stdout.lock();
                write!(out, "{}", prompt)?;
                out.flush()?;
            }

            let stmts = parser.parse_fragment(&mut self.interp.symbols, &mut self.interp.functions);

            if parser.errors() == 0 {
                match self.interp.eval_program(&stmts) {
                    // `ans` mirrors whatever is about to be printed, so it
                    // reflects even the results (e.g. a bare loop or
                    // identifier as the last statement) that the individual
                    // node evaluators above don't mirror into it themselves.
                    Ok(Some(value)) => {
                        self.interp.symbols.set_ans(value.clone());
                        println!("{}", value);
                    }
                    Ok(None)     => {}
                    Err(message) => report(&ErrorMsg(message)),
                }
            }

            if parser.at_eof() {
                return Ok(());
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_precedence_end_to_end() {
        let mut session = Session::new();
        session.run(b"1 + 2 * 3\n", "").unwrap();
        assert_eq!(session.interp.symbols.lookup_top("ans").unwrap().val.to_string(), "7.000000");
    }

    #[test]
    fn user_defined_function_end_to_end() {
        let mut session = Session::new();
        session.run(b"function f(x) { return x*x }\nf(3)\n", "").unwrap();
        assert_eq!(session.interp.symbols.lookup_top("ans").unwrap().val.to_string(), "9.000000");
    }

    #[test]
    fn matrix_multiplication_end_to_end() {
        let mut session = Session::new();
        session.run(b"A = [1,2;3,4]\nA*A\n", "").unwrap();
        assert_eq!(
            session.interp.symbols.lookup_top("ans").unwrap().val.to_string(),
            "7.000000 10.000000\n15.000000 22.000000",
        );
    }

    #[test]
    fn vector_dot_product_end_to_end() {
        let mut session = Session::new();
        session.run(b"v = vector(3)\nv[0]=1\nv[1]=2\nv[2]=3\nv*v\n", "").unwrap();
        assert_eq!(session.interp.symbols.lookup_top("ans").unwrap().val.to_string(), "14.000000");
    }

    #[test]
    fn for_loop_leaves_last_iteration_value_in_ans() {
        let mut session = Session::new();
        session.run(b"for(i=0;i<3;i=i+1){ i }\n", "").unwrap();
        assert_eq!(session.interp.symbols.lookup_top("ans").unwrap().val.to_string(), "2.000000");
    }

    #[test]
    fn if_else_end_to_end() {
        let mut session = Session::new();
        session.run(b"if (1==1) { \"yes\" } else { \"no\" }\n", "").unwrap();
        assert_eq!(session.interp.symbols.lookup_top("ans").unwrap().val.to_string(), "yes");
    }

    #[test]
    fn a_parse_error_does_not_poison_the_following_fragment() {
        let mut session = Session::new();
        session.run(b"1 = 2\n3 + 4\n", "").unwrap();
        assert_eq!(session.interp.symbols.lookup_top("ans").unwrap().val.to_string(), "7.000000");
    }
}
