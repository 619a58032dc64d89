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

#![allow(dead_code)]

mod function;
mod interp;
mod lang;
mod message;
mod session;
mod symbol;
mod util;
mod value;

use std::env::args;
use std::fs;
use std::io::{self, stdin, Read};
use std::process::ExitCode;

use session::Session;

/// The name of the interpreter, used as the `Origin::General` label on
/// diagnostics that are not tied to a source location.
pub const PROGRAM_NAME: &str = "numl";

fn print_banner() {
    println!(
        "\n\
         \tnuml\n\
         \ta small interactive numeric interpreter\n"
    );
}

fn main() -> ExitCode {
    let mut argv = args();
    argv.next(); // program name

    let path = argv.next();

    let (source, prompt) = match path {
        None => {
            let mut buffer = Vec::new();
            if let Err(e) = stdin().read_to_end(&mut buffer) {
                eprintln!("{}: {}", PROGRAM_NAME, e);
                return ExitCode::FAILURE;
            }
            print_banner();
            (buffer, "> ")
        }
        Some(path) => match fs::read(&path) {
            Ok(buffer) => (buffer, ""),
            // Matches the reference `parse_args`: a file that cannot be
            // opened leaves the REPL loop unentered, so the process exits
            // cleanly without printing anything.
            Err(_) => return ExitCode::SUCCESS,
        },
    };

    match Session::new().run(&source, prompt) {
        Ok(())   => ExitCode::SUCCESS,
        Err(err) => fatal_io_error(err),
    }
}

fn fatal_io_error(err: io::Error) -> ExitCode {
    eprintln!("{}: {}", PROGRAM_NAME, err);
    ExitCode::FAILURE
}
