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

//! Interpreter diagnostics.

use std::fmt::{self, Arguments, Display, Formatter};
use crate::util::Location;

// -----------------------------------------------------------------------------

/// Trait for interpreter message types.
pub trait Message: Display {
    /// Returns the origin (e.g. source location) of the message.
    #[inline]
    fn origin(&self) -> Origin { Origin::General }

    /// Returns the severity level of the message.
    #[inline]
    fn severity(&self) -> Severity { Severity::Normal }
}

impl Message for str           {}
impl Message for String        {}
impl Message for Arguments<'_> {}

impl<T> Message for &T where T: Message + ?Sized {
    #[inline]
    fn origin(&self) -> Origin { (*self).origin() }

    #[inline]
    fn severity(&self) -> Severity { (*self).severity() }
}

// -----------------------------------------------------------------------------

/// Interpreter message origins.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Origin {
    /// The message originates from the interpreter itself, not tied to a
    /// particular line of source (e.g. a CLI argument error).
    General,

    /// The message originates from a specific location in the current
    /// program fragment.
    Source {
        /// Line-and-column location within the current input.
        loc: Location,
    },
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Origin::General        => write!(f, "{}", crate::PROGRAM_NAME),
            Origin::Source { loc } => write!(f, "{}", loc),
        }
    }
}

// -----------------------------------------------------------------------------

/// Wrapper type that adds a source location to an interpreter message.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SourceMessage<M: Message> {
    /// The interpreter message.
    msg: M,

    /// Line-and-column location within the current input.
    loc: Location,
}

impl<M: Message> SourceMessage<M> {
    pub fn new(msg: M, loc: Location) -> Self {
        Self { msg, loc }
    }
}

impl<M: Message> Message for SourceMessage<M> {
    #[inline]
    fn origin(&self) -> Origin {
        Origin::Source { loc: self.loc }
    }

    #[inline]
    fn severity(&self) -> Severity {
        self.msg.severity()
    }
}

impl<M: Message> Display for SourceMessage<M> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.msg.fmt(f)
    }
}

// -----------------------------------------------------------------------------

/// Message severity levels.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    /// For informational messages.
    Normal,

    /// For potential problems that do not prevent evaluation from continuing.
    Warning,

    /// For problems that prevent the current statement from evaluating.
    /// Evaluation of the current top-level fragment stops, but the REPL
    /// continues with the next one.
    Error,

    /// For severe, unrecoverable problems. The interpreter terminates
    /// immediately.
    Fatal,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match *self {
            Severity::Normal  => "",
            Severity::Warning => "warning: ",
            Severity::Error   => "error: ",
            Severity::Fatal   => "fatal: ",
        })
    }
}

// -----------------------------------------------------------------------------

/// Wrapper type that gives warning severity to an interpreter message.
#[derive(Copy, Clone, Debug)]
pub struct Warning<T: Message>(pub T);

impl<T: Message> Message for Warning<T> {
    #[inline]
    fn origin(&self) -> Origin {
        self.0.origin()
    }

    #[inline]
    fn severity(&self) -> Severity {
        Severity::Warning
    }
}

impl<T: Message> Display for Warning<T> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

// -----------------------------------------------------------------------------

/// Wrapper type that gives error severity to an interpreter message.
#[derive(Copy, Clone, Debug)]
pub struct Error<T: Message>(pub T);

impl<T: Message> Message for Error<T> {
    #[inline]
    fn origin(&self) -> Origin {
        self.0.origin()
    }

    #[inline]
    fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl<T: Message> Display for Error<T> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

// -----------------------------------------------------------------------------

/// Wrapper type that gives fatal severity to an interpreter message.
#[derive(Copy, Clone, Debug)]
pub struct Fatal<T: Message>(pub T);

impl<T: Message> Message for Fatal<T> {
    #[inline]
    fn origin(&self) -> Origin {
        self.0.origin()
    }

    #[inline]
    fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

impl<T: Message> Display for Fatal<T> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

// -----------------------------------------------------------------------------

/// Prints a message to standard error, one line per message, with its
/// severity prefix colored following `severity: text` (e.g.
/// `error: division by zero`).
pub fn report<M: Message>(msg: &M) {
    use colored::Colorize;

    let severity = msg.severity();
    let prefix   = severity.to_string();

    let prefix = match severity {
        Severity::Warning => prefix.yellow().to_string(),
        Severity::Error   => prefix.red().to_string(),
        Severity::Fatal   => prefix.red().bold().to_string(),
        Severity::Normal  => prefix,
    };

    match msg.origin() {
        Origin::General         => eprintln!("{}{}", prefix, msg),
        Origin::Source { loc } if loc == Location::UNKNOWN
                                 => eprintln!("{}{}", prefix, msg),
        Origin::Source { loc }  => eprintln!("{}: {}{}", loc, prefix, msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_prefixes() {
        assert_eq!(Severity::Normal.to_string(),  "");
        assert_eq!(Severity::Warning.to_string(), "warning: ");
        assert_eq!(Severity::Error.to_string(),   "error: ");
        assert_eq!(Severity::Fatal.to_string(),   "fatal: ");
    }

    #[test]
    fn error_wraps_severity() {
        let e = Error("division by zero");
        assert_eq!(e.severity(), Severity::Error);
        assert_eq!(e.to_string(), "division by zero");
    }

    #[test]
    fn source_message_origin() {
        let loc = Location::new(3, 5);
        let msg = SourceMessage::new(Error("bad index"), loc);
        assert_eq!(msg.origin(), Origin::Source { loc });
    }
}
