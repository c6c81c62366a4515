//! Rule findings.
//!
//! A [`Diagnostic`] is one advisory report: where, and a human-readable
//! sentence describing the inconsistency. Findings never carry severity or
//! fix-its; downstream tooling decides how to surface them.

use std::fmt;

use crate::ast::Position;

/// One report produced by the tag rule.
///
/// Ordering is by position first, then message text, so a sorted batch reads
/// top to bottom through the file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Diagnostic {
    pub pos: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn new(pos: Position, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            pos,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pos, self.message)
    }
}
