use crate::types::SourcePos;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of everything that can go wrong in a worm-program.
///
/// `Syntax`, `Type` and `Argument` errors are collected during parsing and
/// construction so a single parse reports all of them. The remaining kinds
/// are fatal at run time: they escape `Program::run` and leave the program
/// permanently unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Syntax,
    Type,
    Argument,
    IllegalState,
    Capability,
    Reference,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Type => "type error",
            ErrorKind::Argument => "argument error",
            ErrorKind::IllegalState => "illegal state",
            ErrorKind::Capability => "capability error",
            ErrorKind::Reference => "reference error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct ProgramError {
    pub kind: ErrorKind,
    pub message: String,
    pub pos: Option<SourcePos>,
}

impl ProgramError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            pos: None,
        }
    }

    pub fn at(kind: ErrorKind, pos: SourcePos, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            pos: Some(pos),
        }
    }

    pub fn syntax(pos: SourcePos, message: impl Into<String>) -> Self {
        Self::at(ErrorKind::Syntax, pos, message)
    }

    pub fn type_error(pos: SourcePos, message: impl Into<String>) -> Self {
        Self::at(ErrorKind::Type, pos, message)
    }

    pub fn argument(pos: SourcePos, message: impl Into<String>) -> Self {
        Self::at(ErrorKind::Argument, pos, message)
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IllegalState, message)
    }

    pub fn capability(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Capability, message)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reference, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let error = ProgramError::capability("food has no hit points");
        assert_eq!(error.to_string(), "capability error: food has no hit points");
    }

    #[test]
    fn positioned_error_keeps_its_source_pos() {
        let error = ProgramError::type_error(SourcePos::new(3, 14), "expected number");
        assert_eq!(error.pos, Some(SourcePos::new(3, 14)));
        assert_eq!(error.kind, ErrorKind::Type);
    }
}
