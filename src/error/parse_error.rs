#![allow(unused_assignments)] // False positives from thiserror derive

use thiserror::Error;

use crate::{error::Located, interpreter::token::SourceLocation};

/// Represents all errors that can occur during parsing.
///
/// The parser records these and resynchronises at the next statement
/// boundary, so one pass can report several of them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The current token cannot start an expression.
    #[error("Expected expression, found '{found}'")]
    ExpectedExpression {
        found:    String,
        location: SourceLocation,
    },
    /// A specific token was required.
    #[error("Expected {expected}, found '{found}'")]
    ExpectedToken {
        expected: String,
        found:    String,
        location: SourceLocation,
    },
    /// The left-hand side of `=` is not a variable, property or array slot.
    #[error("Invalid assignment target")]
    InvalidAssignmentTarget { location: SourceLocation },
    /// A call passes more arguments than the language allows.
    #[error("Cannot have more than {limit} arguments")]
    TooManyArguments {
        limit:    usize,
        location: SourceLocation,
    },
    /// A declaration lists more parameters than the language allows.
    #[error("Cannot have more than {limit} parameters")]
    TooManyParameters {
        limit:    usize,
        location: SourceLocation,
    },
    /// A `prefix` or `infix` function with the wrong number of parameters.
    #[error("A {kind} function must declare exactly {expected} parameter(s), found {found}")]
    OperatorArity {
        kind:     &'static str,
        expected: usize,
        found:    usize,
        location: SourceLocation,
    },
    /// Something other than a field, method or constructor in a class body.
    #[error("Expected field, method or constructor in class body, found '{found}'")]
    InvalidClassMember {
        found:    String,
        location: SourceLocation,
    },
}

impl Located for ParseError {
    fn location(&self) -> SourceLocation {
        match self {
            Self::ExpectedExpression { location, .. }
            | Self::ExpectedToken { location, .. }
            | Self::InvalidAssignmentTarget { location }
            | Self::TooManyArguments { location, .. }
            | Self::TooManyParameters { location, .. }
            | Self::OperatorArity { location, .. }
            | Self::InvalidClassMember { location, .. } => *location,
        }
    }
}
