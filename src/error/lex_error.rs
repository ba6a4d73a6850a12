#![allow(unused_assignments)] // False positives from thiserror derive

use thiserror::Error;

use crate::{error::Located, interpreter::token::SourceLocation};

/// Represents all errors that can occur while scanning source text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A character that starts neither a literal, an identifier nor any
    /// registered token sequence.
    #[error("Unexpected character '{character}'")]
    UnexpectedCharacter {
        character: char,
        location:  SourceLocation,
    },
    /// A run of operator characters with no complete token type on its path
    /// through the token graph.
    #[error("Unrecognized token sequence '{sequence}'")]
    UnknownSequence {
        sequence: String,
        location: SourceLocation,
    },
    #[error("Unterminated or malformed string literal")]
    UnterminatedString { location: SourceLocation },
    /// A backslash followed by a character with no escape meaning.
    #[error("Invalid escape sequence '\\{escape}'")]
    InvalidEscape {
        escape:   char,
        location: SourceLocation,
    },
    #[error("Invalid character literal")]
    InvalidCharLiteral { location: SourceLocation },
    #[error("Unterminated block comment")]
    UnterminatedComment { location: SourceLocation },
}

impl Located for LexError {
    fn location(&self) -> SourceLocation {
        match self {
            Self::UnexpectedCharacter { location, .. }
            | Self::UnknownSequence { location, .. }
            | Self::InvalidEscape { location, .. }
            | Self::UnterminatedString { location }
            | Self::InvalidCharLiteral { location }
            | Self::UnterminatedComment { location } => *location,
        }
    }
}

/// Errors raised when a host registers an invalid token sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("token sequences cannot be empty")]
    EmptySequence,
    #[error("'{character}' in '{sequence}' is not a token character")]
    NotATokenCharacter { character: char, sequence: String },
    #[error("'{sequence}' is already registered as {existing}")]
    Conflict { sequence: String, existing: String },
    #[error("'{word}' is not a valid keyword")]
    InvalidKeyword { word: String },
    #[error("too many custom token types")]
    Exhausted,
}
