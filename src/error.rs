use std::fmt;

use thiserror::Error;

use crate::interpreter::token::SourceLocation;

/// Lexing errors.
///
/// Raised while turning source text into tokens: characters and character
/// sequences the token registry does not recognise, and unterminated
/// literals or comments. Also holds the errors raised when a host extends
/// the token registry with an invalid sequence.
pub mod lex_error;
/// Parsing errors.
///
/// Defines all error types that can occur while building the AST from the
/// token stream. The parser recovers from these, so a single pass may report
/// several.
pub mod parse_error;
/// Diagnostic rendering with a caret under the offending column.
pub mod reporter;
/// Resolution errors.
///
/// Raised by the static pass that runs between parsing and evaluation:
/// finality violations, illegal inheritance, private access the resolver can
/// prove, and misplaced control flow.
pub mod resolve_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation: type
/// mismatches, undefined names, illegal property access, native overload
/// failures, and the dynamic backstops for finality.
pub mod runtime_error;

pub use lex_error::{LexError, RegistryError};
pub use parse_error::ParseError;
pub use reporter::ErrorReporter;
pub use resolve_error::ResolveError;
pub use runtime_error::RuntimeError;

/// The pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Tokenizing,
    Parsing,
    Resolving,
    Interpreting,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Self; 4] = [Self::Tokenizing, Self::Parsing, Self::Resolving, Self::Interpreting];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
                        Self::Tokenizing => "Tokenizing",
                        Self::Parsing => "Parsing",
                        Self::Resolving => "Resolving",
                        Self::Interpreting => "Interpreting",
                    })
    }
}

/// Implemented by every error that points at a position in the source.
pub trait Located {
    fn location(&self) -> SourceLocation;
}

/// The single structured error surfaced to hosts.
///
/// Lexing and parsing recover and may carry several diagnostics; resolution
/// and interpretation are fail-fast and carry exactly one.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("tokenizing failed with {} error(s)", .0.len())]
    Lex(Vec<LexError>),
    #[error("parsing failed with {} error(s)", .0.len())]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// A host customizer rejected the context.
    #[error("{phase} customizer failed: {message}")]
    Customizer { phase: Phase, message: String },
}

impl ScriptError {
    /// The phase the error was raised in.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Lex(_) => Phase::Tokenizing,
            Self::Parse(_) => Phase::Parsing,
            Self::Resolve(_) => Phase::Resolving,
            Self::Runtime(_) => Phase::Interpreting,
            Self::Customizer { phase, .. } => *phase,
        }
    }

    /// Convenience constructor for customizers.
    pub fn customizer(phase: Phase, message: impl Into<String>) -> Self {
        Self::Customizer { phase,
                           message: message.into() }
    }
}
