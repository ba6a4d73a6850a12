#![allow(unused_assignments)] // False positives from thiserror derive

use std::fmt;

use thiserror::Error;

use crate::{error::Located, interpreter::token::SourceLocation};

/// The kind of binding a finality diagnostic talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Variable,
    Function,
    Class,
    Parameter,
    Module,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
                        Self::Variable => "variable",
                        Self::Function => "function",
                        Self::Class => "class",
                        Self::Parameter => "parameter",
                        Self::Module => "module",
                    })
    }
}

/// Represents all errors raised by the static resolution pass.
///
/// Resolution is fail-fast: the first of these aborts the pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Cannot reassign final {kind} '{name}'")]
    FinalReassignment {
        kind:     DeclarationKind,
        name:     String,
        location: SourceLocation,
    },
    #[error("Cannot redeclare final {kind} '{name}'")]
    FinalRedeclaration {
        kind:     DeclarationKind,
        name:     String,
        location: SourceLocation,
    },
    #[error("Class '{class}' cannot extend final class '{superclass}'")]
    FinalInheritance {
        class:      String,
        superclass: String,
        location:   SourceLocation,
    },
    #[error("Cannot add extension methods to final class '{class}'")]
    FinalExtension {
        class:    String,
        location: SourceLocation,
    },
    #[error("Class '{class}' cannot override final method '{method}'")]
    FinalOverride {
        class:    String,
        method:   String,
        location: SourceLocation,
    },
    #[error("Cannot reassign final property '{name}'")]
    FinalFieldReassignment {
        name:     String,
        location: SourceLocation,
    },
    #[error("Cannot access private property '{name}' of class '{class}' outside its class")]
    PrivateAccess {
        class:    String,
        name:     String,
        location: SourceLocation,
    },
    #[error("Class '{class}' cannot extend itself")]
    SelfInheritance {
        class:    String,
        location: SourceLocation,
    },
    #[error("Cannot read local variable '{name}' in its own initializer")]
    ReadInOwnInitializer {
        name:     String,
        location: SourceLocation,
    },
    #[error("Cannot use '{name}' before its declaration")]
    UseBeforeDeclaration {
        name:     String,
        location: SourceLocation,
    },
    #[error("'{keyword}' used outside of a {context}")]
    IllegalControlFlow {
        keyword:  &'static str,
        context:  &'static str,
        location: SourceLocation,
    },
    #[error("Cannot return a value from a constructor")]
    ReturnFromConstructor { location: SourceLocation },
    #[error("Cannot use 'this' outside of a class")]
    ThisOutsideClass { location: SourceLocation },
    #[error("Cannot use 'super' outside of a class with a superclass")]
    SuperOutsideSubclass { location: SourceLocation },
}

impl Located for ResolveError {
    fn location(&self) -> SourceLocation {
        match self {
            Self::FinalReassignment { location, .. }
            | Self::FinalRedeclaration { location, .. }
            | Self::FinalInheritance { location, .. }
            | Self::FinalExtension { location, .. }
            | Self::FinalOverride { location, .. }
            | Self::FinalFieldReassignment { location, .. }
            | Self::PrivateAccess { location, .. }
            | Self::SelfInheritance { location, .. }
            | Self::ReadInOwnInitializer { location, .. }
            | Self::UseBeforeDeclaration { location, .. }
            | Self::IllegalControlFlow { location, .. }
            | Self::ReturnFromConstructor { location }
            | Self::ThisOutsideClass { location }
            | Self::SuperOutsideSubclass { location } => *location,
        }
    }
}
