#![allow(unused_assignments)] // False positives from thiserror derive

use thiserror::Error;

use crate::{error::Located, interpreter::token::SourceLocation};

/// Represents all errors that can occur during evaluation.
///
/// Evaluation is fail-fast: the first runtime error aborts the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable {
        name:     String,
        location: SourceLocation,
    },
    /// An operand had a type the operation does not accept.
    #[error("Type mismatch: {details}")]
    TypeMismatch {
        details:  String,
        location: SourceLocation,
    },
    #[error("Can only call functions and classes, not {type_name}")]
    NotCallable {
        type_name: &'static str,
        location:  SourceLocation,
    },
    #[error("Expected {expected} argument(s) but got {found}")]
    ArityMismatch {
        expected: usize,
        found:    usize,
        location: SourceLocation,
    },
    #[error("Undefined property '{name}'")]
    UndefinedProperty {
        name:     String,
        location: SourceLocation,
    },
    #[error("Cannot access property '{name}' on {type_name}")]
    PropertyOnNonObject {
        name:      String,
        type_name: &'static str,
        location:  SourceLocation,
    },
    /// A private field was read or written from outside its declaring class.
    #[error("Cannot access private property '{name}' outside its class")]
    PrivateAccess {
        name:     String,
        location: SourceLocation,
    },
    #[error("Cannot reassign final binding '{name}'")]
    FinalReassignment {
        name:     String,
        location: SourceLocation,
    },
    #[error("Cannot reassign final property '{name}'")]
    FinalFieldReassignment {
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
    #[error("Superclass '{name}' is not a class")]
    SuperclassNotClass {
        name:     String,
        location: SourceLocation,
    },
    #[error("'{name}' is not a class")]
    NotAClass {
        name:     String,
        location: SourceLocation,
    },
    #[error("Index {index} out of bounds for length {length}")]
    IndexOutOfBounds {
        index:    i64,
        length:   usize,
        location: SourceLocation,
    },
    #[error("Unknown native module '{name}'")]
    UnknownModule {
        name:     String,
        location: SourceLocation,
    },
    #[error("Native module '{module}' has no function '{name}'")]
    UnknownNativeFunction {
        module:   String,
        name:     String,
        location: SourceLocation,
    },
    #[error("No overload of '{module}.{name}' accepts the given arguments")]
    NoMatchingOverload {
        module:   String,
        name:     String,
        location: SourceLocation,
    },
    #[error("Call to '{module}.{name}' is ambiguous between {candidates} overloads")]
    AmbiguousOverload {
        module:     String,
        name:       String,
        candidates: usize,
        location:   SourceLocation,
    },
    #[error("Native function '{module}.{name}' failed: {message}")]
    NativeFailure {
        module:   String,
        name:     String,
        message:  String,
        location: SourceLocation,
    },
    /// `break`, `continue` or `return` escaped the construct that should
    /// have caught it.
    #[error("'{keyword}' is not allowed here")]
    IllegalControlFlow {
        keyword:  &'static str,
        location: SourceLocation,
    },
    /// Script functions recursed deeper than the configured limit.
    #[error("Maximum call depth of {limit} exceeded")]
    CallDepthExceeded {
        limit:    usize,
        location: SourceLocation,
    },
    #[error("Test '{name}' failed")]
    TestFailed {
        name:     String,
        location: SourceLocation,
    },
}

impl Located for RuntimeError {
    fn location(&self) -> SourceLocation {
        match self {
            Self::UndefinedVariable { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::NotCallable { location, .. }
            | Self::ArityMismatch { location, .. }
            | Self::UndefinedProperty { location, .. }
            | Self::PropertyOnNonObject { location, .. }
            | Self::PrivateAccess { location, .. }
            | Self::FinalReassignment { location, .. }
            | Self::FinalFieldReassignment { location, .. }
            | Self::FinalInheritance { location, .. }
            | Self::FinalExtension { location, .. }
            | Self::SuperclassNotClass { location, .. }
            | Self::NotAClass { location, .. }
            | Self::IndexOutOfBounds { location, .. }
            | Self::UnknownModule { location, .. }
            | Self::UnknownNativeFunction { location, .. }
            | Self::NoMatchingOverload { location, .. }
            | Self::AmbiguousOverload { location, .. }
            | Self::NativeFailure { location, .. }
            | Self::IllegalControlFlow { location, .. }
            | Self::CallDepthExceeded { location, .. }
            | Self::TestFailed { location, .. } => *location,
        }
    }
}

impl RuntimeError {
    /// Shorthand for the most common runtime error.
    pub fn type_mismatch(details: impl Into<String>, location: SourceLocation) -> Self {
        Self::TypeMismatch { details: details.into(),
                             location }
    }
}
