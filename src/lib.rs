//! # hsl
//!
//! hsl is an embeddable scripting language written in Rust.
//! A host hands it a small, dynamically typed script, for example a
//! conditional expression or a configuration snippet. The engine tokenizes,
//! parses, statically resolves and then interprets the script, with hooks for
//! extending the syntax, exposing host functions and observing each phase.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    error::ScriptError,
    interpreter::{context::ScriptContext, script::Script},
};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` and `Statement` enums and related types
/// that represent the syntactic structure of a script as a tree. The AST is
/// built by the parser, checked by the resolver and walked by the evaluator.
///
/// # Responsibilities
/// - Defines expression and statement types for all language constructs.
/// - Attaches source locations to AST nodes for error reporting.
/// - Gives name-bearing expressions the ids the resolver keys its results
///   by.
pub mod ast;
/// Provides unified error types for every phase.
///
/// This module defines all errors that can be raised while tokenizing,
/// parsing, resolving or evaluating a script, the `ScriptError` that carries
/// them to the host, and the reporter that renders them with a caret under
/// the offending column.
///
/// # Responsibilities
/// - Defines one error enum per phase, each carrying a source location.
/// - Aggregates them into a single structured error for hosts.
/// - Renders diagnostics uniformly.
pub mod error;
/// Orchestrates the entire process of script execution.
///
/// This module ties together lexing, parsing, resolution, evaluation, value
/// representations and the host-facing `Script` API.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, resolver, evaluator and
///   value types.
/// - Provides the entry points for checking and running scripts.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for numeric conversion.
///
/// # Responsibilities
/// - Convert doubles to the integer types used by bitwise operators, loop
///   counts and indexing, without silent surprises.
pub mod util;

/// Runs a script with the default configuration and returns its context.
///
/// # Errors
/// Returns a [`ScriptError`] from whichever phase failed first.
///
/// # Examples
/// ```
/// use hsl::{evaluate, interpreter::value::core::Value};
///
/// let context = evaluate("var total = 0; repeat (4) total = total + 2.5;").unwrap();
/// assert_eq!(context.global("total"), Some(Value::from(10.0)));
///
/// // 'x' is final, so the assignment is rejected before anything runs.
/// let result = evaluate("final var x = 1; x = 2;");
/// assert!(result.is_err());
/// ```
pub fn evaluate(source: &str) -> Result<ScriptContext, ScriptError> {
    let mut script = Script::new(source);
    script.evaluate()?;
    Ok(script.into_context())
}
