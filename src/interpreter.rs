/// The state shared between the pipeline, customizers and the host.
///
/// `ScriptContext` collects what each phase produces: tokens, comments,
/// statements, the global scope, rendered diagnostics, `print` output and
/// test outcomes.
pub mod context;
/// Host hooks around each phase.
///
/// Customizers are registered against a phase and a timing (before or
/// after) and run in registration order with mutable access to the
/// `ScriptContext`.
pub mod customizer;
/// Lexical scopes.
///
/// Environments bind names to values and chain to their enclosing scope.
/// The interpreter reaches resolved locals by scope distance and globals by
/// name.
pub mod environment;
/// The evaluator module executes the resolved AST.
///
/// The evaluator walks statements and expressions against a chain of
/// environments, propagating `break`, `continue` and `return` as explicit
/// signals rather than by unwinding.
///
/// # Responsibilities
/// - Evaluates expressions, operators, calls and property access.
/// - Creates functions, classes and instances, and dispatches native calls.
/// - Re-checks finality and privacy rules that only show up at run time.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a stream of tokens,
/// each corresponding to a meaningful language element such as a number,
/// identifier, operator, delimiter or keyword. Comments are collected
/// separately. This is the first stage of interpretation.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with type and source
///   location.
/// - Matches operators against an extensible registry of token types.
/// - Reports lexical errors for invalid or malformed input.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser processes the token stream produced by the lexer and
/// constructs an AST that represents the syntactic structure of the
/// program. Statement and primary-expression productions are pluggable so
/// hosts can add syntax.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes (expressions, statements).
/// - Validates correct grammar and syntax, reporting errors with location
///   info and recovering to report as many as possible.
pub mod parser;
/// The static pass between parsing and evaluation.
///
/// Computes scope distances for local references and enforces finality,
/// inheritance, access and control-flow rules before any code runs.
pub mod resolver;
/// The host entry point tying every phase together.
pub mod script;
/// Tokens and source locations.
pub mod token;
/// The value module defines the runtime data types for evaluation.
///
/// This module declares the values scripts compute with, the callable
/// objects (functions, classes, instances) and the bridge to host-provided
/// native functions.
///
/// # Responsibilities
/// - Defines the `Value` enum, truthiness, equality and display formatting.
/// - Implements classes with method lookup along the superclass chain and
///   instances with per-field visibility and finality.
/// - Scores native overloads against runtime argument types.
pub mod value;
