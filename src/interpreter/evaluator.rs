/// Operator evaluation.
///
/// Implements the arithmetic, comparison, equality, bitwise and unary
/// operators on runtime values.
pub mod binary;

/// Calls.
///
/// Dispatches calls to script functions, classes and native bindings, and
/// binds function and native declarations.
pub mod call;

/// Class declarations, instantiation, extension methods and `super`.
pub mod class;

/// Core evaluation logic and interpreter state.
///
/// Contains the interpreter, statement execution and the control-flow
/// signals that statements report.
pub mod core;

/// Expression evaluation, variable access and property access.
pub mod expr;
