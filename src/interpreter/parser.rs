/// Arithmetic, comparison, logical, bitwise and assignment levels.
///
/// Implements the precedence ladder from assignment down to user-declared
/// infix operators, including the level at which user-declared prefix
/// operators bind.
pub mod binary;

/// The parser driver and its extension points.
///
/// Contains the token cursor, error recovery and the ordered strategy sets of
/// node-parsers that hosts can extend.
pub mod core;

/// Function, operator, native, extension and class declarations.
pub mod declaration;

/// Built-in statement productions.
///
/// Each production is a node-parser that declines unless the current token
/// opens the statement it handles.
pub mod statement;

/// Unary operators, calls, member access, indexing and primary expressions.
pub mod unary;

/// List helpers shared by calls, array literals and declarations.
pub mod utils;
