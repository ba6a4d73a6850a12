/// Static knowledge about class declarations.
///
/// Handles class bodies, superclass clauses and extension declarations, and
/// the inheritance, override and field-access checks that depend on them.
pub mod class;

/// The resolver state, scope handling and statement resolution.
pub mod core;

/// Expression resolution.
pub mod expr;
