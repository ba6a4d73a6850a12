/// Logos scanner for whitespace, literals and words.
pub mod atoms;
/// The lexer driver combining the token graph and the atom scanner.
pub mod core;
/// The extensible set of recognised token types.
pub mod registry;
