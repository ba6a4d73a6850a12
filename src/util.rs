/// Numeric conversion helpers.
///
/// All numbers in the language are doubles. These helpers convert them to
/// the integer types the interpreter needs for bitwise operations, loop
/// counts and indexing, with the truncation rules spelled out in one place.
pub mod num;
