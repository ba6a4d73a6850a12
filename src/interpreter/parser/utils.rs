use crate::{
    ast::{Expr, Parameter, Statement},
    error::ParseError,
    interpreter::{
        parser::core::{MAX_ARGUMENTS, ParseResult, Parser},
        token::TokenType,
    },
};

/// Parses a comma-separated expression list up to and including `closing`.
///
/// Shared by call argument lists and array literals. An immediately
/// encountered closing token produces an empty list. Call lists longer than
/// [`MAX_ARGUMENTS`] are reported but still parsed in full.
///
/// # Errors
/// Returns a [`ParseError`] if an element fails to parse or the list is not
/// closed.
pub(in crate::interpreter::parser) fn parse_arguments(parser: &mut Parser<'_>,
                                                      closing: TokenType,
                                                      expected: &str)
                                                      -> ParseResult<Vec<Expr>> {
    let mut items = Vec::new();
    if !parser.check(closing) {
        loop {
            if closing == TokenType::RightParen && items.len() == MAX_ARGUMENTS {
                let location = parser.peek().location();
                parser.report(ParseError::TooManyArguments { limit: MAX_ARGUMENTS,
                                                             location });
            }
            items.push(parser.expression()?);
            if !parser.matches(&[TokenType::Comma]) {
                break;
            }
        }
    }
    parser.consume(closing, expected)?;
    Ok(items)
}

/// Parses `( name, name, ... )` of a declaration.
///
/// Lists longer than `limit` are reported once but parsed in full.
///
/// # Errors
/// Returns a [`ParseError`] if the parentheses or a parameter name are
/// missing.
pub(in crate::interpreter::parser) fn parse_parameters(parser: &mut Parser<'_>,
                                                       limit: usize)
                                                       -> ParseResult<Vec<Parameter>> {
    parser.consume(TokenType::LeftParen, "'(' before parameters")?;
    let mut params = Vec::new();
    if !parser.check(TokenType::RightParen) {
        loop {
            if params.len() == limit {
                let location = parser.peek().location();
                parser.report(ParseError::TooManyParameters { limit, location });
            }
            let name = parser.consume_identifier("parameter name")?;
            params.push(Parameter { name:     name.lexeme.clone(),
                                    location: name.location(), });
            if !parser.matches(&[TokenType::Comma]) {
                break;
            }
        }
    }
    parser.consume(TokenType::RightParen, "')' after parameters")?;
    Ok(params)
}

/// Parses `{ statements }` and returns the statements.
///
/// # Errors
/// Returns a [`ParseError`] if the opening brace is missing or the block is
/// not closed.
pub(in crate::interpreter::parser) fn parse_braced_body(parser: &mut Parser<'_>,
                                                        what: &str)
                                                        -> ParseResult<Vec<Statement>> {
    parser.consume(TokenType::LeftBrace, what)?;
    parser.block_body()
}
