use crate::{
    ast::{LiteralValue, Statement},
    interpreter::{
        parser::{
            core::{ParseResult, Parser},
            utils::parse_braced_body,
        },
        token::TokenType,
    },
};

/// Parses a variable declaration.
///
/// Syntax:
/// ```text
///     var name;
///     var name = initializer;
///     final var name = initializer;
/// ```
///
/// Declines unless the current token is `var`, or `final` followed by `var`.
pub fn parse_var_declaration(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    let is_final = parser.check(TokenType::Final) && parser.check_next(TokenType::Var);
    if !is_final && !parser.check(TokenType::Var) {
        return Ok(None);
    }
    let location = parser.peek().location();
    if is_final {
        parser.advance();
    }
    parser.advance();

    let name = parser.consume_identifier("variable name")?;
    let initializer = if parser.matches(&[TokenType::Equal]) {
        Some(parser.expression()?)
    } else {
        None
    };
    parser.consume(TokenType::Semicolon, "';' after variable declaration")?;

    Ok(Some(Statement::VarDecl { name: name.lexeme.clone(),
                                 initializer,
                                 is_final,
                                 location }))
}

/// Parses `if (condition) statement [else statement]`. A dangling `else`
/// binds to the nearest `if`.
pub fn parse_if(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::If) {
        return Ok(None);
    }
    let location = parser.advance().location();
    parser.consume(TokenType::LeftParen, "'(' after 'if'")?;
    let condition = parser.expression()?;
    parser.consume(TokenType::RightParen, "')' after if condition")?;

    let then_branch = Box::new(parser.statement()?);
    let else_branch = if parser.matches(&[TokenType::Else]) {
        Some(Box::new(parser.statement()?))
    } else {
        None
    };

    Ok(Some(Statement::If { condition,
                            then_branch,
                            else_branch,
                            location }))
}

/// Parses `while (condition) statement`.
pub fn parse_while(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::While) {
        return Ok(None);
    }
    let location = parser.advance().location();
    parser.consume(TokenType::LeftParen, "'(' after 'while'")?;
    let condition = parser.expression()?;
    parser.consume(TokenType::RightParen, "')' after while condition")?;
    let body = Box::new(parser.statement()?);

    Ok(Some(Statement::While { condition,
                               body,
                               location }))
}

/// Parses `do statement while (condition);`. The body always runs at least
/// once.
pub fn parse_do_while(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::Do) {
        return Ok(None);
    }
    let location = parser.advance().location();
    let body = Box::new(parser.statement()?);
    parser.consume(TokenType::While, "'while' after do body")?;
    parser.consume(TokenType::LeftParen, "'(' after 'while'")?;
    let condition = parser.expression()?;
    parser.consume(TokenType::RightParen, "')' after while condition")?;
    parser.consume(TokenType::Semicolon, "';' after do-while")?;

    Ok(Some(Statement::DoWhile { body,
                                 condition,
                                 location }))
}

/// Parses `repeat (count) statement`.
pub fn parse_repeat(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::Repeat) {
        return Ok(None);
    }
    let location = parser.advance().location();
    parser.consume(TokenType::LeftParen, "'(' after 'repeat'")?;
    let count = parser.expression()?;
    parser.consume(TokenType::RightParen, "')' after repeat count")?;
    let body = Box::new(parser.statement()?);

    Ok(Some(Statement::Repeat { count, body, location }))
}

pub fn parse_block(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::LeftBrace) {
        return Ok(None);
    }
    let location = parser.advance().location();
    let statements = parser.block_body()?;
    Ok(Some(Statement::Block { statements, location }))
}

/// Parses `return;` or `return value;`.
pub fn parse_return(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::Return) {
        return Ok(None);
    }
    let location = parser.advance().location();
    let value = if parser.check(TokenType::Semicolon) {
        None
    } else {
        Some(parser.expression()?)
    };
    parser.consume(TokenType::Semicolon, "';' after return value")?;
    Ok(Some(Statement::Return { value, location }))
}

pub fn parse_break(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::Break) {
        return Ok(None);
    }
    let location = parser.advance().location();
    parser.consume(TokenType::Semicolon, "';' after 'break'")?;
    Ok(Some(Statement::Break { location }))
}

pub fn parse_continue(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::Continue) {
        return Ok(None);
    }
    let location = parser.advance().location();
    parser.consume(TokenType::Semicolon, "';' after 'continue'")?;
    Ok(Some(Statement::Continue { location }))
}

pub fn parse_print(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::Print) {
        return Ok(None);
    }
    let location = parser.advance().location();
    let expr = parser.expression()?;
    parser.consume(TokenType::Semicolon, "';' after value")?;
    Ok(Some(Statement::Print { expr, location }))
}

/// Parses a test block.
///
/// Syntax:
/// ```text
///     test ("label") { statements }
/// ```
pub fn parse_test(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::Test) {
        return Ok(None);
    }
    let location = parser.advance().location();
    parser.consume(TokenType::LeftParen, "'(' after 'test'")?;
    let label = parser.consume(TokenType::String, "test name")?;
    let name = match &label.literal {
        Some(LiteralValue::Str(text)) => text.clone(),
        _ => label.lexeme.clone(),
    };
    parser.consume(TokenType::RightParen, "')' after test name")?;
    let body = parse_braced_body(parser, "'{' before test body")?;

    Ok(Some(Statement::Test { name, body, location }))
}

/// Parses `module name;`.
pub fn parse_module(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::Module) {
        return Ok(None);
    }
    let location = parser.advance().location();
    let name = parser.consume_identifier("module name")?;
    parser.consume(TokenType::Semicolon, "';' after module name")?;
    Ok(Some(Statement::Module { name: name.lexeme.clone(),
                                location }))
}
