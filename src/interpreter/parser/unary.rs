use crate::{
    ast::{Expr, ExprId, LiteralValue, UnaryOperator},
    error::ParseError,
    interpreter::{
        parser::{
            core::{ParseResult, Parser, found_text},
            utils::parse_arguments,
        },
        token::TokenType,
    },
};

/// Parses `!`, `-` and `~` applied to an operand. Unary operators nest, so
/// `!!x` and `-~x` are accepted.
///
/// Grammar: `unary := ("!" | "-" | "~") unary | call`
pub fn parse_unary(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let op = match parser.peek().kind {
        TokenType::Bang => UnaryOperator::Not,
        TokenType::Minus => UnaryOperator::Negate,
        TokenType::Tilde => UnaryOperator::Complement,
        _ => return parse_call(parser),
    };
    let location = parser.advance().location();
    let operand = parse_unary(parser)?;
    Ok(Expr::Unary { op,
                     operand: Box::new(operand),
                     location })
}

/// Parses calls, property access and indexing, in any combination.
///
/// Grammar: `call := primary ( "(" arguments? ")" | "." IDENT | "[" expression
/// "]" )*`
pub fn parse_call(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let mut expr = parse_primary(parser)?;
    loop {
        expr = match parser.peek().kind {
            TokenType::LeftParen => {
                let location = parser.advance().location();
                let arguments = parse_arguments(parser, TokenType::RightParen, "')' after arguments")?;
                Expr::Call { callee: Box::new(expr),
                             arguments,
                             location }
            },
            TokenType::Dot => {
                parser.advance();
                let name = parser.consume_member_name("property name after '.'")?;
                Expr::Get { object:   Box::new(expr),
                            name:     name.lexeme.clone(),
                            location: name.location(), }
            },
            TokenType::LeftBracket => {
                let location = parser.advance().location();
                let index = parser.expression()?;
                parser.consume(TokenType::RightBracket, "']' after index")?;
                Expr::ArrayGet { array: Box::new(expr),
                                 index: Box::new(index),
                                 location }
            },
            _ => break,
        };
    }
    Ok(expr)
}

/// Parses literals, names, `this`, `super.method`, parenthesized
/// expressions and array literals, then any host-registered primary forms.
///
/// # Errors
/// Returns [`ParseError::ExpectedExpression`] if nothing matches.
pub fn parse_primary(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let token = parser.peek();
    let location = token.location();

    match token.kind {
        TokenType::Number
        | TokenType::String
        | TokenType::Char
        | TokenType::True
        | TokenType::False
        | TokenType::Nil => {
            parser.advance();
            let value = token.literal.clone().unwrap_or(LiteralValue::Nil);
            Ok(Expr::Literal { value, location })
        },
        TokenType::Identifier => {
            parser.advance();
            Ok(Expr::variable(token.lexeme.clone(), location))
        },
        TokenType::This => {
            parser.advance();
            Ok(Expr::This { id: ExprId::fresh(),
                            location })
        },
        TokenType::Super => {
            parser.advance();
            parser.consume(TokenType::Dot, "'.' after 'super'")?;
            let method = parser.consume_member_name("superclass method name")?;
            Ok(Expr::Super { id: ExprId::fresh(),
                             method: method.lexeme.clone(),
                             location })
        },
        TokenType::LeftParen => {
            parser.advance();
            let expr = parser.expression()?;
            parser.consume(TokenType::RightParen, "')' after expression")?;
            Ok(Expr::Grouping { expr: Box::new(expr),
                                location })
        },
        TokenType::LeftBracket => {
            parser.advance();
            let elements = parse_arguments(parser, TokenType::RightBracket, "']' after array elements")?;
            Ok(Expr::ArrayLiteral { elements, location })
        },
        _ => match parser.extension_expression()? {
            Some(expr) => Ok(expr),
            None => Err(ParseError::ExpectedExpression { found: found_text(token),
                                                         location }),
        },
    }
}

/// Whether a token of type `kind` can begin an operand. Used to tell a
/// prefix-function application apart from a bare reference to the function.
#[must_use]
pub const fn can_start_expression(kind: TokenType) -> bool {
    matches!(kind,
             TokenType::Number
             | TokenType::String
             | TokenType::Char
             | TokenType::True
             | TokenType::False
             | TokenType::Nil
             | TokenType::Identifier
             | TokenType::This
             | TokenType::Super
             | TokenType::LeftParen
             | TokenType::LeftBracket
             | TokenType::Bang
             | TokenType::Minus
             | TokenType::Tilde)
}
