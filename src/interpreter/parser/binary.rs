use crate::{
    ast::{BinaryOperator, BitwiseOperator, Expr, ExprId, LogicalOperator},
    error::ParseError,
    interpreter::{
        parser::{
            core::{ParseResult, Parser},
            unary::{can_start_expression, parse_unary},
        },
        token::TokenType,
    },
};

/// Parses an assignment, the lowest-precedence expression.
///
/// Assignment is right-associative. The left-hand side is parsed as an
/// ordinary expression first and then rewritten into the matching
/// assignment node: variables become [`Expr::Assign`], property reads become
/// [`Expr::Set`] and array reads become [`Expr::ArraySet`]. Any other
/// target is reported without aborting the parse.
///
/// Grammar: `assignment := elvis ("=" assignment)?`
pub fn parse_assignment(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let expr = parse_elvis(parser)?;

    if !parser.check(TokenType::Equal) {
        return Ok(expr);
    }
    let equals = parser.advance().location();
    let value = Box::new(parse_assignment(parser)?);

    Ok(match expr {
        Expr::Variable { name, location, .. } => Expr::Assign { id: ExprId::fresh(),
                                                                name,
                                                                value,
                                                                location },
        Expr::Get { object,
                    name,
                    location, } => Expr::Set { object,
                                               name,
                                               value,
                                               location },
        Expr::ArrayGet { array,
                         index,
                         location, } => Expr::ArraySet { array,
                                                         index,
                                                         value,
                                                         location },
        other => {
            parser.report(ParseError::InvalidAssignmentTarget { location: equals });
            other
        },
    })
}

/// Parses `value ?: fallback`.
///
/// Grammar: `elvis := ternary ("?:" ternary)*`
pub fn parse_elvis(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let mut expr = parse_ternary(parser)?;
    while parser.check(TokenType::Elvis) {
        let location = parser.advance().location();
        let fallback = parse_ternary(parser)?;
        expr = Expr::Elvis { value: Box::new(expr),
                             fallback: Box::new(fallback),
                             location };
    }
    Ok(expr)
}

/// Parses `condition ? then : otherwise`. The else branch nests to the
/// right, so `a ? b : c ? d : e` reads as `a ? b : (c ? d : e)`.
///
/// Grammar: `ternary := shift ("?" elvis ":" ternary)?`
pub fn parse_ternary(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let condition = parse_shift(parser)?;
    if !parser.check(TokenType::Question) {
        return Ok(condition);
    }
    let location = parser.advance().location();
    let then_branch = parse_elvis(parser)?;
    parser.consume(TokenType::Colon, "':' in conditional expression")?;
    let else_branch = parse_ternary(parser)?;

    Ok(Expr::Ternary { condition: Box::new(condition),
                       then_branch: Box::new(then_branch),
                       else_branch: Box::new(else_branch),
                       location })
}

/// Grammar: `shift := or (("<<" | ">>" | ">>>") or)*`
pub fn parse_shift(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let mut left = parse_or(parser)?;
    loop {
        let op = match parser.peek().kind {
            TokenType::ShiftLeft => BitwiseOperator::ShiftLeft,
            TokenType::ShiftRight => BitwiseOperator::ShiftRight,
            TokenType::UnsignedShiftRight => BitwiseOperator::UnsignedShiftRight,
            _ => break,
        };
        let location = parser.advance().location();
        let right = parse_or(parser)?;
        left = Expr::Bitwise { left: Box::new(left),
                               op,
                               right: Box::new(right),
                               location };
    }
    Ok(left)
}

/// Parses `||` (short-circuit) and `|` (bitwise, or eager logical on
/// booleans).
///
/// Grammar: `or := xor (("||" | "|") xor)*`
pub fn parse_or(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let mut left = parse_xor(parser)?;
    loop {
        left = match parser.peek().kind {
            TokenType::Or => {
                let location = parser.advance().location();
                let right = parse_xor(parser)?;
                Expr::Logical { left: Box::new(left),
                                op: LogicalOperator::Or,
                                right: Box::new(right),
                                location }
            },
            TokenType::Pipe => {
                let location = parser.advance().location();
                let right = parse_xor(parser)?;
                Expr::Bitwise { left: Box::new(left),
                                op: BitwiseOperator::Or,
                                right: Box::new(right),
                                location }
            },
            _ => break,
        };
    }
    Ok(left)
}

/// Grammar: `xor := and ("^" and)*`
pub fn parse_xor(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let mut left = parse_and(parser)?;
    while parser.check(TokenType::Caret) {
        let location = parser.advance().location();
        let right = parse_and(parser)?;
        left = Expr::Bitwise { left: Box::new(left),
                               op: BitwiseOperator::Xor,
                               right: Box::new(right),
                               location };
    }
    Ok(left)
}

/// Grammar: `and := equality (("&&" | "&") equality)*`
pub fn parse_and(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let mut left = parse_equality(parser)?;
    loop {
        left = match parser.peek().kind {
            TokenType::And => {
                let location = parser.advance().location();
                let right = parse_equality(parser)?;
                Expr::Logical { left: Box::new(left),
                                op: LogicalOperator::And,
                                right: Box::new(right),
                                location }
            },
            TokenType::Ampersand => {
                let location = parser.advance().location();
                let right = parse_equality(parser)?;
                Expr::Bitwise { left: Box::new(left),
                                op: BitwiseOperator::And,
                                right: Box::new(right),
                                location }
            },
            _ => break,
        };
    }
    Ok(left)
}

/// Grammar: `equality := prefix (("==" | "!=") prefix)*`
pub fn parse_equality(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    binary_level(parser, parse_prefix, |kind| match kind {
        TokenType::EqualEqual => Some(BinaryOperator::Equal),
        TokenType::BangEqual => Some(BinaryOperator::NotEqual),
        _ => None,
    })
}

/// Parses the application of a user-declared `prefix` function.
///
/// A known prefix name followed by something that can start an operand is an
/// operator application; the operand is itself parsed at this level, so
/// `neg neg 5` nests. A prefix name directly followed by `(` is left to the
/// call level, so `neg(5) + 1` keeps ordinary call semantics.
///
/// Grammar: `prefix := PREFIX_NAME prefix | relational`
pub fn parse_prefix(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let token = parser.peek();
    let next = parser.peek_next().kind;
    if token.kind == TokenType::Identifier
       && parser.is_prefix(&token.lexeme)
       && next != TokenType::LeftParen
       && can_start_expression(next)
    {
        parser.advance();
        let operand = parse_prefix(parser)?;
        return Ok(Expr::PrefixCall { id:       ExprId::fresh(),
                                     name:     token.lexeme.clone(),
                                     operand:  Box::new(operand),
                                     location: token.location(), });
    }
    parse_relational(parser)
}

/// Grammar: `relational := additive (("<" | "<=" | ">" | ">=") additive)*`
pub fn parse_relational(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    binary_level(parser, parse_additive, |kind| match kind {
        TokenType::Less => Some(BinaryOperator::Less),
        TokenType::LessEqual => Some(BinaryOperator::LessEqual),
        TokenType::Greater => Some(BinaryOperator::Greater),
        TokenType::GreaterEqual => Some(BinaryOperator::GreaterEqual),
        _ => None,
    })
}

/// Grammar: `additive := multiplicative (("+" | "-") multiplicative)*`
pub fn parse_additive(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    binary_level(parser, parse_multiplicative, |kind| match kind {
        TokenType::Plus => Some(BinaryOperator::Add),
        TokenType::Minus => Some(BinaryOperator::Sub),
        _ => None,
    })
}

/// Grammar: `multiplicative := infix (("*" | "/" | "%") infix)*`
pub fn parse_multiplicative(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    binary_level(parser, parse_infix, |kind| match kind {
        TokenType::Star => Some(BinaryOperator::Mul),
        TokenType::Slash => Some(BinaryOperator::Div),
        TokenType::Percent => Some(BinaryOperator::Mod),
        _ => None,
    })
}

/// Parses applications of user-declared `infix` functions, left to right.
///
/// Grammar: `infix := unary (INFIX_NAME unary)*`
pub fn parse_infix(parser: &mut Parser<'_>) -> ParseResult<Expr> {
    let mut left = parse_unary(parser)?;
    loop {
        let token = parser.peek();
        if token.kind != TokenType::Identifier || !parser.is_infix(&token.lexeme) {
            break;
        }
        parser.advance();
        let right = parse_unary(parser)?;
        left = Expr::InfixCall { id:       ExprId::fresh(),
                                 name:     token.lexeme.clone(),
                                 left:     Box::new(left),
                                 right:    Box::new(right),
                                 location: token.location(), };
    }
    Ok(left)
}

/// Parses one left-associative level of [`Expr::Binary`] operators.
fn binary_level(parser: &mut Parser<'_>,
                operand: fn(&mut Parser<'_>) -> ParseResult<Expr>,
                operator: fn(TokenType) -> Option<BinaryOperator>)
                -> ParseResult<Expr> {
    let mut left = operand(parser)?;
    while let Some(op) = operator(parser.peek().kind) {
        let location = parser.advance().location();
        let right = operand(parser)?;
        left = Expr::Binary { left: Box::new(left),
                              op,
                              right: Box::new(right),
                              location };
    }
    Ok(left)
}
