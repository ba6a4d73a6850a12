use std::rc::Rc;

use crate::{
    ast::{ClassDecl, ExprId, FieldDecl, FunctionDecl, FunctionKind, Statement, SuperclassRef,
          Visibility},
    error::ParseError,
    interpreter::{
        parser::{
            core::{MAX_ARGUMENTS, ParseResult, Parser, found_text},
            utils::{parse_braced_body, parse_parameters},
        },
        token::{SourceLocation, TokenType},
    },
};

/// Parses function, operator and extension declarations.
///
/// Syntax:
/// ```text
///     fun name(a, b) { ... }
///     final fun name(a, b) { ... }
///     prefix fun name(a) { ... }
///     infix fun name(a, b) { ... }
///     fun ClassName.method(a) { ... }
/// ```
///
/// `function` may be written instead of `fun`. The name of a `prefix` or
/// `infix` function is registered with the parser before its body is
/// parsed, so it acts as an operator inside its own body and everywhere
/// after it. Operator functions with the wrong number of parameters are
/// reported without aborting the parse.
pub fn parse_function_declaration(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    let (kind, is_final) = match (parser.peek().kind, parser.peek_next().kind) {
        (TokenType::Function, _) => (FunctionKind::Function, false),
        (TokenType::Final, TokenType::Function) => (FunctionKind::Function, true),
        (TokenType::Prefix, TokenType::Function) => (FunctionKind::Prefix, false),
        (TokenType::Infix, TokenType::Function) => (FunctionKind::Infix, false),
        _ => return Ok(None),
    };
    let location = parser.peek().location();
    if parser.peek().kind != TokenType::Function {
        parser.advance();
    }
    parser.advance();

    let name = parser.consume_identifier("function name")?;

    if kind == FunctionKind::Function && parser.matches(&[TokenType::Dot]) {
        let method = parser.consume_identifier("extension method name")?;
        let params = parse_parameters(parser, MAX_ARGUMENTS)?;
        let body = parse_braced_body(parser, "'{' before method body")?;
        let function = FunctionDecl { name: method.lexeme.clone(),
                                      kind: FunctionKind::Method,
                                      params,
                                      body,
                                      is_final,
                                      location: method.location() };
        return Ok(Some(Statement::Extension { id: ExprId::fresh(),
                                              class_name: name.lexeme.clone(),
                                              function: Rc::new(function),
                                              location }));
    }

    match kind {
        FunctionKind::Prefix => parser.declare_prefix(&name.lexeme),
        FunctionKind::Infix => parser.declare_infix(&name.lexeme),
        _ => {},
    }

    let params = parse_parameters(parser, MAX_ARGUMENTS)?;
    check_operator_arity(parser, kind, params.len(), name.location());
    let body = parse_braced_body(parser, "'{' before function body")?;

    Ok(Some(Statement::Function(Rc::new(FunctionDecl { name: name.lexeme.clone(),
                                                       kind,
                                                       params,
                                                       body,
                                                       is_final,
                                                       location }))))
}

/// Parses `native fun module.name(a, b);`.
pub fn parse_native_declaration(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    if !parser.check(TokenType::Native) {
        return Ok(None);
    }
    let location = parser.advance().location();
    parser.consume(TokenType::Function, "'fun' after 'native'")?;
    let module = parser.consume_identifier("native module name")?;
    parser.consume(TokenType::Dot, "'.' after native module name")?;
    let name = parser.consume_identifier("native function name")?;
    let params = parse_parameters(parser, MAX_ARGUMENTS)?;
    parser.consume(TokenType::Semicolon, "';' after native function declaration")?;

    Ok(Some(Statement::NativeFunction { module: module.lexeme.clone(),
                                        name: name.lexeme.clone(),
                                        params,
                                        location }))
}

/// Parses a class declaration.
///
/// Syntax:
/// ```text
///     [final] class Name [extends Super] {
///         [public|private] [final] var field [= initializer];
///         constructor(a, b) { ... }
///         [final] fun method(a) { ... }
///     }
/// ```
pub fn parse_class_declaration(parser: &mut Parser<'_>) -> ParseResult<Option<Statement>> {
    let is_final = parser.check(TokenType::Final) && parser.check_next(TokenType::Class);
    if !is_final && !parser.check(TokenType::Class) {
        return Ok(None);
    }
    let location = parser.peek().location();
    if is_final {
        parser.advance();
    }
    parser.advance();

    let name = parser.consume_identifier("class name")?;
    let superclass = if parser.matches(&[TokenType::Extends]) {
        let superclass = parser.consume_identifier("superclass name")?;
        Some(SuperclassRef { id:       ExprId::fresh(),
                             name:     superclass.lexeme.clone(),
                             location: superclass.location(), })
    } else {
        None
    };

    parser.consume(TokenType::LeftBrace, "'{' before class body")?;
    let mut fields = Vec::new();
    let mut methods = Vec::new();
    while !parser.check(TokenType::RightBrace) && !parser.is_at_end() {
        match parse_member(parser)? {
            Member::Field(field) => fields.push(field),
            Member::Method(method) => methods.push(Rc::new(method)),
        }
    }
    parser.consume(TokenType::RightBrace, "'}' after class body")?;

    Ok(Some(Statement::Class(Rc::new(ClassDecl { name: name.lexeme.clone(),
                                                 superclass,
                                                 fields,
                                                 methods,
                                                 is_final,
                                                 location }))))
}

enum Member {
    Field(FieldDecl),
    Method(FunctionDecl),
}

fn parse_member(parser: &mut Parser<'_>) -> ParseResult<Member> {
    let location = parser.peek().location();

    if parser.check(TokenType::Constructor) {
        parser.advance();
        let params = parse_parameters(parser, MAX_ARGUMENTS)?;
        let body = parse_braced_body(parser, "'{' before constructor body")?;
        return Ok(Member::Method(FunctionDecl { name: "constructor".to_string(),
                                                kind: FunctionKind::Constructor,
                                                params,
                                                body,
                                                is_final: false,
                                                location }));
    }

    let visibility = match parser.peek().kind {
        TokenType::Public => {
            parser.advance();
            Some(Visibility::Public)
        },
        TokenType::Private => {
            parser.advance();
            Some(Visibility::Private)
        },
        _ => None,
    };
    let is_final = parser.matches(&[TokenType::Final]);

    if visibility.is_none() && parser.matches(&[TokenType::Function]) {
        let name = parser.consume_identifier("method name")?;
        let params = parse_parameters(parser, MAX_ARGUMENTS)?;
        let body = parse_braced_body(parser, "'{' before method body")?;
        return Ok(Member::Method(FunctionDecl { name: name.lexeme.clone(),
                                                kind: FunctionKind::Method,
                                                params,
                                                body,
                                                is_final,
                                                location: name.location() }));
    }

    if parser.matches(&[TokenType::Var]) {
        let name = parser.consume_identifier("field name")?;
        let initializer = if parser.matches(&[TokenType::Equal]) {
            Some(parser.expression()?)
        } else {
            None
        };
        parser.consume(TokenType::Semicolon, "';' after field declaration")?;
        return Ok(Member::Field(FieldDecl { name: name.lexeme.clone(),
                                            visibility: visibility.unwrap_or_default(),
                                            is_final,
                                            initializer,
                                            location: name.location() }));
    }

    let token = parser.peek();
    Err(ParseError::InvalidClassMember { found:    found_text(token),
                                         location: token.location(), })
}

fn check_operator_arity(parser: &mut Parser<'_>,
                        kind: FunctionKind,
                        found: usize,
                        location: SourceLocation) {
    let (name, expected) = match kind {
        FunctionKind::Prefix => ("prefix", 1),
        FunctionKind::Infix => ("infix", 2),
        _ => return,
    };
    if found != expected {
        parser.report(ParseError::OperatorArity { kind: name,
                                                  expected,
                                                  found,
                                                  location });
    }
}
