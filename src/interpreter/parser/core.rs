use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::{
    ast::{Expr, Statement},
    error::ParseError,
    interpreter::{
        parser::{
            binary::parse_assignment,
            declaration::{parse_class_declaration, parse_function_declaration,
                          parse_native_declaration},
            statement::{parse_block, parse_break, parse_continue, parse_do_while, parse_if,
                        parse_module, parse_print, parse_repeat, parse_return, parse_test,
                        parse_var_declaration, parse_while},
        },
        token::{Token, TokenType},
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum number of parameters or arguments of an ordinary function.
pub const MAX_ARGUMENTS: usize = 8;

/// Stand-in for a missing end-of-input token when a host hands the parser a
/// stream that was not produced by the lexer.
static END_OF_INPUT: Token = Token { kind:    TokenType::Eof,
                                     lexeme:  String::new(),
                                     literal: None,
                                     line:    0,
                                     column:  0, };

/// A pluggable production of the grammar.
///
/// A node-parser inspects the parser's current position and either declines
/// with `Ok(None)`, leaving the position untouched, or consumes the tokens of
/// one node and returns it. Plain functions and closures with the matching
/// signature are node-parsers.
///
/// # Example
/// ```
/// use hsl::{
///     ast::{Expr, Statement},
///     interpreter::{
///         lexer::{core::Lexer, registry::TokenRegistry},
///         parser::core::{Grammar, ParseResult, Parser},
///     },
/// };
///
/// let mut registry = TokenRegistry::standard();
/// let answer = registry.register_custom("ANSWER", "@@").unwrap();
///
/// let mut grammar = Grammar::standard();
/// grammar.add_expression_parser(move |parser: &mut Parser<'_>| -> ParseResult<Option<Expr>> {
///            if !parser.check(answer) {
///                return Ok(None);
///            }
///            let location = parser.advance().location();
///            Ok(Some(Expr::literal(42.0, location)))
///        });
///
/// let scanned = Lexer::new("print @@;", &registry).scan_tokens().unwrap();
/// let statements = Parser::with_grammar(&scanned.tokens, grammar.into()).parse()
///                                                                      .unwrap();
/// assert!(matches!(statements[0], Statement::Print { .. }));
/// ```
pub trait NodeParser<T> {
    /// Attempts to parse one node at the current position.
    ///
    /// # Errors
    /// Returns a [`ParseError`] if the strategy claimed the position but the
    /// tokens that follow are malformed.
    fn try_parse(&self, parser: &mut Parser<'_>) -> ParseResult<Option<T>>;
}

impl<T, F> NodeParser<T> for F
    where F: Fn(&mut Parser<'_>) -> ParseResult<Option<T>>
{
    fn try_parse(&self, parser: &mut Parser<'_>) -> ParseResult<Option<T>> {
        self(parser)
    }
}

/// The ordered strategy sets the parser consults.
///
/// Statement strategies are tried in registration order before the
/// expression-statement fallback. Expression strategies extend the primary
/// level: they are tried, in registration order, when no built-in literal,
/// name or bracketed form matches.
#[derive(Clone)]
pub struct Grammar {
    statements:  Vec<Rc<dyn NodeParser<Statement>>>,
    expressions: Vec<Rc<dyn NodeParser<Expr>>>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
         .field("statements", &self.statements.len())
         .field("expressions", &self.expressions.len())
         .finish()
    }
}

impl Grammar {
    /// A grammar with no statement strategies: every statement is an
    /// expression statement.
    #[must_use]
    pub fn empty() -> Self {
        Self { statements:  Vec::new(),
               expressions: Vec::new(), }
    }

    /// The built-in statement productions.
    #[must_use]
    pub fn standard() -> Self {
        let mut grammar = Self::empty();
        grammar.add_statement_parser(parse_var_declaration);
        grammar.add_statement_parser(parse_function_declaration);
        grammar.add_statement_parser(parse_native_declaration);
        grammar.add_statement_parser(parse_class_declaration);
        grammar.add_statement_parser(parse_if);
        grammar.add_statement_parser(parse_while);
        grammar.add_statement_parser(parse_do_while);
        grammar.add_statement_parser(parse_repeat);
        grammar.add_statement_parser(parse_block);
        grammar.add_statement_parser(parse_return);
        grammar.add_statement_parser(parse_break);
        grammar.add_statement_parser(parse_continue);
        grammar.add_statement_parser(parse_print);
        grammar.add_statement_parser(parse_test);
        grammar.add_statement_parser(parse_module);
        grammar
    }

    /// Appends a statement strategy.
    pub fn add_statement_parser(&mut self, parser: impl NodeParser<Statement> + 'static) {
        self.statements.push(Rc::new(parser));
    }

    /// Appends a primary-expression strategy.
    pub fn add_expression_parser(&mut self, parser: impl NodeParser<Expr> + 'static) {
        self.expressions.push(Rc::new(parser));
    }
}

/// A recursive-descent parser over a lexed token stream.
///
/// The parser keeps track of the `prefix` and `infix` functions declared so
/// far; from their declaration on, their names act as operators at the
/// corresponding precedence level.
pub struct Parser<'t> {
    tokens:           &'t [Token],
    current:          usize,
    errors:           Vec<ParseError>,
    prefix_functions: FxHashSet<String>,
    infix_functions:  FxHashSet<String>,
    grammar:          Rc<Grammar>,
}

impl<'t> Parser<'t> {
    #[must_use]
    pub fn new(tokens: &'t [Token]) -> Self {
        Self::with_grammar(tokens, Rc::new(Grammar::standard()))
    }

    #[must_use]
    pub fn with_grammar(tokens: &'t [Token], grammar: Rc<Grammar>) -> Self {
        Self { tokens,
               current: 0,
               errors: Vec::new(),
               prefix_functions: FxHashSet::default(),
               infix_functions: FxHashSet::default(),
               grammar }
    }

    /// Parses the whole token stream.
    ///
    /// Errors do not stop the parse: after each one the parser discards
    /// tokens up to the next statement boundary and carries on, so the
    /// returned list holds every diagnostic of the pass.
    ///
    /// # Errors
    /// Returns all [`ParseError`]s if any statement was malformed.
    #[tracing::instrument(skip_all)]
    pub fn parse(mut self) -> Result<Vec<Statement>, Vec<ParseError>> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(statement) = self.recovering_statement() {
                statements.push(statement);
            }
        }

        tracing::debug!(statements = statements.len(),
                        errors = self.errors.len(),
                        "parsed token stream");

        if self.errors.is_empty() {
            Ok(statements)
        } else {
            Err(self.errors)
        }
    }

    /// Parses one statement through the strategy set, falling back to an
    /// expression statement.
    ///
    /// # Errors
    /// Returns the first [`ParseError`] of the statement.
    pub fn statement(&mut self) -> ParseResult<Statement> {
        let grammar = Rc::clone(&self.grammar);
        for strategy in &grammar.statements {
            let start = self.current;
            if let Some(statement) = strategy.try_parse(self)? {
                return Ok(statement);
            }
            self.current = start;
        }
        self.expression_statement()
    }

    /// Parses a full expression, starting at the assignment level.
    ///
    /// # Errors
    /// Returns a [`ParseError`] if no expression starts at the current
    /// position or the expression is malformed.
    pub fn expression(&mut self) -> ParseResult<Expr> {
        parse_assignment(self)
    }

    /// Parses statements up to and including the closing `}`. The opening
    /// brace must already have been consumed.
    ///
    /// # Errors
    /// Returns a [`ParseError`] if the block is not closed.
    pub fn block_body(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            if let Some(statement) = self.recovering_statement() {
                statements.push(statement);
            }
        }
        self.consume(TokenType::RightBrace, "'}' after block")?;
        Ok(statements)
    }

    /// Runs the host's primary-expression strategies.
    pub(in crate::interpreter::parser) fn extension_expression(&mut self)
                                                               -> ParseResult<Option<Expr>> {
        let grammar = Rc::clone(&self.grammar);
        for strategy in &grammar.expressions {
            let start = self.current;
            if let Some(expr) = strategy.try_parse(self)? {
                return Ok(Some(expr));
            }
            self.current = start;
        }
        Ok(None)
    }

    fn expression_statement(&mut self) -> ParseResult<Statement> {
        let location = self.peek().location();
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "';' after expression")?;
        Ok(Statement::Expression { expr, location })
    }

    fn recovering_statement(&mut self) -> Option<Statement> {
        match self.statement() {
            Ok(statement) => Some(statement),
            Err(error) => {
                tracing::trace!(%error, "recovering from parse error");
                self.errors.push(error);
                self.synchronize();
                None
            },
        }
    }

    /// Discards tokens until just after a `;` or just before a token that
    /// starts a statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenType::Semicolon || self.peek().kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }

    /// Records an error without aborting the current production.
    pub fn report(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    #[must_use]
    pub fn peek(&self) -> &'t Token {
        self.tokens.get(self.current).unwrap_or(&END_OF_INPUT)
    }

    /// The token after the current one.
    #[must_use]
    pub fn peek_next(&self) -> &'t Token {
        self.tokens.get(self.current + 1).unwrap_or(&END_OF_INPUT)
    }

    #[must_use]
    pub fn previous(&self) -> &'t Token {
        self.current
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .unwrap_or(&END_OF_INPUT)
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.peek().kind == TokenType::Eof
    }

    #[must_use]
    pub fn check(&self, kind: TokenType) -> bool {
        self.peek().kind == kind
    }

    #[must_use]
    pub fn check_next(&self, kind: TokenType) -> bool {
        self.peek_next().kind == kind
    }

    /// Consumes the current token if it is any of `kinds`.
    pub fn matches(&mut self, kinds: &[TokenType]) -> bool {
        if kinds.contains(&self.peek().kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes and returns the current token. Never moves past the end of
    /// input.
    pub fn advance(&mut self) -> &'t Token {
        let token = self.peek();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Consumes a token of type `kind`.
    ///
    /// # Errors
    /// Returns [`ParseError::ExpectedToken`] naming `expected` otherwise.
    pub fn consume(&mut self, kind: TokenType, expected: &str) -> ParseResult<&'t Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.expected(expected))
    }

    /// Consumes an identifier.
    ///
    /// # Errors
    /// Returns [`ParseError::ExpectedToken`] if the current token is not an
    /// identifier.
    pub fn consume_identifier(&mut self, what: &str) -> ParseResult<&'t Token> {
        self.consume(TokenType::Identifier, what)
    }

    /// Consumes the name of a member after `.`: an identifier or the
    /// `constructor` keyword.
    ///
    /// # Errors
    /// Returns an "expected `what`" error at any other token.
    pub fn consume_member_name(&mut self, what: &str) -> ParseResult<&'t Token> {
        if self.check(TokenType::Constructor) {
            return Ok(self.advance());
        }
        self.consume_identifier(what)
    }

    /// Builds an "expected X" error at the current token.
    #[must_use]
    pub fn expected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::ExpectedToken { expected: expected.to_string(),
                                    found:    found_text(token),
                                    location: token.location(), }
    }

    pub fn declare_prefix(&mut self, name: &str) {
        self.prefix_functions.insert(name.to_string());
    }

    pub fn declare_infix(&mut self, name: &str) {
        self.infix_functions.insert(name.to_string());
    }

    #[must_use]
    pub fn is_prefix(&self, name: &str) -> bool {
        self.prefix_functions.contains(name)
    }

    #[must_use]
    pub fn is_infix(&self, name: &str) -> bool {
        self.infix_functions.contains(name)
    }
}

/// How a token is named in diagnostics.
pub(in crate::interpreter::parser) fn found_text(token: &Token) -> String {
    if token.kind == TokenType::Eof {
        "end of input".to_string()
    } else {
        token.lexeme.clone()
    }
}
