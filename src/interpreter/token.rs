use std::fmt;

use crate::ast::LiteralValue;

/// A 1-based position in the source text.
///
/// Every token, AST node and diagnostic carries one of these so that errors
/// can point at the exact offending column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    /// Line number, starting at 1.
    pub line:   usize,
    /// Column number (in characters), starting at 1.
    pub column: usize,
}

impl SourceLocation {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Groups token types by the role they play in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    /// Numbers, strings, characters and the `true`/`false`/`nil` keywords.
    Literal,
    /// Reserved words such as `var` or `class`.
    Keyword,
    /// `+`, `-`, `*`, `/`, `%`.
    Arithmetic,
    /// `&`, `|`, `^`, `~`, and the shift operators.
    Bitwise,
    /// Comparison, equality and logical connectives.
    Condition,
    /// `=`.
    Assignment,
    /// Brackets, separators and member access.
    Punctuation,
    /// Tokens that open a comment; never emitted into the token stream.
    Comment,
    /// Types registered at runtime through the token registry.
    Custom,
    /// The synthetic end-of-input marker.
    EndOfInput,
}

/// The type of a lexical token.
///
/// The built-in variants form a closed set. Hosts that need additional
/// operators register them on a [`TokenRegistry`] which hands out
/// [`TokenType::Custom`] identifiers.
///
/// [`TokenRegistry`]: crate::interpreter::lexer::registry::TokenRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    Semicolon,
    Colon,
    Question,
    Elvis,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    And,
    Or,

    Ampersand,
    Pipe,
    Caret,
    Tilde,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,

    HashComment,
    LineComment,
    BlockComment,

    Identifier,
    String,
    Char,
    Number,

    Var,
    Final,
    Function,
    Prefix,
    Infix,
    Native,
    Class,
    Extends,
    Constructor,
    This,
    Super,
    If,
    Else,
    While,
    Do,
    Repeat,
    Print,
    Return,
    Break,
    Continue,
    Test,
    Module,
    Public,
    Private,
    True,
    False,
    Nil,

    /// A host-registered composite type; the registry knows its name.
    Custom(u16),

    Eof,
}

impl TokenType {
    /// Returns the conventional upper-case name of a built-in token type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LeftParen => "LEFT_PAREN",
            Self::RightParen => "RIGHT_PAREN",
            Self::LeftBrace => "LEFT_BRACE",
            Self::RightBrace => "RIGHT_BRACE",
            Self::LeftBracket => "LEFT_BRACKET",
            Self::RightBracket => "RIGHT_BRACKET",
            Self::Comma => "COMMA",
            Self::Dot => "DOT",
            Self::Semicolon => "SEMICOLON",
            Self::Colon => "COLON",
            Self::Question => "QUESTION_MARK",
            Self::Elvis => "ELVIS",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Star => "STAR",
            Self::Slash => "SLASH",
            Self::Percent => "MODULO",
            Self::Bang => "BANG",
            Self::BangEqual => "BANG_EQUAL",
            Self::Equal => "EQUAL",
            Self::EqualEqual => "EQUAL_EQUAL",
            Self::Greater => "GREATER",
            Self::GreaterEqual => "GREATER_EQUAL",
            Self::Less => "LESS",
            Self::LessEqual => "LESS_EQUAL",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Ampersand => "BITWISE_AND",
            Self::Pipe => "BITWISE_OR",
            Self::Caret => "XOR",
            Self::Tilde => "COMPLEMENT",
            Self::ShiftLeft => "SHIFT_LEFT",
            Self::ShiftRight => "SHIFT_RIGHT",
            Self::UnsignedShiftRight => "LOGICAL_SHIFT_RIGHT",
            Self::HashComment => "HASH_COMMENT",
            Self::LineComment => "LINE_COMMENT",
            Self::BlockComment => "BLOCK_COMMENT",
            Self::Identifier => "IDENTIFIER",
            Self::String => "STRING",
            Self::Char => "CHAR",
            Self::Number => "NUMBER",
            Self::Var => "VAR",
            Self::Final => "FINAL",
            Self::Function => "FUNCTION",
            Self::Prefix => "PREFIX",
            Self::Infix => "INFIX",
            Self::Native => "NATIVE",
            Self::Class => "CLASS",
            Self::Extends => "EXTENDS",
            Self::Constructor => "CONSTRUCTOR",
            Self::This => "THIS",
            Self::Super => "SUPER",
            Self::If => "IF",
            Self::Else => "ELSE",
            Self::While => "WHILE",
            Self::Do => "DO",
            Self::Repeat => "REPEAT",
            Self::Print => "PRINT",
            Self::Return => "RETURN",
            Self::Break => "BREAK",
            Self::Continue => "CONTINUE",
            Self::Test => "TEST",
            Self::Module => "MODULE",
            Self::Public => "PUBLIC",
            Self::Private => "PRIVATE",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Nil => "NIL",
            Self::Custom(_) => "CUSTOM",
            Self::Eof => "EOF",
        }
    }

    /// Whether this token type begins a statement; used by the parser to
    /// resynchronise after an error.
    #[must_use]
    pub const fn starts_statement(self) -> bool {
        matches!(self,
                 Self::Var
                 | Self::Final
                 | Self::Function
                 | Self::Prefix
                 | Self::Infix
                 | Self::Native
                 | Self::Class
                 | Self::If
                 | Self::While
                 | Self::Do
                 | Self::Repeat
                 | Self::Print
                 | Self::Return
                 | Self::Break
                 | Self::Continue
                 | Self::Test
                 | Self::Module)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(id) => write!(f, "CUSTOM#{id}"),
            other => f.write_str(other.name()),
        }
    }
}

/// A lexical token.
///
/// The token stream produced by the lexer is always terminated by a single
/// [`TokenType::Eof`] token and is never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token type.
    pub kind:    TokenType,
    /// The exact source text of the token.
    pub lexeme:  String,
    /// The literal value for numbers, strings, characters and keyword
    /// literals.
    pub literal: Option<LiteralValue>,
    /// Line the token starts on.
    pub line:    usize,
    /// Column the token starts at.
    pub column:  usize,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenType, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self { kind,
               lexeme: lexeme.into(),
               literal: None,
               line: location.line,
               column: location.column }
    }

    #[must_use]
    pub fn with_literal(mut self, literal: LiteralValue) -> Self {
        self.literal = Some(literal);
        self
    }

    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Distinguishes `#`/`//` comments from `/* */` comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    Line,
    Block,
}

/// A comment captured out-of-band by the lexer.
///
/// Comments never enter the token stream. The captured text excludes the
/// comment markers but is otherwise verbatim: it is not trimmed, and block
/// comments keep their embedded newlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub line: usize,
    pub kind: CommentKind,
}
