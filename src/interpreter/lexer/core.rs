use logos::Logos;

use crate::{
    ast::LiteralValue,
    error::LexError,
    interpreter::{
        lexer::{
            atoms::{Atom, escaped},
            registry::{GraphMatch, TokenRegistry},
        },
        token::{Comment, CommentKind, SourceLocation, Token, TokenType},
    },
};

/// The result of a successful scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scanned {
    /// The token stream, terminated by a single [`TokenType::Eof`].
    pub tokens:   Vec<Token>,
    /// Comments, in source order.
    pub comments: Vec<Comment>,
}

/// Turns source text into tokens and out-of-band comments.
///
/// Operator characters are matched against the registry's token graph;
/// whitespace, literals and words go through the [`Atom`] scanner. Errors do
/// not stop the scan: the offending input is skipped and scanning resumes,
/// so all lexing errors of a source are reported together.
///
/// # Example
/// ```
/// use hsl::interpreter::{
///     lexer::{core::Lexer, registry::TokenRegistry},
///     token::TokenType,
/// };
///
/// let registry = TokenRegistry::standard();
/// let scanned = Lexer::new("1 <<< 2", &registry).scan_tokens().unwrap();
/// let kinds: Vec<TokenType> = scanned.tokens.iter().map(|t| t.kind).collect();
///
/// assert_eq!(kinds,
///            vec![TokenType::Number,
///                 TokenType::ShiftLeft,
///                 TokenType::Less,
///                 TokenType::Number,
///                 TokenType::Eof]);
/// ```
pub struct Lexer<'s, 'r> {
    source:     &'s str,
    registry:   &'r TokenRegistry,
    /// Upper bound on how many characters the token graph can consume.
    lookahead:  usize,
    /// Byte offset of the next unconsumed character.
    position:   usize,
    line:       usize,
    /// Byte offset at which the current line starts.
    line_start: usize,
    tokens:     Vec<Token>,
    comments:   Vec<Comment>,
    errors:     Vec<LexError>,
}

impl<'s, 'r> Lexer<'s, 'r> {
    #[must_use]
    pub fn new(source: &'s str, registry: &'r TokenRegistry) -> Self {
        Self { source,
               registry,
               lookahead: registry.max_sequence_length(),
               position: 0,
               line: 1,
               line_start: 0,
               tokens: Vec::new(),
               comments: Vec::new(),
               errors: Vec::new() }
    }

    /// Scans the whole source.
    ///
    /// # Errors
    /// Returns every [`LexError`] encountered if any input could not be
    /// matched.
    #[tracing::instrument(skip_all)]
    pub fn scan_tokens(mut self) -> Result<Scanned, Vec<LexError>> {
        while self.position < self.source.len() {
            self.scan_token();
        }

        let end = self.location();
        self.tokens.push(Token::new(TokenType::Eof, "", end));
        tracing::debug!(tokens = self.tokens.len(),
                        comments = self.comments.len(),
                        errors = self.errors.len(),
                        "scanned source");

        if self.errors.is_empty() {
            Ok(Scanned { tokens:   self.tokens,
                         comments: self.comments, })
        } else {
            Err(self.errors)
        }
    }

    fn scan_token(&mut self) {
        let rest = &self.source[self.position..];
        let Some(first) = rest.chars().next() else {
            return;
        };

        if self.registry.starts_sequence(first) {
            self.scan_sequence(rest);
            return;
        }

        let mut atoms = Atom::lexer(rest);
        match atoms.next() {
            Some(Ok(atom)) => {
                let length = atoms.span().end;
                self.emit_atom(atom, &rest[..length]);
            },
            _ if first == '"' => self.scan_malformed_string(rest),
            _ => {
                let location = self.location();
                self.errors.push(match first {
                                     '\'' => LexError::InvalidCharLiteral { location },
                                     character => LexError::UnexpectedCharacter { character,
                                                                                  location },
                                 });
                self.advance(first.len_utf8());
            },
        }
    }

    /// Reports a string literal the atom scanner rejected and skips past it.
    ///
    /// A literal that is closed but contains an unknown escape is reported at
    /// the first bad escape and consumed up to its closing quote. One that is
    /// never closed consumes the rest of the source.
    fn scan_malformed_string(&mut self, rest: &'s str) {
        let start = self.location();
        let mut closing = None;
        let mut invalid = None;
        let mut chars = rest.char_indices().skip(1);
        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    closing = Some(offset);
                    break;
                },
                '\\' => match chars.next() {
                    Some((_, escape)) if invalid.is_none() && escaped(escape).is_none() => {
                        invalid = Some((offset, escape));
                    },
                    Some(_) => {},
                    None => break,
                },
                _ => {},
            }
        }

        match (closing, invalid) {
            (Some(end), Some((offset, escape))) => {
                self.advance(offset);
                let location = self.location();
                self.errors.push(LexError::InvalidEscape { escape, location });
                self.advance(end + 1 - offset);
            },
            (Some(end), None) => {
                self.errors.push(LexError::UnterminatedString { location: start });
                self.advance(end + 1);
            },
            (None, _) => {
                self.errors.push(LexError::UnterminatedString { location: start });
                self.advance(rest.len());
            },
        }
    }

    fn emit_atom(&mut self, atom: Atom, lexeme: &'s str) {
        let location = self.location();
        match atom {
            Atom::Whitespace | Atom::NewLine => {},
            Atom::Number(value) => {
                self.tokens.push(Token::new(TokenType::Number, lexeme, location).with_literal(value.into()));
            },
            Atom::Str(value) => {
                self.tokens.push(Token::new(TokenType::String, lexeme, location).with_literal(value.into()));
            },
            Atom::Char(value) => {
                self.tokens.push(Token::new(TokenType::Char, lexeme, location).with_literal(value.into()));
            },
            Atom::Word(word) => {
                let token = match self.registry.keyword(&word) {
                    Some(TokenType::True) => {
                        Token::new(TokenType::True, lexeme, location).with_literal(true.into())
                    },
                    Some(TokenType::False) => {
                        Token::new(TokenType::False, lexeme, location).with_literal(false.into())
                    },
                    Some(TokenType::Nil) => {
                        Token::new(TokenType::Nil, lexeme, location).with_literal(LiteralValue::Nil)
                    },
                    Some(kind) => Token::new(kind, lexeme, location),
                    None => Token::new(TokenType::Identifier, lexeme, location),
                };
                self.tokens.push(token);
            },
        }
        self.advance(lexeme.len());
    }

    fn scan_sequence(&mut self, rest: &'s str) {
        let chars: Vec<char> = rest.chars().take(self.lookahead).collect();
        let location = self.location();

        match self.registry.longest_match(&chars) {
            GraphMatch::Matched { kind, length } => {
                let byte_length = byte_length(rest, length);
                if let Some(comment) = self.registry.comment_kind(kind) {
                    self.scan_comment(comment, byte_length);
                } else {
                    self.tokens.push(Token::new(kind, &rest[..byte_length], location));
                    self.advance(byte_length);
                }
            },
            GraphMatch::Unmatched { length } => {
                let byte_length = byte_length(rest, length);
                self.errors.push(LexError::UnknownSequence { sequence: rest[..byte_length].to_string(),
                                                             location });
                self.advance(byte_length);
            },
        }
    }

    fn scan_comment(&mut self, kind: CommentKind, marker_length: usize) {
        let location = self.location();
        let body_start = self.position + marker_length;
        let body = &self.source[body_start..];

        match kind {
            CommentKind::Line => {
                let end = body.find('\n').unwrap_or(body.len());
                self.comments.push(Comment { text: body[..end].to_string(),
                                             line: location.line,
                                             kind });
                self.advance(marker_length + end);
            },
            CommentKind::Block => match body.find("*/") {
                Some(end) => {
                    self.comments.push(Comment { text: body[..end].to_string(),
                                                 line: location.line,
                                                 kind });
                    self.advance(marker_length + end + 2);
                },
                None => {
                    self.errors.push(LexError::UnterminatedComment { location });
                    self.advance(self.source.len() - self.position);
                },
            },
        }
    }

    /// Consumes `bytes` bytes, keeping the line bookkeeping current.
    fn advance(&mut self, bytes: usize) {
        let end = (self.position + bytes).min(self.source.len());
        for (offset, c) in self.source[self.position..end].char_indices() {
            if c == '\n' {
                self.line += 1;
                self.line_start = self.position + offset + 1;
            }
        }
        self.position = end;
    }

    fn location(&self) -> SourceLocation {
        let column = self.source[self.line_start..self.position].chars().count() + 1;
        SourceLocation::new(self.line, column)
    }
}

/// Byte length of the first `chars` characters of `text`.
fn byte_length(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(index, _)| index)
}
