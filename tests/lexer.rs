use hsl::{
    ast::LiteralValue,
    error::{LexError, RegistryError},
    interpreter::{
        lexer::{
            core::{Lexer, Scanned},
            registry::{GraphMatch, TokenRegistry},
        },
        token::{CommentKind, SourceLocation, TokenCategory, TokenType},
    },
};

fn scan(src: &str) -> Scanned {
    scan_with(src, &TokenRegistry::standard())
}

fn scan_with(src: &str, registry: &TokenRegistry) -> Scanned {
    Lexer::new(src, registry).scan_tokens()
                             .unwrap_or_else(|e| panic!("Lexing failed: {e:?}"))
}

fn kinds(scanned: &Scanned) -> Vec<TokenType> {
    scanned.tokens.iter().map(|t| t.kind).collect()
}

fn scan_errors(src: &str) -> Vec<LexError> {
    match Lexer::new(src, &TokenRegistry::standard()).scan_tokens() {
        Ok(scanned) => panic!("Lexing succeeded but was expected to fail: {:?}", scanned.tokens),
        Err(errors) => errors,
    }
}

#[test]
fn empty_source_is_just_eof() {
    let scanned = scan("");
    assert_eq!(kinds(&scanned), [TokenType::Eof]);
    assert!(scanned.comments.is_empty());
}

#[test]
fn unknown_longer_sequence_falls_back() {
    let scanned = scan("1 <<< 2");
    assert_eq!(kinds(&scanned),
               [TokenType::Number, TokenType::ShiftLeft, TokenType::Less, TokenType::Number, TokenType::Eof]);
    assert_eq!(scanned.tokens[2].column, 5);
}

#[test]
fn longest_sequence_wins() {
    let scanned = scan(">>> >> > >= ?: ? == =");
    assert_eq!(kinds(&scanned),
               [TokenType::UnsignedShiftRight,
                TokenType::ShiftRight,
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Elvis,
                TokenType::Question,
                TokenType::EqualEqual,
                TokenType::Equal,
                TokenType::Eof]);
}

#[test]
fn custom_sequence_takes_priority_over_prefixes() {
    let mut registry = TokenRegistry::standard();
    let decrement = registry.register_custom("MINUS_MINUS", "--").unwrap();

    let scanned = scan_with("---", &registry);
    assert_eq!(kinds(&scanned), [decrement, TokenType::Minus, TokenType::Eof]);
    assert_eq!(registry.name_of(decrement), "MINUS_MINUS");
    assert_eq!(registry.category(decrement), Some(TokenCategory::Custom));
    assert_eq!(registry.sequence(decrement), Some("--"));
}

#[test]
fn without_custom_sequence_minus_repeats() {
    let scanned = scan("---");
    assert_eq!(kinds(&scanned),
               [TokenType::Minus, TokenType::Minus, TokenType::Minus, TokenType::Eof]);
}

#[test]
fn registry_rejects_bad_sequences() {
    let mut registry = TokenRegistry::standard();

    assert_eq!(registry.register_custom("EMPTY", ""), Err(RegistryError::EmptySequence));
    assert!(matches!(registry.register_custom("WORD", "ab"),
                     Err(RegistryError::NotATokenCharacter { character: 'a', .. })));
    assert!(matches!(registry.register_custom("PLUS_AGAIN", "+"),
                     Err(RegistryError::Conflict { .. })));
    assert!(matches!(registry.register_keyword("1st", TokenType::Var),
                     Err(RegistryError::InvalidKeyword { .. })));

    // Re-registering the same sequence for the same type is harmless.
    assert_eq!(registry.register(TokenType::Plus, "+", TokenCategory::Arithmetic), Ok(()));
}

#[test]
fn graph_match_reports_unmatched_runs() {
    let registry = TokenRegistry::standard();
    let chars: Vec<char> = "@@".chars().collect();
    assert_eq!(registry.longest_match(&chars), GraphMatch::Unmatched { length: 1 });

    let chars: Vec<char> = "!=x".chars().collect();
    assert_eq!(registry.longest_match(&chars),
               GraphMatch::Matched { kind:   TokenType::BangEqual,
                                     length: 2, });
}

#[test]
fn hash_comment_is_captured_out_of_band() {
    let scanned = scan("# Comment");
    assert_eq!(kinds(&scanned), [TokenType::Eof]);
    assert_eq!(scanned.comments.len(), 1);
    assert_eq!(scanned.comments[0].text, " Comment");
    assert_eq!(scanned.comments[0].line, 1);
    assert_eq!(scanned.comments[0].kind, CommentKind::Line);
}

#[test]
fn comments_of_every_style() {
    let scanned = scan("var a; // trailing\n/* block\nspans */ var b;\n# last");
    let texts: Vec<_> = scanned.comments
                               .iter()
                               .map(|c| (c.text.as_str(), c.line, c.kind))
                               .collect();
    assert_eq!(texts,
               [(" trailing", 1, CommentKind::Line),
                (" block\nspans ", 2, CommentKind::Block),
                (" last", 4, CommentKind::Line)]);

    let b = &scanned.tokens[4];
    assert_eq!((b.lexeme.as_str(), b.line, b.column), ("b", 3, 14));
}

#[test]
fn literals_carry_values() {
    let scanned = scan("42 3.5 \"a\\nb\" 'x' true nil");
    let literals: Vec<_> = scanned.tokens
                                  .iter()
                                  .filter_map(|t| t.literal.clone())
                                  .collect();
    assert_eq!(literals,
               [LiteralValue::Number(42.0),
                LiteralValue::Number(3.5),
                LiteralValue::Str("a\nb".to_string()),
                LiteralValue::Char('x'),
                LiteralValue::Bool(true),
                LiteralValue::Nil]);
}

#[test]
fn keywords_and_identifiers() {
    let scanned = scan("final var function fun classy");
    assert_eq!(kinds(&scanned),
               [TokenType::Final,
                TokenType::Var,
                TokenType::Function,
                TokenType::Function,
                TokenType::Identifier,
                TokenType::Eof]);
}

#[test]
fn host_keywords_extend_the_language() {
    let mut registry = TokenRegistry::standard();
    registry.register_keyword("let", TokenType::Var).unwrap();

    let scanned = scan_with("let x", &registry);
    assert_eq!(kinds(&scanned), [TokenType::Var, TokenType::Identifier, TokenType::Eof]);
}

#[test]
fn locations_track_lines_and_columns() {
    let scanned = scan("var x =\n  10;");
    let locations: Vec<_> = scanned.tokens.iter().map(|t| t.location()).collect();
    assert_eq!(locations,
               [SourceLocation::new(1, 1),
                SourceLocation::new(1, 5),
                SourceLocation::new(1, 7),
                SourceLocation::new(2, 3),
                SourceLocation::new(2, 5),
                SourceLocation::new(2, 6)]);
}

#[test]
fn all_errors_are_reported() {
    let errors = scan_errors("var a = 1 @ 2;\nvar s = \"open");
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0],
                     LexError::UnexpectedCharacter { character: '@', .. }));
    assert!(matches!(errors[1], LexError::UnterminatedString { .. }));
}

#[test]
fn unterminated_block_comment() {
    let errors = scan_errors("var a; /* never closed");
    assert!(matches!(errors.as_slice(), [LexError::UnterminatedComment { .. }]));
}

#[test]
fn invalid_escape_is_reported_once() {
    let errors = scan_errors("var s = \"a\\qb\"; var t = 1;");
    assert_eq!(errors,
               [LexError::InvalidEscape { escape:   'q',
                                          location: SourceLocation::new(1, 11), }]);
    assert_eq!(errors[0].to_string(), "Invalid escape sequence '\\q'");

    let errors = scan_errors("var s = \"open\nvar t = 1;");
    assert_eq!(errors,
               [LexError::UnterminatedString { location: SourceLocation::new(1, 9) }]);
}
