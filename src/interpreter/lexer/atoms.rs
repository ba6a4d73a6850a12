use logos::Logos;

/// The lexical atoms that are not operator sequences: whitespace, line
/// breaks, literals and words.
///
/// The lexer only ever asks for a single atom at the current position; words
/// are classified as keywords or identifiers afterwards, against the token
/// registry.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Atom {
    /// Spaces, tabs, carriage returns and form feeds.
    #[regex(r"[ \t\r\f]+")]
    Whitespace,
    /// A line break.
    #[token("\n")]
    NewLine,
    /// Numeric literals such as `3`, `3.14` or `2.1e-10`. All numbers are
    /// doubles.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", parse_number)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", parse_number)]
    #[regex(r"[0-9]+", parse_number)]
    Number(f64),
    /// `"..."` with `\n`, `\t`, `\r`, `\0`, `\\`, `\"` and `\'` escapes.
    #[regex(r#""([^"\\]|\\.)*""#, parse_string)]
    Str(String),
    /// `'c'` or an escaped character such as `'\n'`.
    #[regex(r"'([^'\\\n]|\\.)'", parse_char)]
    Char(char),
    /// Identifier-shaped words, including keywords.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Word(String),
}

fn parse_number(lex: &logos::Lexer<Atom>) -> Option<f64> {
    lex.slice().parse().ok()
}

fn parse_string(lex: &logos::Lexer<Atom>) -> Option<String> {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1])
}

fn parse_char(lex: &logos::Lexer<Atom>) -> Option<char> {
    let slice = lex.slice();
    let text = unescape(&slice[1..slice.len() - 1])?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Processes backslash escapes. Returns `None` on an unknown escape.
fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        out.push(escaped(chars.next()?)?);
    }
    Some(out)
}

/// The character a backslash escape such as `\n` stands for.
pub(in crate::interpreter::lexer) const fn escaped(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}
