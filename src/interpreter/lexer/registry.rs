use rustc_hash::FxHashMap;

use crate::{
    error::RegistryError,
    interpreter::token::{CommentKind, TokenCategory, TokenType},
};

/// Characters that may appear in registered token sequences.
///
/// Everything else is handled by the literal/identifier scanner.
pub const TOKEN_CHARACTERS: &[char] = &['(', ')', '{', '}', '[', ']', ',', '.', ';', ':', '?', '+',
                                        '-', '*', '/', '%', '!', '=', '<', '>', '&', '|', '^', '~',
                                        '#', '@', '$'];

/// Index of a node in the token graph.
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// A node in the character-combination graph.
///
/// A node at depth `n` stands for "these `n` characters matched so far". It
/// completes a token type when `token` is set.
#[derive(Debug, Clone)]
struct GraphNode {
    parent:   Option<NodeId>,
    depth:    usize,
    children: FxHashMap<char, NodeId>,
    token:    Option<TokenType>,
}

impl GraphNode {
    fn new(parent: Option<NodeId>, depth: usize) -> Self {
        Self { parent,
               depth,
               children: FxHashMap::default(),
               token: None }
    }
}

/// The outcome of walking the graph from a position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMatch {
    /// The deepest complete node on the walked path.
    Matched {
        kind:   TokenType,
        /// Number of characters the token spans.
        length: usize,
    },
    /// No node on the walked path completes a token.
    Unmatched {
        /// Number of characters walked before the graph ran out.
        length: usize,
    },
}

/// The set of recognised token types.
///
/// Operator and punctuation types are stored as paths through a trie of
/// [`TOKEN_CHARACTERS`], kept in an arena with parent back-references so the
/// lexer can fall back to the deepest complete ancestor with a plain index
/// walk. Keywords live in a separate word table.
///
/// The registry can be extended before lexing, e.g. to add a four-character
/// operator:
///
/// ```
/// use hsl::interpreter::lexer::registry::{GraphMatch, TokenRegistry};
///
/// let mut registry = TokenRegistry::standard();
/// let arrow = registry.register_custom("LONG_ARROW", "<==>").unwrap();
///
/// let chars: Vec<char> = "<==> x".chars().collect();
/// assert_eq!(registry.longest_match(&chars),
///            GraphMatch::Matched { kind: arrow, length: 4 });
/// ```
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    nodes:        Vec<GraphNode>,
    sequences:    FxHashMap<TokenType, String>,
    categories:   FxHashMap<TokenType, TokenCategory>,
    comments:     FxHashMap<TokenType, CommentKind>,
    keywords:     FxHashMap<String, TokenType>,
    custom_names: Vec<String>,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl TokenRegistry {
    /// Creates a registry with no token types at all.
    #[must_use]
    pub fn empty() -> Self {
        Self { nodes:        vec![GraphNode::new(None, 0)],
               sequences:    FxHashMap::default(),
               categories:   FxHashMap::default(),
               comments:     FxHashMap::default(),
               keywords:     FxHashMap::default(),
               custom_names: Vec::new(), }
    }

    /// Creates a registry holding every built-in token type.
    #[must_use]
    pub fn standard() -> Self {
        use TokenCategory as C;
        use TokenType as T;

        let mut registry = Self::empty();
        let sequences = [(T::LeftParen, "(", C::Punctuation),
                         (T::RightParen, ")", C::Punctuation),
                         (T::LeftBrace, "{", C::Punctuation),
                         (T::RightBrace, "}", C::Punctuation),
                         (T::LeftBracket, "[", C::Punctuation),
                         (T::RightBracket, "]", C::Punctuation),
                         (T::Comma, ",", C::Punctuation),
                         (T::Dot, ".", C::Punctuation),
                         (T::Semicolon, ";", C::Punctuation),
                         (T::Colon, ":", C::Condition),
                         (T::Question, "?", C::Condition),
                         (T::Elvis, "?:", C::Condition),
                         (T::Plus, "+", C::Arithmetic),
                         (T::Minus, "-", C::Arithmetic),
                         (T::Star, "*", C::Arithmetic),
                         (T::Slash, "/", C::Arithmetic),
                         (T::Percent, "%", C::Arithmetic),
                         (T::Bang, "!", C::Condition),
                         (T::BangEqual, "!=", C::Condition),
                         (T::Equal, "=", C::Assignment),
                         (T::EqualEqual, "==", C::Condition),
                         (T::Greater, ">", C::Condition),
                         (T::GreaterEqual, ">=", C::Condition),
                         (T::Less, "<", C::Condition),
                         (T::LessEqual, "<=", C::Condition),
                         (T::And, "&&", C::Condition),
                         (T::Or, "||", C::Condition),
                         (T::Ampersand, "&", C::Bitwise),
                         (T::Pipe, "|", C::Bitwise),
                         (T::Caret, "^", C::Bitwise),
                         (T::Tilde, "~", C::Bitwise),
                         (T::ShiftLeft, "<<", C::Bitwise),
                         (T::ShiftRight, ">>", C::Bitwise),
                         (T::UnsignedShiftRight, ">>>", C::Bitwise)];
        for (kind, sequence, category) in sequences {
            registry.insert_sequence(kind, sequence, category);
        }

        registry.insert_comment(T::HashComment, "#", CommentKind::Line);
        registry.insert_comment(T::LineComment, "//", CommentKind::Line);
        registry.insert_comment(T::BlockComment, "/*", CommentKind::Block);

        let keywords = [("var", T::Var),
                        ("final", T::Final),
                        ("fun", T::Function),
                        ("function", T::Function),
                        ("prefix", T::Prefix),
                        ("infix", T::Infix),
                        ("native", T::Native),
                        ("class", T::Class),
                        ("extends", T::Extends),
                        ("constructor", T::Constructor),
                        ("this", T::This),
                        ("super", T::Super),
                        ("if", T::If),
                        ("else", T::Else),
                        ("while", T::While),
                        ("do", T::Do),
                        ("repeat", T::Repeat),
                        ("print", T::Print),
                        ("return", T::Return),
                        ("break", T::Break),
                        ("continue", T::Continue),
                        ("test", T::Test),
                        ("module", T::Module),
                        ("public", T::Public),
                        ("private", T::Private),
                        ("true", T::True),
                        ("false", T::False),
                        ("nil", T::Nil)];
        for (word, kind) in keywords {
            registry.keywords.insert(word.to_string(), kind);
            let category = if matches!(kind, T::True | T::False | T::Nil) {
                C::Literal
            } else {
                C::Keyword
            };
            registry.categories.insert(kind, category);
        }

        registry
    }

    /// Registers `kind` as the token produced by `sequence`.
    ///
    /// Every character of the sequence must be one of [`TOKEN_CHARACTERS`].
    /// Registering the same sequence twice for the same type is a no-op;
    /// registering it for a different type is a conflict.
    ///
    /// # Errors
    /// Returns a [`RegistryError`] if the sequence is empty, contains a
    /// non-token character, or is already bound to another type.
    pub fn register(&mut self,
                    kind: TokenType,
                    sequence: &str,
                    category: TokenCategory)
                    -> Result<(), RegistryError> {
        Self::validate(sequence)?;
        if let Some(existing) = self.lookup_exact(sequence)
           && existing != kind
        {
            return Err(RegistryError::Conflict { sequence: sequence.to_string(),
                                                 existing: self.name_of(existing), });
        }
        self.insert_sequence(kind, sequence, category);
        Ok(())
    }

    /// Allocates a new [`TokenType::Custom`] and registers it for `sequence`.
    ///
    /// # Errors
    /// Same as [`TokenRegistry::register`], plus [`RegistryError::Exhausted`]
    /// once the custom id space is used up.
    pub fn register_custom(&mut self,
                           name: impl Into<String>,
                           sequence: &str)
                           -> Result<TokenType, RegistryError> {
        Self::validate(sequence)?;
        let id = u16::try_from(self.custom_names.len()).map_err(|_| RegistryError::Exhausted)?;
        let kind = TokenType::Custom(id);
        self.register(kind, sequence, TokenCategory::Custom)?;
        self.custom_names.push(name.into());
        Ok(kind)
    }

    /// Adds a keyword. Keywords must look like identifiers.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidKeyword`] for words that are not
    /// identifier-shaped.
    pub fn register_keyword(&mut self,
                            word: &str,
                            kind: TokenType)
                            -> Result<(), RegistryError> {
        let mut chars = word.chars();
        let valid_start = chars.next()
                               .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(RegistryError::InvalidKeyword { word: word.to_string() });
        }
        self.keywords.insert(word.to_string(), kind);
        self.categories.entry(kind).or_insert(TokenCategory::Keyword);
        Ok(())
    }

    /// Length of the longest registered sequence.
    #[must_use]
    pub fn max_sequence_length(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or_default()
    }

    /// Whether `character` starts at least one registered sequence.
    #[must_use]
    pub fn starts_sequence(&self, character: char) -> bool {
        self.nodes[ROOT].children.contains_key(&character)
    }

    /// Walks the graph greedily over `input` and falls back to the deepest
    /// complete ancestor of the node where the walk stopped.
    ///
    /// With `<` and `<<` registered but not `<<<`, the input `<<<` yields
    /// `<<` (length 2); the lexer then resumes at the third character.
    #[must_use]
    pub fn longest_match(&self, input: &[char]) -> GraphMatch {
        let mut node = ROOT;
        for character in input {
            match self.nodes[node].children.get(character) {
                Some(&next) => node = next,
                None => break,
            }
        }

        let walked = self.nodes[node].depth;
        let mut cursor = Some(node);
        while let Some(id) = cursor
              && id != ROOT
        {
            let current = &self.nodes[id];
            if let Some(kind) = current.token {
                return GraphMatch::Matched { kind,
                                             length: current.depth };
            }
            cursor = current.parent;
        }

        GraphMatch::Unmatched { length: walked.max(1) }
    }

    /// Looks up a keyword.
    #[must_use]
    pub fn keyword(&self, word: &str) -> Option<TokenType> {
        self.keywords.get(word).copied()
    }

    /// The comment style a token type opens, if it is a comment marker.
    #[must_use]
    pub fn comment_kind(&self, kind: TokenType) -> Option<CommentKind> {
        self.comments.get(&kind).copied()
    }

    #[must_use]
    pub fn category(&self, kind: TokenType) -> Option<TokenCategory> {
        match kind {
            TokenType::Identifier
            | TokenType::String
            | TokenType::Char
            | TokenType::Number => Some(TokenCategory::Literal),
            TokenType::Eof => Some(TokenCategory::EndOfInput),
            other => self.categories.get(&other).copied(),
        }
    }

    /// The character sequence registered for `kind`, if any.
    #[must_use]
    pub fn sequence(&self, kind: TokenType) -> Option<&str> {
        self.sequences.get(&kind).map(String::as_str)
    }

    /// Human-readable name, resolving custom types to their registered name.
    #[must_use]
    pub fn name_of(&self, kind: TokenType) -> String {
        match kind {
            TokenType::Custom(id) => self.custom_names
                                         .get(usize::from(id))
                                         .cloned()
                                         .unwrap_or_else(|| kind.to_string()),
            other => other.name().to_string(),
        }
    }

    fn validate(sequence: &str) -> Result<(), RegistryError> {
        if sequence.is_empty() {
            return Err(RegistryError::EmptySequence);
        }
        if let Some(character) = sequence.chars().find(|c| !TOKEN_CHARACTERS.contains(c)) {
            return Err(RegistryError::NotATokenCharacter { character,
                                                           sequence: sequence.to_string() });
        }
        Ok(())
    }

    fn lookup_exact(&self, sequence: &str) -> Option<TokenType> {
        let mut node = ROOT;
        for character in sequence.chars() {
            node = *self.nodes[node].children.get(&character)?;
        }
        self.nodes[node].token
    }

    fn insert_sequence(&mut self, kind: TokenType, sequence: &str, category: TokenCategory) {
        let mut node = ROOT;
        for character in sequence.chars() {
            node = match self.nodes[node].children.get(&character) {
                Some(&next) => next,
                None => {
                    let id = self.nodes.len();
                    let depth = self.nodes[node].depth + 1;
                    self.nodes.push(GraphNode::new(Some(node), depth));
                    self.nodes[node].children.insert(character, id);
                    id
                },
            };
        }
        self.nodes[node].token = Some(kind);
        self.sequences.insert(kind, sequence.to_string());
        self.categories.insert(kind, category);
    }

    fn insert_comment(&mut self, kind: TokenType, sequence: &str, comment: CommentKind) {
        self.insert_sequence(kind, sequence, TokenCategory::Comment);
        self.comments.insert(kind, comment);
    }
}
