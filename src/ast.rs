use std::{
    fmt,
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::interpreter::token::SourceLocation;

/// Represents a literal value in the language.
///
/// `LiteralValue` covers the raw constants that can appear directly in source
/// code. The lexer attaches one to every number, string and character token,
/// and to the `true`, `false` and `nil` keywords.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// A double-precision number. All numbers in the language are doubles.
    Number(f64),
    /// A double-quoted string with escapes already processed.
    Str(String),
    /// A single-quoted character.
    Char(char),
    /// `true` or `false`.
    Bool(bool),
    /// `nil`.
    Nil,
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for LiteralValue {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of an expression node that the resolver attaches metadata to.
///
/// Ids are unique for the lifetime of the process, so nodes synthesised by a
/// customizer never collide with parsed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(usize);

impl ExprId {
    /// Allocates a fresh id.
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Arithmetic, comparison and equality operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// Short-circuiting logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Operators that work on the 32-bit integer truncation of their operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitwiseOperator {
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
}

/// Prefix operators built into the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `!`
    Not,
    /// `-`
    Negate,
    /// `~`
    Complement,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
                        Self::Add => "+",
                        Self::Sub => "-",
                        Self::Mul => "*",
                        Self::Div => "/",
                        Self::Mod => "%",
                        Self::Equal => "==",
                        Self::NotEqual => "!=",
                        Self::Less => "<",
                        Self::LessEqual => "<=",
                        Self::Greater => ">",
                        Self::GreaterEqual => ">=",
                    })
    }
}

impl fmt::Display for BitwiseOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
                        Self::And => "&",
                        Self::Or => "|",
                        Self::Xor => "^",
                        Self::ShiftLeft => "<<",
                        Self::ShiftRight => ">>",
                        Self::UnsignedShiftRight => ">>>",
                    })
    }
}

/// An abstract syntax tree node representing an expression.
///
/// Nodes that refer to a binding by name (`Variable`, `Assign`, `This`,
/// `Super`, and the user-defined operator calls) carry an [`ExprId`] under
/// which the resolver records the binding's scope distance.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant.
    Literal {
        value:    LiteralValue,
        location: SourceLocation,
    },
    /// `[a, b, c]`
    ArrayLiteral {
        elements: Vec<Self>,
        location: SourceLocation,
    },
    /// A reference to a variable, function or class by name.
    Variable {
        id:       ExprId,
        name:     String,
        location: SourceLocation,
    },
    /// `name = value`
    Assign {
        id:       ExprId,
        name:     String,
        value:    Box<Self>,
        location: SourceLocation,
    },
    /// Arithmetic, comparison or equality.
    Binary {
        left:     Box<Self>,
        op:       BinaryOperator,
        right:    Box<Self>,
        location: SourceLocation,
    },
    /// `&&` or `||`.
    Logical {
        left:     Box<Self>,
        op:       LogicalOperator,
        right:    Box<Self>,
        location: SourceLocation,
    },
    /// `&`, `|`, `^`, `<<`, `>>` or `>>>`.
    Bitwise {
        left:     Box<Self>,
        op:       BitwiseOperator,
        right:    Box<Self>,
        location: SourceLocation,
    },
    /// `!x`, `-x` or `~x`.
    Unary {
        op:       UnaryOperator,
        operand:  Box<Self>,
        location: SourceLocation,
    },
    /// Application of a user-declared `prefix` function: `name operand`.
    PrefixCall {
        id:       ExprId,
        name:     String,
        operand:  Box<Self>,
        location: SourceLocation,
    },
    /// Application of a user-declared `infix` function: `left name right`.
    InfixCall {
        id:       ExprId,
        name:     String,
        left:     Box<Self>,
        right:    Box<Self>,
        location: SourceLocation,
    },
    /// `condition ? then : otherwise`
    Ternary {
        condition:   Box<Self>,
        then_branch: Box<Self>,
        else_branch: Box<Self>,
        location:    SourceLocation,
    },
    /// `value ?: fallback`
    Elvis {
        value:    Box<Self>,
        fallback: Box<Self>,
        location: SourceLocation,
    },
    /// `callee(arguments...)`
    Call {
        callee:    Box<Self>,
        arguments: Vec<Self>,
        location:  SourceLocation,
    },
    /// `object.name`
    Get {
        object:   Box<Self>,
        name:     String,
        location: SourceLocation,
    },
    /// `object.name = value`
    Set {
        object:   Box<Self>,
        name:     String,
        value:    Box<Self>,
        location: SourceLocation,
    },
    /// `array[index]`
    ArrayGet {
        array:    Box<Self>,
        index:    Box<Self>,
        location: SourceLocation,
    },
    /// `array[index] = value`
    ArraySet {
        array:    Box<Self>,
        index:    Box<Self>,
        value:    Box<Self>,
        location: SourceLocation,
    },
    /// `(expr)`
    Grouping {
        expr:     Box<Self>,
        location: SourceLocation,
    },
    /// `this`
    This {
        id:       ExprId,
        location: SourceLocation,
    },
    /// `super.method`
    Super {
        id:       ExprId,
        method:   String,
        location: SourceLocation,
    },
}

impl Expr {
    /// Returns the source location the node was parsed from.
    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        match self {
            Self::Literal { location, .. }
            | Self::ArrayLiteral { location, .. }
            | Self::Variable { location, .. }
            | Self::Assign { location, .. }
            | Self::Binary { location, .. }
            | Self::Logical { location, .. }
            | Self::Bitwise { location, .. }
            | Self::Unary { location, .. }
            | Self::PrefixCall { location, .. }
            | Self::InfixCall { location, .. }
            | Self::Ternary { location, .. }
            | Self::Elvis { location, .. }
            | Self::Call { location, .. }
            | Self::Get { location, .. }
            | Self::Set { location, .. }
            | Self::ArrayGet { location, .. }
            | Self::ArraySet { location, .. }
            | Self::Grouping { location, .. }
            | Self::This { location, .. }
            | Self::Super { location, .. } => *location,
        }
    }

    /// Builds a literal node.
    #[must_use]
    pub fn literal(value: impl Into<LiteralValue>, location: SourceLocation) -> Self {
        Self::Literal { value: value.into(),
                        location }
    }

    /// Builds a variable reference with a fresh id.
    #[must_use]
    pub fn variable(name: impl Into<String>, location: SourceLocation) -> Self {
        Self::Variable { id: ExprId::fresh(),
                         name: name.into(),
                         location }
    }
}

/// What a function declaration declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// `fun name(...)`
    Function,
    /// `prefix fun name(a)`
    Prefix,
    /// `infix fun name(a, b)`
    Infix,
    /// A method inside a class body, or added by an extension declaration.
    Method,
    /// `constructor(...)` inside a class body.
    Constructor,
}

/// A named parameter in a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name:     String,
    pub location: SourceLocation,
}

/// A function, operator, method or constructor declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name:     String,
    pub kind:     FunctionKind,
    pub params:   Vec<Parameter>,
    pub body:     Vec<Statement>,
    pub is_final: bool,
    pub location: SourceLocation,
}

/// Field visibility. Private fields are only reachable from the declaring
/// class's own methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// `[public|private] [final] var name [= initializer];` inside a class body.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name:        String,
    pub visibility:  Visibility,
    pub is_final:    bool,
    pub initializer: Option<Expr>,
    pub location:    SourceLocation,
}

/// The `extends Name` clause of a class declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperclassRef {
    pub id:       ExprId,
    pub name:     String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name:       String,
    pub superclass: Option<SuperclassRef>,
    pub fields:     Vec<FieldDecl>,
    /// Methods, including the constructor if one is declared.
    pub methods:    Vec<Rc<FunctionDecl>>,
    pub is_final:   bool,
    pub location:   SourceLocation,
}

/// An abstract syntax tree node representing a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// An expression evaluated for its side effects.
    Expression {
        expr:     Expr,
        location: SourceLocation,
    },
    /// `[final] var name [= initializer];`
    VarDecl {
        name:        String,
        initializer: Option<Expr>,
        is_final:    bool,
        location:    SourceLocation,
    },
    /// `{ ... }`
    Block {
        statements: Vec<Self>,
        location:   SourceLocation,
    },
    If {
        condition:   Expr,
        then_branch: Box<Self>,
        else_branch: Option<Box<Self>>,
        location:    SourceLocation,
    },
    While {
        condition: Expr,
        body:      Box<Self>,
        location:  SourceLocation,
    },
    /// `do body while (condition);`
    DoWhile {
        body:      Box<Self>,
        condition: Expr,
        location:  SourceLocation,
    },
    /// `repeat (count) body`
    Repeat {
        count:    Expr,
        body:     Box<Self>,
        location: SourceLocation,
    },
    Function(Rc<FunctionDecl>),
    Class(Rc<ClassDecl>),
    Return {
        value:    Option<Expr>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Print {
        expr:     Expr,
        location: SourceLocation,
    },
    /// `test ("name") { ... }`
    Test {
        name:     String,
        body:     Vec<Self>,
        location: SourceLocation,
    },
    /// `module name;`
    Module {
        name:     String,
        location: SourceLocation,
    },
    /// `native fun module.name(params);`
    NativeFunction {
        module:   String,
        name:     String,
        params:   Vec<Parameter>,
        location: SourceLocation,
    },
    /// `fun ClassName.method(params) { ... }`
    Extension {
        id:         ExprId,
        class_name: String,
        function:   Rc<FunctionDecl>,
        location:   SourceLocation,
    },
}

impl Statement {
    #[must_use]
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::Function(decl) => decl.location,
            Self::Class(decl) => decl.location,
            Self::Expression { location, .. }
            | Self::VarDecl { location, .. }
            | Self::Block { location, .. }
            | Self::If { location, .. }
            | Self::While { location, .. }
            | Self::DoWhile { location, .. }
            | Self::Repeat { location, .. }
            | Self::Return { location, .. }
            | Self::Break { location }
            | Self::Continue { location }
            | Self::Print { location, .. }
            | Self::Test { location, .. }
            | Self::Module { location, .. }
            | Self::NativeFunction { location, .. }
            | Self::Extension { location, .. } => *location,
        }
    }
}
