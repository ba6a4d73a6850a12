use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    ast::LiteralValue,
    interpreter::value::{
        callable::{ScriptClass, ScriptFunction, ScriptInstance},
        native::{NativeBinding, NativeModule},
    },
};

/// Represents a runtime value in the interpreter.
///
/// Scalars are held inline. Arrays, functions, classes, instances and native
/// modules are reference types: copies of the value share the underlying
/// object, so a mutation through one copy is visible through all others,
/// including copies held by the host.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    /// All numbers are double-precision floating point.
    Number(f64),
    Str(Rc<str>),
    Char(char),
    Array(Rc<RefCell<Vec<Self>>>),
    /// A user-defined function, or a method bound to an instance.
    Function(Rc<ScriptFunction>),
    /// A call-time reference to a native module function.
    Native(Rc<NativeBinding>),
    Class(Rc<ScriptClass>),
    Instance(Rc<RefCell<ScriptInstance>>),
    /// A host module brought into scope with `module name;`.
    Module(Rc<NativeModule>),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(v)))
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Number(n) => Self::Number(*n),
            LiteralValue::Str(s) => Self::from(s.as_str()),
            LiteralValue::Char(c) => Self::Char(*c),
            LiteralValue::Bool(b) => Self::Bool(*b),
            LiteralValue::Nil => Self::Nil,
        }
    }
}

/// Equality is structural for scalars and strings, and identity for every
/// reference type.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            #[allow(clippy::float_cmp)]
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Native(a), Self::Native(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
            (Self::Instance(a), Self::Instance(b)) => Rc::ptr_eq(a, b),
            (Self::Module(a), Self::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Only `nil` and `false` are falsy.
    ///
    /// # Example
    /// ```
    /// use hsl::interpreter::value::core::Value;
    ///
    /// assert!(Value::Number(0.0).is_truthy());
    /// assert!(Value::from("").is_truthy());
    /// assert!(!Value::Nil.is_truthy());
    /// assert!(!Value::Bool(false).is_truthy());
    /// ```
    #[must_use]
    pub const fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }

    /// The name of the value's runtime type, as used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Char(_) => "char",
            Self::Array(_) => "array",
            Self::Function(_) => "function",
            Self::Native(_) => "native function",
            Self::Class(_) => "class",
            Self::Instance(_) => "instance",
            Self::Module(_) => "module",
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Reads a field of an instance, ignoring visibility. Intended for hosts
    /// inspecting the results of a run.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Self> {
        match self {
            Self::Instance(instance) => instance.borrow().field(name).map(|f| f.value.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write_number(f, *n),
            Self::Str(s) => write!(f, "{s}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Array(elements) => write_array(f, elements, &mut Vec::new()),
            Self::Function(function) => write!(f, "<fun {}>", function.name()),
            Self::Native(binding) => write!(f, "<native fun {}.{}>", binding.module, binding.name),
            Self::Class(class) => write!(f, "{}", class.name),
            Self::Instance(instance) => write!(f, "{} instance", instance.borrow().class.name),
            Self::Module(module) => write!(f, "<module {}>", module.name()),
        }
    }
}

/// Writes an array, printing `[...]` for an array that is already being
/// written further up, so arrays that contain themselves terminate.
fn write_array(f: &mut fmt::Formatter<'_>,
               elements: &Rc<RefCell<Vec<Value>>>,
               open: &mut Vec<*const RefCell<Vec<Value>>>)
               -> fmt::Result {
    let pointer = Rc::as_ptr(elements);
    if open.contains(&pointer) {
        return write!(f, "[...]");
    }
    open.push(pointer);

    write!(f, "[")?;
    for (i, element) in elements.borrow().iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match element {
            Value::Array(inner) => write_array(f, inner, open)?,
            other => write!(f, "{other}")?,
        }
    }
    open.pop();
    write!(f, "]")
}

/// Integral numbers print without a fractional part.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        write!(f, "{n:.0}")
    } else {
        write!(f, "{n}")
    }
}
