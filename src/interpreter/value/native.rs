use std::{fmt, rc::Rc};

use rustc_hash::FxHashMap;

use crate::interpreter::value::core::Value;

/// The host closure behind a native overload. An `Err` carries a message
/// that is surfaced as a runtime error at the call site.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, String>>;

/// The runtime type a native parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Accepts every value, at a lower score than an exact match.
    Any,
    Number,
    Str,
    Char,
    Bool,
    Array,
    Instance,
    /// Script functions, classes and native functions.
    Callable,
    Nil,
}

impl ParamType {
    /// Scores `value` against this parameter: `2` for an exact type match,
    /// `1` for [`ParamType::Any`], `None` when the value is not accepted.
    #[must_use]
    pub const fn score(self, value: &Value) -> Option<u32> {
        let exact = match (self, value) {
            (Self::Any, _) => return Some(1),
            (Self::Number, Value::Number(_))
            | (Self::Str, Value::Str(_))
            | (Self::Char, Value::Char(_))
            | (Self::Bool, Value::Bool(_))
            | (Self::Array, Value::Array(_))
            | (Self::Instance, Value::Instance(_))
            | (Self::Callable, Value::Function(_) | Value::Native(_) | Value::Class(_))
            | (Self::Nil, Value::Nil) => true,
            _ => false,
        };
        if exact { Some(2) } else { None }
    }
}

/// One overload of a native function.
#[derive(Clone)]
pub struct NativeOverload {
    pub params: Vec<ParamType>,
    function:   NativeFn,
}

impl NativeOverload {
    /// Calls the host closure.
    ///
    /// # Errors
    /// Returns the host's failure message.
    pub fn invoke(&self, arguments: &[Value]) -> Result<Value, String> {
        (self.function)(arguments)
    }

    /// Total score of `arguments` against the parameter list, or `None` if
    /// any argument is rejected or the arity differs.
    #[must_use]
    pub fn score(&self, arguments: &[Value]) -> Option<u32> {
        if self.params.len() != arguments.len() {
            return None;
        }
        self.params
            .iter()
            .zip(arguments)
            .try_fold(0, |total, (param, argument)| Some(total + param.score(argument)?))
    }
}

impl fmt::Debug for NativeOverload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeOverload")
         .field("params", &self.params)
         .finish_non_exhaustive()
    }
}

/// Why overload selection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadError {
    /// The module has no function of that name.
    UnknownFunction,
    /// No overload accepts the arguments.
    NoMatch,
    /// Several overloads share the best score.
    Ambiguous { candidates: usize },
}

/// A named bundle of host functions exposed to scripts.
///
/// Overloads are kept in declaration order, which is the order used to break
/// ties when ambiguous calls are permitted.
///
/// # Example
/// ```
/// use hsl::interpreter::value::{
///     core::Value,
///     native::{NativeModule, ParamType},
/// };
///
/// let math = NativeModule::new("math").function("max",
///                                                &[ParamType::Number, ParamType::Number],
///                                                |args| match (&args[0], &args[1]) {
///                                                    (Value::Number(a), Value::Number(b)) => {
///                                                        Ok(Value::Number(a.max(*b)))
///                                                    },
///                                                    _ => Err("expected numbers".to_string()),
///                                                });
///
/// let args = [Value::Number(2.0), Value::Number(5.0)];
/// let overload = math.select("max", &args, false).unwrap();
/// assert_eq!(overload.invoke(&args), Ok(Value::Number(5.0)));
/// ```
#[derive(Clone)]
pub struct NativeModule {
    name:      String,
    functions: FxHashMap<String, Vec<NativeOverload>>,
}

impl NativeModule {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name:      name.into(),
               functions: FxHashMap::default(), }
    }

    /// Adds an overload of `name`. Repeating a name adds further overloads.
    #[must_use]
    pub fn function<F>(mut self, name: impl Into<String>, params: &[ParamType], function: F) -> Self
        where F: Fn(&[Value]) -> Result<Value, String> + 'static
    {
        self.functions
            .entry(name.into())
            .or_default()
            .push(NativeOverload { params:   params.to_vec(),
                                   function: Rc::new(function), });
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Picks the overload of `name` that best matches `arguments`.
    ///
    /// Every overload of matching arity is scored; the highest total wins.
    /// A tie for the highest score is an error unless `permit_ambiguous` is
    /// set, in which case the first declared of the tied overloads is used.
    ///
    /// # Errors
    /// Returns an [`OverloadError`] when the function is unknown, nothing
    /// matches, or the best match is ambiguous and not permitted.
    pub fn select(&self,
                  name: &str,
                  arguments: &[Value],
                  permit_ambiguous: bool)
                  -> Result<&NativeOverload, OverloadError> {
        let overloads = self.functions
                            .get(name)
                            .ok_or(OverloadError::UnknownFunction)?;

        let mut best: Option<(u32, &NativeOverload)> = None;
        let mut ties = 0;
        for overload in overloads {
            let Some(score) = overload.score(arguments) else {
                continue;
            };
            tracing::trace!(module = %self.name,
                            function = name,
                            params = ?overload.params,
                            score,
                            "scored native overload");
            match best {
                Some((top, _)) if score < top => {},
                Some((top, _)) if score == top => ties += 1,
                _ => {
                    best = Some((score, overload));
                    ties = 1;
                },
            }
        }

        let (_, overload) = best.ok_or(OverloadError::NoMatch)?;
        if ties > 1 {
            if !permit_ambiguous {
                return Err(OverloadError::Ambiguous { candidates: ties });
            }
            tracing::warn!(module = %self.name,
                           function = name,
                           candidates = ties,
                           "ambiguous native call resolved to the first declared overload");
        }
        Ok(overload)
    }
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule")
         .field("name", &self.name)
         .field("functions", &self.functions)
         .finish()
    }
}

/// A script-side reference to a native function, looked up by name in the
/// registered modules each time it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeBinding {
    pub module: String,
    pub name:   String,
    /// The arity given by a `native fun` declaration, checked before
    /// overload selection.
    pub arity:  Option<usize>,
}
