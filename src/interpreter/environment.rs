use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;

use crate::interpreter::value::core::Value;

/// Why an assignment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingError {
    Undefined,
    Final,
}

#[derive(Debug, Clone)]
struct Binding {
    value:    Value,
    is_final: bool,
}

/// A lexical scope: names bound to values, plus the enclosing scope.
///
/// Lookups by name walk the chain outwards. After resolution the interpreter
/// instead jumps straight to the scope the resolver computed, using the
/// `*_at` methods.
#[derive(Debug, Default)]
pub struct Environment {
    values:    FxHashMap<String, Binding>,
    enclosing: Option<Rc<RefCell<Self>>>,
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_enclosing(enclosing: Rc<RefCell<Self>>) -> Self {
        Self { values:    FxHashMap::default(),
               enclosing: Some(enclosing), }
    }

    /// Binds `name` in this scope, replacing any previous binding of the
    /// same name here. Re-running a declaration therefore simply rebinds it.
    pub fn define(&mut self, name: impl Into<String>, value: Value, is_final: bool) {
        self.values.insert(name.into(), Binding { value, is_final });
    }

    /// Looks `name` up along the chain.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(binding) = self.values.get(name) {
            return Some(binding.value.clone());
        }
        self.enclosing
            .as_ref()
            .and_then(|enclosing| enclosing.borrow().get(name))
    }

    /// Assigns to the nearest binding of `name` along the chain.
    ///
    /// # Errors
    /// Returns [`BindingError::Undefined`] if no scope binds `name` and
    /// [`BindingError::Final`] if the binding is final.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), BindingError> {
        if let Some(binding) = self.values.get_mut(name) {
            if binding.is_final {
                return Err(BindingError::Final);
            }
            binding.value = value;
            return Ok(());
        }
        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign(name, value),
            None => Err(BindingError::Undefined),
        }
    }

    /// Reads `name` from the scope `distance` levels up, without searching.
    #[must_use]
    pub fn get_at(environment: &Rc<RefCell<Self>>, distance: usize, name: &str) -> Option<Value> {
        let scope = Self::ancestor(environment, distance)?;
        let scope = scope.borrow();
        scope.values.get(name).map(|binding| binding.value.clone())
    }

    /// Assigns `name` in the scope `distance` levels up, without searching.
    ///
    /// # Errors
    /// Same as [`Environment::assign`], for that scope only.
    pub fn assign_at(environment: &Rc<RefCell<Self>>,
                     distance: usize,
                     name: &str,
                     value: Value)
                     -> Result<(), BindingError> {
        let scope = Self::ancestor(environment, distance).ok_or(BindingError::Undefined)?;
        let mut scope = scope.borrow_mut();
        let binding = scope.values.get_mut(name).ok_or(BindingError::Undefined)?;
        if binding.is_final {
            return Err(BindingError::Final);
        }
        binding.value = value;
        Ok(())
    }

    /// The scope `distance` levels up from `environment`.
    #[must_use]
    pub fn ancestor(environment: &Rc<RefCell<Self>>, distance: usize) -> Option<Rc<RefCell<Self>>> {
        let mut scope = Rc::clone(environment);
        for _ in 0..distance {
            let next = scope.borrow().enclosing.clone()?;
            scope = next;
        }
        Some(scope)
    }

    /// Whether this scope itself binds `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The bindings of this scope only, as name-value pairs in no
    /// particular order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .map(|(name, binding)| (name.as_str(), &binding.value))
    }
}
