use std::{
    cell::RefCell,
    fmt,
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use rustc_hash::FxHashMap;

use crate::{
    ast::{ClassDecl, FunctionDecl, FunctionKind, Visibility},
    interpreter::{environment::Environment, value::core::Value},
};

static NEXT_CLASS_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a class object. Each evaluation of a class declaration
/// produces a fresh id; private field access is checked against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

impl ClassId {
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A user-defined function closed over the environment it was declared in.
pub struct ScriptFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure:     Rc<RefCell<Environment>>,
    /// The class whose body the function belongs to, if any. Code running
    /// with an owner may access that class's private fields.
    pub owner:       Option<ClassId>,
}

impl ScriptFunction {
    #[must_use]
    pub fn new(declaration: Rc<FunctionDecl>,
               closure: Rc<RefCell<Environment>>,
               owner: Option<ClassId>)
               -> Self {
        Self { declaration,
               closure,
               owner }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.declaration.kind == FunctionKind::Constructor
    }

    /// Returns a copy whose closure binds `this` to `instance`.
    #[must_use]
    pub fn bind(&self, instance: Value) -> Self {
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        environment.define("this", instance, true);
        Self { declaration: Rc::clone(&self.declaration),
               closure:     Rc::new(RefCell::new(environment)),
               owner:       self.owner, }
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
         .field("name", &self.declaration.name)
         .field("arity", &self.arity())
         .finish_non_exhaustive()
    }
}

/// A class object.
pub struct ScriptClass {
    pub id:          ClassId,
    pub name:        String,
    pub superclass:  Option<Rc<Self>>,
    /// Methods declared in the class body, plus those added later by
    /// extension declarations.
    pub methods:     RefCell<FxHashMap<String, Rc<ScriptFunction>>>,
    pub declaration: Rc<ClassDecl>,
    /// The environment field initialisers and methods close over. When the
    /// class has a superclass it binds `super`.
    pub closure:     Rc<RefCell<Environment>>,
    pub is_final:    bool,
}

impl ScriptClass {
    /// Looks `name` up in this class, then along the superclass chain.
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<Rc<ScriptFunction>> {
        if let Some(method) = self.methods.borrow().get(name) {
            return Some(Rc::clone(method));
        }
        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// Inserts or replaces a method.
    pub fn add_method(&self, method: Rc<ScriptFunction>) {
        self.methods
            .borrow_mut()
            .insert(method.name().to_string(), method);
    }
}

impl fmt::Debug for ScriptClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptClass")
         .field("name", &self.name)
         .field("superclass", &self.superclass.as_ref().map(|s| s.name.clone()))
         .field("is_final", &self.is_final)
         .finish_non_exhaustive()
    }
}

/// A field slot of an instance.
#[derive(Debug, Clone)]
pub struct Field {
    pub value:      Value,
    pub visibility: Visibility,
    pub is_final:   bool,
    /// Whether a value has been stored. A final field may be assigned once
    /// if it was declared without an initializer.
    pub assigned:   bool,
    /// The class that declared the field.
    pub owner:      ClassId,
}

/// An instance of a [`ScriptClass`].
pub struct ScriptInstance {
    pub class: Rc<ScriptClass>,
    fields:    FxHashMap<String, Field>,
}

impl ScriptInstance {
    #[must_use]
    pub fn new(class: Rc<ScriptClass>) -> Self {
        Self { class,
               fields: FxHashMap::default() }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    pub fn insert_field(&mut self, name: impl Into<String>, field: Field) {
        self.fields.insert(name.into(), field);
    }

    /// Field names, in no particular order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl fmt::Debug for ScriptInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptInstance")
         .field("class", &self.class.name)
         .field("fields", &self.fields.len())
         .finish()
    }
}
