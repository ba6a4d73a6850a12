use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;

use crate::{
    ast::{ClassDecl, ExprId, FunctionDecl, SuperclassRef},
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::core::{EvalResult, Interpreter},
        token::SourceLocation,
        value::{
            callable::{ClassId, Field, ScriptClass, ScriptFunction, ScriptInstance},
            core::Value,
        },
    },
};

impl Interpreter<'_> {
    /// Creates the class object for a declaration and binds it in the
    /// current scope.
    ///
    /// Methods close over the current scope, or over a scope binding `super`
    /// when the class has a superclass.
    pub(in crate::interpreter::evaluator) fn declare_class(&mut self,
                                                           declaration: &Rc<ClassDecl>)
                                                           -> EvalResult<()> {
        let superclass = match &declaration.superclass {
            Some(reference) => Some(self.evaluate_superclass(declaration, reference)?),
            None => None,
        };

        let closure = match &superclass {
            Some(superclass) => {
                let mut scope = Environment::with_enclosing(Rc::clone(&self.environment));
                scope.define("super", Value::Class(Rc::clone(superclass)), true);
                Rc::new(RefCell::new(scope))
            },
            None => Rc::clone(&self.environment),
        };

        let id = ClassId::fresh();
        let methods: FxHashMap<_, _> =
            declaration.methods
                       .iter()
                       .map(|method| {
                           let function =
                               ScriptFunction::new(Rc::clone(method), Rc::clone(&closure), Some(id));
                           (method.name.clone(), Rc::new(function))
                       })
                       .collect();

        tracing::debug!(class = %declaration.name,
                        superclass = ?superclass.as_ref().map(|s| s.name.as_str()),
                        methods = methods.len(),
                        "declared class");

        let class = ScriptClass { id,
                                  name: declaration.name.clone(),
                                  superclass,
                                  methods: RefCell::new(methods),
                                  declaration: Rc::clone(declaration),
                                  closure,
                                  is_final: declaration.is_final };
        self.environment
            .borrow_mut()
            .define(declaration.name.as_str(),
                    Value::Class(Rc::new(class)),
                    declaration.is_final);
        Ok(())
    }

    fn evaluate_superclass(&self,
                           declaration: &ClassDecl,
                           reference: &SuperclassRef)
                           -> EvalResult<Rc<ScriptClass>> {
        match self.lookup_variable(reference.id, &reference.name, reference.location)? {
            Value::Class(superclass) if superclass.is_final => {
                Err(RuntimeError::FinalInheritance { class:      declaration.name.clone(),
                                                     superclass: superclass.name.clone(),
                                                     location:   reference.location, })
            },
            Value::Class(superclass) => Ok(superclass),
            _ => Err(RuntimeError::SuperclassNotClass { name:     reference.name.clone(),
                                                        location: reference.location, }),
        }
    }

    /// Creates an instance: fields are initialised from the root of the
    /// class chain downwards, then the constructor runs if there is one.
    pub(in crate::interpreter::evaluator) fn instantiate(&mut self,
                                                         class: &Rc<ScriptClass>,
                                                         arguments: Vec<Value>,
                                                         location: SourceLocation)
                                                         -> EvalResult<Value> {
        let instance = Rc::new(RefCell::new(ScriptInstance::new(Rc::clone(class))));
        self.initialize_fields(class, &instance)?;

        let value = Value::Instance(instance);
        match class.find_method("constructor") {
            Some(constructor) => {
                let bound = constructor.bind(value.clone());
                self.call_function(&bound, arguments, location)?;
            },
            None if !arguments.is_empty() => {
                return Err(RuntimeError::ArityMismatch { expected: 0,
                                                         found: arguments.len(),
                                                         location });
            },
            None => {},
        }
        Ok(value)
    }

    fn initialize_fields(&mut self,
                         class: &ScriptClass,
                         instance: &Rc<RefCell<ScriptInstance>>)
                         -> EvalResult<()> {
        if let Some(superclass) = &class.superclass {
            self.initialize_fields(superclass, instance)?;
        }
        if class.declaration.fields.is_empty() {
            return Ok(());
        }

        let mut scope = Environment::with_enclosing(Rc::clone(&class.closure));
        scope.define("this", Value::Instance(Rc::clone(instance)), true);

        self.owners.push(Some(class.id));
        let result = self.in_environment(Rc::new(RefCell::new(scope)), |interpreter| -> EvalResult<()> {
                             for field in &class.declaration.fields {
                                 let value = match &field.initializer {
                                     Some(initializer) => interpreter.evaluate(initializer)?,
                                     None => Value::Nil,
                                 };
                                 let slot = Field { value,
                                                    visibility: field.visibility,
                                                    is_final: field.is_final,
                                                    assigned: field.initializer.is_some(),
                                                    owner: class.id };
                                 instance.borrow_mut().insert_field(field.name.as_str(), slot);
                             }
                             Ok(())
                         });
        self.owners.pop();
        result
    }

    /// Adds an extension method to an existing, non-final class. Extension
    /// methods see `this` but not the class's private fields.
    pub(in crate::interpreter::evaluator) fn declare_extension(&self,
                                                               id: ExprId,
                                                               class_name: &str,
                                                               function: &Rc<FunctionDecl>,
                                                               location: SourceLocation)
                                                               -> EvalResult<()> {
        let Value::Class(class) = self.lookup_variable(id, class_name, location)? else {
            return Err(RuntimeError::NotAClass { name: class_name.to_string(),
                                                 location });
        };
        if class.is_final {
            return Err(RuntimeError::FinalExtension { class: class_name.to_string(),
                                                      location });
        }
        let method = ScriptFunction::new(Rc::clone(function), Rc::clone(&self.environment), None);
        class.add_method(Rc::new(method));
        tracing::debug!(class = class_name, method = %function.name, "added extension method");
        Ok(())
    }

    /// `super.method`: looks the method up in the superclass of the class
    /// whose body contains the expression and binds it to the current
    /// `this`.
    pub(in crate::interpreter::evaluator) fn evaluate_super(&self,
                                                            id: ExprId,
                                                            method: &str,
                                                            location: SourceLocation)
                                                            -> EvalResult<Value> {
        let undefined = || RuntimeError::UndefinedVariable { name: "super".to_string(),
                                                             location };
        let distance = *self.resolutions.get(&id).ok_or_else(undefined)?;
        let Some(Value::Class(superclass)) = Environment::get_at(&self.environment, distance, "super")
        else {
            return Err(undefined());
        };
        let instance = distance.checked_sub(1)
                               .and_then(|distance| {
                                   Environment::get_at(&self.environment, distance, "this")
                               })
                               .ok_or_else(undefined)?;

        superclass.find_method(method)
                  .map(|method| Value::Function(Rc::new(method.bind(instance))))
                  .ok_or_else(|| RuntimeError::UndefinedProperty { name: method.to_string(),
                                                                   location })
    }
}
