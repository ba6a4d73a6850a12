use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::FunctionDecl,
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::core::{EvalResult, ExecResult, Interpreter},
        token::SourceLocation,
        value::{
            callable::ScriptFunction,
            core::Value,
            native::{NativeBinding, OverloadError},
        },
    },
};

/// Remaining native stack below which a call moves onto a fresh segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

impl Interpreter<'_> {
    /// Calls a function, class or native binding with already evaluated
    /// arguments.
    ///
    /// # Errors
    /// Returns [`RuntimeError::NotCallable`] for any other value, and
    /// whatever the callee raises.
    pub fn call_value(&mut self,
                      callee: &Value,
                      arguments: Vec<Value>,
                      location: SourceLocation)
                      -> EvalResult<Value> {
        match callee {
            Value::Function(function) => self.call_function(function, arguments, location),
            Value::Class(class) => self.instantiate(class, arguments, location),
            Value::Native(binding) => self.call_native(binding, &arguments, location),
            other => Err(RuntimeError::NotCallable { type_name: other.type_name(),
                                                     location }),
        }
    }

    /// Runs a script function: binds the parameters in a fresh scope over
    /// the closure and executes the body there.
    ///
    /// Constructors always produce the instance they were bound to.
    pub(in crate::interpreter::evaluator) fn call_function(&mut self,
                                                           function: &ScriptFunction,
                                                           arguments: Vec<Value>,
                                                           location: SourceLocation)
                                                           -> EvalResult<Value> {
        if arguments.len() != function.arity() {
            return Err(RuntimeError::ArityMismatch { expected: function.arity(),
                                                     found: arguments.len(),
                                                     location });
        }

        if self.call_depth >= self.options.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded { limit: self.options.max_call_depth,
                                                         location });
        }

        let mut scope = Environment::with_enclosing(Rc::clone(&function.closure));
        for (param, argument) in function.declaration.params.iter().zip(arguments) {
            scope.define(param.name.as_str(), argument, false);
        }
        tracing::trace!(function = function.name(),
                        depth = self.call_depth,
                        "calling script function");

        self.owners.push(function.owner);
        self.call_depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                         self.in_environment(Rc::new(RefCell::new(scope)), |interpreter| {
                                 interpreter.execute_statements(&function.declaration.body)
                             })
                     });
        self.call_depth -= 1;
        self.owners.pop();

        let value = match result? {
            ExecResult::Normal => Value::Nil,
            ExecResult::Return(value) => value,
            ExecResult::Break => {
                return Err(RuntimeError::IllegalControlFlow { keyword: "break",
                                                              location });
            },
            ExecResult::Continue => {
                return Err(RuntimeError::IllegalControlFlow { keyword: "continue",
                                                              location });
            },
        };

        if function.is_constructor() {
            return Ok(Environment::get_at(&function.closure, 0, "this").unwrap_or_default());
        }
        Ok(value)
    }

    /// Calls into a registered native module.
    ///
    /// The declared arity of a `native fun` binding is checked first, then
    /// the module picks an overload from the runtime types of the
    /// arguments.
    fn call_native(&self,
                   binding: &NativeBinding,
                   arguments: &[Value],
                   location: SourceLocation)
                   -> EvalResult<Value> {
        if let Some(arity) = binding.arity
           && arity != arguments.len()
        {
            return Err(RuntimeError::ArityMismatch { expected: arity,
                                                     found: arguments.len(),
                                                     location });
        }

        let module = self.modules
                         .get(&binding.module)
                         .ok_or_else(|| RuntimeError::UnknownModule { name: binding.module.clone(),
                                                                      location })?;
        let permit_ambiguous = self.options.permit_ambiguous_external_functions;
        let overload = module.select(&binding.name, arguments, permit_ambiguous)
                             .map_err(|error| {
                                 let (module, name) = (binding.module.clone(), binding.name.clone());
                                 match error {
                                     OverloadError::UnknownFunction => {
                                         RuntimeError::UnknownNativeFunction { module,
                                                                               name,
                                                                               location }
                                     },
                                     OverloadError::NoMatch => {
                                         RuntimeError::NoMatchingOverload { module,
                                                                            name,
                                                                            location }
                                     },
                                     OverloadError::Ambiguous { candidates } => {
                                         RuntimeError::AmbiguousOverload { module,
                                                                           name,
                                                                           candidates,
                                                                           location }
                                     },
                                 }
                             })?;

        overload.invoke(arguments)
                .map_err(|message| RuntimeError::NativeFailure { module: binding.module.clone(),
                                                                 name: binding.name.clone(),
                                                                 message,
                                                                 location })
    }

    /// Binds a function declaration in the current scope. Functions
    /// declared inside a class body share its private field access.
    pub(in crate::interpreter::evaluator) fn declare_function(&self, declaration: &Rc<FunctionDecl>) {
        let function = ScriptFunction::new(Rc::clone(declaration),
                                           Rc::clone(&self.environment),
                                           self.current_owner());
        self.environment
            .borrow_mut()
            .define(declaration.name.as_str(),
                    Value::Function(Rc::new(function)),
                    declaration.is_final);
    }

    /// Binds `native fun module.name(params);` in the current scope. The
    /// module must be registered and provide the function.
    pub(in crate::interpreter::evaluator) fn declare_native(&self,
                                                            module: &str,
                                                            name: &str,
                                                            arity: usize,
                                                            location: SourceLocation)
                                                            -> EvalResult<()> {
        let registered = self.modules
                             .get(module)
                             .ok_or_else(|| RuntimeError::UnknownModule { name: module.to_string(),
                                                                          location })?;
        if !registered.has_function(name) {
            return Err(RuntimeError::UnknownNativeFunction { module: module.to_string(),
                                                             name: name.to_string(),
                                                             location });
        }
        let binding = NativeBinding { module: module.to_string(),
                                      name:   name.to_string(),
                                      arity:  Some(arity), };
        self.environment
            .borrow_mut()
            .define(name, Value::Native(Rc::new(binding)), false);
        Ok(())
    }
}
