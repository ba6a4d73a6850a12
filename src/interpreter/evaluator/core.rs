use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;

use crate::{
    ast::{Expr, Statement},
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        resolver::core::Resolutions,
        token::SourceLocation,
        value::{callable::ClassId, core::Value, native::NativeModule},
    },
    util::num::repeat_count,
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or the
/// `RuntimeError` that aborted the run.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// How a statement finished executing.
///
/// Loops consume `Break` and `Continue`; function calls consume `Return`.
/// Anything else propagates outwards unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecResult {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// How many script function calls may be active at once by default.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Switches that change how a script runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// When several native overloads tie for the best score, call the first
    /// declared one instead of failing.
    pub permit_ambiguous_external_functions: bool,
    /// Also write `print` output to stdout.
    pub echo_print:                          bool,
    /// Deeper script recursion fails with
    /// [`RuntimeError::CallDepthExceeded`].
    pub max_call_depth:                      usize,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self { permit_ambiguous_external_functions: false,
               echo_print:                          false,
               max_call_depth:                      DEFAULT_MAX_CALL_DEPTH, }
    }
}

impl InterpreterOptions {
    #[must_use]
    pub const fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub const fn permit_ambiguous_external_functions(mut self, permit: bool) -> Self {
        self.permit_ambiguous_external_functions = permit;
        self
    }

    #[must_use]
    pub const fn echo_print(mut self, echo: bool) -> Self {
        self.echo_print = echo;
        self
    }
}

/// The result of one `test` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub name:   String,
    pub passed: bool,
}

/// The tree-walking interpreter.
///
/// Holds the runtime state of one evaluation: the global scope shared with
/// the host, the current scope, the scope distances computed by the
/// resolver, the registered native modules, and everything the run
/// produces (`print` output and test outcomes).
///
/// Control flow is not implemented with unwinding. Every statement reports
/// how it finished through an [`ExecResult`], and the construct that owns a
/// signal consumes it.
pub struct Interpreter<'a> {
    pub(in crate::interpreter::evaluator) globals:     Rc<RefCell<Environment>>,
    pub(in crate::interpreter::evaluator) environment: Rc<RefCell<Environment>>,
    pub(in crate::interpreter::evaluator) resolutions: &'a Resolutions,
    pub(in crate::interpreter::evaluator) modules:     &'a FxHashMap<String, Rc<NativeModule>>,
    pub(in crate::interpreter::evaluator) options:     InterpreterOptions,
    /// Class bodies currently executing, innermost last. Private fields are
    /// accessible only when the innermost owner declared them.
    pub(in crate::interpreter::evaluator) owners:      Vec<Option<ClassId>>,
    /// Script function calls currently executing.
    pub(in crate::interpreter::evaluator) call_depth:  usize,
    output:                                            Vec<String>,
    tests:                                             Vec<TestOutcome>,
}

impl<'a> Interpreter<'a> {
    #[must_use]
    pub fn new(globals: Rc<RefCell<Environment>>,
               resolutions: &'a Resolutions,
               modules: &'a FxHashMap<String, Rc<NativeModule>>,
               options: InterpreterOptions)
               -> Self {
        Self { environment: Rc::clone(&globals),
               globals,
               resolutions,
               modules,
               options,
               owners: Vec::new(),
               call_depth: 0,
               output: Vec::new(),
               tests: Vec::new() }
    }

    /// Executes a program in the global scope.
    ///
    /// # Errors
    /// Returns the first [`RuntimeError`] raised. A `break`, `continue` or
    /// `return` that reaches the top level is reported as
    /// [`RuntimeError::IllegalControlFlow`].
    #[tracing::instrument(skip_all)]
    pub fn interpret(&mut self, statements: &[Statement]) -> EvalResult<()> {
        for statement in statements {
            let keyword = match self.execute(statement)? {
                ExecResult::Normal => continue,
                ExecResult::Break => "break",
                ExecResult::Continue => "continue",
                ExecResult::Return(_) => "return",
            };
            return Err(RuntimeError::IllegalControlFlow { keyword,
                                                          location: statement.location() });
        }
        tracing::debug!(printed = self.output.len(),
                        tests = self.tests.len(),
                        "interpretation finished");
        Ok(())
    }

    /// Consumes the interpreter, returning the printed lines and the test
    /// outcomes, including those produced before a failure.
    #[must_use]
    pub fn finish(self) -> (Vec<String>, Vec<TestOutcome>) {
        (self.output, self.tests)
    }

    /// Executes a single statement.
    pub fn execute(&mut self, statement: &Statement) -> EvalResult<ExecResult> {
        match statement {
            Statement::Expression { expr, .. } => {
                self.evaluate(expr)?;
                Ok(ExecResult::Normal)
            },
            Statement::VarDecl { name,
                                 initializer,
                                 is_final,
                                 .. } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };
                self.environment
                    .borrow_mut()
                    .define(name.as_str(), value, *is_final);
                Ok(ExecResult::Normal)
            },
            Statement::Block { statements, .. } => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, scope)
            },
            Statement::If { condition,
                            then_branch,
                            else_branch,
                            .. } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(ExecResult::Normal)
                }
            },
            Statement::While { condition, body, .. } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        ExecResult::Break => break,
                        ExecResult::Normal | ExecResult::Continue => {},
                        ret @ ExecResult::Return(_) => return Ok(ret),
                    }
                }
                Ok(ExecResult::Normal)
            },
            Statement::DoWhile { body, condition, .. } => {
                loop {
                    match self.execute(body)? {
                        ExecResult::Break => break,
                        ExecResult::Normal | ExecResult::Continue => {},
                        ret @ ExecResult::Return(_) => return Ok(ret),
                    }
                    if !self.evaluate(condition)?.is_truthy() {
                        break;
                    }
                }
                Ok(ExecResult::Normal)
            },
            Statement::Repeat { count, body, location } => self.execute_repeat(count, body, *location),
            Statement::Function(declaration) => {
                self.declare_function(declaration);
                Ok(ExecResult::Normal)
            },
            Statement::Class(declaration) => {
                self.declare_class(declaration)?;
                Ok(ExecResult::Normal)
            },
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };
                Ok(ExecResult::Return(value))
            },
            Statement::Break { .. } => Ok(ExecResult::Break),
            Statement::Continue { .. } => Ok(ExecResult::Continue),
            Statement::Print { expr, .. } => {
                let line = self.evaluate(expr)?.to_string();
                if self.options.echo_print {
                    println!("{line}");
                }
                self.output.push(line);
                Ok(ExecResult::Normal)
            },
            Statement::Test { name, body, location } => self.execute_test(name, body, *location),
            Statement::Module { name, location } => {
                let module = self.modules
                                 .get(name)
                                 .ok_or_else(|| RuntimeError::UnknownModule { name:     name.clone(),
                                                                              location: *location, })?;
                self.environment
                    .borrow_mut()
                    .define(name.as_str(), Value::Module(Rc::clone(module)), false);
                Ok(ExecResult::Normal)
            },
            Statement::NativeFunction { module,
                                        name,
                                        params,
                                        location, } => {
                self.declare_native(module, name, params.len(), *location)?;
                Ok(ExecResult::Normal)
            },
            Statement::Extension { id,
                                   class_name,
                                   function,
                                   location, } => {
                self.declare_extension(*id, class_name, function, *location)?;
                Ok(ExecResult::Normal)
            },
        }
    }

    /// Executes `statements` in `scope`, restoring the current scope
    /// afterwards even when execution fails.
    pub fn execute_block(&mut self,
                         statements: &[Statement],
                         scope: Environment)
                         -> EvalResult<ExecResult> {
        self.in_environment(Rc::new(RefCell::new(scope)), |interpreter| {
                interpreter.execute_statements(statements)
            })
    }

    /// Executes `statements` in the current scope, stopping at the first
    /// one that does not finish normally.
    pub(in crate::interpreter::evaluator) fn execute_statements(&mut self,
                                                                statements: &[Statement])
                                                                -> EvalResult<ExecResult> {
        for statement in statements {
            let result = self.execute(statement)?;
            if result != ExecResult::Normal {
                return Ok(result);
            }
        }
        Ok(ExecResult::Normal)
    }

    /// Runs `run` with `environment` as the current scope.
    pub(in crate::interpreter::evaluator) fn in_environment<T>(&mut self,
                                                               environment: Rc<RefCell<Environment>>,
                                                               run: impl FnOnce(&mut Self) -> T)
                                                               -> T {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = run(self);
        self.environment = previous;
        result
    }

    /// The class whose body is executing, if any.
    pub(in crate::interpreter::evaluator) fn current_owner(&self) -> Option<ClassId> {
        self.owners.last().copied().flatten()
    }

    fn execute_repeat(&mut self,
                      count: &Expr,
                      body: &Statement,
                      location: SourceLocation)
                      -> EvalResult<ExecResult> {
        let count = self.evaluate(count)?;
        let Some(count) = count.as_number() else {
            return Err(RuntimeError::type_mismatch(format!("repeat count must be a number, not {}",
                                                           count.type_name()),
                                                   location));
        };
        for _ in 0..repeat_count(count) {
            match self.execute(body)? {
                ExecResult::Break => break,
                ExecResult::Normal | ExecResult::Continue => {},
                ret @ ExecResult::Return(_) => return Ok(ret),
            }
        }
        Ok(ExecResult::Normal)
    }

    /// Runs a `test` block in its own scope. The test fails when its body
    /// returns a falsy value; failure is recorded and then aborts the run.
    fn execute_test(&mut self,
                    name: &str,
                    body: &[Statement],
                    location: SourceLocation)
                    -> EvalResult<ExecResult> {
        let scope = Environment::with_enclosing(Rc::clone(&self.environment));
        let passed = match self.execute_block(body, scope)? {
            ExecResult::Normal => true,
            ExecResult::Return(value) => value.is_truthy(),
            ExecResult::Break => {
                return Err(RuntimeError::IllegalControlFlow { keyword: "break",
                                                              location });
            },
            ExecResult::Continue => {
                return Err(RuntimeError::IllegalControlFlow { keyword: "continue",
                                                              location });
            },
        };
        tracing::debug!(test = name, passed, "ran test");
        self.tests.push(TestOutcome { name: name.to_string(),
                                      passed });
        if passed {
            Ok(ExecResult::Normal)
        } else {
            Err(RuntimeError::TestFailed { name: name.to_string(),
                                           location })
        }
    }
}
