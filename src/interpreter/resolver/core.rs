use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{
    ast::{ExprId, FunctionDecl, FunctionKind, Parameter, Statement},
    error::{ResolveError, resolve_error::DeclarationKind},
    interpreter::{resolver::class::ClassInfo, token::SourceLocation},
};

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Scope distances keyed by expression id. Expressions without an entry
/// refer to globals.
pub type Resolutions = FxHashMap<ExprId, usize>;

/// What the resolver knows about a declared name.
#[derive(Debug, Clone)]
pub(in crate::interpreter::resolver) struct Declared {
    /// `false` while the declaration's own initializer is being resolved.
    pub defined:     bool,
    pub is_final:    bool,
    pub kind:        DeclarationKind,
    /// For class bindings, the class itself.
    pub class:       Option<Rc<ClassInfo>>,
    /// For variables initialised with `ClassName(...)`, the class of the
    /// instance they hold.
    pub instance_of: Option<Rc<ClassInfo>>,
}

impl Declared {
    pub(in crate::interpreter::resolver) const fn new(kind: DeclarationKind, is_final: bool) -> Self {
        Self { defined: false,
               is_final,
               kind,
               class: None,
               instance_of: None }
    }
}

/// A declaration found ahead of time in a scope's statement list.
#[derive(Debug, Clone, Copy)]
pub(in crate::interpreter::resolver) struct Hoisted {
    pub kind:     DeclarationKind,
    pub is_final: bool,
}

/// Every name a scope declares somewhere in its statement list, known
/// before any of them is resolved.
#[derive(Debug, Default)]
pub(in crate::interpreter::resolver) struct Upcoming {
    /// Function nesting depth at which the scope's statements run.
    pub level: usize,
    pub names: FxHashMap<String, Hoisted>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::interpreter::resolver) enum FunctionContext {
    None,
    Function,
    Method,
    Constructor,
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::interpreter::resolver) enum ClassContext {
    None,
    Class,
    Subclass,
}

/// The static pass between parsing and evaluation.
///
/// The resolver walks the AST once, keeping a stack of scopes that mirrors
/// the environments the interpreter will create. For every variable-like
/// expression that refers to a local it records how many scopes separate
/// the use from the declaration. Along the way it rejects reassignment and
/// redeclaration of final names, inheritance from or extension of final
/// classes, overriding of final methods, field access it can prove illegal,
/// names used before their declaration further down the same scope, and
/// misplaced `break`, `continue`, `return`, `this` and `super`.
///
/// Resolution is fail-fast: the first violation is returned.
///
/// # Example
/// ```
/// use hsl::{
///     error::ResolveError,
///     interpreter::{
///         lexer::{core::Lexer, registry::TokenRegistry},
///         parser::core::Parser,
///         resolver::core::Resolver,
///     },
/// };
///
/// let registry = TokenRegistry::standard();
/// let scanned = Lexer::new("final var x = 1;\nx = 2;", &registry).scan_tokens()
///                                                              .unwrap();
/// let statements = Parser::new(&scanned.tokens).parse().unwrap();
///
/// let error = Resolver::new().resolve(&statements).unwrap_err();
/// assert_eq!(error.to_string(), "Cannot reassign final variable 'x'");
/// assert!(matches!(error, ResolveError::FinalReassignment { .. }));
/// ```
pub struct Resolver {
    /// `scopes[0]` holds the globals.
    pub(in crate::interpreter::resolver) scopes:         Vec<FxHashMap<String, Declared>>,
    /// Parallel to `scopes`.
    pub(in crate::interpreter::resolver) upcoming:       Vec<Upcoming>,
    pub(in crate::interpreter::resolver) resolutions:    Resolutions,
    pub(in crate::interpreter::resolver) function:       FunctionContext,
    pub(in crate::interpreter::resolver) class:          ClassContext,
    /// The class whose body is being resolved.
    pub(in crate::interpreter::resolver) current:        Option<Rc<ClassInfo>>,
    pub(in crate::interpreter::resolver) loop_depth:     usize,
    /// How many function, method or class bodies enclose the code being
    /// resolved. Code at the same depth as a scope runs in order with it.
    pub(in crate::interpreter::resolver) function_depth: usize,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    #[must_use]
    pub fn new() -> Self {
        Self { scopes:         vec![FxHashMap::default()],
               upcoming:       vec![Upcoming::default()],
               resolutions:    Resolutions::default(),
               function:       FunctionContext::None,
               class:          ClassContext::None,
               current:        None,
               loop_depth:     0,
               function_depth: 0, }
    }

    /// Resolves a whole program.
    ///
    /// # Errors
    /// Returns the first [`ResolveError`] found.
    #[tracing::instrument(skip_all)]
    pub fn resolve(mut self, statements: &[Statement]) -> ResolveResult<Resolutions> {
        self.hoist(statements);
        self.resolve_statements(statements)?;
        tracing::debug!(resolved = self.resolutions.len(), "resolved program");
        Ok(self.resolutions)
    }

    pub(in crate::interpreter::resolver) fn resolve_statements(&mut self,
                                                               statements: &[Statement])
                                                               -> ResolveResult<()> {
        statements.iter()
                  .try_for_each(|statement| self.resolve_statement(statement))
    }

    fn resolve_statement(&mut self, statement: &Statement) -> ResolveResult<()> {
        match statement {
            Statement::Expression { expr, .. } | Statement::Print { expr, .. } => {
                self.resolve_expr(expr)
            },
            Statement::VarDecl { name,
                                 initializer,
                                 is_final,
                                 location, } => {
                self.declare(name, Declared::new(DeclarationKind::Variable, *is_final), *location)?;
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer)?;
                }
                let instance_of = initializer.as_ref().and_then(|init| self.constructed_class(init));
                self.define(name);
                if let Some(declared) = self.innermost_mut(name) {
                    declared.instance_of = instance_of;
                }
                Ok(())
            },
            Statement::Block { statements, .. } => {
                self.begin_scope();
                self.hoist(statements);
                let result = self.resolve_statements(statements);
                self.end_scope();
                result
            },
            Statement::If { condition,
                            then_branch,
                            else_branch,
                            .. } => {
                self.resolve_expr(condition)?;
                self.resolve_statement(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.resolve_statement(else_branch)?;
                }
                Ok(())
            },
            Statement::While { condition, body, .. }
            | Statement::DoWhile { body, condition, .. }
            | Statement::Repeat { count: condition,
                                  body,
                                  .. } => {
                self.resolve_expr(condition)?;
                self.loop_depth += 1;
                let result = self.resolve_statement(body);
                self.loop_depth -= 1;
                result
            },
            Statement::Function(declaration) => {
                let kind = DeclarationKind::Function;
                self.declare(&declaration.name,
                             Declared::new(kind, declaration.is_final),
                             declaration.location)?;
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionContext::Function)
            },
            Statement::Class(declaration) => self.resolve_class(declaration),
            Statement::Return { value, location } => {
                match self.function {
                    FunctionContext::None => {
                        return Err(ResolveError::IllegalControlFlow { keyword:  "return",
                                                                      context:  "function",
                                                                      location: *location, });
                    },
                    FunctionContext::Constructor if value.is_some() => {
                        return Err(ResolveError::ReturnFromConstructor { location: *location });
                    },
                    _ => {},
                }
                if let Some(value) = value {
                    self.resolve_expr(value)?;
                }
                Ok(())
            },
            Statement::Break { location } => self.check_in_loop("break", *location),
            Statement::Continue { location } => self.check_in_loop("continue", *location),
            Statement::Test { body, .. } => {
                let enclosing_function = self.function;
                let enclosing_loops = self.loop_depth;
                self.function = FunctionContext::Test;
                self.loop_depth = 0;
                self.begin_scope();
                self.hoist(body);
                let result = self.resolve_statements(body);
                self.end_scope();
                self.function = enclosing_function;
                self.loop_depth = enclosing_loops;
                result
            },
            Statement::Module { name, location } => {
                self.declare(name, Declared::new(DeclarationKind::Module, false), *location)?;
                self.define(name);
                Ok(())
            },
            Statement::NativeFunction { name, location, .. } => {
                self.declare(name, Declared::new(DeclarationKind::Function, false), *location)?;
                self.define(name);
                Ok(())
            },
            Statement::Extension { id,
                                   class_name,
                                   function,
                                   location, } => {
                self.resolve_extension(*id, class_name, function, *location)
            },
        }
    }

    /// Resolves a function body in its own scope, together with its
    /// parameters.
    pub(in crate::interpreter::resolver) fn resolve_function(&mut self,
                                                             declaration: &FunctionDecl,
                                                             context: FunctionContext)
                                                             -> ResolveResult<()> {
        let enclosing_function = self.function;
        let enclosing_loops = self.loop_depth;
        self.function = context;
        self.loop_depth = 0;
        self.function_depth += 1;

        self.begin_scope();
        self.hoist(&declaration.body);
        let result = self.declare_parameters(&declaration.params)
                         .and_then(|()| self.resolve_statements(&declaration.body));
        self.end_scope();

        self.function_depth -= 1;

        self.function = enclosing_function;
        self.loop_depth = enclosing_loops;
        result
    }

    fn declare_parameters(&mut self, params: &[Parameter]) -> ResolveResult<()> {
        for param in params {
            self.declare(&param.name,
                         Declared::new(DeclarationKind::Parameter, false),
                         param.location)?;
            self.define(&param.name);
        }
        Ok(())
    }

    fn check_in_loop(&self, keyword: &'static str, location: SourceLocation) -> ResolveResult<()> {
        if self.loop_depth == 0 {
            return Err(ResolveError::IllegalControlFlow { keyword,
                                                          context: "loop",
                                                          location });
        }
        Ok(())
    }

    pub(in crate::interpreter::resolver) fn begin_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
        self.upcoming.push(Upcoming { level: self.function_depth,
                                      names: FxHashMap::default(), });
        tracing::trace!(depth = self.scopes.len() - 1, "entered scope");
    }

    pub(in crate::interpreter::resolver) fn end_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
            self.upcoming.pop();
        }
        tracing::trace!(depth = self.scopes.len() - 1, "left scope");
    }

    /// Records the names `statements` declare in the innermost scope.
    /// A name declared several times counts as final if any of its
    /// declarations is.
    fn hoist(&mut self, statements: &[Statement]) {
        let Some(upcoming) = self.upcoming.last_mut() else {
            return;
        };
        for statement in statements {
            let (name, kind, is_final) = match statement {
                Statement::VarDecl { name, is_final, .. } => (name, DeclarationKind::Variable, *is_final),
                Statement::Function(declaration) => {
                    (&declaration.name, DeclarationKind::Function, declaration.is_final)
                },
                Statement::Class(declaration) => (&declaration.name, DeclarationKind::Class, declaration.is_final),
                Statement::Module { name, .. } => (name, DeclarationKind::Module, false),
                Statement::NativeFunction { name, .. } => (name, DeclarationKind::Function, false),
                _ => continue,
            };
            let hoisted = upcoming.names
                                  .entry(name.clone())
                                  .or_insert(Hoisted { kind, is_final });
            if is_final && !hoisted.is_final {
                *hoisted = Hoisted { kind, is_final };
            }
        }
    }

    /// Rejects a use of `name` that runs before the declaration of `name`
    /// further down the same scope.
    ///
    /// Uses from nested function bodies are left alone: they run later, and
    /// see whichever binding is visible where the function is declared.
    pub(in crate::interpreter::resolver) fn check_declared_before_use(&self,
                                                                      name: &str,
                                                                      location: SourceLocation)
                                                                      -> ResolveResult<()> {
        for (scope, upcoming) in self.scopes.iter().zip(&self.upcoming).rev() {
            if scope.contains_key(name) {
                return Ok(());
            }
            if upcoming.level == self.function_depth && upcoming.names.contains_key(name) {
                return Err(ResolveError::UseBeforeDeclaration { name: name.to_string(),
                                                                location });
            }
        }
        Ok(())
    }

    /// A final global declared further down the program. Function bodies
    /// reach globals by name, so they assign that binding once it exists.
    pub(in crate::interpreter::resolver) fn later_final_global(&self, name: &str) -> Option<Hoisted> {
        if self.function_depth == 0 {
            return None;
        }
        self.upcoming
            .first()
            .and_then(|globals| globals.names.get(name))
            .filter(|hoisted| hoisted.is_final)
            .copied()
    }

    /// Adds `name` to the innermost scope, not yet defined.
    ///
    /// # Errors
    /// Returns [`ResolveError::FinalRedeclaration`] if the scope already
    /// holds a final binding of that name.
    pub(in crate::interpreter::resolver) fn declare(&mut self,
                                                    name: &str,
                                                    declared: Declared,
                                                    location: SourceLocation)
                                                    -> ResolveResult<()> {
        let Some(scope) = self.scopes.last_mut() else {
            return Ok(());
        };
        if let Some(existing) = scope.get(name)
           && existing.is_final
        {
            return Err(ResolveError::FinalRedeclaration { kind: existing.kind,
                                                          name: name.to_string(),
                                                          location });
        }
        scope.insert(name.to_string(), declared);
        Ok(())
    }

    pub(in crate::interpreter::resolver) fn define(&mut self, name: &str) {
        if let Some(declared) = self.innermost_mut(name) {
            declared.defined = true;
        }
    }

    pub(in crate::interpreter::resolver) fn innermost_mut(&mut self,
                                                          name: &str)
                                                          -> Option<&mut Declared> {
        self.scopes.last_mut().and_then(|scope| scope.get_mut(name))
    }

    pub(in crate::interpreter::resolver) fn lookup_mut(&mut self,
                                                       name: &str)
                                                       -> Option<&mut Declared> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    /// Finds the nearest declaration of `name` and its scope distance.
    /// Globals report `None` as distance.
    pub(in crate::interpreter::resolver) fn lookup(&self,
                                                   name: &str)
                                                   -> Option<(Option<usize>, &Declared)> {
        let innermost = self.scopes.len() - 1;
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, scope)| {
                scope.get(name).map(|declared| {
                                   let distance = (index > 0).then(|| innermost - index);
                                   (distance, declared)
                               })
            })
    }

    /// Records the scope distance of a local reference. References to
    /// globals, declared or not, are left unrecorded.
    pub(in crate::interpreter::resolver) fn resolve_local(&mut self, id: ExprId, name: &str) {
        if let Some((Some(distance), _)) = self.lookup(name) {
            self.resolutions.insert(id, distance);
        }
    }
}

/// Shorthand used by class resolution.
pub(in crate::interpreter::resolver) fn method_context(declaration: &FunctionDecl)
                                                       -> FunctionContext {
    if declaration.kind == FunctionKind::Constructor {
        FunctionContext::Constructor
    } else {
        FunctionContext::Method
    }
}
