use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;

use crate::{
    ast::Statement,
    interpreter::{
        environment::Environment,
        evaluator::core::TestOutcome,
        token::{Comment, Token},
        value::core::Value,
    },
};

/// The state a script accumulates while it moves through the pipeline.
///
/// Each phase fills in its part: tokens and comments after tokenizing,
/// statements after parsing, the resolved flag after resolving, output and
/// test outcomes after interpreting. Customizers receive it mutably between
/// phases. Once the program is resolved the AST can no longer be changed.
#[derive(Debug, Default)]
pub struct ScriptContext {
    tokens:      Vec<Token>,
    comments:    Vec<Comment>,
    statements:  Vec<Statement>,
    resolved:    bool,
    globals:     Rc<RefCell<Environment>>,
    diagnostics: Vec<String>,
    /// Lines written by `print` during the last run.
    pub output:  Vec<String>,
    /// Outcomes of the `test` blocks executed during the last run.
    pub tests:   Vec<TestOutcome>,
}

impl ScriptContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Mutable access to the AST, available until the program has been
    /// resolved.
    pub fn statements_mut(&mut self) -> Option<&mut Vec<Statement>> {
        (!self.resolved).then_some(&mut self.statements)
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Rendered diagnostics of the last failed run, empty after a success.
    #[must_use]
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Binds a global visible to the script. Rebinding a name replaces it.
    pub fn define_global(&self, name: impl Into<String>, value: Value) {
        self.globals.borrow_mut().define(name, value, false);
    }

    /// The current value of a global.
    #[must_use]
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name)
    }

    /// A snapshot of every global binding.
    #[must_use]
    pub fn globals(&self) -> FxHashMap<String, Value> {
        self.globals
            .borrow()
            .bindings()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    pub(in crate::interpreter) fn global_environment(&self) -> Rc<RefCell<Environment>> {
        Rc::clone(&self.globals)
    }

    pub(in crate::interpreter) fn set_scanned(&mut self, tokens: Vec<Token>, comments: Vec<Comment>) {
        self.tokens = tokens;
        self.comments = comments;
    }

    pub(in crate::interpreter) fn set_statements(&mut self, statements: Vec<Statement>) {
        self.statements = statements;
    }

    pub(in crate::interpreter) const fn mark_resolved(&mut self) {
        self.resolved = true;
    }

    pub(in crate::interpreter) fn set_diagnostics(&mut self, diagnostics: Vec<String>) {
        self.diagnostics = diagnostics;
    }
}
