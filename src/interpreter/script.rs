use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{
    error::{ErrorReporter, Phase, ScriptError},
    interpreter::{
        context::ScriptContext,
        customizer::{Customizer, CustomizerPipeline, Timing},
        evaluator::core::{Interpreter, InterpreterOptions},
        lexer::{core::Lexer, registry::TokenRegistry},
        parser::core::{Grammar, Parser},
        resolver::core::{Resolutions, Resolver},
        value::{core::Value, native::NativeModule},
    },
};

/// A script and everything the host configured around it.
///
/// The host builds a `Script` from source text, binds globals, registers
/// native modules and customizers, then calls [`Script::resolve`] to check
/// the program without running it, or [`Script::evaluate`] to run it.
///
/// Tokenizing, parsing and resolving happen once; their result is cached.
/// Evaluation can be repeated, and each run starts from the same resolved
/// program against the persistent global scope.
///
/// # Example
/// ```
/// use hsl::interpreter::{
///     script::Script,
///     value::{
///         core::Value,
///         native::{NativeModule, ParamType},
///     },
/// };
///
/// let strings = NativeModule::new("strings").function("upper", &[ParamType::Str], |args| {
///                                                   Ok(Value::from(args[0].to_string()
///                                                                         .to_uppercase()))
///                                               });
///
/// let mut script = Script::new("module strings; var shout = strings.upper(greeting);");
/// script.bind_global("greeting", Value::from("hello"));
/// script.register_module(strings);
///
/// let context = script.evaluate().unwrap();
/// assert_eq!(context.global("shout"), Some(Value::from("HELLO")));
/// ```
#[derive(Debug)]
pub struct Script {
    source:      String,
    registry:    TokenRegistry,
    grammar:     Rc<Grammar>,
    options:     InterpreterOptions,
    modules:     FxHashMap<String, Rc<NativeModule>>,
    customizers: CustomizerPipeline,
    resolutions: Option<Resolutions>,
    context:     ScriptContext,
}

impl Script {
    /// A script using the standard token set and grammar.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_registry(source, TokenRegistry::standard())
    }

    /// A script lexed with a host-supplied token registry.
    #[must_use]
    pub fn with_registry(source: impl Into<String>, registry: TokenRegistry) -> Self {
        Self { source: source.into(),
               registry,
               grammar: Rc::new(Grammar::standard()),
               options: InterpreterOptions::default(),
               modules: FxHashMap::default(),
               customizers: CustomizerPipeline::new(),
               resolutions: None,
               context: ScriptContext::new() }
    }

    #[must_use]
    pub fn with_options(mut self, options: InterpreterOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the grammar, typically [`Grammar::standard`] with host
    /// node-parsers added.
    #[must_use]
    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = Rc::new(grammar);
        self
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn options(&self) -> InterpreterOptions {
        self.options
    }

    /// Binds a global in the persistent global scope, immediately.
    pub fn bind_global(&mut self, name: impl Into<String>, value: Value) {
        self.context.define_global(name, value);
    }

    /// Makes a native module available to `module` declarations. A module
    /// of the same name is replaced.
    pub fn register_module(&mut self, module: NativeModule) {
        tracing::debug!(module = module.name(), "registered native module");
        self.modules
            .insert(module.name().to_string(), Rc::new(module));
    }

    /// Registers a customizer for a phase boundary.
    pub fn customize(&mut self, phase: Phase, timing: Timing, customizer: impl Customizer + 'static) {
        self.customizers.register(phase, timing, customizer);
    }

    /// The state gathered so far.
    #[must_use]
    pub const fn context(&self) -> &ScriptContext {
        &self.context
    }

    /// Tokenizes, parses and resolves the script without running it.
    ///
    /// The first successful call caches the resolved program; later calls
    /// return immediately. A failed call can be retried.
    ///
    /// # Errors
    /// Returns the lexing or parsing diagnostics, the first resolution
    /// error, or a customizer failure. The rendered diagnostics are also
    /// stored in the context.
    pub fn resolve(&mut self) -> Result<(), ScriptError> {
        if self.resolutions.is_some() {
            return Ok(());
        }
        let result = self.run_front_end();
        match result {
            Ok(resolutions) => {
                self.resolutions = Some(resolutions);
                self.context.set_diagnostics(Vec::new());
                Ok(())
            },
            Err(error) => Err(self.record_failure(error)),
        }
    }

    /// Runs the whole pipeline.
    ///
    /// `print` output and test outcomes are reset at the start of every
    /// run. Globals persist between runs.
    ///
    /// # Errors
    /// Everything [`Script::resolve`] returns, the first runtime error, or
    /// a customizer failure.
    pub fn evaluate(&mut self) -> Result<&ScriptContext, ScriptError> {
        self.resolve()?;
        match self.run_interpreter() {
            Ok(()) => {
                self.context.set_diagnostics(Vec::new());
                Ok(&self.context)
            },
            Err(error) => Err(self.record_failure(error)),
        }
    }

    /// Consumes the script, returning its context.
    #[must_use]
    pub fn into_context(self) -> ScriptContext {
        self.context
    }

    #[tracing::instrument(skip_all)]
    fn run_front_end(&mut self) -> Result<Resolutions, ScriptError> {
        self.customizers
            .run(Phase::Tokenizing, Timing::Before, &mut self.context)?;
        let scanned = Lexer::new(&self.source, &self.registry).scan_tokens()
                                                             .map_err(ScriptError::Lex)?;
        self.context.set_scanned(scanned.tokens, scanned.comments);
        self.customizers
            .run(Phase::Tokenizing, Timing::After, &mut self.context)?;

        self.customizers
            .run(Phase::Parsing, Timing::Before, &mut self.context)?;
        let statements = Parser::with_grammar(self.context.tokens(), Rc::clone(&self.grammar))
                                .parse()
                                .map_err(ScriptError::Parse)?;
        self.context.set_statements(statements);
        self.customizers
            .run(Phase::Parsing, Timing::After, &mut self.context)?;

        self.customizers
            .run(Phase::Resolving, Timing::Before, &mut self.context)?;
        let resolutions = Resolver::new().resolve(self.context.statements())?;
        self.context.mark_resolved();
        self.customizers
            .run(Phase::Resolving, Timing::After, &mut self.context)?;

        Ok(resolutions)
    }

    fn run_interpreter(&mut self) -> Result<(), ScriptError> {
        let Some(resolutions) = &self.resolutions else {
            return Ok(());
        };

        self.customizers
            .run(Phase::Interpreting, Timing::Before, &mut self.context)?;

        let mut interpreter = Interpreter::new(self.context.global_environment(),
                                               resolutions,
                                               &self.modules,
                                               self.options);
        let result = interpreter.interpret(self.context.statements());
        let (output, tests) = interpreter.finish();
        self.context.output = output;
        self.context.tests = tests;
        result?;

        self.customizers
            .run(Phase::Interpreting, Timing::After, &mut self.context)?;
        Ok(())
    }

    fn record_failure(&mut self, error: ScriptError) -> ScriptError {
        let diagnostics = ErrorReporter::new(&self.source).render_all(&error);
        tracing::debug!(phase = %error.phase(),
                        diagnostics = diagnostics.len(),
                        "script failed");
        self.context.set_diagnostics(diagnostics);
        error
    }
}
