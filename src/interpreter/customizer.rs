use std::{fmt, rc::Rc};

use crate::{
    error::{Phase, ScriptError},
    interpreter::context::ScriptContext,
};

/// Whether a customizer runs before or after its phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timing {
    Before,
    After,
}

/// A host hook that observes or mutates the [`ScriptContext`] at a phase
/// boundary.
///
/// Any closure `Fn(&mut ScriptContext) -> Result<(), ScriptError>` is a
/// customizer. Returning an error aborts the pipeline.
pub trait Customizer {
    /// # Errors
    /// Whatever the hook decides aborts the run.
    fn customize(&self, context: &mut ScriptContext) -> Result<(), ScriptError>;
}

impl<F> Customizer for F where F: Fn(&mut ScriptContext) -> Result<(), ScriptError>
{
    fn customize(&self, context: &mut ScriptContext) -> Result<(), ScriptError> {
        self(context)
    }
}

/// The customizers registered for every phase and timing.
///
/// Within one phase and timing, customizers run in registration order.
///
/// # Example
/// ```
/// use hsl::{
///     error::{Phase, ScriptError},
///     interpreter::{
///         context::ScriptContext,
///         customizer::{CustomizerPipeline, Timing},
///         value::core::Value,
///     },
/// };
///
/// let mut pipeline = CustomizerPipeline::new();
/// pipeline.register(Phase::Interpreting,
///                   Timing::Before,
///                   |context: &mut ScriptContext| -> Result<(), ScriptError> {
///                       context.define_global("answer", Value::from(42.0));
///                       Ok(())
///                   });
///
/// let mut context = ScriptContext::new();
/// pipeline.run(Phase::Interpreting, Timing::Before, &mut context).unwrap();
/// assert_eq!(context.global("answer"), Some(Value::from(42.0)));
/// ```
#[derive(Clone, Default)]
pub struct CustomizerPipeline {
    hooks: Vec<(Phase, Timing, Rc<dyn Customizer>)>,
}

impl CustomizerPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, phase: Phase, timing: Timing, customizer: impl Customizer + 'static) {
        self.hooks.push((phase, timing, Rc::new(customizer)));
    }

    /// Runs the customizers registered for `phase` and `timing`.
    ///
    /// # Errors
    /// Stops at the first customizer that fails and returns its error.
    pub fn run(&self,
               phase: Phase,
               timing: Timing,
               context: &mut ScriptContext)
               -> Result<(), ScriptError> {
        for (_, _, customizer) in self.hooks
                                      .iter()
                                      .filter(|(p, t, _)| *p == phase && *t == timing)
        {
            tracing::trace!(%phase, ?timing, "running customizer");
            customizer.customize(context)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for CustomizerPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomizerPipeline")
         .field("hooks", &self.hooks.len())
         .finish()
    }
}
