use std::fmt::Display;

use crate::{
    error::{Located, Phase, ScriptError},
    interpreter::token::SourceLocation,
};

/// Formats diagnostics from every phase in one uniform shape.
///
/// Each diagnostic renders as three lines: the phase, location and message;
/// the offending source line verbatim; and a caret under the offending
/// column.
///
/// # Example
/// ```
/// use hsl::{error::{ErrorReporter, Phase}, interpreter::token::SourceLocation};
///
/// let reporter = ErrorReporter::new("final var x = 1;\nx = 2;");
/// let text = reporter.render(Phase::Resolving,
///                            &"Cannot reassign final variable 'x'",
///                            SourceLocation::new(2, 1));
///
/// assert_eq!(text,
///            "Resolving error at 2:1: Cannot reassign final variable 'x'\nx = 2;\n^");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ErrorReporter<'s> {
    source: &'s str,
}

impl<'s> ErrorReporter<'s> {
    #[must_use]
    pub const fn new(source: &'s str) -> Self {
        Self { source }
    }

    /// Renders a single diagnostic.
    ///
    /// Tabs in the excerpt before the offending column are copied into the
    /// caret line so the caret stays aligned regardless of tab width.
    #[must_use]
    pub fn render(&self, phase: Phase, message: &dyn Display, location: SourceLocation) -> String {
        let excerpt = self.source
                          .lines()
                          .nth(location.line.saturating_sub(1))
                          .unwrap_or_default();
        let offset = location.column.saturating_sub(1);

        let mut padding: String = excerpt.chars()
                                         .take(offset)
                                         .map(|c| if c == '\t' { '\t' } else { ' ' })
                                         .collect();
        let missing = offset.saturating_sub(padding.chars().count());
        padding.extend(std::iter::repeat_n(' ', missing));

        format!("{phase} error at {location}: {message}\n{excerpt}\n{padding}^")
    }

    /// Renders an error that knows its own location.
    #[must_use]
    pub fn render_error<E>(&self, phase: Phase, error: &E) -> String
        where E: Located + Display
    {
        self.render(phase, error, error.location())
    }

    /// Renders every diagnostic carried by a [`ScriptError`], in order.
    #[must_use]
    pub fn render_all(&self, error: &ScriptError) -> Vec<String> {
        let phase = error.phase();
        match error {
            ScriptError::Lex(errors) => errors.iter()
                                              .map(|e| self.render_error(phase, e))
                                              .collect(),
            ScriptError::Parse(errors) => errors.iter()
                                                .map(|e| self.render_error(phase, e))
                                                .collect(),
            ScriptError::Resolve(e) => vec![self.render_error(phase, e)],
            ScriptError::Runtime(e) => vec![self.render_error(phase, e)],
            ScriptError::Customizer { message, .. } => vec![format!("{phase} error: {message}")],
        }
    }
}
