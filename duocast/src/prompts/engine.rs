//! Template rendering engine using minijinja (Jinja2-compatible).

use std::collections::BTreeMap;

use minijinja::{Environment, UndefinedBehavior, Value};

/// Variables available to a template.
///
/// # Example
///
/// ```rust,ignore
/// let ctx = TemplateContext::new()
///     .with_var("text", chunk)
///     .with_var("target_length", 5000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: BTreeMap<String, Value>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable to the context.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Add any serializable value to the context.
    #[must_use]
    pub fn with_serialized<T: serde::Serialize>(mut self, key: impl Into<String>, value: &T) -> Self {
        self.vars.insert(key.into(), Value::from_serialize(value));
        self
    }

    fn to_value(&self) -> Value {
        Value::from_serialize(&self.vars)
    }
}

/// Jinja2-compatible template rendering engine.
///
/// Undefined variables are an error, so a template and its call site cannot
/// drift apart silently.
#[derive(Debug, Clone)]
pub struct PromptEngine {
    env: Environment<'static>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptEngine {
    /// Create a new template engine.
    #[must_use]
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        Self { env }
    }

    /// Render a template string with the given context.
    ///
    /// # Errors
    ///
    /// Returns an error if the template syntax is invalid or rendering fails.
    pub fn render(&self, template: &str, context: &TemplateContext) -> Result<String, RenderError> {
        let tmpl = self
            .env
            .template_from_str(template)
            .map_err(|e| RenderError::Template(e.to_string()))?;

        tmpl.render(context.to_value())
            .map(|s| s.trim().to_owned())
            .map_err(|e| RenderError::Render(e.to_string()))
    }
}

/// Error type for template rendering operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// Template parsing/compilation error.
    #[error("Template error: {0}")]
    Template(String),
    /// Runtime rendering error.
    #[error("Render error: {0}")]
    Render(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn simple_render() {
        let engine = PromptEngine::new();
        let ctx = TemplateContext::new().with_var("task", "Test task");
        assert_eq!(engine.render("Task: {{ task }}", &ctx).unwrap(), "Task: Test task");
    }

    #[test]
    fn numbers_and_conditionals() {
        let engine = PromptEngine::new();
        let ctx = TemplateContext::new().with_var("minutes", 4);
        let out = engine
            .render("{% if minutes < 5 %}3{% else %}5{% endif %} topics", &ctx)
            .unwrap();
        assert_eq!(out, "3 topics");
    }

    #[test]
    fn serialized_values() {
        #[derive(serde::Serialize)]
        struct Topic {
            topic: &'static str,
        }
        let engine = PromptEngine::new();
        let ctx = TemplateContext::new().with_serialized("t", &Topic { topic: "Habits" });
        assert_eq!(engine.render("{{ t.topic }}", &ctx).unwrap(), "Habits");
    }

    #[test]
    fn undefined_variable_fails() {
        let engine = PromptEngine::new();
        let err = engine.render("{{ missing }}", &TemplateContext::new()).unwrap_err();
        assert!(matches!(err, RenderError::Render(_)));
    }

    #[test]
    fn syntax_error_is_template_error() {
        let engine = PromptEngine::new();
        let err = engine.render("{% if %}", &TemplateContext::new()).unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
    }
}
