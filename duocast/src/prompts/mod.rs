//! Prompt templates for every model call in the pipeline.
//!
//! Templates use Jinja2 syntax rendered by [`PromptEngine`]. The built-in
//! set lives in [`templates`]; host personas come from [`HostProfiles`].

mod engine;
mod hosts;
pub mod templates;

pub use engine::{PromptEngine, RenderError, TemplateContext};
pub use hosts::HostProfiles;

/// Built-in assets embedded at compile time.
pub mod builtin {
    /// Default host personas (Samuel "Sam" Eldredge and Alex Morey).
    pub const DEFAULT_HOSTS: &str = include_str!("default_hosts.txt");
}
