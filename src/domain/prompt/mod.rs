//! Prompt templates with variable support

mod template;

pub use template::{PromptTemplate, PromptVariable, TemplateError, render_template};
