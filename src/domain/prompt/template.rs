//! Prompt templates with `${var:name}` placeholders
//!
//! `${var:name}` must be supplied at render time; `${var:name:fallback}`
//! uses the fallback when it is not. Values are inserted as-is and never
//! scanned for placeholders themselves.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{var:([a-zA-Z0-9][-a-zA-Z0-9]*)(?::([^}]*))?\}").unwrap()
});

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing required variable: {name}")]
    MissingVariable { name: String },
}

/// A placeholder declared by a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptVariable {
    pub name: String,
    pub default: Option<String>,
}

impl PromptVariable {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Slot(PromptVariable),
}

/// Template split into literal text and placeholders once, rendered many times
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
    variables: Vec<PromptVariable>,
}

impl PromptTemplate {
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut variables: Vec<PromptVariable> = Vec::new();
        let mut cursor = 0;

        for caps in PLACEHOLDER.captures_iter(source) {
            let whole = &caps[0];
            let start = caps.get(0).map_or(cursor, |m| m.start());
            if start > cursor {
                segments.push(Segment::Text(source[cursor..start].to_string()));
            }
            cursor = start + whole.len();

            let slot = PromptVariable {
                name: caps[1].to_string(),
                default: caps.get(2).map(|m| m.as_str().to_string()),
            };
            // the first declaration of a name decides whether it is required
            if !variables.iter().any(|v| v.name == slot.name) {
                variables.push(slot.clone());
            }
            segments.push(Segment::Slot(slot));
        }

        if cursor < source.len() {
            segments.push(Segment::Text(source[cursor..].to_string()));
        }

        Self { segments, variables }
    }

    pub fn variables(&self) -> &[PromptVariable] {
        &self.variables
    }

    pub fn render(&self, values: &HashMap<&str, String>) -> Result<String, TemplateError> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(slot) => match (values.get(slot.name.as_str()), &slot.default) {
                    (Some(value), _) => out.push_str(value),
                    (None, Some(fallback)) => out.push_str(fallback),
                    (None, None) => {
                        return Err(TemplateError::MissingVariable {
                            name: slot.name.clone(),
                        });
                    }
                },
            }
        }

        Ok(out)
    }
}

pub fn render_template(
    template: &str,
    values: &HashMap<&str, String>,
) -> Result<String, TemplateError> {
    PromptTemplate::parse(template).render(values)
}
