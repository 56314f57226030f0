use crate::language;
use crate::segment::Element;
use minijinja::{context, Environment};
use serde_json::Value;
use std::fmt;

/// Built-in template for `--format text`.
pub const DEFAULT_TEXT_TEMPLATE: &str = r#"{% for el in elements -%}
{% if el.kind == "text" -%}
{{ el.content }}
{% elif el.kind == "file" -%}
=== {{ el.action }} {{ el.file_name }}{% if el.language %} ({{ el.language }}){% endif %}{% if not el.complete %} [in progress]{% endif %}
{% if el.action != "delete" %}{{ el.content }}
{% endif -%}
{% elif el.kind == "replace" -%}
=== replace in {{ el.file_name }}{% if not el.complete %} [in progress]{% endif %}
--- find
{{ el.find_content }}
+++ replace
{{ el.replace_content }}
{% elif el.kind == "issue" -%}
!!! issue{% if el.category %} [{{ el.category }}]{% endif %}: {{ el.description }}{% if not el.complete %} [in progress]{% endif %}
{% if el.detail %}{{ el.detail }}
{% endif -%}
{% elif el.kind == "logs" -%}
>>> logs{% if not el.complete %} [in progress]{% endif %}
{{ el.content }}
{% elif el.kind == "thinking" -%}
... thinking{% if not el.complete %} [in progress]{% endif %}
{{ el.content }}
{% endif -%}
{% endfor %}"#;

// ===================================================================
// Error: serialization and template rendering are the only failures
// ===================================================================

#[derive(Debug)]
pub enum OutputError {
    Serialize(String),
    TemplateRender(String),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Serialize(msg) => write!(f, "serialization error: {msg}"),
            OutputError::TemplateRender(msg) => write!(f, "template render error: {msg}"),
        }
    }
}

impl std::error::Error for OutputError {}

// ===================================================================
// Element views
// ===================================================================

/// Renderer-side switches; the element list itself is never altered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub hide_blank_text: bool,
    pub detect_languages: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            hide_blank_text: true,
            detect_languages: true,
        }
    }
}

/// One element as handed to JSON output and templates: its serialized form
/// plus a `language` key for file elements when detection is on.
fn element_view(el: &Element, options: OutputOptions) -> Result<Value, OutputError> {
    let mut view = serde_json::to_value(el).map_err(|e| OutputError::Serialize(e.to_string()))?;
    if options.detect_languages {
        let sample = match el {
            Element::File { content, .. } => Some(content.as_str()),
            Element::Replace {
                replace_content, ..
            } => Some(replace_content.as_str()),
            _ => None,
        };
        if let (Some(name), Some(sample)) = (el.file_name(), sample) {
            view["language"] = Value::from(language::detect(name, sample).as_str());
        }
    }
    Ok(view)
}

pub fn element_views(elements: &[Element], options: OutputOptions) -> Result<Vec<Value>, OutputError> {
    elements
        .iter()
        .filter(|el| !(options.hide_blank_text && el.is_blank_text()))
        .map(|el| element_view(el, options))
        .collect()
}

// ===================================================================
// Formats
// ===================================================================

pub fn to_json(elements: &[Element], options: OutputOptions) -> Result<String, OutputError> {
    let views = element_views(elements, options)?;
    serde_json::to_string_pretty(&views).map_err(|e| OutputError::Serialize(e.to_string()))
}

/// One compact JSON line describing a stream snapshot.
pub fn snapshot_line(
    chunk: usize,
    open: bool,
    elements: &[Element],
    options: OutputOptions,
) -> Result<String, OutputError> {
    let views = element_views(elements, options)?;
    let line = serde_json::json!({ "chunk": chunk, "open": open, "elements": views });
    serde_json::to_string(&line).map_err(|e| OutputError::Serialize(e.to_string()))
}

pub fn to_text(elements: &[Element], template: &str, options: OutputOptions) -> Result<String, OutputError> {
    let views = element_views(elements, options)?;
    let env = Environment::new();
    let tmpl = env
        .template_from_str(template)
        .map_err(|e| OutputError::TemplateRender(format!("parsing template: {e}")))?;
    tmpl.render(context! { elements => views })
        .map_err(|e| OutputError::TemplateRender(format!("rendering template: {e}")))
}
