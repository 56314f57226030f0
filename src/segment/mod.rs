use crate::grammar::{
    ActionType, ArtifactType, SubactionType, TagFamily, ATTR_ISSUE_CATEGORY, ATTR_ISSUE_DESCRIPTION,
    ATTR_NAME,
};
use crate::scanner::{RawElement, Span};
use serde::Serialize;
use tracing::debug;

// ===================================================================
// Element model consumed by renderers
// ===================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileActionKind {
    Create,
    Edit,
    Delete,
}

/// One displayable segment of a generation transcript.
///
/// Serialized with a `kind` discriminator (snake_case JSON throughout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    /// Narrative text between tags. Always complete.
    Text { content: String },
    File {
        action: FileActionKind,
        file_name: String,
        content: String,
        complete: bool,
    },
    Replace {
        file_name: String,
        find_content: String,
        replace_content: String,
        complete: bool,
    },
    Issue {
        category: String,
        description: String,
        /// Inner content of an issue whose description came from its
        /// attribute; empty otherwise.
        detail: String,
        complete: bool,
    },
    Logs { content: String, complete: bool },
    Thinking { content: String, complete: bool },
}

impl Element {
    pub fn is_complete(&self) -> bool {
        match self {
            Element::Text { .. } => true,
            Element::File { complete, .. }
            | Element::Replace { complete, .. }
            | Element::Issue { complete, .. }
            | Element::Logs { complete, .. }
            | Element::Thinking { complete, .. } => *complete,
        }
    }

    /// The file this element touches, if any.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Element::File { file_name, .. } | Element::Replace { file_name, .. } => {
                Some(file_name.as_str())
            }
            _ => None,
        }
    }

    /// The element's content with tag syntax stripped, as a reader would
    /// see it. A replace shows its find text followed by its replacement.
    pub fn visible_text(&self) -> String {
        match self {
            Element::Text { content }
            | Element::File { content, .. }
            | Element::Logs { content, .. }
            | Element::Thinking { content, .. } => content.clone(),
            Element::Replace {
                find_content,
                replace_content,
                ..
            } => format!("{find_content}{replace_content}"),
            Element::Issue {
                description,
                detail,
                ..
            } => format!("{description}{detail}"),
        }
    }

    pub fn is_blank_text(&self) -> bool {
        matches!(self, Element::Text { content } if content.trim().is_empty())
    }
}

// ===================================================================
// Builder
// ===================================================================

/// Turn scanner spans into typed elements, preserving order.
///
/// Adjacent text spans (including unrecognized tags rendered as text) are
/// merged into one `Text` element.
pub fn build<'a>(spans: impl IntoIterator<Item = Span<'a>>) -> Vec<Element> {
    let mut out: Vec<Element> = Vec::new();
    for span in spans {
        match span {
            Span::Text(text) => push_text(&mut out, text),
            Span::Element(raw) => match classify(&raw) {
                Some(el) => out.push(el),
                None => {
                    debug!(
                        tag = raw.family.name(),
                        element_type = raw.type_attr().unwrap_or(""),
                        "unrecognized element type, rendering source as text"
                    );
                    push_text(&mut out, raw.source);
                }
            },
        }
    }
    out
}

fn push_text(out: &mut Vec<Element>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Element::Text { content }) = out.last_mut() {
        content.push_str(text);
    } else {
        out.push(Element::Text {
            content: text.to_string(),
        });
    }
}

/// Map one raw element to its typed form, or `None` when its `type`
/// attribute is missing or unknown.
fn classify(raw: &RawElement<'_>) -> Option<Element> {
    let complete = raw.complete;
    let type_attr = raw.type_attr()?;
    let file_name = || raw.attributes.get(ATTR_NAME).unwrap_or("").to_string();

    let el = match raw.family {
        TagFamily::Action => match ActionType::parse(type_attr)? {
            ActionType::CreateFile => Element::File {
                action: FileActionKind::Create,
                file_name: file_name(),
                content: raw.inner.to_string(),
                complete,
            },
            ActionType::EditFile => Element::File {
                action: FileActionKind::Edit,
                file_name: file_name(),
                content: raw.inner.to_string(),
                complete,
            },
            ActionType::DeleteFile => Element::File {
                action: FileActionKind::Delete,
                file_name: file_name(),
                content: String::new(),
                complete,
            },
            ActionType::ContentReplace => Element::Replace {
                file_name: file_name(),
                find_content: subaction_content(raw, SubactionType::Find),
                replace_content: subaction_content(raw, SubactionType::Replace),
                complete,
            },
            ActionType::ReportIssue => {
                let (description, detail) = match raw.attributes.get(ATTR_ISSUE_DESCRIPTION) {
                    Some(description) => (description, raw.inner),
                    None => (raw.inner, ""),
                };
                Element::Issue {
                    category: raw
                        .attributes
                        .get(ATTR_ISSUE_CATEGORY)
                        .unwrap_or("")
                        .to_string(),
                    description: description.to_string(),
                    detail: detail.to_string(),
                    complete,
                }
            }
        },
        TagFamily::Artifact => match ArtifactType::parse(type_attr)? {
            ArtifactType::Logs => Element::Logs {
                content: raw.inner.to_string(),
                complete,
            },
            ArtifactType::Thinking => Element::Thinking {
                content: raw.inner.to_string(),
                complete,
            },
        },
        // Never produced at top level.
        TagFamily::Subaction => return None,
    };
    Some(el)
}

/// Content of the first subaction of the given type; empty when absent.
fn subaction_content(raw: &RawElement<'_>, wanted: SubactionType) -> String {
    raw.subactions
        .iter()
        .find(|sub| sub.type_attr().and_then(SubactionType::parse) == Some(wanted))
        .map(|sub| sub.inner.to_string())
        .unwrap_or_default()
}
