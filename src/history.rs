use crate::reconcile::render_history;
use crate::segment::Element;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ===================================================================
// Stored chat history
// ===================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One persisted chat message for a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// History files are either a bare array of messages or an object with a
/// `messages` array (as the backend returns it).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoryFile {
    Bare(Vec<ChatMessage>),
    Wrapped { messages: Vec<ChatMessage> },
}

pub fn parse_history(json: &str) -> Result<Vec<ChatMessage>> {
    let file: HistoryFile = serde_json::from_str(json).context("parsing chat history")?;
    Ok(match file {
        HistoryFile::Bare(messages) | HistoryFile::Wrapped { messages } => messages,
    })
}

pub fn load_history(path: &Path) -> Result<Vec<ChatMessage>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading chat history {}", path.display()))?;
    parse_history(&contents).with_context(|| format!("in {}", path.display()))
}

// ===================================================================
// Rendering
// ===================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub elements: Vec<Element>,
}

/// Assistant messages go through the legacy dialect; everything else is
/// shown as plain text.
pub fn render_message(message: &ChatMessage) -> RenderedMessage {
    let elements = match message.role {
        Role::Assistant => render_history(&message.content),
        Role::User | Role::System if message.content.is_empty() => Vec::new(),
        Role::User | Role::System => vec![Element::Text {
            content: message.content.clone(),
        }],
    };
    RenderedMessage {
        role: message.role,
        created_at: message.created_at.clone(),
        elements,
    }
}

pub fn render_messages(messages: &[ChatMessage]) -> Vec<RenderedMessage> {
    messages.iter().map(render_message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::FileActionKind;
    use serde_json::json;

    #[test]
    fn parses_bare_array() {
        let input = json!([
            { "role": "user", "content": "make a landing page" },
            { "role": "assistant", "content": "ok", "created_at": "2025-01-01T00:00:00Z" }
        ]);
        let messages = parse_history(&input.to_string()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].created_at.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn parses_wrapped_object() {
        let input = json!({ "messages": [{ "role": "system", "content": "hi" }] });
        let messages = parse_history(&input.to_string()).unwrap();
        assert_eq!(messages[0].role, Role::System);
    }

    #[test]
    fn rejects_unknown_role() {
        let input = json!([{ "role": "robot", "content": "x" }]);
        let err = parse_history(&input.to_string()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing chat history"));
    }

    #[test]
    fn assistant_messages_use_legacy_dialect() {
        let message = ChatMessage {
            role: Role::Assistant,
            content: concat!(
                r#"<webgen_artifact type="logs">x</webgen_artifact>"#,
                r#"<webgen_action type="create_file" name="a.html">hi</webgen_action>"#
            )
            .into(),
            created_at: None,
        };
        let rendered = render_message(&message);
        assert_eq!(
            rendered.elements,
            vec![
                Element::Text {
                    content: r#"<webgen_artifact type="logs">x</webgen_artifact>"#.into()
                },
                Element::File {
                    action: FileActionKind::Create,
                    file_name: "a.html".into(),
                    content: "hi".into(),
                    complete: true,
                },
            ]
        );
    }

    #[test]
    fn user_messages_are_not_parsed() {
        let message = ChatMessage {
            role: Role::User,
            content: r#"<webgen_action type="delete_file" name="x"/>"#.into(),
            created_at: None,
        };
        let rendered = render_message(&message);
        assert_eq!(
            rendered.elements,
            vec![Element::Text {
                content: message.content.clone()
            }]
        );
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.json");
        fs::write(&path, "not json").unwrap();
        let err = load_history(&path).unwrap_err();
        assert!(format!("{err:#}").contains("chat.json"));
    }
}
