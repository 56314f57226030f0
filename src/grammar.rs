// ===================================================================
// Tag families
// ===================================================================

/// The element families the scanner knows how to delimit.
///
/// ```text
/// <webgen_action type="create_file" name="index.html">...</webgen_action>
/// <webgen_action type="content_replace" name="app.js">
///   <webgen_subaction type="find">...</webgen_subaction>
///   <webgen_subaction type="replace">...</webgen_subaction>
/// </webgen_action>
/// <webgen_artifact type="thinking">...</webgen_artifact>
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFamily {
    Action,
    Artifact,
    /// Only recognized inside a `content_replace` action.
    Subaction,
}

impl TagFamily {
    pub fn name(self) -> &'static str {
        match self {
            TagFamily::Action => "webgen_action",
            TagFamily::Artifact => "webgen_artifact",
            TagFamily::Subaction => "webgen_subaction",
        }
    }

    /// `<webgen_action` etc. Must be followed by a boundary char to count.
    pub fn open_marker(self) -> &'static str {
        match self {
            TagFamily::Action => "<webgen_action",
            TagFamily::Artifact => "<webgen_artifact",
            TagFamily::Subaction => "<webgen_subaction",
        }
    }

    pub fn close_tag(self) -> &'static str {
        match self {
            TagFamily::Action => "</webgen_action>",
            TagFamily::Artifact => "</webgen_artifact>",
            TagFamily::Subaction => "</webgen_subaction>",
        }
    }
}

/// Whether `c` may directly follow an opening marker.
pub fn is_marker_boundary(c: char) -> bool {
    c.is_whitespace() || c == '>' || c == '/'
}

// ===================================================================
// Dialects
// ===================================================================

/// Which grammar a transcript was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Live generation output: actions and artifacts, partial elements
    /// allowed while the stream is open.
    #[default]
    Live,
    /// Persisted chat logs that predate artifacts: actions only, always
    /// treated as a closed stream.
    Legacy,
}

impl Dialect {
    /// Top-level families recognized by this dialect, in no particular order.
    pub fn top_level_families(self) -> &'static [TagFamily] {
        match self {
            Dialect::Live => &[TagFamily::Action, TagFamily::Artifact],
            Dialect::Legacy => &[TagFamily::Action],
        }
    }
}

// ===================================================================
// `type` attribute values
// ===================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    CreateFile,
    EditFile,
    DeleteFile,
    ContentReplace,
    ReportIssue,
}

impl ActionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create_file" => Some(ActionType::CreateFile),
            "edit_file" => Some(ActionType::EditFile),
            "delete_file" => Some(ActionType::DeleteFile),
            "content_replace" => Some(ActionType::ContentReplace),
            "report_issue" => Some(ActionType::ReportIssue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubactionType {
    Find,
    Replace,
}

impl SubactionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "find" => Some(SubactionType::Find),
            "replace" => Some(SubactionType::Replace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactType {
    Logs,
    Thinking,
}

impl ArtifactType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "logs" => Some(ArtifactType::Logs),
            "thinking" => Some(ArtifactType::Thinking),
            _ => None,
        }
    }
}

// Attribute names read by the segment builder.
pub const ATTR_TYPE: &str = "type";
pub const ATTR_NAME: &str = "name";
pub const ATTR_ISSUE_CATEGORY: &str = "issue_category";
pub const ATTR_ISSUE_DESCRIPTION: &str = "issue_description";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_types_are_case_sensitive() {
        assert_eq!(ActionType::parse("create_file"), Some(ActionType::CreateFile));
        assert_eq!(ActionType::parse("Create_File"), None);
        assert_eq!(ActionType::parse(""), None);
    }

    #[test]
    fn legacy_dialect_has_no_artifacts() {
        assert_eq!(Dialect::Legacy.top_level_families(), &[TagFamily::Action]);
        assert!(Dialect::Live.top_level_families().contains(&TagFamily::Artifact));
    }

    #[test]
    fn markers_and_close_tags_share_the_family_name() {
        for family in [TagFamily::Action, TagFamily::Artifact, TagFamily::Subaction] {
            assert_eq!(family.open_marker(), format!("<{}", family.name()));
            assert_eq!(family.close_tag(), format!("</{}>", family.name()));
        }
    }
}
