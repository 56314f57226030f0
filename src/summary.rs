use crate::segment::{Element, FileActionKind};

/// Controls the level of detail in `summarize` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Counts only: "created 2 files, reported 1 issue"
    Short,
    /// Names, capped at 3 per category with "+ N more"
    Medium,
    /// Every name, no cap
    Full,
}

impl Verbosity {
    /// Unknown values fall back to `Medium`.
    pub fn parse(value: &str) -> Self {
        match value {
            "short" => Verbosity::Short,
            "full" => Verbosity::Full,
            _ => Verbosity::Medium,
        }
    }
}

/// Summarize a rendered generation: what it did to which files, followed
/// by its narrative text.
///
/// Returns `None` if the generation touched no files, raised no issues and
/// said nothing.
pub fn summarize(elements: &[Element], verbosity: Verbosity) -> Option<String> {
    let mut changes = ChangeCategories::default();
    let mut messages: Vec<&str> = Vec::new();

    for el in elements {
        match el {
            Element::Text { content } => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    messages.push(trimmed);
                }
            }
            other => changes.categorize(other),
        }
    }

    let change_summary = match verbosity {
        Verbosity::Short => changes.format_short(),
        Verbosity::Medium => changes.format_detailed(Some(3)),
        Verbosity::Full => changes.format_detailed(None),
    };

    let messages_section = if messages.is_empty() {
        None
    } else {
        Some(messages.join("\n\n"))
    };

    match (change_summary, messages_section) {
        (Some(changes), Some(msgs)) => Some(format!("{changes}\n---\n{msgs}")),
        (Some(changes), None) => Some(changes),
        (None, Some(msgs)) => Some(msgs),
        (None, None) => None,
    }
}

// ===================================================================
// Change categorization
// ===================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Created,
    Edited,
    Patched,
    Deleted,
    Reported,
}

impl Category {
    const ALL: [Category; 5] = [
        Category::Created,
        Category::Edited,
        Category::Patched,
        Category::Deleted,
        Category::Reported,
    ];

    fn label(self) -> &'static str {
        match self {
            Category::Created => "created",
            Category::Edited => "edited",
            Category::Patched => "patched",
            Category::Deleted => "deleted",
            Category::Reported => "reported",
        }
    }

    fn noun(self, count: usize) -> &'static str {
        match (self, count) {
            (Category::Reported, 1) => "issue",
            (Category::Reported, _) => "issues",
            (_, 1) => "file",
            _ => "files",
        }
    }
}

/// Collects element labels into category buckets.
#[derive(Default)]
struct ChangeCategories {
    buckets: [Vec<String>; 5],
}

impl ChangeCategories {
    /// Truncate a string to `max` chars, appending "..." if truncated.
    fn truncate(s: &str, max: usize) -> String {
        match s.char_indices().nth(max) {
            None => s.to_string(),
            Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
        }
    }

    fn categorize(&mut self, el: &Element) {
        let (category, label) = match el {
            Element::File {
                action, file_name, ..
            } => {
                let category = match action {
                    FileActionKind::Create => Category::Created,
                    FileActionKind::Edit => Category::Edited,
                    FileActionKind::Delete => Category::Deleted,
                };
                (category, Self::file_label(file_name))
            }
            Element::Replace { file_name, .. } => (Category::Patched, Self::file_label(file_name)),
            Element::Issue {
                category,
                description,
                ..
            } => {
                let description = Self::truncate(description.trim(), 80);
                let label = if category.is_empty() {
                    description
                } else {
                    format!("{category}: {description}")
                };
                (Category::Reported, label)
            }
            Element::Text { .. } | Element::Logs { .. } | Element::Thinking { .. } => return,
        };
        let label = if el.is_complete() {
            label
        } else {
            format!("{label} (in progress)")
        };
        self.push(category, label);
    }

    fn file_label(file_name: &str) -> String {
        if file_name.is_empty() {
            "(unnamed)".to_string()
        } else {
            file_name.to_string()
        }
    }

    /// Push a label into its bucket, deduplicating.
    fn push(&mut self, category: Category, label: String) {
        let bucket = &mut self.buckets[category as usize];
        if !bucket.contains(&label) {
            bucket.push(label);
        }
    }

    fn non_empty(&self) -> impl Iterator<Item = (Category, &Vec<String>)> {
        Category::ALL
            .into_iter()
            .map(|c| (c, &self.buckets[c as usize]))
            .filter(|(_, items)| !items.is_empty())
    }

    /// Short verbosity: "created 2 files, reported 1 issue"
    fn format_short(&self) -> Option<String> {
        let parts: Vec<String> = self
            .non_empty()
            .map(|(cat, items)| format!("{} {} {}", cat.label(), items.len(), cat.noun(items.len())))
            .collect();
        if parts.is_empty() { None } else { Some(parts.join(", ")) }
    }

    /// Medium/Full verbosity with optional item cap.
    fn format_detailed(&self, cap: Option<usize>) -> Option<String> {
        let lines: Vec<String> = self
            .non_empty()
            .map(|(cat, items)| match cap {
                Some(max) if items.len() > max => {
                    let shown: Vec<&str> = items.iter().take(max).map(|s| s.as_str()).collect();
                    format!("{}: {} + {} more", cat.label(), shown.join(", "), items.len() - max)
                }
                _ => format!("{}: {}", cat.label(), items.join(", ")),
            })
            .collect();
        if lines.is_empty() { None } else { Some(lines.join("\n")) }
    }
}
