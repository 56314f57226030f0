use serde::Serialize;
use std::path::Path;

/// Best-guess syntax language of a generated file, for renderers that
/// highlight code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Html,
    Css,
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
    Json,
    Markdown,
    Python,
    Shell,
    Svg,
    Yaml,
    Toml,
    PlainText,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Html => "html",
            Language::Css => "css",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Jsx => "jsx",
            Language::Tsx => "tsx",
            Language::Json => "json",
            Language::Markdown => "markdown",
            Language::Python => "python",
            Language::Shell => "shell",
            Language::Svg => "svg",
            Language::Yaml => "yaml",
            Language::Toml => "toml",
            Language::PlainText => "plaintext",
        }
    }
}

/// The file extension decides when it is known; otherwise the content is
/// sniffed.
pub fn detect(file_name: &str, content: &str) -> Language {
    from_extension(file_name).unwrap_or_else(|| sniff(content))
}

fn from_extension(file_name: &str) -> Option<Language> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    let lang = match ext.as_str() {
        "html" | "htm" => Language::Html,
        "css" | "scss" => Language::Css,
        "js" | "mjs" | "cjs" => Language::JavaScript,
        "ts" | "mts" => Language::TypeScript,
        "jsx" => Language::Jsx,
        "tsx" => Language::Tsx,
        "json" => Language::Json,
        "md" | "markdown" => Language::Markdown,
        "py" => Language::Python,
        "sh" | "bash" => Language::Shell,
        "svg" => Language::Svg,
        "yml" | "yaml" => Language::Yaml,
        "toml" => Language::Toml,
        "txt" => Language::PlainText,
        _ => return None,
    };
    Some(lang)
}

fn sniff(content: &str) -> Language {
    let head = content.trim_start();
    let lower: String = head.chars().take(64).collect::<String>().to_ascii_lowercase();

    if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        return Language::Html;
    }
    if lower.starts_with("<svg") || (lower.starts_with("<?xml") && head.contains("<svg")) {
        return Language::Svg;
    }
    if let Some(shebang) = head.lines().next().filter(|l| l.starts_with("#!")) {
        return if shebang.contains("python") {
            Language::Python
        } else {
            Language::Shell
        };
    }
    if (head.starts_with('{') || head.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(content).is_ok()
    {
        return Language::Json;
    }

    let react = head.contains("from 'react'") || head.contains("from \"react\"") || head.contains("import React");
    let typed = head.contains("interface ") || head.contains(": React.FC") || head.contains(": string");
    match (react, typed) {
        (true, true) => return Language::Tsx,
        (true, false) => return Language::Jsx,
        (false, true) => return Language::TypeScript,
        (false, false) => {}
    }
    if head.contains("function ") || head.contains("const ") || head.contains("=>") {
        return Language::JavaScript;
    }
    if looks_like_css(head) {
        return Language::Css;
    }
    if head.lines().any(|l| l.starts_with("# ") || l.starts_with("## ")) {
        return Language::Markdown;
    }
    Language::PlainText
}

/// A first rule like `body {` or `.card, .tile {` followed by declarations.
fn looks_like_css(head: &str) -> bool {
    let Some(first) = head.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return false;
    };
    first.ends_with('{') && !first.contains('(') && head.contains(':') && head.contains(';')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_wins() {
        assert_eq!(detect("src/App.tsx", "hello"), Language::Tsx);
        assert_eq!(detect("INDEX.HTML", ""), Language::Html);
        assert_eq!(detect("notes.txt", "<html>"), Language::PlainText);
    }

    #[test]
    fn sniffs_html_and_svg() {
        assert_eq!(detect("page", "\n<!DOCTYPE html><html></html>"), Language::Html);
        assert_eq!(detect("logo", "<svg viewBox=\"0 0 1 1\"></svg>"), Language::Svg);
    }

    #[test]
    fn sniffs_json_only_when_valid() {
        assert_eq!(detect("data", r#"{"a": 1}"#), Language::Json);
        assert_ne!(detect("data", r#"{"a": "#), Language::Json);
    }

    #[test]
    fn sniffs_react_flavours() {
        assert_eq!(detect("c", "import React from 'react';\nexport default () => <div/>"), Language::Jsx);
        assert_eq!(
            detect("c", "import React from 'react';\ninterface Props { name: string }"),
            Language::Tsx
        );
    }

    #[test]
    fn sniffs_scripts_and_styles() {
        assert_eq!(detect("run", "#!/usr/bin/env python3\nprint(1)"), Language::Python);
        assert_eq!(detect("run", "#!/bin/sh\necho hi"), Language::Shell);
        assert_eq!(detect("x", "const a = 1;"), Language::JavaScript);
        assert_eq!(detect("x", "body {\n  color: red;\n}"), Language::Css);
        assert_eq!(detect("x", "# Title\n\ntext"), Language::Markdown);
        assert_eq!(detect("x", "just words"), Language::PlainText);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_value(Language::JavaScript).unwrap(), "javascript");
        assert_eq!(Language::PlainText.as_str(), "plaintext");
    }
}
