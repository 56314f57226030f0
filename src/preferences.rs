use crate::summary::Verbosity;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const FILENAME: &str = "webgen-codeview.toml";

/// Text output template: either an inline Jinja2 string or a path to a
/// template file (relative to the preferences file).
///
/// In TOML this looks like one of:
///
/// ```toml
/// [text_template]
/// inline = "{% for el in elements %}{{ el.kind }}\n{% endfor %}"
///
/// # or
///
/// [text_template]
/// file = "transcript.j2"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TextTemplate {
    Inline(String),
    File(String),
}

impl Default for TextTemplate {
    fn default() -> Self {
        TextTemplate::Inline(crate::output::DEFAULT_TEXT_TEMPLATE.into())
    }
}

/// User-facing preferences stored in `webgen-codeview.toml`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Preferences {
    /// Detail level of `--format summary`.
    /// Options: "short", "medium", "full"
    #[serde(default = "default_summary_verbosity")]
    pub summary_verbosity: String,

    /// Drop whitespace-only text runs from rendered output.
    #[serde(default = "default_true")]
    pub hide_blank_text: bool,

    /// Annotate file elements with a detected syntax language.
    #[serde(default = "default_true")]
    pub detect_languages: bool,

    /// Kept last so it serializes after the plain keys.
    #[serde(default)]
    pub text_template: TextTemplate,
}

fn default_summary_verbosity() -> String {
    "medium".into()
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            summary_verbosity: default_summary_verbosity(),
            hide_blank_text: true,
            detect_languages: true,
            text_template: TextTemplate::default(),
        }
    }
}

impl Preferences {
    /// Load preferences from `path`. A missing file means defaults; missing
    /// keys in an existing file are filled in with defaults via serde.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let prefs: Preferences = toml::from_str(&contents)
                    .with_context(|| format!("parsing {}", path.display()))?;
                Ok(prefs)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Preferences::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    /// Write a preferences file holding the defaults. Refuses to overwrite.
    pub fn write_default(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("{} already exists", path.display());
        }
        let toml_str = toml::to_string_pretty(&Preferences::default())
            .context("serializing default preferences")?;
        fs::write(path, toml_str).with_context(|| format!("writing default {}", path.display()))
    }

    pub fn summary_verbosity(&self) -> Verbosity {
        Verbosity::parse(&self.summary_verbosity)
    }

    /// The template source text. File templates resolve relative to
    /// `config_dir`.
    pub fn text_template_source(&self, config_dir: &Path) -> Result<String> {
        match &self.text_template {
            TextTemplate::Inline(s) => Ok(s.clone()),
            TextTemplate::File(filename) => {
                let path: PathBuf = config_dir.join(filename);
                fs::read_to_string(&path)
                    .with_context(|| format!("reading template {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(&dir.path().join(FILENAME)).unwrap();
        assert_eq!(prefs.summary_verbosity(), Verbosity::Medium);
        assert!(prefs.hide_blank_text);
        assert!(prefs.detect_languages);
        assert_eq!(prefs.text_template, TextTemplate::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILENAME);
        fs::write(&path, "summary_verbosity = \"short\"\nhide_blank_text = false\n").unwrap();
        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs.summary_verbosity(), Verbosity::Short);
        assert!(!prefs.hide_blank_text);
        assert!(prefs.detect_languages);
    }

    #[test]
    fn file_template_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILENAME);
        fs::write(&path, "[text_template]\nfile = \"t.j2\"\n").unwrap();
        fs::write(dir.path().join("t.j2"), "{{ elements | length }}").unwrap();
        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(
            prefs.text_template_source(dir.path()).unwrap(),
            "{{ elements | length }}"
        );
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILENAME);
        fs::write(&path, "summary_verbosity = [").unwrap();
        let err = Preferences::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }

    #[test]
    fn written_defaults_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILENAME);
        Preferences::write_default(&path).unwrap();
        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs.text_template, TextTemplate::default());
        assert!(Preferences::write_default(&path).is_err());
    }
}
