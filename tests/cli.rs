mod common;

use common::{parse_json, run_cli, run_with_defaults, SITE};
use std::fs;

#[test]
fn render_from_stdin_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_with_defaults(dir.path(), &["render"], SITE);
    assert_eq!(code, 0, "stderr: {stderr}");

    let value = parse_json(&stdout);
    let kinds: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|el| el["kind"].as_str().unwrap())
        .collect();
    // The lone "\n" between actions is hidden by default.
    assert_eq!(kinds, vec!["text", "thinking", "file", "replace", "logs", "text"]);
    assert_eq!(value[2]["file_name"], "index.html");
    assert_eq!(value[2]["language"], "html");
    assert_eq!(value[3]["find_content"], "red");
    assert_eq!(value[3]["replace_content"], "blue");
}

#[test]
fn render_file_argument() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    fs::write(&path, r#"Hello <webgen_action type="create_file" name="a.txt">content</webgen_action> world"#).unwrap();

    let (code, stdout, stderr) = run_with_defaults(dir.path(), &["render", path.to_str().unwrap()], "");
    assert_eq!(code, 0, "stderr: {stderr}");
    let value = parse_json(&stdout);
    assert_eq!(value.as_array().unwrap().len(), 3);
    assert_eq!(value[0]["content"], "Hello ");
    assert_eq!(value[1]["content"], "content");
    assert_eq!(value[1]["complete"], true);
    assert_eq!(value[2]["content"], " world");
}

#[test]
fn render_open_marks_tail_partial() {
    let dir = tempfile::tempdir().unwrap();
    let input = r#"<webgen_action type="create_file" name="a.txt">partial conte"#;

    let (code, stdout, _) = run_with_defaults(dir.path(), &["render", "--open"], input);
    assert_eq!(code, 0);
    let value = parse_json(&stdout);
    assert_eq!(value[0]["content"], "partial conte");
    assert_eq!(value[0]["complete"], false);

    let (code, stdout, _) = run_with_defaults(dir.path(), &["render"], input);
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)[0]["complete"], true);
}

#[test]
fn render_legacy_keeps_artifacts_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_with_defaults(dir.path(), &["render", "--legacy"], SITE);
    assert_eq!(code, 0);
    let value = parse_json(&stdout);
    assert!(value
        .as_array()
        .unwrap()
        .iter()
        .all(|el| el["kind"] != "thinking" && el["kind"] != "logs"));
}

#[test]
fn open_and_legacy_conflict() {
    let (code, _, stderr) = run_cli(&["render", "--open", "--legacy"], "");
    assert_ne!(code, 0);
    assert!(stderr.contains("cannot be used with"), "stderr: {stderr}");
}

#[test]
fn render_text_format() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run_with_defaults(dir.path(), &["render", "--format", "text"], SITE);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("Building your site."));
    assert!(stdout.contains("=== create index.html (html)"));
    assert!(stdout.contains("=== replace in style.css"));
    assert!(stdout.contains(">>> logs\nbuild ok"));
}

#[test]
fn render_summary_format_uses_config_verbosity() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("webgen-codeview.toml");
    fs::write(&config, "summary_verbosity = \"short\"\n").unwrap();

    let (code, stdout, stderr) = run_cli(
        &["--config", config.to_str().unwrap(), "render", "--format", "summary"],
        SITE,
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(
        stdout.trim_end(),
        "created 1 file, patched 1 file\n---\nBuilding your site.\n\nDone."
    );
}

#[test]
fn custom_template_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("webgen-codeview.toml");
    fs::write(&config, "[text_template]\nfile = \"kinds.j2\"\n").unwrap();
    fs::write(
        dir.path().join("kinds.j2"),
        "{% for el in elements %}{{ el.kind }} {% endfor %}",
    )
    .unwrap();

    let (code, stdout, stderr) = run_cli(
        &["--config", config.to_str().unwrap(), "render", "--format", "text"],
        SITE,
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(stdout.trim_end(), "text thinking file replace logs text");
}

#[test]
fn init_config_writes_defaults_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.toml");
    let path_str = path.to_str().unwrap();

    let (code, stdout, stderr) = run_cli(&["init-config", path_str], "");
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("wrote"));
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("summary_verbosity = \"medium\""));
    assert!(written.contains("[text_template]"));

    let (code, _, stderr) = run_cli(&["init-config", path_str], "");
    assert_eq!(code, 2);
    assert!(stderr.contains("already exists"));
}
