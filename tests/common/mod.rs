#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run the binary with `args`, feeding `stdin`. Returns (exit code, stdout,
/// stderr).
pub fn run_cli(args: &[&str], stdin: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_webgen-codeview"))
        .args(args)
        .env_remove("WEBGEN_CODEVIEW_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Run with a preferences file that does not exist, so defaults apply
/// regardless of the working directory.
pub fn run_with_defaults(dir: &Path, args: &[&str], stdin: &str) -> (i32, String, String) {
    let config = dir.join("absent.toml");
    let config = config.to_str().unwrap();
    let mut full = vec!["--config", config];
    full.extend_from_slice(args);
    run_cli(&full, stdin)
}

pub fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).unwrap_or_else(|e| panic!("bad JSON ({e}): {stdout}"))
}

pub const SITE: &str = concat!(
    "Building your site. ",
    r#"<webgen_artifact type="thinking">Start with the landing page</webgen_artifact>"#,
    r#"<webgen_action type="create_file" name="index.html"><!DOCTYPE html><h1>Hi</h1></webgen_action>"#,
    "\n",
    r#"<webgen_action type="content_replace" name="style.css"><webgen_subaction type="find">red</webgen_subaction><webgen_subaction type="replace">blue</webgen_subaction></webgen_action>"#,
    r#"<webgen_artifact type="logs">build ok</webgen_artifact>"#,
    " Done.",
);
