use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use webgen_codeview::history::{self, RenderedMessage, Role};
use webgen_codeview::output::{self, OutputOptions};
use webgen_codeview::preferences::{self, Preferences};
use webgen_codeview::summary::summarize;
use webgen_codeview::{logging, render_with, Element, ScanOptions, StreamView};

#[derive(Parser)]
#[command(name = "webgen-codeview", version, about = "Render website-generation transcripts")]
struct Cli {
    /// Preferences file (defaults to ./webgen-codeview.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a transcript snapshot once
    Render {
        /// Transcript file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Treat the transcript as a stream that is still arriving
        #[arg(long)]
        open: bool,
        /// Parse with the legacy action-only dialect
        #[arg(long, conflicts_with = "open")]
        legacy: bool,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Feed input through a stream view chunk by chunk, printing one JSON
    /// snapshot per chunk
    Stream {
        /// Transcript file; reads stdin as it arrives when omitted
        file: Option<PathBuf>,
        #[arg(long, default_value_t = 4096)]
        chunk_size: usize,
    },
    /// Render a stored chat history (JSON)
    History {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Write a preferences file with the default settings
    InitConfig {
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
    Summary,
}

/// Preferences plus the directory relative template paths resolve against.
struct Settings {
    prefs: Preferences,
    dir: PathBuf,
}

impl Settings {
    fn load(config: Option<&Path>) -> Result<Self> {
        let path = config
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(preferences::FILENAME));
        let prefs = Preferences::load(&path)?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(Self { prefs, dir })
    }

    fn output_options(&self) -> OutputOptions {
        OutputOptions {
            hide_blank_text: self.prefs.hide_blank_text,
            detect_languages: self.prefs.detect_languages,
        }
    }

    fn format(&self, elements: &[Element], format: Format) -> Result<String> {
        let options = self.output_options();
        let out = match format {
            Format::Json => output::to_json(elements, options)?,
            Format::Text => {
                let template = self.prefs.text_template_source(&self.dir)?;
                output::to_text(elements, &template, options)?
            }
            Format::Summary => {
                summarize(elements, self.prefs.summary_verbosity()).unwrap_or_default()
            }
        };
        Ok(out)
    }
}

fn open_input(file: Option<&Path>) -> Result<Box<dyn Read>> {
    match file {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Ok(Box::new(f))
        }
        None => Ok(Box::new(io::stdin())),
    }
}

fn read_all(file: Option<&Path>) -> Result<String> {
    let mut buffer = String::new();
    open_input(file)?
        .read_to_string(&mut buffer)
        .context("reading transcript")?;
    Ok(buffer)
}

/// Decode as much of `pending` as possible. Invalid sequences become one
/// U+FFFD each; an incomplete trailing sequence stays in `pending` for the
/// next read unless `at_eof`.
fn take_utf8(pending: &mut Vec<u8>, at_eof: bool) -> String {
    let mut text = String::new();
    let mut consumed = 0;
    loop {
        match std::str::from_utf8(&pending[consumed..]) {
            Ok(s) => {
                text.push_str(s);
                consumed = pending.len();
                break;
            }
            Err(e) => {
                let valid = consumed + e.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&pending[consumed..valid]));
                match e.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        consumed = valid + len;
                    }
                    None if at_eof => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        consumed = pending.len();
                        break;
                    }
                    None => {
                        consumed = valid;
                        break;
                    }
                }
            }
        }
    }
    pending.drain(..consumed);
    text
}

fn run_stream(file: Option<&Path>, chunk_size: usize, settings: &Settings) -> Result<()> {
    if chunk_size == 0 {
        anyhow::bail!("--chunk-size must be at least 1");
    }
    let options = settings.output_options();
    let mut input = open_input(file)?;
    let mut view = StreamView::new();
    let mut buf = vec![0u8; chunk_size];
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = 0;

    loop {
        let n = input.read(&mut buf).context("reading stream")?;
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&buf[..n]);
        let text = take_utf8(&mut pending, false);
        if text.is_empty() {
            continue;
        }
        view.push_chunk(&text);
        chunk += 1;
        println!("{}", output::snapshot_line(chunk, true, view.elements(), options)?);
    }

    if !pending.is_empty() {
        let text = take_utf8(&mut pending, true);
        view.push_chunk(&text);
    }
    view.finish();
    info!(chunks = chunk, bytes = view.transcript().len(), renders = view.renders(), "stream closed");
    println!("{}", output::snapshot_line(chunk + 1, false, view.elements(), options)?);
    Ok(())
}

fn run_history(file: &Path, format: Format, settings: &Settings) -> Result<String> {
    let messages = history::load_history(file)?;
    info!(messages = messages.len(), "loaded chat history");
    let rendered: Vec<RenderedMessage> = history::render_messages(&messages);

    match format {
        Format::Json => {
            let options = settings.output_options();
            let values = rendered
                .iter()
                .map(|msg| -> Result<serde_json::Value> {
                    let elements = output::element_views(&msg.elements, options)?;
                    Ok(serde_json::json!({
                        "role": msg.role,
                        "created_at": msg.created_at,
                        "elements": elements,
                    }))
                })
                .collect::<Result<Vec<_>>>()?;
            serde_json::to_string_pretty(&values).context("serializing history")
        }
        Format::Text => {
            let mut out = String::new();
            for msg in &rendered {
                out.push_str(&format!("## {}\n", msg.role.as_str()));
                out.push_str(&settings.format(&msg.elements, Format::Text)?);
                out.push('\n');
            }
            Ok(out)
        }
        Format::Summary => {
            let elements: Vec<Element> = rendered
                .into_iter()
                .filter(|msg| msg.role == Role::Assistant)
                .flat_map(|msg| msg.elements)
                .collect();
            settings.format(&elements, Format::Summary)
        }
    }
}

fn run(cli: Cli) -> Result<Option<String>> {
    if let Command::InitConfig { path } = &cli.command {
        let path = path
            .clone()
            .or_else(|| cli.config.clone())
            .unwrap_or_else(|| PathBuf::from(preferences::FILENAME));
        Preferences::write_default(&path)?;
        return Ok(Some(format!("wrote {}", path.display())));
    }

    let settings = Settings::load(cli.config.as_deref())?;
    match cli.command {
        Command::Render {
            file,
            open,
            legacy,
            format,
        } => {
            let transcript = read_all(file.as_deref())?;
            let options = if legacy {
                ScanOptions::legacy()
            } else {
                ScanOptions::live(open)
            };
            let elements = render_with(&transcript, options);
            info!(bytes = transcript.len(), elements = elements.len(), "rendered transcript");
            settings.format(&elements, format).map(Some)
        }
        Command::Stream { file, chunk_size } => {
            run_stream(file.as_deref(), chunk_size, &settings)?;
            Ok(None)
        }
        Command::History { file, format } => run_history(&file, format, &settings).map(Some),
        Command::InitConfig { .. } => Ok(None),
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(Some(output)) => {
            if !output.is_empty() {
                println!("{}", output.trim_end_matches('\n'));
            }
        }
        Ok(None) => {}
        Err(err) => {
            eprintln!("webgen-codeview: {err:#}");
            process::exit(2);
        }
    }
}
