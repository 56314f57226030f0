use crate::scanner::{ScanOptions, Scanner};
use crate::segment::{build, Element};
use std::hash::{DefaultHasher, Hash, Hasher};
use tracing::{trace, warn};

// ===================================================================
// Pure entry points
// ===================================================================

/// Render a live transcript snapshot. `stream_open` says whether the host
/// is still appending to it.
///
/// Pure: the same inputs always produce the same elements, and nothing is
/// carried between calls.
pub fn render(transcript: &str, stream_open: bool) -> Vec<Element> {
    render_with(transcript, ScanOptions::live(stream_open))
}

/// Render a persisted transcript written in the legacy (action-only)
/// dialect. Every element comes back complete.
pub fn render_history(transcript: &str) -> Vec<Element> {
    render_with(transcript, ScanOptions::legacy())
}

pub fn render_with(transcript: &str, options: ScanOptions) -> Vec<Element> {
    build(Scanner::new(transcript, options))
}

// ===================================================================
// StreamView: one growing transcript and its last render
// ===================================================================

/// Identifies a rendered snapshot without keeping a copy of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SnapshotKey {
    len: usize,
    hash: u64,
    open: bool,
}

impl SnapshotKey {
    fn of(transcript: &str, open: bool) -> Self {
        let mut hasher = DefaultHasher::new();
        transcript.hash(&mut hasher);
        Self {
            len: transcript.len(),
            hash: hasher.finish(),
            open,
        }
    }
}

/// Host-side buffer for a single generation stream.
///
/// Chunks are appended as they arrive; `elements` re-renders the whole
/// buffer only when it changed since the last call. Keep one `StreamView`
/// per stream.
#[derive(Debug)]
pub struct StreamView {
    transcript: String,
    open: bool,
    options: ScanOptions,
    last: Option<(SnapshotKey, Vec<Element>)>,
    renders: usize,
}

impl Default for StreamView {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamView {
    /// An open live stream with nothing received yet.
    pub fn new() -> Self {
        Self {
            transcript: String::new(),
            open: true,
            options: ScanOptions::live(true),
            last: None,
            renders: 0,
        }
    }

    /// A closed view over a persisted legacy transcript.
    pub fn history(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            open: false,
            options: ScanOptions::legacy(),
            last: None,
            renders: 0,
        }
    }

    pub fn push_chunk(&mut self, chunk: &str) {
        if !self.open {
            warn!(bytes = chunk.len(), "chunk received after stream closed, ignoring");
            return;
        }
        self.transcript.push_str(chunk);
    }

    /// Mark the stream as ended. Any element still open is rendered as
    /// complete from now on.
    pub fn finish(&mut self) {
        self.open = false;
        self.options.stream_open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// How many times the buffer was actually parsed.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Elements for the current buffer, re-rendered only if it changed.
    pub fn elements(&mut self) -> &[Element] {
        let key = SnapshotKey::of(&self.transcript, self.open);
        let fresh = match &self.last {
            Some((last_key, _)) if *last_key == key => {
                trace!(len = key.len, "transcript unchanged, reusing render");
                false
            }
            _ => true,
        };
        if fresh {
            let elements = render_with(&self.transcript, self.options);
            self.renders += 1;
            self.last = Some((key, elements));
        }
        match &self.last {
            Some((_, elements)) => elements,
            None => &[],
        }
    }
}
