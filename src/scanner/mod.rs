use crate::attributes::{parse_attributes, Attributes};
use crate::grammar::{is_marker_boundary, ActionType, Dialect, TagFamily, ATTR_TYPE};
use tracing::{debug, trace};

// ===================================================================
// Options
// ===================================================================

/// How a transcript snapshot should be scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub dialect: Dialect,
    /// The host is still appending to the transcript.
    pub stream_open: bool,
}

impl ScanOptions {
    pub fn live(stream_open: bool) -> Self {
        Self {
            dialect: Dialect::Live,
            stream_open,
        }
    }

    /// Persisted transcripts are always closed.
    pub fn legacy() -> Self {
        Self {
            dialect: Dialect::Legacy,
            stream_open: false,
        }
    }

    fn mode(self) -> Mode {
        match self.dialect {
            Dialect::Live => Mode {
                partial: self.stream_open,
                resume_unmatched: false,
            },
            Dialect::Legacy => Mode {
                partial: false,
                resume_unmatched: true,
            },
        }
    }
}

/// What to do with an element whose closing tag never shows up.
#[derive(Debug, Clone, Copy)]
struct Mode {
    /// Emit it as an incomplete element and stop (stream frontier).
    partial: bool,
    /// Emit the opening tag as text and keep scanning after it.
    resume_unmatched: bool,
}

// ===================================================================
// Output spans
// ===================================================================

/// One classified region of a transcript, in byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span<'a> {
    Text(&'a str),
    Element(RawElement<'a>),
}

/// A delimited element before kind-specific interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement<'a> {
    pub family: TagFamily,
    pub attributes: Attributes<'a>,
    /// Bytes between the opening tag and the closing tag (or the end of
    /// the transcript when the element is still open).
    pub inner: &'a str,
    /// The element's full source text, tags included.
    pub source: &'a str,
    pub complete: bool,
    /// Nested `find`/`replace` spans; only filled for `content_replace`.
    pub subactions: Vec<RawElement<'a>>,
}

impl RawElement<'_> {
    pub fn type_attr(&self) -> Option<&str> {
        self.attributes.get(ATTR_TYPE)
    }
}

// ===================================================================
// State machine
// ===================================================================

#[derive(Debug, Clone, Copy)]
enum State {
    /// Looking for the next opening marker from `cursor`.
    Scanning { cursor: usize },
    /// An opening marker sits at `start`; its `>` has not been located yet.
    OpenTag { start: usize, family: TagFamily },
    /// Inside an element whose opening tag spans `start..body`.
    InElement {
        start: usize,
        body: usize,
        family: TagFamily,
        attrs_end: usize,
    },
    Done,
}

/// Result of looking for the next opening marker.
enum Marker {
    Found(usize, TagFamily),
    /// The transcript ends partway through what may become a marker.
    Truncated(usize),
    Absent,
}

/// Single left-to-right pass over a transcript snapshot, yielding text and
/// element spans. Never backtracks; every step either advances or stops.
pub struct Scanner<'a> {
    src: &'a str,
    families: &'static [TagFamily],
    mode: Mode,
    state: State,
    /// Per family, the earliest offset from which its closing tag is known
    /// to be absent. Keeps repeated unmatched tags from rescanning the tail.
    unclosed_from: [usize; 3],
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str, options: ScanOptions) -> Self {
        Self::with_families(src, options.dialect.top_level_families(), options.mode())
    }

    fn with_families(src: &'a str, families: &'static [TagFamily], mode: Mode) -> Self {
        Self {
            src,
            families,
            mode,
            state: State::Scanning { cursor: 0 },
            unclosed_from: [usize::MAX; 3],
        }
    }

    fn slot(family: TagFamily) -> usize {
        match family {
            TagFamily::Action => 0,
            TagFamily::Artifact => 1,
            TagFamily::Subaction => 2,
        }
    }

    /// Offset of the next `close` tag for `family` at or after `body`.
    fn find_close(&mut self, family: TagFamily, body: usize) -> Option<usize> {
        let slot = Self::slot(family);
        if body >= self.unclosed_from[slot] {
            return None;
        }
        match self.src[body..].find(family.close_tag()) {
            Some(rel) => Some(body + rel),
            None => {
                self.unclosed_from[slot] = body;
                None
            }
        }
    }

    fn find_marker(&self, from: usize) -> Marker {
        for (offset, _) in self.src[from..].match_indices('<') {
            let pos = from + offset;
            let rest = &self.src[pos..];
            for &family in self.families {
                let marker = family.open_marker();
                if let Some(after) = rest.strip_prefix(marker) {
                    match after.chars().next() {
                        Some(c) if is_marker_boundary(c) => return Marker::Found(pos, family),
                        Some(_) => {}
                        None => return Marker::Truncated(pos),
                    }
                } else if marker.starts_with(rest) {
                    return Marker::Truncated(pos);
                }
            }
        }
        Marker::Absent
    }

    /// Text from `from` to `to`, or `None` when the range is empty.
    fn text(&self, from: usize, to: usize) -> Option<Span<'a>> {
        (from < to).then(|| Span::Text(&self.src[from..to]))
    }

    fn element(
        &self,
        family: TagFamily,
        attrs_region: &'a str,
        inner: &'a str,
        source: &'a str,
        complete: bool,
    ) -> Span<'a> {
        let attributes = parse_attributes(attrs_region);
        let subactions = if family == TagFamily::Action
            && attributes.get(ATTR_TYPE).and_then(ActionType::parse) == Some(ActionType::ContentReplace)
        {
            scan_subactions(inner, !complete)
        } else {
            Vec::new()
        };
        Span::Element(RawElement {
            family,
            attributes,
            inner,
            source,
            complete,
            subactions,
        })
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Span<'a>> {
        let src = self.src;
        loop {
            match self.state {
                State::Done => return None,

                State::Scanning { cursor } => match self.find_marker(cursor) {
                    Marker::Absent => {
                        self.state = State::Done;
                        return self.text(cursor, src.len());
                    }
                    Marker::Truncated(pos) => {
                        self.state = State::Done;
                        // Hold back a marker that may still be arriving.
                        let end = if self.mode.partial { pos } else { src.len() };
                        return self.text(cursor, end);
                    }
                    Marker::Found(start, family) => {
                        self.state = State::OpenTag { start, family };
                        if let Some(text) = self.text(cursor, start) {
                            return Some(text);
                        }
                    }
                },

                State::OpenTag { start, family } => {
                    let attrs_start = start + family.open_marker().len();
                    match src[attrs_start..].find('>') {
                        Some(rel) => {
                            let gt = attrs_start + rel;
                            self.state = State::InElement {
                                start,
                                body: gt + 1,
                                family,
                                attrs_end: gt,
                            };
                        }
                        None if self.mode.partial => {
                            trace!(offset = start, "opening tag still arriving");
                            self.state = State::Done;
                            return None;
                        }
                        None => {
                            debug!(offset = start, tag = family.name(), "unterminated opening tag, rendering as text");
                            self.state = State::Done;
                            return self.text(start, src.len());
                        }
                    }
                }

                State::InElement {
                    start,
                    body,
                    family,
                    attrs_end,
                } => {
                    let attrs_region = &src[start + family.open_marker().len()..attrs_end];

                    if let Some(region) = attrs_region.trim_end().strip_suffix('/') {
                        self.state = State::Scanning { cursor: body };
                        return Some(self.element(family, region, "", &src[start..body], true));
                    }

                    let close = family.close_tag();
                    if let Some(inner_end) = self.find_close(family, body) {
                        let end = inner_end + close.len();
                        self.state = State::Scanning { cursor: end };
                        return Some(self.element(
                            family,
                            attrs_region,
                            &src[body..inner_end],
                            &src[start..end],
                            true,
                        ));
                    }

                    if self.mode.resume_unmatched {
                        debug!(offset = start, tag = family.name(), "unmatched opening tag, rendering as text");
                        self.state = State::Scanning { cursor: body };
                        return Some(Span::Text(&src[start..body]));
                    }

                    // Unclosed: everything left belongs to this element.
                    self.state = State::Done;
                    let inner = strip_partial_close(&src[body..], close);
                    if !self.mode.partial {
                        debug!(offset = start, tag = family.name(), "element never closed, using content to end");
                    }
                    return Some(self.element(
                        family,
                        attrs_region,
                        inner,
                        &src[start..],
                        !self.mode.partial,
                    ));
                }
            }
        }
    }
}

/// Scan a `content_replace` body for its `find`/`replace` spans. Text
/// between them carries no meaning and is dropped.
fn scan_subactions(inner: &str, partial: bool) -> Vec<RawElement<'_>> {
    let mode = Mode {
        partial,
        resume_unmatched: false,
    };
    Scanner::with_families(inner, &[TagFamily::Subaction], mode)
        .filter_map(|span| match span {
            Span::Element(el) => Some(el),
            Span::Text(_) => None,
        })
        .collect()
}

/// Drop a trailing fragment of `close` (e.g. `</webgen_act`) from the
/// content of an element the stream has not finished.
fn strip_partial_close<'a>(content: &'a str, close: &str) -> &'a str {
    let longest = close.len().saturating_sub(1).min(content.len());
    for k in (1..=longest).rev() {
        if content.ends_with(&close[..k]) {
            return &content[..content.len() - k];
        }
    }
    content
}

/// Scan a whole snapshot into spans.
pub fn scan(src: &str, options: ScanOptions) -> Vec<Span<'_>> {
    Scanner::new(src, options).collect()
}
