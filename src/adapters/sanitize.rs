//! Log sanitization for account and health data.
//!
//! Applied to every formatted log line before it reaches the sink. Redacts:
//! - user ids (UUIDs)
//! - email addresses
//! - Argon2 PHC password hashes
//! - `password=...` / `token: ...` style assignments
//!
//! Structured logging should keep these out of log calls in the first
//! place; this writer catches what slips through.
//!
//! Input per call is capped (`GLYCOCHECK_SANITIZE_MAX_BYTES`, default 16 KiB).

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

const RULES: [(&str, &str); 4] = [
    (
        r"\$argon2(?:id|i|d)\$[A-Za-z0-9$=,+/.]+",
        "[REDACTED-HASH]",
    ),
    (
        r"(?i)\b(?:password|passwd|pwd|secret|token)\b\s*[:=]\s*\S+",
        "[REDACTED-SECRET]",
    ),
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-ID]",
    ),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
];

struct Patterns {
    set: RegexSet,
    rules: Vec<(Regex, &'static str)>,
}

fn compile() -> Option<Patterns> {
    let set = RegexSet::new(RULES.iter().map(|(p, _)| *p)).ok()?;
    let rules = RULES
        .iter()
        .map(|(p, r)| Regex::new(p).map(|re| (re, *r)))
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    Some(Patterns { set, rules })
}

fn patterns() -> Option<&'static Patterns> {
    PATTERNS.get_or_init(compile).as_ref()
}

fn max_sanitize_bytes() -> usize {
    std::env::var("GLYCOCHECK_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Replace sensitive substrings with redaction markers.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut out = match patterns() {
        // Rules are applied in order; hashes and secrets go first so the id
        // and email rules never see half-redacted text.
        Some(p) if p.set.is_match(prefix) => {
            let mut result = prefix.to_string();
            for (re, replacement) in &p.rules {
                result = re.replace_all(&result, *replacement).into_owned();
            }
            result
        }
        Some(_) => prefix.to_string(),
        None => "[REDACTED-UNSANITIZABLE]".to_string(),
    };

    if truncated {
        out.push_str(" [TRUNCATED]");
    }
    out
}

/// Check whether a string would be altered by [`sanitize`].
#[must_use]
pub fn contains_sensitive(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, max_sanitize_bytes());
    patterns().map_or(true, |p| p.set.is_match(prefix))
}

/// A `tracing_subscriber` writer that sanitizes each formatted line.
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(sanitize(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A single line with no newline must not buffer without bound.
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}
