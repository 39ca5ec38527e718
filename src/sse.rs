//! SSE (Server-Sent Events) wire-format parser.
//!
//! Reconstructs discrete events from the line-oriented SSE format:
//! - `field: value` lines (`id`, `event`, `data`, `retry`)
//! - Empty line - terminates the in-progress event
//! - Lines starting with `:` - comments (ignored)
//! - Lines without a colon - silently skipped
//!
//! A single corrupt line must never abort an otherwise healthy subscription,
//! so there is no error path out of the parser; everything unrecognized is
//! dropped on the floor.

use std::time::Duration;

use serde::de::DeserializeOwned;

/// One fully-parsed event from the wire.
///
/// `data` is the `\n`-join of every `data:` line seen since the last blank
/// line. An event is only delivered when a blank line terminates it and
/// `data` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Event {
    /// Event id, used as the resumption token on reconnect.
    pub id: String,
    /// Event type from the `event:` field; empty when the server sent none.
    pub event_type: String,
    /// Payload, typically a JSON document.
    pub data: String,
}

impl Event {
    /// Decode the payload as JSON into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}

/// Represents a classified SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Empty line - end of the in-progress event.
    Empty,
    /// Comment line (starts with `:`).
    Comment,
    /// `name: value` field line, value with at most one leading space stripped.
    Field { name: String, value: String },
    /// Line without a colon; contributes nothing.
    Ignored,
}

/// Classify a single SSE line.
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }
    if line.starts_with(':') {
        return SseLine::Comment;
    }
    match line.split_once(':') {
        Some((name, value)) => SseLine::Field {
            name: name.to_string(),
            value: value.strip_prefix(' ').unwrap_or(value).to_string(),
        },
        None => SseLine::Ignored,
    }
}

/// Stateful parser that accumulates field lines and emits complete events.
///
/// One parser instance serves one connection attempt; the `retry:` override
/// it reports applies only to the reconnect that follows that attempt.
#[derive(Debug, Default)]
pub struct SseParser {
    /// Event being accumulated across field lines.
    event: Event,
    /// Most recent positive `retry:` value seen during this attempt.
    retry: Option<Duration>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its trailing newline) to the parser.
    ///
    /// Returns a complete event when the line was a terminator and the
    /// accumulated `data` is non-empty; `None` otherwise. A blank line with
    /// no accumulated data is a keep-alive and a no-op.
    pub fn feed_line(&mut self, line: &str) -> Option<Event> {
        match parse_sse_line(line) {
            SseLine::Empty => {
                if self.event.data.is_empty() {
                    return None;
                }
                Some(std::mem::take(&mut self.event))
            }
            SseLine::Field { name, value } => {
                match name.as_str() {
                    "id" => self.event.id = value,
                    "event" => self.event.event_type = value,
                    "data" => {
                        if !self.event.data.is_empty() {
                            self.event.data.push('\n');
                        }
                        self.event.data.push_str(&value);
                    }
                    "retry" => {
                        // Base-10 milliseconds; only strictly positive values
                        // count, and the last one seen wins.
                        if let Ok(ms) = value.trim().parse::<u64>() {
                            if ms > 0 {
                                self.retry = Some(Duration::from_millis(ms));
                            }
                        }
                    }
                    _ => {}
                }
                None
            }
            SseLine::Comment | SseLine::Ignored => None,
        }
    }

    /// Server-suggested reconnect delay for the upcoming sleep, if any.
    pub fn retry_override(&self) -> Option<Duration> {
        self.retry
    }
}
