//! The watch loop: reconnect state machine driving the stream opener.
//!
//! One watch invocation is a single logical thread of execution: open a
//! connection, feed its body through the SSE parser, deliver events to the
//! callback, classify the outcome, sleep, repeat. Transport failures are
//! retried forever; only cancellation and a callback error terminate.

use bytes::BytesMut;
use futures_util::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::backoff::ReconnectBackoff;
use crate::cancel::CancelToken;
use crate::client::{ClientConfig, FlagsClient};
use crate::error::{CallbackError, WatchError};
use crate::request::WatchRequest;
use crate::sse::{Event, SseParser};

/// Per-invocation connection state. Owned exclusively by one watch call and
/// discarded when it returns.
#[derive(Debug)]
struct ConnectionState {
    /// Id of the last successfully delivered event; sent as `Last-Event-ID`
    /// on the next attempt. Advanced only after the callback returns Ok.
    last_event_id: String,
    backoff: ReconnectBackoff,
}

impl ConnectionState {
    fn new(config: &ClientConfig) -> Self {
        Self {
            last_event_id: String::new(),
            backoff: ReconnectBackoff::with_config(
                config.initial_backoff,
                config.max_backoff,
                config.resume_delay,
            ),
        }
    }
}

impl FlagsClient {
    /// Watch the event feed until cancelled or the callback returns an error.
    ///
    /// The callback is invoked synchronously, once per complete event, in
    /// wire order; the next line is not read until it returns. A callback
    /// error ends the whole watch as [`WatchError::Callback`]; cancellation
    /// ends it as [`WatchError::Cancelled`]. Everything else reconnects:
    /// transport errors with exponential backoff up to the configured
    /// ceiling, a clean end-of-stream after the short resume delay. A
    /// positive `retry:` field from the server overrides the computed delay
    /// for the sleep that immediately follows the attempt it was seen in.
    pub async fn watch<F>(
        &self,
        request: &WatchRequest,
        cancel: &CancelToken,
        mut on_event: F,
    ) -> Result<(), WatchError>
    where
        F: FnMut(Event) -> Result<(), CallbackError>,
    {
        let mut state = ConnectionState::new(&self.config);
        loop {
            // Fail fast before opening a socket.
            if cancel.is_cancelled() {
                return Err(WatchError::Cancelled);
            }

            debug!(
                "opening event stream (last_event_id: {:?})",
                state.last_event_id
            );
            let (retry_override, outcome) =
                match self.open_stream(request, &state.last_event_id).await {
                    Ok(response) => {
                        info!("event stream connected");
                        consume_stream(response, cancel, &mut state.last_event_id, &mut on_event)
                            .await
                    }
                    Err(err) => (None, Err(err)),
                };

            match outcome {
                Err(WatchError::Cancelled) => return Err(WatchError::Cancelled),
                Err(err @ WatchError::Callback(_)) => return Err(err),
                Err(WatchError::Disconnected) => {
                    debug!("server closed the stream, reconnecting shortly");
                    state.backoff.set_resume();
                }
                Err(err) => {
                    state.backoff.record_failure();
                    warn!(
                        "stream attempt failed ({}), retry {} in {:?}",
                        err,
                        state.backoff.failure_count(),
                        state.backoff.current()
                    );
                }
                Ok(()) => state.backoff.reset(),
            }

            // A server-suggested retry delay wins for this sleep only.
            let delay = retry_override.unwrap_or_else(|| state.backoff.current());
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WatchError::Cancelled),
                _ = sleep(delay) => {}
            }
        }
    }
}

/// Consume one response body until it ends, delivering complete events.
///
/// Returns the server's `retry:` override (if any) together with the attempt
/// outcome. Dropping the response on every return path releases the socket.
async fn consume_stream<F>(
    response: reqwest::Response,
    cancel: &CancelToken,
    last_event_id: &mut String,
    on_event: &mut F,
) -> (Option<std::time::Duration>, Result<(), WatchError>)
where
    F: FnMut(Event) -> Result<(), CallbackError>,
{
    let mut body = response.bytes_stream();
    let mut parser = SseParser::new();
    let mut buffer = BytesMut::new();

    loop {
        // Cancellation takes priority over stream progress and over how the
        // read would otherwise be classified.
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return (parser.retry_override(), Err(WatchError::Cancelled));
            }
            chunk = body.next() => chunk,
        };

        match chunk {
            None => {
                let err = if cancel.is_cancelled() {
                    WatchError::Cancelled
                } else {
                    WatchError::Disconnected
                };
                return (parser.retry_override(), Err(err));
            }
            Some(Err(err)) => {
                let err = if cancel.is_cancelled() {
                    WatchError::Cancelled
                } else {
                    WatchError::Http(err)
                };
                return (parser.retry_override(), Err(err));
            }
            Some(Ok(bytes)) => {
                buffer.extend_from_slice(&bytes);
                while let Some(line) = next_line(&mut buffer) {
                    if let Some(event) = parser.feed_line(&line) {
                        let id = event.id.clone();
                        if let Err(err) = on_event(event) {
                            return (parser.retry_override(), Err(WatchError::Callback(err)));
                        }
                        // Committed only after successful delivery.
                        *last_event_id = id;
                    }
                }
            }
        }
    }
}

/// Pop the next complete line off the buffer, tolerating LF and CRLF.
///
/// Bytes after the last newline stay buffered, so multi-byte characters and
/// events split across network chunks reassemble correctly.
fn next_line(buffer: &mut BytesMut) -> Option<String> {
    let pos = buffer.iter().position(|&b| b == b'\n')?;
    let raw = buffer.split_to(pos + 1);
    let mut end = raw.len() - 1;
    if end > 0 && raw[end - 1] == b'\r' {
        end -= 1;
    }
    Some(String::from_utf8_lossy(&raw[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_line_lf_and_crlf() {
        let mut buffer = BytesMut::from(&b"data: a\r\ndata: b\n"[..]);
        assert_eq!(next_line(&mut buffer).as_deref(), Some("data: a"));
        assert_eq!(next_line(&mut buffer).as_deref(), Some("data: b"));
        assert_eq!(next_line(&mut buffer), None);
    }

    #[test]
    fn test_next_line_keeps_partial_tail() {
        let mut buffer = BytesMut::from(&b"id: 1\nda"[..]);
        assert_eq!(next_line(&mut buffer).as_deref(), Some("id: 1"));
        assert_eq!(next_line(&mut buffer), None);
        buffer.extend_from_slice(b"ta: x\n");
        assert_eq!(next_line(&mut buffer).as_deref(), Some("data: x"));
    }

    #[test]
    fn test_next_line_blank_lines() {
        let mut buffer = BytesMut::from(&b"\n\r\n"[..]);
        assert_eq!(next_line(&mut buffer).as_deref(), Some(""));
        assert_eq!(next_line(&mut buffer).as_deref(), Some(""));
    }

    #[test]
    fn test_next_line_reassembles_split_utf8() {
        // "é" is 0xC3 0xA9; split the chunks between the two bytes
        let mut buffer = BytesMut::from(&b"data: caf\xc3"[..]);
        assert_eq!(next_line(&mut buffer), None);
        buffer.extend_from_slice(b"\xa9\n");
        assert_eq!(next_line(&mut buffer).as_deref(), Some("data: café"));
    }

    #[test]
    fn test_connection_state_defaults() {
        let state = ConnectionState::new(&ClientConfig::default());
        assert!(state.last_event_id.is_empty());
        assert_eq!(state.backoff.current(), std::time::Duration::from_secs(1));
    }
}
