//! Error taxonomy for the watch subsystem.
//!
//! The connection manager classifies every attempt outcome into one of four
//! buckets: cancellation (terminal, silent), clean disconnect (short resume
//! delay), transport failure (exponential backoff, retried forever), and
//! callback rejection (terminal for the whole watch).

use thiserror::Error;

/// Error returned by an event callback. Boxed so callers can surface any
/// error type through the watch without an extra generic parameter.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while opening or consuming an event stream.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The caller requested the watch to stop.
    #[error("watch cancelled")]
    Cancelled,

    /// The server closed the stream without error (clean end-of-stream).
    #[error("server closed the event stream")]
    Disconnected,

    /// Connection failure or mid-stream I/O error.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The subscription endpoint answered with a non-2xx status.
    #[error("server returned status {status}")]
    Status { status: u16 },

    /// The event callback rejected an event.
    #[error("event callback failed: {0}")]
    Callback(#[source] CallbackError),
}

impl WatchError {
    /// Terminal errors end the whole watch; everything else is retried.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WatchError::Cancelled | WatchError::Callback(_))
    }

    /// Check if the watch loop should open another connection after this.
    pub fn should_reconnect(&self) -> bool {
        !self.is_terminal()
    }
}
