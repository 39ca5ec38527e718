//! flagwatch - resilient SSE watch client for feature-flag change events.
//!
//! Maintains a long-lived subscription to a flag-management service's event
//! feed across network interruptions, server restarts, and idle timeouts.
//! Transient failures are retried forever with exponential backoff; only
//! cancellation and a callback error end a watch.
//!
//! ```no_run
//! use flagwatch::{CancelToken, FlagsClient, WatchRequest};
//!
//! # async fn run() -> Result<(), flagwatch::WatchError> {
//! let client = FlagsClient::with_base_url("https://flags.example.com");
//! let cancel = CancelToken::new();
//! let request = WatchRequest {
//!     projects: vec!["web".to_string()],
//!     ..Default::default()
//! };
//! client
//!     .watch(&request, &cancel, |event| {
//!         println!("{}: {}", event.event_type, event.data);
//!         Ok(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod cancel;
pub mod client;
pub mod error;
pub mod models;
pub mod request;
pub mod sse;
pub mod watch;

pub use backoff::ReconnectBackoff;
pub use cancel::CancelToken;
pub use client::{ClientConfig, FlagsClient};
pub use error::{CallbackError, WatchError};
pub use models::{FlagChange, FlagValue};
pub use request::WatchRequest;
pub use sse::{Event, SseParser};
