//! RTMP Protocol Vocabulary
//!
//! The small set of protocol-level identifiers the accept layer needs:
//! lifecycle event codes and handshake stages. The handshake bytes, chunk
//! streams and AMF commands themselves belong to the connection
//! implementation, not to this crate.
//!
//! ## Modules
//!
//! - `event`: Lifecycle event codes with stable labels
//! - `stage`: Ordered handshake checkpoints
//!
//! ## Example
//!
//! ```
//! use rtmp_server::protocol::{Event, Stage};
//!
//! assert_eq!(Event::ConnConnected.code(), 1);
//! assert_eq!(Event::try_from(2), Ok(Event::HandshakeFailed));
//! assert!(Stage::HandshakeDone < Stage::GotPublishOrPlayCommand);
//! ```

pub mod event;
pub mod stage;

// Re-export commonly used types for convenience
pub use event::{Event, UnknownEvent};
pub use stage::Stage;
