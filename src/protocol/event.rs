//! Connection Lifecycle Events
//!
//! Event codes reported to the event callback as a connection moves
//! through the server. The numeric codes and labels are stable so log
//! and metrics sinks can render them without help from the server.
//!
//! ## Emission Order
//!
//! ```text
//! accept ──> ConnConnected ──> handshake ──┬──> (handoff, no event)
//!                                          │
//!                                          └──> HandshakeFailed
//! ```
//!
//! `ConnConnectFailed` and `ConnDisconnected` belong to the same vocabulary
//! but are reported by collaborators (client dialers, application handlers),
//! never by the accept loop itself.

use std::fmt;
use thiserror::Error;

/// A lifecycle event for a single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Event {
    /// The socket was accepted and a connection object was built for it.
    ConnConnected = 1,

    /// The handshake did not reach the requested stage.
    HandshakeFailed = 2,

    /// The connection was closed after handoff.
    ConnDisconnected = 4,

    /// An outgoing connection attempt failed.
    ConnConnectFailed = 5,
}

/// Returned when converting an integer that is not a known event code.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unknown event code: {0}")]
pub struct UnknownEvent(pub i32);

impl Event {
    /// Every event code, in numeric order.
    pub const ALL: [Event; 4] = [
        Event::ConnConnected,
        Event::HandshakeFailed,
        Event::ConnDisconnected,
        Event::ConnConnectFailed,
    ];

    /// Returns the stable numeric code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Returns the stable human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Event::ConnConnected => "Connected",
            Event::HandshakeFailed => "HandshakeFailed",
            Event::ConnDisconnected => "ConnDisconnected",
            Event::ConnConnectFailed => "ConnectFailed",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<i32> for Event {
    type Error = UnknownEvent;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Event::ALL
            .into_iter()
            .find(|event| event.code() == code)
            .ok_or(UnknownEvent(code))
    }
}

impl From<Event> for i32 {
    fn from(event: Event) -> Self {
        event.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(Event::ConnConnected.code(), 1);
        assert_eq!(Event::HandshakeFailed.code(), 2);
        assert_eq!(Event::ConnDisconnected.code(), 4);
        assert_eq!(Event::ConnConnectFailed.code(), 5);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Event::ConnConnected.to_string(), "Connected");
        assert_eq!(Event::HandshakeFailed.to_string(), "HandshakeFailed");
        assert_eq!(Event::ConnDisconnected.to_string(), "ConnDisconnected");
        assert_eq!(Event::ConnConnectFailed.to_string(), "ConnectFailed");
    }

    #[test]
    fn test_try_from_code() {
        for event in Event::ALL {
            assert_eq!(Event::try_from(i32::from(event)), Ok(event));
        }
        assert_eq!(Event::try_from(3), Err(UnknownEvent(3)));
        assert_eq!(
            UnknownEvent(0).to_string(),
            "unknown event code: 0"
        );
    }
}
