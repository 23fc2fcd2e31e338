//! Handshake Stages
//!
//! A connection is prepared "up to" a stage: the collaborator runs the
//! handshake and reads commands until it has reached the requested
//! checkpoint. Stages are ordered, so a connection that is already past a
//! stage satisfies a request for it.

use std::fmt;

/// A checkpoint within the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// The C0/C1/C2 and S0/S1/S2 exchange has completed.
    HandshakeDone,

    /// The peer has sent its `publish` or `play` command.
    GotPublishOrPlayCommand,

    /// Codec metadata for the stream has been received.
    GotCodecData,
}

impl Stage {
    /// Returns a stable label for logging.
    pub fn label(self) -> &'static str {
        match self {
            Stage::HandshakeDone => "handshake-done",
            Stage::GotPublishOrPlayCommand => "got-publish-or-play",
            Stage::GotCodecData => "got-codec-data",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
