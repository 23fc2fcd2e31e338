//! The Connection Contract
//!
//! The server never looks inside a connection. It builds one per accepted
//! socket, asks it to prepare up to a stage, and hands it to the
//! application. This trait is that whole surface.

use crate::protocol::Stage;
use crate::transport::{BufReadWriter, Transport};
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Which side of the handshake a connection plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Dialled out; sends C0/C1 first.
    Client,
    /// Accepted; answers with S0/S1/S2.
    Server,
}

/// Errors that can occur while preparing a connection.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// I/O error, including a transport deadline being exceeded
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The peer violated the handshake or command sequence
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The peer sent something that does not lead to the requested stage
    #[error("cannot reach stage {wanted} from {reached}")]
    UnexpectedStage { wanted: Stage, reached: Stage },

    /// Preparation did not finish within the handshake timeout
    #[error("handshake timed out after {0:?}")]
    TimedOut(Duration),
}

impl PrepareError {
    /// Returns true if the failure was caused by a deadline or timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            PrepareError::Io(err) => err.kind() == io::ErrorKind::TimedOut,
            PrepareError::TimedOut(_) => true,
            _ => false,
        }
    }
}

/// A protocol connection driven by the server.
///
/// Implementations own the buffered transport for their whole life and
/// give it back through [`Connection::into_inner`] when the owner needs to
/// close it.
#[async_trait]
pub trait Connection: Sized + Send + 'static {
    /// The raw stream type underneath the transport.
    type Io: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Builds a connection over a buffered transport.
    ///
    /// The role is fixed here and never changes afterwards.
    fn new(rw: BufReadWriter<Transport<Self::Io>>, role: Role) -> Self;

    /// Returns the role given at construction.
    fn role(&self) -> Role;

    /// Runs the handshake and reads commands until `stage` is reached.
    ///
    /// `aux` is passed through untouched for handshake variants; the
    /// server always sends `0`.
    async fn prepare(&mut self, stage: Stage, aux: u32) -> Result<(), PrepareError>;

    /// Consumes the connection, returning its buffered transport.
    fn into_inner(self) -> BufReadWriter<Transport<Self::Io>>;
}
