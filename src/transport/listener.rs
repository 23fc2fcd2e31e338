//! Connection Acceptors
//!
//! The accept loop is written against the [`Listener`] trait rather than
//! `TcpListener` directly, so it can be driven by any source of streams.

use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};

/// A source of accepted byte streams.
#[async_trait]
pub trait Listener: Send {
    /// The stream type produced for each accepted peer.
    type Io: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Waits for the next peer.
    ///
    /// An error ends the accept loop; it is never retried.
    async fn accept(&mut self) -> io::Result<(Self::Io, SocketAddr)>;
}

#[async_trait]
impl Listener for TcpListener {
    type Io = TcpStream;

    async fn accept(&mut self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }
}
