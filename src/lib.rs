//! # rtmp-server - Connection Acceptance for an RTMP Server
//!
//! This crate owns the first few seconds of every RTMP connection: it
//! accepts the socket, builds a protocol connection over a buffered,
//! deadline-bounded transport, drives the handshake up to the client's
//! `publish` or `play` command, and hands the result to the application.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Server                                     │
//! │                                                                         │
//! │  ┌─────────────┐  spawn   ┌──────────────────────────────────────────┐  │
//! │  │  Listener   │─────────>│  Per-connection task                     │  │
//! │  │ accept loop │          │                                          │  │
//! │  └─────────────┘          │  Transport ─> BufReadWriter ─> Connection│  │
//! │        │                  │       │                          │       │  │
//! │        │ accept error     │  deadline armed       on_new_conn hook   │  │
//! │        ▼                  │       │                          │       │  │
//! │  serve() returns          │       └──── prepare(stage) ◄─────┘       │  │
//! │                           │                  │                       │  │
//! │                           │        ┌─────────┴─────────┐             │  │
//! │                           │        ▼                   ▼             │  │
//! │                           │  HandshakeFailed      handle_conn        │  │
//! │                           │  + close              (owns it now)      │  │
//! │                           └──────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use rtmp_server::{Event, Server};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rtmp_server::ServerError> {
//!     let server = Server::<MyRtmpConn>::new()
//!         .log_event(|_, transport, event| {
//!             tracing::info!(client = %transport.peer_addr(), %event, "rtmp");
//!         })
//!         .handle_conn(|conn, _transport| async move {
//!             relay(conn).await;
//!         });
//!
//!     server
//!         .listen_and_serve((rtmp_server::DEFAULT_HOST, rtmp_server::DEFAULT_PORT))
//!         .await
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: Event codes and handshake stages
//! - [`transport`]: Listener trait, deadline-aware transport, buffered adapter
//! - [`connection`]: The contract a protocol connection implements
//! - [`server`]: Configuration and the accept loop
//!
//! ## Design Highlights
//!
//! ### Isolation
//!
//! Every accepted socket gets its own Tokio task. A stalled handshake or a
//! handler that never returns occupies only that task; the accept loop
//! keeps going. Tasks share nothing mutable, only a read-only snapshot of
//! the configuration taken when `serve` starts.
//!
//! ### Deadlines
//!
//! The transport carries an absolute deadline that fails reads and writes
//! with `TimedOut` once passed. It is armed before the handshake and
//! cleared before handoff, so the application starts with an unbounded
//! transport and sets its own timing.

pub mod connection;
pub mod protocol;
pub mod server;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types for convenience
pub use connection::{Connection, PrepareError, Role};
pub use protocol::{Event, Stage, UnknownEvent};
pub use server::{
    Server, ServerConfig, ServerError, DEFAULT_HANDSHAKE_TIMEOUT, PRE_HANDSHAKE_TIMEOUT,
};
pub use transport::{
    bufio_size, set_bufio_size, BufReadWriter, Listener, Transport, TransportHandle,
    DEFAULT_BUFIO_SIZE,
};

/// The default RTMP port
pub const DEFAULT_PORT: u16 = 1935;

/// The default bind address (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Version of rtmp-server
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
