//! Server Module
//!
//! The accept loop and the per-connection pipeline, plus the
//! configuration that feeds them.
//!
//! ## Example
//!
//! ```ignore
//! use rtmp_server::server::{Server, ServerConfig};
//! use std::time::Duration;
//!
//! let config = ServerConfig::<MyConn>::new()
//!     .with_handshake_timeout(Duration::from_secs(5))
//!     .handle_conn(|conn, transport| async move { play(conn, transport).await });
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:1935").await?;
//! let err = Server::with_config(config).serve(listener).await;
//! ```

pub mod config;
#[allow(clippy::module_inception)]
pub mod server;

// Re-export commonly used types
pub use config::{
    BoxFuture, ConnHandler, EventLogger, NewConnHook, ServerConfig, DEFAULT_HANDSHAKE_TIMEOUT,
    PRE_HANDSHAKE_TIMEOUT,
};
pub use server::{Server, ServerError};
