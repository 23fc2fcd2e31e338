//! Transport Module
//!
//! Everything between the socket and the connection object: the acceptor
//! abstraction, the deadline-aware stream, and the buffered adapter the
//! connection reads and writes through.
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ BufReadWriter   (4 KB read + 4 KB write)    │  owned by the Connection
//! ├─────────────────────────────────────────────┤
//! │ Transport       (absolute I/O deadline)     │  controlled via TransportHandle
//! ├─────────────────────────────────────────────┤
//! │ Listener::Io    (TcpStream, DuplexStream)   │  produced by Listener::accept
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use rtmp_server::transport::{BufReadWriter, Transport};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (_client, server) = tokio::io::duplex(1024);
//! let transport = Transport::new(server, "127.0.0.1:1935".parse().unwrap());
//! let handle = transport.handle();
//!
//! handle.set_timeout(Duration::from_secs(15));
//! let _rw = BufReadWriter::new(transport);
//! assert!(handle.deadline().is_some());
//! # }
//! ```

pub mod bufio;
pub mod deadline;
pub mod listener;

// Re-export commonly used types
pub use bufio::{bufio_size, set_bufio_size, BufReadWriter, DEFAULT_BUFIO_SIZE};
pub use deadline::{Transport, TransportHandle};
pub use listener::Listener;
