//! Accept Loop and Connection Pipeline
//!
//! The server accepts sockets forever and gives each one its own task.
//! That task builds the connection, bounds the handshake by a deadline,
//! and either hands the connection to the application or closes it.
//!
//! ## Per-Connection State Machine
//!
//! ```text
//! Accepted
//!    │  wrap in Transport + BufReadWriter
//!    ▼
//! Constructed ── on_new_conn hook
//!    │
//!    ▼
//! Connected ──── report ConnConnected, arm io_timeout deadline
//!    │
//!    ▼
//! Handshaking ── prepare(GotPublishOrPlayCommand, 0) within handshake_timeout
//!    │
//!    ├── Err ──> report HandshakeFailed, close transport        (terminal)
//!    │
//!    └── Ok ───> clear deadline, await application handler      (terminal)
//! ```
//!
//! Nothing a single connection does can reach the accept loop or its
//! siblings: each task owns its connection and transport outright and
//! only reads the shared configuration snapshot.

use crate::connection::{Connection, PrepareError, Role};
use crate::protocol::{Event, Stage};
use crate::server::config::ServerConfig;
use crate::transport::{BufReadWriter, Listener, Transport, TransportHandle};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{debug, error, trace};

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound
    #[error("failed to bind listener: {0}")]
    Bind(#[source] io::Error),

    /// The listener's accept failed; the accept loop has stopped
    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),
}

/// Accepts connections and drives each one through the handshake.
///
/// # Example
///
/// ```ignore
/// use rtmp_server::{Event, Server};
///
/// let server = Server::<MyConn>::new()
///     .on_new_conn(|conn| conn.set_id(next_id()))
///     .log_event(|_, transport, event| {
///         tracing::info!(client = %transport.peer_addr(), event = %event, "rtmp event");
///     })
///     .handle_conn(|conn, transport| async move {
///         serve_stream(conn, transport).await;
///     });
///
/// server.listen_and_serve((rtmp_server::DEFAULT_HOST, rtmp_server::DEFAULT_PORT)).await?;
/// ```
#[derive(Debug)]
pub struct Server<C: Connection> {
    config: ServerConfig<C>,
}

impl<C: Connection> Server<C> {
    /// Creates a server with no callbacks and a 10 second handshake timeout.
    pub fn new() -> Self {
        Self::with_config(ServerConfig::new())
    }

    /// Creates a server from a prepared configuration.
    pub fn with_config(config: ServerConfig<C>) -> Self {
        Self { config }
    }

    /// Returns the configuration the next `serve` call will snapshot.
    pub fn config(&self) -> &ServerConfig<C> {
        &self.config
    }

    /// Mutable access to the configuration.
    ///
    /// `serve` borrows the server, so the configuration cannot change while
    /// it runs; edits apply to the next call.
    pub fn config_mut(&mut self) -> &mut ServerConfig<C> {
        &mut self.config
    }

    /// See [`ServerConfig::on_new_conn`].
    pub fn on_new_conn<F>(self, hook: F) -> Self
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        Self::with_config(self.config.on_new_conn(hook))
    }

    /// See [`ServerConfig::handle_conn`].
    pub fn handle_conn<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(C, TransportHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::with_config(self.config.handle_conn(handler))
    }

    /// See [`ServerConfig::log_event`].
    pub fn log_event<F>(self, reporter: F) -> Self
    where
        F: Fn(&C, &TransportHandle, Event) + Send + Sync + 'static,
    {
        Self::with_config(self.config.log_event(reporter))
    }

    /// See [`ServerConfig::with_handshake_timeout`].
    pub fn handshake_timeout(self, timeout: Duration) -> Self {
        Self::with_config(self.config.with_handshake_timeout(timeout))
    }

    /// See [`ServerConfig::with_io_timeout`].
    pub fn io_timeout(self, timeout: Duration) -> Self {
        Self::with_config(self.config.with_io_timeout(timeout))
    }

    /// Runs the accept loop until the listener fails.
    ///
    /// Each accepted stream is handled on its own task, so a slow handshake
    /// or a long-running handler never delays the next accept. Connections
    /// already spawned keep running after this returns.
    ///
    /// Only ever returns `Err`, carrying the listener's own error.
    pub async fn serve<L>(&self, mut listener: L) -> Result<(), ServerError>
    where
        L: Listener<Io = C::Io>,
    {
        let config = Arc::new(self.config.clone());

        if !config.has_handler() {
            debug!("Serving without a connection handler; prepared connections will be closed");
        }

        loop {
            let (io, addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    debug!(error = %e, "Accept failed, stopping server");
                    return Err(ServerError::Accept(e));
                }
            };

            trace!(client = %addr, "Accepted connection");
            tokio::spawn(handle_accepted(Arc::clone(&config), io, addr));
        }
    }
}

impl<C: Connection<Io = tokio::net::TcpStream>> Server<C> {
    /// Binds a TCP listener on `addr` and serves it.
    pub async fn listen_and_serve<A: ToSocketAddrs>(&self, addr: A) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr).await.map_err(ServerError::Bind)?;
        if let Ok(local) = listener.local_addr() {
            debug!(address = %local, "Listening");
        }
        self.serve(listener).await
    }
}

impl<C: Connection> Default for Server<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one accepted stream from construction to handoff or close.
async fn handle_accepted<C: Connection>(config: Arc<ServerConfig<C>>, io: C::Io, addr: SocketAddr) {
    let transport = Transport::new(io, addr);
    let handle = transport.handle();
    let mut conn = C::new(BufReadWriter::new(transport), Role::Server);

    if let Some(hook) = &config.on_new_conn {
        hook(&mut conn);
    }

    config.report(&conn, &handle, Event::ConnConnected);

    handle.set_timeout(config.io_timeout);

    let prepared = tokio::time::timeout(
        config.handshake_timeout,
        conn.prepare(Stage::GotPublishOrPlayCommand, 0),
    )
    .await
    .unwrap_or(Err(PrepareError::TimedOut(config.handshake_timeout)));

    if let Err(e) = prepared {
        debug!(client = %addr, error = %e, "Handshake failed");
        config.report(&conn, &handle, Event::HandshakeFailed);
        close(conn, addr).await;
        return;
    }

    handle.clear_deadline();

    match &config.handle_conn {
        Some(handler) => {
            trace!(client = %addr, "Handing off connection");
            handler(conn, handle).await;
        }
        None => {
            error!(client = %addr, "No connection handler configured, closing connection");
            close(conn, addr).await;
        }
    }
}

/// Closes a connection's transport. Takes the connection by value, so a
/// transport can only be closed once.
async fn close<C: Connection>(conn: C, addr: SocketAddr) {
    let transport = conn.into_inner().into_inner();
    if let Err(e) = transport.close().await {
        trace!(client = %addr, error = %e, "Error while closing transport");
    }
}
