//! Server Configuration
//!
//! The three callback slots and the two timeouts that shape how accepted
//! connections are driven. Every slot is optional; an empty slot skips
//! that step of the pipeline.
//!
//! `Server::serve` takes a snapshot of the configuration when it starts
//! and shares it read-only with every connection task. Changes made after
//! that point only apply to later calls to `serve`.

use crate::protocol::Event;
use crate::transport::TransportHandle;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Default bound on the whole `prepare` call (10 seconds)
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport deadline armed before the handshake starts (15 seconds)
pub const PRE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(15);

/// A boxed, sendable future returned by the application handler.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Called once per connection, right after it is constructed.
pub type NewConnHook<C> = Arc<dyn Fn(&mut C) + Send + Sync>;

/// Takes ownership of a prepared connection for the rest of its life.
pub type ConnHandler<C> = Arc<dyn Fn(C, TransportHandle) -> BoxFuture + Send + Sync>;

/// Called inline at each lifecycle transition.
pub type EventLogger<C> = Arc<dyn Fn(&C, &TransportHandle, Event) + Send + Sync>;

/// Callbacks and timeouts for a [`Server`](crate::server::Server).
pub struct ServerConfig<C> {
    pub(crate) on_new_conn: Option<NewConnHook<C>>,
    pub(crate) handle_conn: Option<ConnHandler<C>>,
    pub(crate) log_event: Option<EventLogger<C>>,

    /// Upper bound on the whole `prepare` call, independent of I/O
    pub handshake_timeout: Duration,

    /// Transport deadline armed before `prepare` and cleared after it
    pub io_timeout: Duration,
}

impl<C> ServerConfig<C> {
    /// Creates a configuration with no callbacks and default timeouts.
    pub fn new() -> Self {
        Self {
            on_new_conn: None,
            handle_conn: None,
            log_event: None,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            io_timeout: PRE_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the hook run on each new connection before any I/O.
    pub fn on_new_conn<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut C) + Send + Sync + 'static,
    {
        self.on_new_conn = Some(Arc::new(hook));
        self
    }

    /// Sets the application handler that receives prepared connections.
    pub fn handle_conn<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(C, TransportHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handle_conn = Some(Arc::new(move |conn: C, handle: TransportHandle| {
            Box::pin(handler(conn, handle)) as BoxFuture
        }));
        self
    }

    /// Sets the event reporter.
    ///
    /// The reporter runs inline on the connection's task; a slow reporter
    /// delays only that connection.
    pub fn log_event<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&C, &TransportHandle, Event) + Send + Sync + 'static,
    {
        self.log_event = Some(Arc::new(reporter));
        self
    }

    /// Sets the upper bound on the whole `prepare` call.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Sets the transport deadline armed before `prepare`.
    ///
    /// A timeout too large to represent arms no deadline at all.
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Returns true if an application handler is configured.
    pub fn has_handler(&self) -> bool {
        self.handle_conn.is_some()
    }

    /// Reports an event if a reporter is configured.
    pub(crate) fn report(&self, conn: &C, handle: &TransportHandle, event: Event) {
        if let Some(reporter) = &self.log_event {
            reporter(conn, handle, event);
        }
    }
}

impl<C> Default for ServerConfig<C> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impl: the callbacks are shared, so `C` itself need not be Clone
impl<C> Clone for ServerConfig<C> {
    fn clone(&self) -> Self {
        Self {
            on_new_conn: self.on_new_conn.clone(),
            handle_conn: self.handle_conn.clone(),
            log_event: self.log_event.clone(),
            handshake_timeout: self.handshake_timeout,
            io_timeout: self.io_timeout,
        }
    }
}

impl<C> fmt::Debug for ServerConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("on_new_conn", &self.on_new_conn.is_some())
            .field("handle_conn", &self.handle_conn.is_some())
            .field("log_event", &self.log_event.is_some())
            .field("handshake_timeout", &self.handshake_timeout)
            .field("io_timeout", &self.io_timeout)
            .finish()
    }
}
