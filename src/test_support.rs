//! Test doubles shared by the in-crate tests.
//!
//! - [`LineConn`]: a connection whose "handshake" is a single text line
//!   (`publish <name>` or `play <name>`), answered with `ok`
//! - [`channel_listener`]: a listener fed from a [`Dialer`] over in-memory
//!   duplex streams, with a way to inject accept errors
//! - [`EventLog`]: a thread-safe recorder for hook calls and events

use crate::connection::{Connection, PrepareError, Role};
use crate::protocol::Stage;
use crate::transport::{BufReadWriter, Listener, Transport};
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::task::{Context, Poll};
use tokio::io::{
    duplex, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, DuplexStream, ReadBuf,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-writer subscriber once per process.
///
/// Honors `RUST_LOG`, defaulting to trace output for this crate.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("rtmp_server=trace"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_ansi(false)
            .try_init();
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Read one command line and acknowledge it
    Script,
    /// Never finish preparing and never touch the transport
    Stall,
}

pub struct LineConn<S = ProbeIo> {
    rw: BufReadWriter<Transport<S>>,
    role: Role,
    pub id: usize,
    pub mode: Mode,
    pub command: Option<String>,
    pub last_error: Option<String>,
    /// Stage and aux value of the last `prepare` call
    pub requested: Option<(Stage, u32)>,
    /// Transport deadline seen when `prepare` started
    pub prepare_deadline: Option<Instant>,
}

impl<S> LineConn<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn run(&mut self, stage: Stage) -> Result<(), PrepareError> {
        if self.mode == Mode::Stall {
            std::future::pending::<()>().await;
        }

        let mut line = String::new();
        if self.rw.read_line(&mut line).await? == 0 {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        let line = line.trim_end().to_string();

        match line.split_whitespace().next() {
            Some("publish") | Some("play") => {}
            _ => return Err(PrepareError::Protocol(format!("unexpected command: {line}"))),
        }

        if stage > Stage::GotPublishOrPlayCommand {
            return Err(PrepareError::UnexpectedStage {
                wanted: stage,
                reached: Stage::GotPublishOrPlayCommand,
            });
        }

        self.rw.write_all(b"ok\n").await?;
        self.rw.flush().await?;
        self.command = Some(line);
        Ok(())
    }
}

#[async_trait]
impl<S> Connection for LineConn<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Io = S;

    fn new(rw: BufReadWriter<Transport<S>>, role: Role) -> Self {
        Self {
            rw,
            role,
            id: 0,
            mode: Mode::Script,
            command: None,
            last_error: None,
            requested: None,
            prepare_deadline: None,
        }
    }

    fn role(&self) -> Role {
        self.role
    }

    async fn prepare(&mut self, stage: Stage, aux: u32) -> Result<(), PrepareError> {
        self.requested = Some((stage, aux));
        self.prepare_deadline = self.rw.get_ref().handle().deadline();
        let result = self.run(stage).await;
        if let Err(e) = &result {
            self.last_error = Some(e.to_string());
        }
        result
    }

    fn into_inner(self) -> BufReadWriter<Transport<S>> {
        self.rw
    }
}

/// A duplex stream that counts successful shutdowns.
pub struct ProbeIo {
    inner: DuplexStream,
    shutdowns: Arc<AtomicUsize>,
}

impl AsyncRead for ProbeIo {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for ProbeIo {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let result = Pin::new(&mut self.inner).poll_shutdown(cx);
        if let Poll::Ready(Ok(())) = result {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
        result
    }
}

pub struct ChannelListener {
    rx: mpsc::UnboundedReceiver<io::Result<ProbeIo>>,
    accepted: u16,
}

#[async_trait]
impl Listener for ChannelListener {
    type Io = ProbeIo;

    async fn accept(&mut self) -> io::Result<(ProbeIo, SocketAddr)> {
        match self.rx.recv().await {
            Some(Ok(io)) => {
                self.accepted += 1;
                let addr = SocketAddr::from(([127, 0, 0, 1], 40000 + self.accepted));
                Ok((io, addr))
            }
            Some(Err(e)) => Err(e),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "dialer dropped")),
        }
    }
}

#[derive(Clone)]
pub struct Dialer {
    tx: mpsc::UnboundedSender<io::Result<ProbeIo>>,
    shutdowns: Arc<AtomicUsize>,
}

impl Dialer {
    /// Queues a new connection and returns the client end.
    pub fn connect(&self) -> DuplexStream {
        let (client, server) = duplex(4096);
        let io = ProbeIo {
            inner: server,
            shutdowns: Arc::clone(&self.shutdowns),
        };
        self.tx.send(Ok(io)).expect("listener dropped");
        client
    }

    /// Makes the listener's next accept fail with `err`.
    pub fn fail(&self, err: io::Error) {
        self.tx.send(Err(err)).expect("listener dropped");
    }

    /// Shutdown count across every stream this dialer created.
    pub fn shutdowns(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.shutdowns)
    }
}

pub fn channel_listener() -> (ChannelListener, Dialer) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ChannelListener { rx, accepted: 0 },
        Dialer {
            tx,
            shutdowns: Arc::new(AtomicUsize::new(0)),
        },
    )
}

#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<(usize, String)>>>,
    errors: Arc<Mutex<Vec<(usize, String)>>>,
}

impl EventLog {
    pub fn push(&self, id: usize, entry: &str) {
        self.events.lock().unwrap().push((id, entry.to_string()));
    }

    pub fn push_error(&self, id: usize, error: String) {
        self.errors.lock().unwrap().push((id, error));
    }

    pub fn events_for(&self, id: usize) -> Vec<String> {
        Self::entries_for(&self.events, id)
    }

    pub fn errors_for(&self, id: usize) -> Vec<String> {
        Self::entries_for(&self.errors, id)
    }

    fn entries_for(entries: &Mutex<Vec<(usize, String)>>, id: usize) -> Vec<String> {
        entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(entry_id, _)| *entry_id == id)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}
