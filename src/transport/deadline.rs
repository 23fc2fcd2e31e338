//! Deadline-Aware Transport
//!
//! Tokio streams have no notion of an I/O deadline, but the accept layer
//! needs one: the deadline is armed before the handshake, enforced on every
//! read and write the connection performs, and cleared before handoff.
//!
//! ## Design
//!
//! ```text
//!   Server ──holds──> TransportHandle ──┐
//!                                       │  Arc<Mutex<DeadlineState>>
//!   Connection ──owns──> Transport<S> ──┘
//! ```
//!
//! The transport and its handle share one deadline slot. Each I/O
//! direction keeps its own timer so that split halves polled from
//! different tasks are all woken when the deadline passes. Changing the
//! deadline wakes any pending operation so it re-reads the new value.
//!
//! Operations attempted at or after the deadline fail with
//! [`io::ErrorKind::TimedOut`]. Shutdown ignores the deadline so that a
//! timed-out transport can still be closed.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll, Waker};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::time::{sleep_until, Instant, Sleep};

#[derive(Debug, Default)]
struct DeadlineState {
    at: Option<Instant>,
    read_waker: Option<Waker>,
    write_waker: Option<Waker>,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Read,
    Write,
}

/// A cloneable control handle for a [`Transport`].
///
/// The handle carries the peer address and controls the transport's
/// deadline. It never touches the bytes themselves.
#[derive(Debug, Clone)]
pub struct TransportHandle {
    peer_addr: SocketAddr,
    state: Arc<Mutex<DeadlineState>>,
}

impl TransportHandle {
    /// Returns the remote address of the transport.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Returns the current absolute deadline, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.lock().at
    }

    /// Sets the absolute deadline for all future and pending I/O.
    ///
    /// `None` removes the deadline.
    pub fn set_deadline(&self, at: Option<Instant>) {
        let (read_waker, write_waker) = {
            let mut state = self.lock();
            state.at = at;
            (state.read_waker.take(), state.write_waker.take())
        };

        if let Some(waker) = read_waker {
            waker.wake();
        }
        if let Some(waker) = write_waker {
            waker.wake();
        }
    }

    /// Arms the deadline at `now + timeout`.
    ///
    /// A timeout too large to represent as an instant leaves the transport
    /// without a deadline.
    pub fn set_timeout(&self, timeout: Duration) {
        self.set_deadline(Instant::now().checked_add(timeout));
    }

    /// Removes the deadline.
    pub fn clear_deadline(&self) {
        self.set_deadline(None);
    }

    fn lock(&self) -> MutexGuard<'_, DeadlineState> {
        // The state is plain data; a poisoned lock still holds a usable value.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A raw stream with an absolute I/O deadline.
#[derive(Debug)]
pub struct Transport<S> {
    io: S,
    handle: TransportHandle,
    read_timer: Option<Pin<Box<Sleep>>>,
    write_timer: Option<Pin<Box<Sleep>>>,
}

impl<S> Transport<S> {
    /// Wraps a freshly accepted stream. No deadline is armed.
    pub fn new(io: S, peer_addr: SocketAddr) -> Self {
        Self {
            io,
            handle: TransportHandle {
                peer_addr,
                state: Arc::new(Mutex::new(DeadlineState::default())),
            },
            read_timer: None,
            write_timer: None,
        }
    }

    /// Returns a control handle sharing this transport's deadline.
    pub fn handle(&self) -> TransportHandle {
        self.handle.clone()
    }

    /// Returns the remote address of the transport.
    pub fn peer_addr(&self) -> SocketAddr {
        self.handle.peer_addr
    }

    pub fn get_ref(&self) -> &S {
        &self.io
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.io
    }

    /// Consumes the transport, returning the raw stream.
    pub fn into_inner(self) -> S {
        self.io
    }

    /// Returns true if the deadline has passed. Registers the task to be
    /// woken when it passes or when the deadline changes.
    fn poll_expired(&mut self, cx: &mut Context<'_>, direction: Direction) -> bool {
        let at = {
            let mut state = self.handle.lock();
            let slot = match direction {
                Direction::Read => &mut state.read_waker,
                Direction::Write => &mut state.write_waker,
            };
            if !slot.as_ref().is_some_and(|waker| waker.will_wake(cx.waker())) {
                *slot = Some(cx.waker().clone());
            }
            state.at
        };

        let timer = match direction {
            Direction::Read => &mut self.read_timer,
            Direction::Write => &mut self.write_timer,
        };

        let Some(at) = at else {
            *timer = None;
            return false;
        };

        if at <= Instant::now() {
            return true;
        }

        let sleep = timer.get_or_insert_with(|| Box::pin(sleep_until(at)));
        if sleep.deadline() != at {
            sleep.as_mut().reset(at);
        }
        sleep.as_mut().poll(cx).is_ready()
    }
}

impl<S: AsyncWrite + Unpin> Transport<S> {
    /// Shuts the stream down and releases it.
    ///
    /// Consuming `self` makes a second close impossible.
    pub async fn close(mut self) -> io::Result<()> {
        self.shutdown().await
    }
}

fn deadline_exceeded() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "i/o deadline exceeded")
}

impl<S: AsyncRead + Unpin> AsyncRead for Transport<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.poll_expired(cx, Direction::Read) {
            return Poll::Ready(Err(deadline_exceeded()));
        }
        Pin::new(&mut this.io).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for Transport<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.poll_expired(cx, Direction::Write) {
            return Poll::Ready(Err(deadline_exceeded()));
        }
        Pin::new(&mut this.io).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.poll_expired(cx, Direction::Write) {
            return Poll::Ready(Err(deadline_exceeded()));
        }
        Pin::new(&mut this.io).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.io.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.poll_expired(cx, Direction::Write) {
            return Poll::Ready(Err(deadline_exceeded()));
        }
        Pin::new(&mut this.io).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().io).poll_shutdown(cx)
    }
}
