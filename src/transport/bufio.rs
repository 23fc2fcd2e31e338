//! Buffered Read/Write Adapter
//!
//! RTMP traffic is dominated by small reads (chunk headers) and small
//! writes (acknowledgements, control messages). The connection works on a
//! [`BufReadWriter`] so that these are batched into larger socket calls.
//!
//! The buffer size is a process-wide tunable read once per accepted
//! connection. Changing it only affects connections accepted afterwards.

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, BufStream, ReadBuf};

/// Default buffer size for each direction (4 KB)
pub const DEFAULT_BUFIO_SIZE: usize = 4096;

static BUFIO_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_BUFIO_SIZE);

/// Returns the buffer size used for newly accepted connections.
pub fn bufio_size() -> usize {
    BUFIO_SIZE.load(Ordering::Relaxed)
}

/// Sets the buffer size used for newly accepted connections.
///
/// A size of zero restores [`DEFAULT_BUFIO_SIZE`].
pub fn set_bufio_size(size: usize) {
    let size = if size == 0 { DEFAULT_BUFIO_SIZE } else { size };
    BUFIO_SIZE.store(size, Ordering::Relaxed);
}

/// Buffered reader and buffered writer over a single stream.
#[derive(Debug)]
pub struct BufReadWriter<S> {
    inner: BufStream<S>,
}

impl<S: AsyncRead + AsyncWrite> BufReadWriter<S> {
    /// Creates an adapter using the process-wide [`bufio_size`].
    pub fn new(stream: S) -> Self {
        Self::with_capacity(bufio_size(), stream)
    }

    /// Creates an adapter with `capacity` bytes of buffer in each direction.
    pub fn with_capacity(capacity: usize, stream: S) -> Self {
        Self {
            inner: BufStream::with_capacity(capacity, capacity, stream),
        }
    }

    pub fn get_ref(&self) -> &S {
        self.inner.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut S {
        self.inner.get_mut()
    }

    /// Consumes the adapter, returning the stream.
    ///
    /// Buffered input and unflushed output are discarded.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> AsyncRead for BufReadWriter<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> AsyncBufRead for BufReadWriter<S> {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        Pin::new(&mut self.get_mut().inner).poll_fill_buf(cx)
    }

    fn consume(mut self: Pin<&mut Self>, amt: usize) {
        Pin::new(&mut self.inner).consume(amt)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> AsyncWrite for BufReadWriter<S> {
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
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
