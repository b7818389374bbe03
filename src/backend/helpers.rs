use std::fmt;
use std::io;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

type Commit = Box<dyn FnOnce(Vec<u8>) -> io::Result<()> + Send>;

/// A write handle that buffers everything written and hands the buffer to a commit function when
/// shut down.
///
/// Dropping the handle without shutting it down discards the buffer. Writing after shutdown
/// fails with [`io::ErrorKind::BrokenPipe`].
pub struct CommitOnClose {
    buffer: Vec<u8>,
    commit: Option<Commit>,
}

impl CommitOnClose {
    pub(crate) fn new<F>(commit: F) -> Self
    where
        F: FnOnce(Vec<u8>) -> io::Result<()> + Send + 'static,
    {
        Self {
            buffer: Vec::new(),
            commit: Some(Box::new(commit)),
        }
    }
}

impl fmt::Debug for CommitOnClose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitOnClose")
            .field("buffered", &self.buffer.len())
            .field("committed", &self.commit.is_none())
            .finish()
    }
}

impl AsyncWrite for CommitOnClose {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.commit.is_none() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "blob handle already closed",
            )));
        }
        this.buffer.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match this.commit.take() {
            Some(commit) => Poll::Ready(commit(mem::take(&mut this.buffer))),
            None => Poll::Ready(Ok(())),
        }
    }
}
