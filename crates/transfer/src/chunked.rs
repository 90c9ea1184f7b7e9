use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use futures_util::Stream;
use tokio::io::{AsyncReadExt, Take};
use tokio::sync::watch;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::file::{FileSource, VideoFile};
use crate::progress::TransferProgress;
use crate::{DEFAULT_CHUNK_SIZE, TransferError};

enum Chunks {
    /// Zero-copy slices of an in-memory buffer.
    Memory { data: Bytes, offset: usize },
    /// Reads from disk, capped at the size the body was declared with.
    Disk(ReaderStream<Take<tokio::fs::File>>),
}

/// Streams a video in chunks of at most `chunk_size` bytes, publishing
/// bytes-sent progress for every chunk handed to the consumer.
///
/// Files opened from disk are read chunk by chunk; only one chunk is held
/// in memory at a time. Once the token is cancelled the next poll yields
/// [`TransferError::Cancelled`] and the stream ends.
pub struct ChunkStream {
    chunks: Chunks,
    chunk_size: usize,
    sent: u64,
    total: u64,
    progress: watch::Sender<TransferProgress>,
    cancel: CancellationToken,
    done: bool,
}

impl ChunkStream {
    /// Opens a stream over `file`.
    ///
    /// The stream yields exactly `file.size()` bytes. A file on disk that
    /// shrank since it was opened ends the stream with an I/O error.
    /// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] is used.
    pub async fn open(
        file: &VideoFile,
        chunk_size: usize,
        progress: watch::Sender<TransferProgress>,
        cancel: CancellationToken,
    ) -> Result<Self, TransferError> {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        let chunks = match file.source() {
            FileSource::Memory(data) => Chunks::Memory {
                data: data.clone(),
                offset: 0,
            },
            FileSource::Disk(path) => {
                let reader = tokio::fs::File::open(path).await?.take(file.size());
                Chunks::Disk(ReaderStream::with_capacity(reader, chunk_size))
            }
        };
        Ok(Self {
            chunks,
            chunk_size,
            sent: 0,
            total: file.size(),
            progress,
            cancel,
            done: false,
        })
    }

    fn current(&self) -> TransferProgress {
        TransferProgress::new(self.sent, Some(self.total))
    }
}

impl Stream for ChunkStream {
    type Item = Result<Bytes, TransferError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        if this.cancel.is_cancelled() {
            this.done = true;
            debug!(sent = this.sent, "upload body stopped by cancellation");
            return Poll::Ready(Some(Err(TransferError::Cancelled)));
        }

        let chunk = match &mut this.chunks {
            Chunks::Memory { data, offset } => {
                if *offset >= data.len() {
                    this.done = true;
                    return Poll::Ready(None);
                }
                let end = (*offset + this.chunk_size).min(data.len());
                let chunk = data.slice(*offset..end);
                *offset = end;
                chunk
            }
            Chunks::Disk(reader) => match ready!(Pin::new(reader).poll_next(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e.into())));
                }
                None => {
                    this.done = true;
                    if TransferProgress::new(this.sent, Some(this.total)).is_complete() {
                        return Poll::Ready(None);
                    }
                    debug!(sent = this.sent, total = this.total, "video file shrank");
                    let err = io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("file ended after {} of {} bytes", this.sent, this.total),
                    );
                    return Poll::Ready(Some(Err(err.into())));
                }
            },
        };

        this.sent += chunk.len() as u64;
        // Receivers may already be gone; the latest value is kept regardless.
        this.progress.send_replace(this.current());

        Poll::Ready(Some(Ok(chunk)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.chunks {
            _ if self.done => (0, Some(0)),
            Chunks::Memory { data, offset } => {
                let chunks = (data.len() - offset).div_ceil(self.chunk_size);
                (chunks, Some(chunks))
            }
            // Short reads can split a chunk.
            Chunks::Disk(_) => (0, None),
        }
    }
}
