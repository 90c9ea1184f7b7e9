//! File handle and byte-level plumbing for single-file video uploads.
//!
//! The upload body is streamed in bounded chunks, read from disk as the
//! connection consumes them, so that every chunk handed to the connection
//! can be reported as progress on a `watch` channel. The stream observes a [`CancellationToken`] and stops early
//! once it is signaled.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod chunked;
mod file;
mod progress;

pub use chunked::ChunkStream;
pub use file::{VideoFile, content_type_for_extension};
pub use progress::TransferProgress;

/// Default body chunk size: 64 KiB.
///
/// Small enough that a multi-megabyte video produces a smooth progress
/// curve, large enough to keep per-chunk overhead negligible.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("cancelled")]
    Cancelled,
}
