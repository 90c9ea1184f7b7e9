//! Transport seam between the coordinator and the network.
//!
//! [`HttpTransport`](crate::HttpTransport) is the production implementation.
//! Using a trait keeps the race and classification logic testable with mocks.

use std::future::Future;
use std::pin::Pin;

use reelsend_transfer::TransferProgress;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::types::UploadRequest;

/// Errors produced while carrying a request to the server.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read video: {0}")]
    Transfer(#[from] reelsend_transfer::TransferError),

    #[error("cancelled")]
    Cancelled,
}

/// Raw server response, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Carries one upload request to the server.
pub trait UploadTransport: Send + Sync {
    /// Sends the request and waits for the full response.
    ///
    /// Implementations publish bytes-sent measurements on `progress` while
    /// streaming the body and should stop streaming once `cancel` fires.
    /// Dropping the returned future must abort the request.
    fn send(
        &self,
        request: UploadRequest,
        progress: watch::Sender<TransferProgress>,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + '_>>;
}
