//! Multipart HTTP transport.
//!
//! Async HTTP client using `reqwest`. The file part is streamed from a
//! [`ChunkStream`] with a known length, so the request carries a
//! `Content-Length` and every chunk handed to the connection is reported
//! as progress. Files opened from disk are read chunk by chunk while the
//! request is written.

use std::future::Future;
use std::pin::Pin;

use reelsend_transfer::{ChunkStream, TransferProgress};
use reqwest::Body;
use reqwest::multipart::{Form, Part};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::UploaderConfig;
use crate::transport::{TransportError, TransportResponse, UploadTransport};
use crate::types::UploadRequest;

/// Uploads a video as a multipart POST to the editor backend.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
    file_field: String,
    target_field: String,
    chunk_size: usize,
}

impl HttpTransport {
    /// Creates a transport with a default `reqwest` client.
    pub fn new(config: &UploaderConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, config))
    }

    /// Creates a transport on top of an existing client (shared connection
    /// pool, custom TLS or proxy settings).
    pub fn with_client(http: reqwest::Client, config: &UploaderConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            file_field: config.file_field.clone(),
            target_field: config.target_field.clone(),
            chunk_size: config.chunk_size,
        }
    }

    /// The upload endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Builds the multipart form: the file under `file_field`, then the
    /// target id under `target_field`.
    async fn build_form(
        &self,
        request: UploadRequest,
        progress: watch::Sender<TransferProgress>,
        cancel: CancellationToken,
    ) -> Result<Form, TransportError> {
        let UploadRequest { file, target_id } = request;
        let size = file.size();

        let stream = ChunkStream::open(&file, self.chunk_size, progress, cancel).await?;
        let mut part = Part::stream_with_length(Body::wrap_stream(stream), size)
            .file_name(file.name().to_string());
        if let Some(content_type) = file.content_type() {
            part = part.mime_str(content_type)?;
        }

        Ok(Form::new()
            .part(self.file_field.clone(), part)
            .text(self.target_field.clone(), target_id))
    }
}

impl UploadTransport for HttpTransport {
    fn send(
        &self,
        request: UploadRequest,
        progress: watch::Sender<TransferProgress>,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + '_>> {
        Box::pin(async move {
            let name = request.file.name().to_string();
            let size = request.file.size();
            let form = self.build_form(request, progress, cancel).await?;

            debug!(endpoint = %self.endpoint, file = %name, size, "sending upload request");
            let resp = self.http.post(&self.endpoint).multipart(form).send().await?;
            let status = resp.status().as_u16();
            let body = resp.bytes().await?.to_vec();

            debug!(status, body_len = body.len(), "upload response received");
            Ok(TransportResponse { status, body })
        })
    }
}
