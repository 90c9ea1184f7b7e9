//! Single-file video upload coordinator.
//!
//! This crate implements the **business logic** for uploading one edited
//! video to the editor backend: file selection, one multipart POST per
//! attempt, progress reporting, and user-initiated cancellation. It has no
//! UI dependencies. The host app drives [`UploadCoordinator`] from its
//! buttons and renders the [`UploadEvent`]s it emits.
//!
//! # Attempt lifecycle
//!
//! 1. **Select**: `Idle | FileSelected → FileSelected` (or back to `Idle`)
//! 2. **Submit**: `FileSelected → Uploading(0)`, the transport starts
//! 3. **Race**: transport completion vs. cancellation, progress on the side
//! 4. **Classify**: exactly one [`UploadOutcome`], then back to `Idle`

pub mod config;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod notice;
pub mod transport;
pub mod types;

// Re-export primary types for convenience.
pub use config::UploaderConfig;
pub use coordinator::{Canceller, UploadCoordinator};
pub use error::UploadError;
pub use http::HttpTransport;
pub use notice::{Notification, Severity};
pub use reelsend_transfer::{TransferProgress, VideoFile};
pub use transport::{TransportError, TransportResponse, UploadTransport};
pub use types::{UploadEvent, UploadOutcome, UploadRequest, UploadState};
