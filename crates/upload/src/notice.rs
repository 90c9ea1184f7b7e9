//! User-facing notifications derived from upload results.
//!
//! Rendering (toasts, banners) is a UI concern. This module only decides
//! the title, severity and message for each result.

use crate::error::UploadError;
use crate::types::UploadOutcome;

/// Default notification display duration in milliseconds.
const DEFAULT_DURATION_MS: u64 = 4000;

/// Destructive notification display duration in milliseconds (longer for visibility).
const ERROR_DURATION_MS: u64 = 6000;

/// Fallback shown when the server rejects an upload without a usable message.
pub const GENERIC_REJECTION: &str = "Failed to upload video";

/// The visual category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Destructive,
}

/// A notification for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub severity: Severity,
    pub message: String,
    pub duration_ms: u64,
}

impl Notification {
    /// Informational notification with default duration (4s).
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            severity: Severity::Info,
            message: message.into(),
            duration_ms: DEFAULT_DURATION_MS,
        }
    }

    /// Destructive notification with extended duration (6s).
    pub fn destructive(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            severity: Severity::Destructive,
            message: message.into(),
            duration_ms: ERROR_DURATION_MS,
        }
    }
}

impl From<&UploadOutcome> for Notification {
    fn from(outcome: &UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Success => Self::info("Success", "Video uploaded successfully"),
            UploadOutcome::ServerRejected(message) => Self::destructive("Upload Failed", message),
            UploadOutcome::Cancelled => Self::info("Upload Cancelled", "Upload was cancelled"),
            // The detail goes to the log, not to the user.
            UploadOutcome::UnexpectedError(_) => {
                Self::destructive("Error", "An unexpected error occurred")
            }
        }
    }
}

impl From<&UploadError> for Notification {
    fn from(err: &UploadError) -> Self {
        match err {
            UploadError::NoFileSelected => {
                Self::destructive("Error", "Please select a video file to upload")
            }
            UploadError::UnsupportedType(_) => {
                Self::destructive("Error", "Only video files can be uploaded")
            }
            UploadError::Busy => {
                Self::info("Upload in progress", "Please wait for the current upload")
            }
        }
    }
}
