//! Data types for the upload flow.

use reelsend_transfer::VideoFile;

use crate::error::UploadError;
use crate::notice::Notification;

/// Upload widget state.
///
/// A plain record owned by the caller and handed to every
/// [`UploadCoordinator`](crate::UploadCoordinator) operation by `&mut`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadState {
    /// No file chosen.
    #[default]
    Idle,
    /// A file is chosen and ready to submit.
    FileSelected(VideoFile),
    /// An attempt is in flight.
    Uploading {
        /// Completion percentage, 0-100.
        progress: u8,
    },
}

impl UploadState {
    /// The selected file, if any.
    pub fn selected_file(&self) -> Option<&VideoFile> {
        match self {
            Self::FileSelected(file) => Some(file),
            _ => None,
        }
    }

    /// Current progress while uploading.
    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::Uploading { progress } => Some(*progress),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self, Self::Uploading { .. })
    }
}

/// What the transport carries for one attempt.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: VideoFile,
    /// Destination record id. Passed through unvalidated.
    pub target_id: String,
}

/// Terminal classification of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// 2xx response with a JSON body.
    Success,
    /// Non-2xx response; carries the server message or a generic fallback.
    ServerRejected(String),
    /// The user cancelled before a response was classified.
    Cancelled,
    /// Network failure or malformed response.
    UnexpectedError(String),
}

impl UploadOutcome {
    /// Returns `true` for [`UploadOutcome::Success`]; hosts typically close
    /// the upload dialog on success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// User-facing notification for this outcome.
    pub fn notification(&self) -> Notification {
        Notification::from(self)
    }
}

/// Events emitted by the coordinator to the presentation layer.
///
/// Per attempt: zero or more `Progress`, then exactly one `Finished` or
/// `Invalid`. No `Progress` follows the terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// Upload progress, 0-100.
    Progress(u8),
    /// The attempt resolved.
    Finished(UploadOutcome),
    /// An operation was rejected locally; no request was issued.
    Invalid(UploadError),
}

impl UploadEvent {
    /// Notification to show for terminal events.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            Self::Progress(_) => None,
            Self::Finished(outcome) => Some(Notification::from(outcome)),
            Self::Invalid(err) => Some(Notification::from(err)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}
