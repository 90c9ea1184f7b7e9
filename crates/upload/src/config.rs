//! Uploader configuration.
//!
//! Every value has a compiled-in default; host apps that keep their own
//! settings file can embed [`UploaderConfig`] and override fields there.

use serde::{Deserialize, Serialize};

/// Editor backend endpoint that receives edited videos.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/editor/upload-edited-video";

/// Multipart field carrying the video file.
pub const DEFAULT_FILE_FIELD: &str = "editedVideoFile";

/// Multipart field carrying the destination record id.
pub const DEFAULT_TARGET_FIELD: &str = "videoId";

/// Content-type prefix a selected file must match when its type is known.
pub const DEFAULT_ACCEPT_PREFIX: &str = "video/";

/// Capacity of the outbound event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Configuration for an [`UploadCoordinator`](crate::UploadCoordinator)
/// and its [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    pub endpoint: String,
    pub file_field: String,
    pub target_field: String,
    /// Empty accepts every file.
    pub accept_prefix: String,
    /// Upload body chunk size in bytes (0 = transfer default).
    pub chunk_size: usize,
    pub event_capacity: usize,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            file_field: DEFAULT_FILE_FIELD.into(),
            target_field: DEFAULT_TARGET_FIELD.into(),
            accept_prefix: DEFAULT_ACCEPT_PREFIX.into(),
            chunk_size: reelsend_transfer::DEFAULT_CHUNK_SIZE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl UploaderConfig {
    /// Returns `true` if a file with the given content type may be selected.
    ///
    /// Files whose type is unknown are always accepted.
    pub fn accepts(&self, content_type: Option<&str>) -> bool {
        match content_type {
            Some(ct) => ct
                .to_ascii_lowercase()
                .starts_with(&self.accept_prefix.to_ascii_lowercase()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_backend() {
        let cfg = UploaderConfig::default();
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.file_field, "editedVideoFile");
        assert_eq!(cfg.target_field, "videoId");
        assert_eq!(cfg.event_capacity, 256);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: UploaderConfig =
            serde_json::from_str(r#"{"endpoint":"http://10.0.0.2:3000/upload"}"#).unwrap();
        assert_eq!(cfg.endpoint, "http://10.0.0.2:3000/upload");
        assert_eq!(cfg.file_field, DEFAULT_FILE_FIELD);
        assert_eq!(cfg.chunk_size, reelsend_transfer::DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn accepts_video_types_only() {
        let cfg = UploaderConfig::default();
        assert!(cfg.accepts(Some("video/mp4")));
        assert!(cfg.accepts(Some("VIDEO/WebM")));
        assert!(cfg.accepts(None));
        assert!(!cfg.accepts(Some("image/png")));
    }

    #[test]
    fn empty_prefix_accepts_everything() {
        let cfg = UploaderConfig {
            accept_prefix: String::new(),
            ..Default::default()
        };
        assert!(cfg.accepts(Some("application/pdf")));
    }
}
