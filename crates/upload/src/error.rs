//! Upload error types.

/// Local failures that prevent an upload attempt from starting.
///
/// These never involve the network; they are surfaced to the user as a
/// notification and leave the state record untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("no video file selected")]
    NoFileSelected,

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("an upload is already in progress")]
    Busy,
}
