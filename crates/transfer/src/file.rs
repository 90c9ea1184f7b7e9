use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::TransferError;

/// Where a file's contents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FileSource {
    /// Contents already in memory.
    Memory(Bytes),
    /// Contents read from disk, chunk by chunk, when streamed.
    Disk(PathBuf),
}

/// A video file ready to be uploaded.
///
/// Cloning is cheap: in-memory contents are reference-counted and files
/// opened from disk are only referenced by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    name: String,
    content_type: Option<String>,
    source: FileSource,
    size: u64,
}

impl VideoFile {
    /// Creates a file from a name and in-memory contents. The content type
    /// is inferred from the name's extension when it is a known video format.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let name = name.into();
        let data: Bytes = data.into();
        Self {
            content_type: infer_content_type(&name),
            name,
            size: data.len() as u64,
            source: FileSource::Memory(data),
        }
    }

    /// Overrides the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Opens a file on disk without reading it.
    ///
    /// The file name is the final component of `path` and the size comes
    /// from its metadata. Contents are streamed when the upload body is
    /// built.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TransferError::InvalidPath(path.display().to_string()))?
            .to_string();

        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(TransferError::InvalidPath(path.display().to_string()));
        }

        debug!(path = %path.display(), size = meta.len(), "video file opened");
        Ok(Self {
            content_type: infer_content_type(&name),
            name,
            size: meta.len(),
            source: FileSource::Disk(path.to_path_buf()),
        })
    }

    /// File name as presented to the server.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type, when known.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Size in bytes. For files on disk, as of [`VideoFile::open`].
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Path on disk, for files created with [`VideoFile::open`].
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Disk(path) => Some(path),
            FileSource::Memory(_) => None,
        }
    }

    pub(crate) fn source(&self) -> &FileSource {
        &self.source
    }
}

fn infer_content_type(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(content_type_for_extension)
        .map(str::to_string)
}

/// Maps a file extension (without the dot, any case) to a video MIME type.
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "mp4" => Some("video/mp4"),
        "m4v" => Some("video/x-m4v"),
        "mov" => Some("video/quicktime"),
        "webm" => Some("video/webm"),
        "mkv" => Some("video/x-matroska"),
        "avi" => Some("video/x-msvideo"),
        "ogv" => Some("video/ogg"),
        "mpeg" | "mpg" => Some("video/mpeg"),
        _ => None,
    }
}
