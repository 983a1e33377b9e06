use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 500 MB, the ceiling advertised on the upload panel.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("unsupported media type: {mime_type:?}")]
    NotVideo { mime_type: String },
    #[error("file too large: limit={limit} bytes")]
    TooLarge { limit: u64 },
}

impl UploadError {
    /// Text shown to the operator.
    pub fn user_message(&self) -> &'static str {
        match self {
            UploadError::NotVideo { .. } => "Please select a valid video file.",
            UploadError::TooLarge { .. } => "Video exceeds the upload size limit.",
        }
    }
}

/// Handle to an accepted upload. Only metadata is kept; contents are discarded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl VideoFile {
    /// Rejects anything whose MIME type does not start with `video/`.
    pub fn check_mime(mime_type: &str) -> Result<(), UploadError> {
        let essence = mime_type.trim().to_ascii_lowercase();
        if essence.starts_with("video/") {
            Ok(())
        } else {
            Err(UploadError::NotVideo {
                mime_type: mime_type.to_string(),
            })
        }
    }

    pub fn accept(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
        max_bytes: u64,
    ) -> Result<Self, UploadError> {
        let mime_type = mime_type.into();
        Self::check_mime(&mime_type)?;
        if size_bytes > max_bytes {
            return Err(UploadError::TooLarge { limit: max_bytes });
        }
        let name = name.into();
        Ok(Self {
            name: if name.trim().is_empty() {
                "upload".to_string()
            } else {
                name
            },
            mime_type,
            size_bytes,
        })
    }

    pub fn size_megabytes(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}
