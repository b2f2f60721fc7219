use thiserror::Error;

/// Errors raised while loading a project file.
///
/// Loading is all-or-nothing: any of these leaves the in-memory scene untouched.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid project file: {reason}")]
    Invalid { reason: String },
}

impl ProjectError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// Errors raised while turning a `data:` URI back into pixels.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Not a base64 data URI")]
    NotDataUri,

    #[error("Failed to decode base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors raised while rasterising the scene for export or fill snapshots.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Cannot allocate a {width}x{height} raster surface")]
    Surface { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to serialize project: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised by the persistence collaborator.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write state: {0}")]
    Io(#[from] std::io::Error),
}
