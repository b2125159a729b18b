use thiserror::Error;

/// Failure to load the image catalog.
///
/// `Clone` so the outcome of one in-flight fetch can be handed to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The endpoint answered with a non-success status.
    #[error("Failed to load image data")]
    Status(u16),

    /// The request never produced a response (connection, IO).
    #[error("Failed to load image data: {0}")]
    Transport(String),

    /// The response body was not a list of image descriptors.
    #[error("Failed to load image data: malformed catalog: {0}")]
    Decode(String),

    /// The fetch task ended without reporting a result.
    #[error("Failed to load image data: fetch abandoned")]
    Abandoned,
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
