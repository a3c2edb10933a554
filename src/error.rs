use thiserror::Error;

/// Asset upload pipeline errors
///
/// Everything except a transport failure on both sends is handled inside
/// the pipeline (logged and resolved to a skipped or error outcome); only
/// [`UploadError::UploadTransportFailure`] ever propagates out of
/// `upload_asset`.
#[derive(Debug, Error)]
pub enum UploadError {
    /// No token in the persistent storage scope
    #[error("Authentication error: {0}")]
    MissingCredential(String),

    /// Absent or malformed project/demo reference in the URL
    #[error("Invalid reference: {0}")]
    MissingReference(String),

    /// Project read failed (non-success status or network error)
    #[error("Fetch error: {0}")]
    FetchFailure(String),

    /// Project data contains no demo with the requested id
    #[error("No matching demo: {0}")]
    NoMatchingDemo(String),

    /// Demo carries no edit records to upload
    #[error("Empty edit set for demo: {0}")]
    EmptyEditSet(String),

    /// User identifier could not be resolved from the session scope
    #[error("Missing user identifier")]
    MissingUserIdentifier,

    /// Upload send failed (transport error or rejected status)
    #[error("Upload error: {0}")]
    UploadTransportFailure(String),
}

/// Convert UploadError to String for embedding hosts that only pass
/// string errors across their boundary
impl From<UploadError> for String {
    fn from(err: UploadError) -> String {
        err.to_string()
    }
}
