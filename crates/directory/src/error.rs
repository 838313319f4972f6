use thiserror::Error;

/// Errors from a directory lookup.
///
/// A 404 is not an error; `exists` reports it as `Ok(false)`. Everything
/// else — other client errors, server errors, transport failures — is
/// surfaced here and aborts the validation that triggered the lookup.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory rejected the request (4xx other than 404).
    #[error("Client error: {message}")]
    Client { status: u16, message: String },

    /// The directory failed (5xx or unexpected response).
    #[error("Server error: {message}")]
    Server { status: u16, message: String },

    /// The directory could not be reached.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
