use perspecto_core::error::CoreError;

/// Errors surfaced by the data layer.
///
/// The `Display` text is what view-state holders show to the user, so
/// remote messages are passed through verbatim.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The call needs a signed-in user and there is none.
    #[error("User not logged in")]
    NotAuthenticated,

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// The request never got an answer (network, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Transport(String),

    /// A row could not be decoded into its model.
    #[error("Failed to decode {table} rows: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    /// A model could not be encoded into a row.
    #[error("Failed to encode {table} row: {source}")]
    Encode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    /// Input rejected before any remote call.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience alias for data-layer results.
pub type DataResult<T> = Result<T, DataError>;
