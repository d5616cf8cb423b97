use thiserror::Error;

/// Errors returned by the upstream API client.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A non-retryable HTTP status (4xx other than 429).
    #[error("upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// A transient status class (429/5xx) persisted through the whole
    /// attempt budget.
    #[error("upstream still failing with HTTP {status} after {attempts} attempts")]
    RetriesExhausted { status: u16, attempts: u32 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The payload parsed as JSON but violates the documented shape.
    #[error("malformed upstream response for {context}: {reason}")]
    Malformed { context: String, reason: String },

    /// Guard against cycling pagination cursors.
    #[error("pagination limit reached for {path}: exceeded {max_pages} pages")]
    PageLimit { path: String, max_pages: usize },

    /// Client construction failed (bad base URL or credential).
    #[error("invalid upstream configuration: {0}")]
    Config(String),
}
