use thiserror::Error;

/// Failure talking to one upstream catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to source '{key}' timed out")]
    Timeout { key: String },

    #[error("request to source '{key}' failed: {error}")]
    Transport {
        key: String,
        #[source]
        error: reqwest::Error,
    },

    #[error("source '{key}' answered with HTTP {status}")]
    Status { key: String, status: u16 },

    #[error("source '{key}' returned a malformed catalog response: {error}")]
    Decode {
        key: String,
        #[source]
        error: serde_json::Error,
    },
}

impl CatalogError {
    pub(crate) fn from_reqwest(key: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout { key: key.to_string() }
        } else {
            Self::Transport { key: key.to_string(), error }
        }
    }

    /// Worth retrying after a short pause.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport { error, .. } => error.is_connect() || error.is_request() || error.is_body(),
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode { .. } => false,
        }
    }

    pub fn source_key(&self) -> &str {
        match self {
            Self::Timeout { key } | Self::Transport { key, .. } | Self::Status { key, .. } | Self::Decode { key, .. } => key,
        }
    }
}

/// Why a source switch was rejected. The previous source stays selected.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error("no video is loaded")]
    NothingLoaded,

    #[error("source '{key}' has no match for '{title}'")]
    NoMatch { key: String, title: String },

    #[error("source '{key}' is unavailable")]
    Unavailable {
        key: String,
        #[source]
        error: CatalogError,
    },
}

impl SwitchError {
    /// The same switch may succeed if tried again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoMatch { .. } | Self::Unavailable { .. })
    }
}
