//! Errors raised while loading evaluation data.

/// Failure to load a dashboard payload or evaluation run.
///
/// Only the outer envelope is validated. Unexpected shapes inside model
/// outputs are never errors; see [`crate::normalize`].
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The endpoint was unreachable or answered with a non-success status.
    #[error("failed to fetch {url}: {message}")]
    Fetch {
        url: String,
        /// HTTP status code, when the server answered at all.
        status: Option<u16>,
        message: String,
    },

    /// The response succeeded but did not carry the expected payload.
    #[error("unexpected response from {url}: {message}")]
    DataShape { url: String, message: String },
}

impl DashboardError {
    pub(crate) fn fetch(url: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.to_string(),
            status,
            message: message.into(),
        }
    }

    pub(crate) fn data_shape(url: &str, message: impl Into<String>) -> Self {
        Self::DataShape {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status of a failed fetch, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => *status,
            Self::DataShape { .. } => None,
        }
    }

    /// The single message shown to users. Both kinds read the same way.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("Failed to load evaluation data: {self}")
    }
}
