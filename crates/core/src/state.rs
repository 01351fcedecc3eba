//! View load state.

use crate::error::DashboardError;

/// What a view shows while its one fetch is pending, failed or done.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Loading,
    /// The fetch failed; holds the message shown to the user.
    Failed(String),
    Ready(T),
}

impl<T> LoadState<T> {
    /// Collapse a fetch outcome. Every error kind becomes the same
    /// single-message failure state.
    pub fn from_result(result: Result<T, DashboardError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => {
                tracing::warn!("{}", err);
                Self::Failed(err.user_message())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            Self::Loading => LoadState::Loading,
            Self::Failed(message) => LoadState::Failed(message),
            Self::Ready(value) => LoadState::Ready(f(value)),
        }
    }
}
