use thiserror::Error;

use crate::fetch::FetchError;

/// Failures surfaced by search and detail handling.
///
/// `InvalidInput` and `RouteNotFound` are raised before any upstream call is made.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    RouteNotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self { Self::InvalidInput(msg.into()) }
    pub fn upstream(msg: impl Into<String>) -> Self { Self::Upstream(msg.into()) }
}

impl From<FetchError> for Error {
    fn from(e: FetchError) -> Self { Self::Upstream(e.to_string()) }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self { Self::Upstream(format!("invalid upstream payload: {e}")) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
