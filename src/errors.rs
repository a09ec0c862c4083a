use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Upstream call failed: {0}")]
    UpstreamFailure(String),
}

impl AdminError {
    /// Callable status string sent back in the `error.status` field.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            AdminError::Unauthenticated(_) => "UNAUTHENTICATED",
            AdminError::PermissionDenied(_) => "PERMISSION_DENIED",
            AdminError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AdminError::UpstreamFailure(_) => "INTERNAL",
        }
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            AdminError::Unauthenticated(_) => 401,
            AdminError::PermissionDenied(_) => 403,
            AdminError::InvalidArgument(_) => 400,
            AdminError::UpstreamFailure(_) => 500,
        }
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(error: reqwest::Error) -> Self {
        AdminError::UpstreamFailure(error.to_string())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(error: serde_json::Error) -> Self {
        AdminError::UpstreamFailure(format!("malformed upstream payload: {error}"))
    }
}
