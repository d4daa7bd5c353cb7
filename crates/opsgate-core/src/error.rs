use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsgateError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error("invalid action type: {0}")]
    InvalidActionType(String),

    #[error("invalid request status: {0}")]
    InvalidStatus(String),

    #[error("planner error: {0}")]
    Planner(String),

    #[error("admin gateway error: {0}")]
    Gateway(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OpsgateError>;
