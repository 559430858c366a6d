use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::model::transaction::ErrorResponse;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FrameError>;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid choice {0:?}, expected Rock, Paper or Scissors")]
    InvalidChoice(String),
    /// Only raised while loading configuration; handlers fold chain faults
    /// into rendered views.
    #[error("chain access failed: {0}")]
    Chain(#[from] ChainError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Faults from the chain-access collaborator. The resolver turns every one of
/// these into an error-bearing `GameResult`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("invalid player address {0:?}")]
    InvalidAddress(String),
    #[error("invalid chain id {0:?}, expected eip155:<number>")]
    InvalidChainId(String),
    #[error("connected to chain {actual}, expected {expected}")]
    WrongChain { expected: u64, actual: u64 },
    #[error("contract call failed: {0}")]
    Call(String),
    #[error("could not reach chain rpc: {0}")]
    Connect(String),
}

impl IntoResponse for FrameError {
    fn into_response(self) -> Response {
        let status = match self {
            FrameError::InvalidChoice(_) => StatusCode::BAD_REQUEST,
            FrameError::Chain(_) | FrameError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
