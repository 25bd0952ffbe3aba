use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{
    dto::ws::InboundError,
    state::{game::MoveError, room::RoomError, rooms::DirectoryError},
};

/// Errors that can occur in service layer operations.
///
/// The `Display` text is what a WebSocket client receives in an `error` message.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Frame is not a message this server understands.
    #[error("malformed message")]
    Malformed,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested room does not exist (or was just removed).
    #[error("room `{0}` not found")]
    RoomNotFound(String),
    /// The connection is not a member of the named room.
    #[error("not a member of room `{0}`")]
    NotInRoom(String),
    /// The connection lacks the slot the operation requires.
    #[error("{0}")]
    Forbidden(String),
    /// The game rules refused the move.
    #[error(transparent)]
    Move(MoveError),
    /// Identifier space exhausted or a similar transient failure.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl From<InboundError> for ServiceError {
    fn from(err: InboundError) -> Self {
        match err {
            InboundError::Malformed(_) | InboundError::Unsupported => ServiceError::Malformed,
            InboundError::Invalid(errors) => ServiceError::InvalidInput(errors.to_string()),
        }
    }
}

impl From<RoomError> for ServiceError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::Closed(room_id) => ServiceError::RoomNotFound(room_id),
            RoomError::NotAPlayer | RoomError::ResetForbidden => {
                ServiceError::Forbidden(err.to_string())
            }
            RoomError::Move(err) => ServiceError::Move(err),
        }
    }
}

impl From<DirectoryError> for ServiceError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(room_id) => ServiceError::RoomNotFound(room_id),
            DirectoryError::Exhausted(err) => ServiceError::Unavailable(err.to_string()),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Operation not allowed for the caller.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Malformed | ServiceError::InvalidInput(_) => {
                AppError::BadRequest(message)
            }
            ServiceError::RoomNotFound(_) => AppError::NotFound(message),
            ServiceError::NotInRoom(_) | ServiceError::Forbidden(_) => AppError::Forbidden(message),
            ServiceError::Move(_) => AppError::Conflict(message),
            ServiceError::Unavailable(_) => AppError::ServiceUnavailable(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
