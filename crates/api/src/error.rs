//! Error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledgerline_shared::AppError;
use serde_json::json;
use tracing::{error, warn};

/// An [`AppError`] on its way to the client.
///
/// The body is `{"error": "<CODE>", "message": "..."}` with the status taken
/// from [`AppError::status_code`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::InvalidArgument(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(AppError::InvalidArgument(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::InvalidArgument(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(code = self.0.error_code(), error = %self.0, "Request failed");
        } else if matches!(self.0, AppError::Cancelled(_)) {
            warn!(error = %self.0, "Request cancelled");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.message(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::InvalidArgument("code is required".into()), StatusCode::BAD_REQUEST)]
    #[case(AppError::NotFound("account x not found".into()), StatusCode::NOT_FOUND)]
    #[case(AppError::FailedPrecondition("unbalanced".into()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(AppError::Conflict("revision".into()), StatusCode::CONFLICT)]
    #[case(AppError::Unavailable("pool".into()), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(AppError::DeadlineExceeded("late".into()), StatusCode::GATEWAY_TIMEOUT)]
    #[case(AppError::Internal("bug".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    #[tokio::test]
    async fn test_status_and_body(#[case] err: AppError, #[case] status: StatusCode) {
        let code = err.error_code();
        let message = err.message().to_string();
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), status);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], code);
        assert_eq!(body["message"], message);
    }

    #[test]
    fn test_cancelled_uses_client_closed_status() {
        let response = ApiError(AppError::Cancelled("gone".into())).into_response();
        assert_eq!(response.status().as_u16(), 499);
    }
}
