use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use common::prelude::{ErrorKind, KvError};

/// Error body shared by every API route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub msg: String,
}

/// Handler failure, rendered as a status code plus `{"msg": ...}`.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct RequestError(#[from] KvError);

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let msg = match kind {
            // engine messages carry paths; keep them in the log only
            ErrorKind::Internal => {
                tracing::error!(error = %self.0, "request failed");
                "internal server error".to_string()
            }
            _ => {
                tracing::debug!(error = %self.0, %kind, "request rejected");
                self.0.to_string()
            }
        };
        (status_for(kind), Json(ErrorBody { msg })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (KvError::UnknownCredential, StatusCode::UNAUTHORIZED),
            (KvError::BucketNotFound("b".into()), StatusCode::NOT_FOUND),
            (KvError::KeyNotFound("k".into()), StatusCode::NOT_FOUND),
            (KvError::Conflict("alice".into()), StatusCode::CONFLICT),
            (KvError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (
                KvError::ReservedBucket("_system".into()),
                StatusCode::METHOD_NOT_ALLOWED,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(RequestError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let err = KvError::Io(std::io::Error::other("/srv/data/secret.db: disk on fire"));
        let response = RequestError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.msg, "internal server error");
    }
}
