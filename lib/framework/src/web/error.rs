use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::exception::Exception;
use crate::exception::error_code;
use crate::log;
use crate::web::body::Json;

pub type HttpResult<T> = Result<T, HttpError>;

pub struct HttpError {
    exception: Exception,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self.exception.code.as_deref() {
            Some(error_code::UNAUTHORIZED) => StatusCode::UNAUTHORIZED,
            Some(error_code::CONFLICT) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Exception> for HttpError {
    fn from(exception: Exception) -> Self {
        HttpError { exception }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        log::log_exception(&self.exception);
        let status = self.status();
        let body = ErrorResponse {
            ok: false,
            error: self.exception.message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::HttpError;
    use crate::exception::Severity;
    use crate::exception::error_code;

    #[test]
    fn status() {
        let error: HttpError = exception!(
            severity = Severity::Warn,
            code = error_code::UNAUTHORIZED,
            message = "Unauthorized"
        )
        .into();
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);

        let error: HttpError = exception!(code = error_code::CONFLICT, message = "job is running").into();
        assert_eq!(error.status(), StatusCode::CONFLICT);

        let error: HttpError = exception!(message = "connection reset").into();
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unauthorized_body() {
        let error: HttpError = exception!(
            severity = Severity::Warn,
            code = error_code::UNAUTHORIZED,
            message = "Unauthorized"
        )
        .into();

        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"ok":false,"error":"Unauthorized"}"#);
    }
}
