use std::fmt::Debug;

use axum::http::HeaderValue;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;
use tracing::debug;

use crate::json;
use crate::web::error::HttpError;

pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    T: Serialize + Debug,
{
    fn into_response(self) -> Response {
        match json::to_json(&self.0) {
            Ok(body) => {
                debug!("[response] body={body}");
                let length = body.len();
                debug!(response_content_length = length, "stats");
                (
                    [
                        (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
                        (header::CONTENT_LENGTH, HeaderValue::from(length)),
                    ],
                    body,
                )
                    .into_response()
            }
            Err(exception) => HttpError::from(exception).into_response(),
        }
    }
}
