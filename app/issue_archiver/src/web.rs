use std::sync::Arc;

use axum::Router;
use axum::debug_handler;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header;
use axum::routing::get;
use framework::exception;
use framework::exception::CoreRsResult;
use framework::exception::Severity;
use framework::exception::error_code;
use framework::web::body::Json;
use framework::web::error::HttpResult;

use crate::AppState;
use crate::job::ArchiveReport;
use crate::job::archive_closed_issues;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/job/archive", get(run_archive_job).post(run_archive_job))
}

#[debug_handler]
async fn run_archive_job(State(state): State<Arc<AppState>>, headers: HeaderMap) -> HttpResult<Json<ArchiveReport>> {
    authorize(state.config.cron_secret(), &headers)?;
    let report = archive_closed_issues(&state).await?;
    Ok(Json(report))
}

fn authorize(cron_secret: Option<&str>, headers: &HeaderMap) -> CoreRsResult<()> {
    let Some(cron_secret) = cron_secret else {
        return Ok(());
    };
    let authorization = headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok());
    if authorization != Some(format!("Bearer {cron_secret}").as_str()) {
        return Err(exception!(
            severity = Severity::Warn,
            code = error_code::UNAUTHORIZED,
            message = "Unauthorized"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::HeaderMap;
    use axum::http::HeaderValue;
    use axum::http::Method;
    use axum::http::Request;
    use axum::http::StatusCode;
    use axum::http::header;
    use framework::exception::error_code;
    use tower::ServiceExt;

    use crate::AppState;

    fn headers(authorization: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(authorization));
        headers
    }

    #[test]
    fn authorize_without_secret() {
        assert!(super::authorize(None, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn authorize_with_secret() {
        assert!(super::authorize(Some("s3cret"), &headers("Bearer s3cret")).is_ok());

        let error = super::authorize(Some("s3cret"), &headers("Bearer wrong")).err().unwrap();
        assert!(error.has_code(error_code::UNAUTHORIZED));
        assert!(super::authorize(Some("s3cret"), &headers("s3cret")).is_err());
        assert!(super::authorize(Some("s3cret"), &HeaderMap::new()).is_err());
    }

    #[tokio::test]
    async fn archive_route_requires_bearer_token() {
        let app = super::routes().with_state(Arc::new(AppState::for_test(Some("s3cret"))));

        for method in [Method::GET, Method::POST] {
            let request = Request::builder()
                .method(method.clone())
                .uri("/job/archive")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "method={method}");

            let request = Request::builder()
                .method(method.clone())
                .uri("/job/archive")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "method={method}");
        }
    }
}
