use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Duration;

pub use http::HeaderName;
pub use http::header;
use reqwest::Body;
pub use reqwest::Method;
use reqwest::Request;
use reqwest::Url;
use serde::Serialize;
use tracing::Instrument;
use tracing::debug;
use tracing::debug_span;

use crate::exception::CoreRsResult;
use crate::json;

pub struct HttpClient {
    client: reqwest::Client,
}

pub struct HttpClientConfig {
    pub timeout: Duration,
    pub pool_idle_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        HttpClientConfig {
            timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(300),
        }
    }
}

pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<HeaderName, String>,
    body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: String) -> Self {
        HttpRequest {
            method,
            url,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn header(&mut self, name: HeaderName, value: impl Into<String>) {
        self.headers.insert(name, value.into());
    }

    pub fn body(&mut self, body: String, content_type: impl Into<String>) {
        self.body = Some(body);
        self.headers.insert(header::CONTENT_TYPE, content_type.into());
    }

    pub fn json_body<T>(&mut self, body: &T) -> CoreRsResult<()>
    where
        T: Serialize + Debug,
    {
        self.body(json::to_json(body)?, "application/json");
        Ok(())
    }
}

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> CoreRsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .connection_verbose(false)
            .build()?;
        Ok(HttpClient { client })
    }

    pub async fn execute(&self, request: HttpRequest) -> CoreRsResult<HttpResponse> {
        let span = debug_span!("http_client", url = request.url, method = %request.method);
        async {
            debug!(method = %request.method, url = request.url, "[request]");
            let url = Url::parse(&request.url)?;
            let mut http_request = Request::new(request.method, url);
            for (key, value) in request.headers {
                if key == header::AUTHORIZATION {
                    debug!("[header] {key}=******");
                } else {
                    debug!("[header] {key}={value}");
                }
                http_request.headers_mut().insert(key, value.parse()?);
            }
            if let Some(body) = request.body {
                debug!("[request] body={body}");
                *http_request.body_mut() = Some(Body::from(body));
            }

            let response = self.client.execute(http_request).await?;
            let status = response.status().as_u16();
            debug!(status, "[response]");
            for (key, value) in response.headers() {
                debug!("[header] {key}={}", value.to_str().unwrap_or("<binary>"));
            }
            let textual = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|content_type| content_type.contains("json") || content_type.contains("text"));

            let body = response.text().await?;
            if textual {
                debug!("[response] body={body}");
            }

            Ok(HttpResponse { status, body })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::HttpRequest;
    use super::Method;
    use super::header;

    #[derive(Debug, Serialize)]
    struct Variables {
        id: &'static str,
    }

    #[test]
    fn json_body() {
        let mut request = HttpRequest::new(Method::POST, "https://api.linear.app/graphql".to_owned());
        request.json_body(&Variables { id: "issue-1" }).unwrap();

        assert_eq!(request.body.as_deref(), Some(r#"{"id":"issue-1"}"#));
        assert_eq!(
            request.headers.get(&header::CONTENT_TYPE).map(String::as_str),
            Some("application/json")
        );
    }
}
