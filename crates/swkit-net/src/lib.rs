//! # swkit Net
//!
//! HTTP fetch client and typed request/response surface for the swkit
//! cache worker.
//!
//! ## Design Goals
//!
//! 1. **Async HTTP**: non-blocking fetches over a shared client
//! 2. **Deadline-bound requests**: per-request timeouts surfaced as a
//!    distinct error so deadline expiry shares the transport-error branch
//! 3. **Declared destinations**: requests carry the resource kind the
//!    runtime declared for them (script, style, document, ...)

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

/// Errors that can occur in networking.
#[derive(Error, Debug)]
pub enum NetError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    HttpError(reqwest::Error),
}

/// Declared resource kind of a request, as reported by the surrounding
/// runtime. Requests without a declared kind carry [`Destination::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Destination {
    Script,
    Style,
    Font,
    Image,
    Audio,
    Manifest,
    Document,
    #[default]
    Unknown,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Script => "script",
            Destination::Style => "style",
            Destination::Font => "font",
            Destination::Image => "image",
            Destination::Audio => "audio",
            Destination::Manifest => "manifest",
            Destination::Document => "document",
            Destination::Unknown => "unknown",
        }
    }
}

/// HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub destination: Destination,
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a GET request.
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            destination: Destination::Unknown,
            timeout: None,
        }
    }

    /// Add a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the declared destination.
    pub fn destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Set the request deadline.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// HTTP response with a fully read body.
#[derive(Debug, Clone)]
pub struct Response {
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Assemble a response from parts.
    pub fn from_parts(url: Url, status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            url,
            status,
            headers,
            body,
        }
    }

    /// Check if the request was successful (2xx).
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Get the body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume into the body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Get the body as text.
    pub fn text(&self) -> Result<String, NetError> {
        String::from_utf8(self.body.to_vec()).map_err(|e| NetError::RequestFailed(e.to_string()))
    }
}

/// Fetch client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string.
    pub user_agent: String,
    /// Default deadline when a request does not set one.
    pub default_timeout: Duration,
    /// Maximum redirects.
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "swkit/0.1".to_string(),
            default_timeout: Duration::from_secs(30),
            max_redirects: 10,
        }
    }
}

/// Fetch client for performing network attempts.
#[derive(Debug)]
pub struct FetchClient {
    client: Client,
    config: ClientConfig,
}

impl FetchClient {
    /// Create a new fetch client.
    pub fn new(config: ClientConfig) -> Result<Self, NetError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| NetError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Perform a request, bounded by its deadline.
    ///
    /// Deadline expiry aborts the in-flight attempt and surfaces as
    /// [`NetError::Timeout`], the same failure branch as a transport error.
    pub async fn fetch(&self, request: Request) -> Result<Response, NetError> {
        let deadline = request.timeout.unwrap_or(self.config.default_timeout);
        debug!(url = %request.url, method = %request.method, ?deadline, "fetching");

        let mut req_builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .timeout(deadline);

        for (name, value) in request.headers.iter() {
            req_builder = req_builder.header(name, value);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                NetError::Timeout(deadline)
            } else {
                NetError::HttpError(e)
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                NetError::Timeout(deadline)
            } else {
                NetError::HttpError(e)
            }
        })?;

        trace!(
            url = %url,
            status = %status,
            body_len = body.len(),
            "response received"
        );

        Ok(Response::from_parts(url, status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> FetchClient {
        FetchClient::new(ClientConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app.js"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"console.log(1)".to_vec()))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/app.js", server.uri())).unwrap();
        let response = client().fetch(Request::get(url)).await.unwrap();

        assert!(response.ok());
        assert_eq!(response.body().as_ref(), b"console.log(1)");
        assert_eq!(response.text().unwrap(), "console.log(1)");
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let response = client().fetch(Request::get(url)).await.unwrap();

        assert!(!response.ok());
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_fetch_deadline_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();
        let request = Request::get(url).timeout(Duration::from_millis(50));

        match client().fetch(request).await {
            Err(NetError::Timeout(d)) => assert_eq!(d, Duration::from_millis(50)),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("x-requested-with", "swkit"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let request = Request::get(url).header(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("swkit"),
        );

        let response = client().fetch(request).await.unwrap();
        assert_eq!(response.status, StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_destination_labels() {
        assert_eq!(Destination::Script.as_str(), "script");
        assert_eq!(Destination::Document.as_str(), "document");
        assert_eq!(Destination::default(), Destination::Unknown);
    }
}
