//! Intercepted fetch events and the responses the engine yields for them.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use swkit_net::{Request, Response};
use swkit_store::StoredResponse;

use crate::config::WorkerConfig;

/// An intercepted request, as delivered by the surrounding runtime.
#[derive(Debug, Clone)]
pub struct FetchEvent {
    /// The intercepted request.
    pub request: Request,

    /// ID of the client context that issued the request, if any.
    pub client_id: Option<String>,
}

impl FetchEvent {
    /// Create a fetch event with no client attribution.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            client_id: None,
        }
    }

    /// Create a fetch event issued by a known client.
    pub fn for_client(request: Request, client_id: impl Into<String>) -> Self {
        Self {
            request,
            client_id: Some(client_id.into()),
        }
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    /// Live network response.
    Network,
    /// Cache snapshot.
    Cache,
    /// Synthesized fallback document.
    Fallback,
}

/// The single response the engine yields for an intercepted request.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Status code.
    pub status: StatusCode,

    /// Response headers.
    pub headers: HeaderMap,

    /// Response body.
    pub body: Bytes,

    /// Provenance of this response.
    pub served_from: ServedFrom,
}

impl FetchResponse {
    /// Wrap a live network response.
    pub fn from_network(response: Response) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.into_body(),
            served_from: ServedFrom::Network,
        }
    }

    /// Rehydrate a cached snapshot.
    pub fn from_cached(entry: &StoredResponse) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in entry.headers.iter() {
            if let (Ok(name), Ok(value)) = (
                name.parse::<HeaderName>(),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        Self {
            status: StatusCode::from_u16(entry.status).unwrap_or(StatusCode::OK),
            headers,
            body: Bytes::from(entry.body.clone()),
            served_from: ServedFrom::Cache,
        }
    }

    /// Synthesize the fallback document. Never stored.
    pub fn fallback(config: &WorkerConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_str(&config.fallback_content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("text/html; charset=utf-8")),
        );

        Self {
            status: StatusCode::OK,
            headers,
            body: Bytes::from(config.fallback_body.clone()),
            served_from: ServedFrom::Fallback,
        }
    }

    /// Whether this response came from the cache.
    pub fn is_from_cache(&self) -> bool {
        self.served_from == ServedFrom::Cache
    }
}

/// Snapshot a network response for storage.
pub(crate) fn snapshot_of(response: &Response) -> StoredResponse {
    let mut headers = hashbrown::HashMap::new();
    for (name, value) in response.headers.iter() {
        if let Ok(value) = value.to_str() {
            headers.insert(name.as_str().to_string(), value.to_string());
        }
    }
    StoredResponse::new(response.status.as_u16(), headers, response.body().to_vec())
}
