//! Immutable worker configuration.
//!
//! Every policy constant the engine consults lives here and is injected at
//! construction, so tests can shrink deadlines and swap precache sets
//! without touching the engine.

use std::time::Duration;

use swkit_net::Destination;
use url::Url;

/// Deadline for the network attempt when a cache hit exists. With
/// something to show already, the network gets less time before the
/// refresh is abandoned.
pub const FETCH_CACHED_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Deadline for the network attempt when the cache is empty.
pub const FETCH_NETWORK_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Default fallback document, shown when neither cache nor network can
/// produce a response.
pub const FALLBACK_BODY: &str = "\
<h1>You appear to be offline.</h1>
<h2>Reload the page or return to the home screen.</h2>
";

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Product name, used in the versioned store name.
    pub product: String,
    /// Deployed version. A bump opens a new store.
    pub version: String,
    /// URLs fetched and stored at install time.
    pub precache_urls: Vec<Url>,
    /// Declared destinations served from cache without awaiting the race.
    pub instant_destinations: Vec<Destination>,
    /// Network deadline when a cache hit exists.
    pub cached_hit_timeout: Duration,
    /// Network deadline when the cache is empty.
    pub network_timeout: Duration,
    /// Fallback document body.
    pub fallback_body: String,
    /// Fallback document content type.
    pub fallback_content_type: String,
    /// Path prefix reserved for the live backend; matching requests bypass
    /// the engine entirely.
    pub api_prefix: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            product: "swkit".to_string(),
            version: "1.0.0".to_string(),
            precache_urls: Vec::new(),
            instant_destinations: vec![
                Destination::Script,
                Destination::Style,
                Destination::Font,
                Destination::Image,
                Destination::Audio,
                Destination::Manifest,
            ],
            cached_hit_timeout: FETCH_CACHED_TIMEOUT,
            network_timeout: FETCH_NETWORK_TIMEOUT,
            fallback_body: FALLBACK_BODY.to_string(),
            fallback_content_type: "text/html; charset=utf-8".to_string(),
            api_prefix: "/api/".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Configuration for a product and version.
    pub fn new(product: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Set the precache set.
    pub fn with_precache(mut self, urls: Vec<Url>) -> Self {
        self.precache_urls = urls;
        self
    }

    /// Set the race deadlines.
    pub fn with_timeouts(mut self, cached_hit: Duration, network: Duration) -> Self {
        self.cached_hit_timeout = cached_hit;
        self.network_timeout = network;
        self
    }

    /// Set the fallback document body.
    pub fn with_fallback_body(mut self, body: impl Into<String>) -> Self {
        self.fallback_body = body.into();
        self
    }

    /// Set the API exclusion prefix.
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// The version-qualified store name for this configuration.
    pub fn store_name(&self) -> String {
        swkit_store::store_name(&self.product, &self.version)
    }
}
