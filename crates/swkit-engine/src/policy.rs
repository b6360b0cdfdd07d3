//! Per-request caching policy: eligibility and serve timing.

use swkit_net::{Destination, Request};

use crate::config::WorkerConfig;

/// Whether the engine applies any policy to this request at all.
///
/// Ineligible requests are not intercepted; the caller performs the plain
/// network call with no cache involvement.
pub fn is_eligible(request: &Request, config: &WorkerConfig) -> bool {
    // Internal/extension schemes are not fetchable network requests.
    if !matches!(request.url.scheme(), "http" | "https") {
        return false;
    }

    // Requests meant for the live backend are never served from cache.
    if request.url.path().contains(&config.api_prefix) {
        return false;
    }

    true
}

/// Whether a cache hit may be returned immediately, with the network
/// attempt detached as a background refresh.
///
/// Static assets are shown stale without hesitation; page documents always
/// await the race so the user sees live content when the network has it.
pub fn serve_instantly(request: &Request, config: &WorkerConfig) -> bool {
    if config.instant_destinations.contains(&request.destination) {
        return true;
    }

    // Page-shaped requests force the race. Some runtimes do not flag HTML
    // as a document destination, so the URL shape is consulted too.
    if request.destination == Destination::Document || looks_like_page(request) {
        return false;
    }

    // Unclassified, extension-bearing paths default to asset treatment.
    true
}

// A trailing slash, or a final path segment with no extension, reads as a
// page path rather than a file path.
fn looks_like_page(request: &Request) -> bool {
    let path = request.url.path();
    if path.ends_with('/') {
        return true;
    }

    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap())
    }

    fn request_with(url: &str, destination: Destination) -> Request {
        request(url).destination(destination)
    }

    #[test]
    fn test_non_network_schemes_are_ineligible() {
        let config = WorkerConfig::default();
        assert!(!is_eligible(
            &request("chrome-extension://abcdef/script.js"),
            &config
        ));
        assert!(!is_eligible(&request("file:///tmp/page.html"), &config));
        assert!(is_eligible(&request("https://example.com/page"), &config));
        assert!(is_eligible(&request("http://example.com/page"), &config));
    }

    #[test]
    fn test_api_paths_are_ineligible() {
        let config = WorkerConfig::default();
        assert!(!is_eligible(
            &request("https://example.com/api/leaderboard"),
            &config
        ));
        assert!(!is_eligible(
            &request("https://example.com/v2/api/users"),
            &config
        ));
        assert!(is_eligible(&request("https://example.com/apidocs"), &config));
    }

    #[test]
    fn test_api_prefix_is_configurable() {
        let config = WorkerConfig::default().with_api_prefix("/backend/");
        assert!(is_eligible(
            &request("https://example.com/api/users"),
            &config
        ));
        assert!(!is_eligible(
            &request("https://example.com/backend/users"),
            &config
        ));
    }

    #[test]
    fn test_asset_destinations_serve_instantly() {
        let config = WorkerConfig::default();
        for destination in [
            Destination::Script,
            Destination::Style,
            Destination::Font,
            Destination::Image,
            Destination::Audio,
            Destination::Manifest,
        ] {
            // Destination wins even over a page-shaped URL.
            assert!(serve_instantly(
                &request_with("https://example.com/assets/latest", destination),
                &config
            ));
        }
    }

    #[test]
    fn test_documents_await_the_race() {
        let config = WorkerConfig::default();
        assert!(!serve_instantly(
            &request_with("https://example.com/game.html", Destination::Document),
            &config
        ));
    }

    #[test]
    fn test_page_shaped_urls_await_the_race() {
        let config = WorkerConfig::default();
        // Trailing slash.
        assert!(!serve_instantly(&request("https://example.com/"), &config));
        assert!(!serve_instantly(
            &request("https://example.com/game/"),
            &config
        ));
        // Extension-less final segment.
        assert!(!serve_instantly(
            &request("https://example.com/leaderboard"),
            &config
        ));
        assert!(!serve_instantly(
            &request("https://example.com/my-profile_2"),
            &config
        ));
    }

    #[test]
    fn test_extension_bearing_paths_default_to_instant() {
        let config = WorkerConfig::default();
        assert!(serve_instantly(
            &request("https://example.com/bundle.js"),
            &config
        ));
        assert!(serve_instantly(
            &request("https://example.com/media/track.mp3"),
            &config
        ));
        // A dot anywhere in the final segment breaks the page shape.
        assert!(serve_instantly(
            &request("https://example.com/release-1.2.3"),
            &config
        ));
    }
}
