//! Client contexts controlled by the worker.
//!
//! A client is an already-open page context. Activation claims every
//! registered client so interception starts without a reload; this is a
//! liveness concern only and never changes what is served.

use hashbrown::HashMap;
use url::Url;

/// An open client context.
#[derive(Debug, Clone)]
pub struct Client {
    /// Client ID, assigned by the surrounding runtime.
    pub id: String,

    /// Client URL.
    pub url: Url,

    /// Whether this worker controls the client.
    pub controlled: bool,
}

impl Client {
    /// Create an uncontrolled client.
    pub fn new(id: impl Into<String>, url: Url) -> Self {
        Self {
            id: id.into(),
            url,
            controlled: false,
        }
    }
}

/// Registry of open client contexts.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Client>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client.
    pub fn add(&mut self, client: Client) {
        self.clients.insert(client.id.clone(), client);
    }

    /// Remove a client.
    pub fn remove(&mut self, id: &str) -> Option<Client> {
        self.clients.remove(id)
    }

    /// Get a client by ID.
    pub fn get(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    /// Claim every registered client. Returns how many are now controlled.
    pub fn claim(&mut self) -> usize {
        for client in self.clients.values_mut() {
            client.controlled = true;
        }
        self.clients.len()
    }

    /// Number of controlled clients.
    pub fn controlled_count(&self) -> usize {
        self.clients.values().filter(|c| c.controlled).count()
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str) -> Client {
        Client::new(id, Url::parse("https://example.com/").unwrap())
    }

    #[test]
    fn test_claim_controls_all_clients() {
        let mut registry = ClientRegistry::new();
        registry.add(client("a"));
        registry.add(client("b"));

        assert_eq!(registry.controlled_count(), 0);
        assert_eq!(registry.claim(), 2);
        assert_eq!(registry.controlled_count(), 2);
    }

    #[test]
    fn test_claim_covers_late_registrations() {
        let mut registry = ClientRegistry::new();
        registry.add(client("a"));
        registry.claim();

        // A page opened after activation starts uncontrolled until the
        // next claim.
        registry.add(client("b"));
        assert_eq!(registry.controlled_count(), 1);
        assert_eq!(registry.claim(), 2);
        assert_eq!(registry.controlled_count(), 2);
    }

    #[test]
    fn test_remove() {
        let mut registry = ClientRegistry::new();
        registry.add(client("a"));
        assert!(registry.remove("a").is_some());
        assert!(registry.is_empty());
    }
}
