//! # swkit Engine
//!
//! Stale-while-revalidate cache worker for the swkit stack.
//!
//! ## Features
//!
//! - **Lifecycle**: install (precache + takeover), activate (claim clients)
//! - **Interception**: eligibility gate over scheme and API prefix
//! - **Serve policy**: instant cache hits for static assets, forced
//!   revalidation for page documents
//! - **Revalidation race**: one deadline-bound network attempt per request,
//!   deadline chosen by cache presence, deterministic fallback
//!
//! ## Architecture
//!
//! ```text
//! FetchEvent
//!     │
//!     ├── ineligible ──────────────► None (plain network call)
//!     │
//!     └── CacheWorker::serve
//!             ├── store lookup (versioned CacheStore)
//!             ├── instant hit ─────► cached response + detached refresh
//!             └── revalidation race ► network | cached | fallback
//! ```

pub mod clients;
pub mod config;
pub mod fetch;
pub mod lifecycle;
pub mod policy;
pub mod worker;

pub use clients::{Client, ClientRegistry};
pub use config::{WorkerConfig, FALLBACK_BODY, FETCH_CACHED_TIMEOUT, FETCH_NETWORK_TIMEOUT};
pub use fetch::{FetchEvent, FetchResponse, ServedFrom};
pub use lifecycle::{WorkerEvent, WorkerState};
pub use worker::CacheWorker;
