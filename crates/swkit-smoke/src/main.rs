//! swkit smoke harness.
//!
//! Installs a cache worker against a real origin, replays a handful of
//! fetch events twice (cold, then warm), and prints per-phase timings so
//! regressions in the serve path are visible at a glance.
//!
//! Usage: `swkit-smoke <origin> [path ...]`

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use swkit_common::{init_logging, LogConfig};
use swkit_engine::{CacheWorker, FetchEvent, WorkerConfig};
use swkit_net::{ClientConfig, FetchClient, Request};
use swkit_store::StoreRegistry;
use tracing::{error, info};
use url::Url;

/// Timing collector for tracking phase durations.
struct PerfTiming {
    timings: HashMap<&'static str, Vec<Duration>>,
}

impl PerfTiming {
    fn new() -> Self {
        Self {
            timings: HashMap::new(),
        }
    }

    fn record(&mut self, phase: &'static str, duration: Duration) {
        self.timings.entry(phase).or_default().push(duration);
    }

    fn summary(&self) -> serde_json::Value {
        let mut summary = serde_json::Map::new();

        for (phase, durations) in &self.timings {
            if durations.is_empty() {
                continue;
            }

            let count = durations.len();
            let total_ms: f64 = durations.iter().map(|d| d.as_secs_f64() * 1000.0).sum();
            let max_ms = durations
                .iter()
                .map(|d| d.as_secs_f64() * 1000.0)
                .fold(f64::NEG_INFINITY, f64::max);

            summary.insert(
                phase.to_string(),
                json!({
                    "count": count,
                    "total_ms": (total_ms * 100.0).round() / 100.0,
                    "avg_ms": (total_ms / count as f64 * 100.0).round() / 100.0,
                    "max_ms": (max_ms * 100.0).round() / 100.0,
                }),
            );
        }

        serde_json::Value::Object(summary)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging(LogConfig::default().with_filter("swkit=info"));

    let mut args = std::env::args().skip(1);
    let Some(origin) = args.next() else {
        eprintln!("usage: swkit-smoke <origin> [path ...]");
        return ExitCode::FAILURE;
    };
    let origin = match Url::parse(&origin) {
        Ok(url) => url,
        Err(err) => {
            error!(%origin, %err, "invalid origin");
            return ExitCode::FAILURE;
        }
    };

    let paths: Vec<String> = {
        let rest: Vec<String> = args.collect();
        if rest.is_empty() {
            vec!["/".to_string()]
        } else {
            rest
        }
    };

    let mut timing = PerfTiming::new();

    let config = WorkerConfig::new("swkit-smoke", "1.0.0").with_precache(vec![origin.clone()]);
    let registry = Arc::new(StoreRegistry::new());
    let net = match FetchClient::new(ClientConfig::default()) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!(%err, "failed to build fetch client");
            return ExitCode::FAILURE;
        }
    };
    let (worker, _events) = CacheWorker::new(config, registry, net);

    let start = Instant::now();
    if let Err(err) = worker.install().await {
        error!(category = err.category(), %err, "install failed");
        return ExitCode::FAILURE;
    }
    timing.record("install", start.elapsed());

    let start = Instant::now();
    if let Err(err) = worker.activate().await {
        error!(category = err.category(), %err, "activate failed");
        return ExitCode::FAILURE;
    }
    timing.record("activate", start.elapsed());

    for round in ["cold", "warm"] {
        for path in &paths {
            let url = match origin.join(path) {
                Ok(url) => url,
                Err(err) => {
                    error!(%path, %err, "skipping unjoinable path");
                    continue;
                }
            };

            let start = Instant::now();
            let served = worker
                .handle_fetch(FetchEvent::new(Request::get(url.clone())))
                .await;
            let elapsed = start.elapsed();

            match served {
                Some(response) => {
                    info!(
                        %url,
                        round,
                        status = %response.status,
                        served_from = ?response.served_from,
                        ms = elapsed.as_millis() as u64,
                        "served"
                    );
                    timing.record(if round == "cold" { "fetch_cold" } else { "fetch_warm" }, elapsed);
                }
                None => info!(%url, round, "not intercepted"),
            }
        }
    }

    println!("{}", timing.summary());
    ExitCode::SUCCESS
}
