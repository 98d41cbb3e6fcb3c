//! Shared types for the API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::{open_database, DatabaseError};
use crate::pipeline::analysis::DocumentAnalyzer;
use crate::pipeline::gemini::GenerativeClient;
use crate::pipeline::triage::SymptomAssistant;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
    pub assistant: Arc<SymptomAssistant>,
    pub analyzer: Arc<DocumentAnalyzer>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    /// Wire both features to the same model client.
    pub fn new(config: AppConfig, client: Arc<dyn GenerativeClient>) -> Self {
        let rate_limiter =
            RateLimiter::new(config.server.rate_per_minute, config.server.rate_per_hour);
        Self {
            config: Arc::new(config),
            assistant: Arc::new(SymptomAssistant::new(client.clone())),
            analyzer: Arc::new(DocumentAnalyzer::new(client)),
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        }
    }

    /// Open a connection to the analysis store.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        open_database(&self.config.server.db_path)
    }

    pub fn model_name(&self) -> &str {
        self.analyzer.model_name()
    }
}

// ═══════════════════════════════════════════════════════════
// Caller context: injected by identity middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated caller, inserted into request extensions by the
/// identity middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: String,
}

// ═══════════════════════════════════════════════════════════
// Rate limiter: per-caller sliding window
// ═══════════════════════════════════════════════════════════

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// Tracked-caller count above which idle windows are swept.
const PRUNE_THRESHOLD: usize = 10_000;
/// Minimum spacing between sweeps.
const PRUNE_INTERVAL: Duration = MINUTE;

/// Sliding-window rate limiter keyed by caller.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
    last_prune: Instant,
}

impl RateLimiter {
    pub fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            windows: HashMap::new(),
            per_minute,
            per_hour,
            last_prune: Instant::now(),
        }
    }

    /// Check if a caller is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&mut self, key: &str, now: Instant) -> Result<(), u64> {
        self.prune_if_due(now);

        let entries = self.windows.entry(key.to_string()).or_default();

        entries.retain(|ts| now.duration_since(*ts) < HOUR);

        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < MINUTE)
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(MINUTE.as_secs());
        }

        if entries.len() as u32 >= self.per_hour {
            return Err(HOUR.as_secs());
        }

        entries.push(now);
        Ok(())
    }

    /// Sweep idle callers when the map is large, at most once per interval.
    fn prune_if_due(&mut self, now: Instant) {
        if self.windows.len() > PRUNE_THRESHOLD
            && now.saturating_duration_since(self.last_prune) >= PRUNE_INTERVAL
        {
            self.prune_at(now);
        }
    }

    /// Drop callers with no request in the last hour.
    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    fn prune_at(&mut self, now: Instant) {
        self.last_prune = now;
        self.windows.retain(|_, entries| {
            entries.retain(|ts| now.duration_since(*ts) < HOUR);
            !entries.is_empty()
        });
    }

    pub fn tracked_callers(&self) -> usize {
        self.windows.len()
    }
}
