use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sliding window in-memory rate limiter (pod local).
#[derive(Clone)]
pub struct InMemoryRateLimiter {
    store: Arc<DashMap<String, VecDeque<Instant>>>,
    pub enabled: bool,
}

impl InMemoryRateLimiter {
    pub fn new(enabled: bool) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            enabled,
        }
    }

    /// Returns true if allowed, false if limited.
    pub fn check(&self, key: &str, limit: usize, window: Duration) -> bool {
        if !self.enabled {
            return true;
        }
        let now = Instant::now();
        let mut entry = self.store.entry(key.to_string()).or_default();
        while let Some(front) = entry.front() {
            if now.duration_since(*front) >= window {
                entry.pop_front();
            } else {
                break;
            }
        }
        if entry.len() < limit {
            entry.push_back(now);
            true
        } else {
            false
        }
    }
}

/// Per-action limits, overridable through `RL_*` env vars.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub report_limit: usize,
    pub report_window: Duration,
    pub comment_limit: usize,
    pub comment_window: Duration,
    pub interaction_limit: usize,
    pub interaction_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            report_limit: 5,
            report_window: Duration::from_secs(60),
            comment_limit: 10,
            comment_window: Duration::from_secs(60),
            interaction_limit: 30,
            interaction_window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        fn usize_env(name: &str, default: usize) -> usize {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
        fn dur_env(name: &str, default: u64) -> Duration {
            Duration::from_secs(
                std::env::var(name)
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default),
            )
        }
        Self {
            report_limit: usize_env("RL_REPORT_LIMIT", 5),
            report_window: dur_env("RL_REPORT_WINDOW", 60),
            comment_limit: usize_env("RL_COMMENT_LIMIT", 10),
            comment_window: dur_env("RL_COMMENT_WINDOW", 60),
            interaction_limit: usize_env("RL_INTERACTION_LIMIT", 30),
            interaction_window: dur_env("RL_INTERACTION_WINDOW", 60),
        }
    }
}

/// High level guard used by handlers, keyed by client IP.
#[derive(Clone)]
pub struct RateLimiterFacade {
    pub limiter: InMemoryRateLimiter,
    pub cfg: RateLimitConfig,
}

impl RateLimiterFacade {
    pub fn new(limiter: InMemoryRateLimiter, cfg: RateLimitConfig) -> Self {
        Self { limiter, cfg }
    }

    /// Limiter that never rejects; used by tests.
    pub fn disabled() -> Self {
        Self::new(InMemoryRateLimiter::new(false), RateLimitConfig::default())
    }

    pub fn allow_report(&self, ip: &str) -> bool {
        self.limiter
            .check(&format!("report:{ip}"), self.cfg.report_limit, self.cfg.report_window)
    }

    pub fn allow_comment(&self, ip: &str) -> bool {
        self.limiter
            .check(&format!("comment:{ip}"), self.cfg.comment_limit, self.cfg.comment_window)
    }

    pub fn allow_interaction(&self, ip: &str) -> bool {
        self.limiter.check(
            &format!("interaction:{ip}"),
            self.cfg.interaction_limit,
            self.cfg.interaction_window,
        )
    }
}
