//! Environment-driven settings for the library layer.

use std::time::Duration;

pub use projectdesk_api::ClientConfig;

const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);
const DEFAULT_GC_TIME: Duration = Duration::from_secs(300);
const PERIOD_GATE_STALE_TIME: Duration = Duration::from_secs(60);

/// How long cached query results stay fresh and how long they are kept at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Within this age an entry is served without refetching.
    pub stale_time: Duration,
    /// Past this age an entry is dropped.
    pub gc_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
        }
    }
}

impl CacheConfig {
    /// Reads `PROJECTDESK_CACHE_STALE_SECS` and `PROJECTDESK_CACHE_GC_SECS`.
    pub fn from_env() -> Self {
        Self {
            stale_time: Duration::from_secs(env_u64(
                "PROJECTDESK_CACHE_STALE_SECS",
                DEFAULT_STALE_TIME.as_secs(),
            )),
            gc_time: Duration::from_secs(env_u64(
                "PROJECTDESK_CACHE_GC_SECS",
                DEFAULT_GC_TIME.as_secs(),
            )),
        }
    }

    /// Period checks are reused for a minute.
    pub fn period_gate() -> Self {
        Self {
            stale_time: PERIOD_GATE_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
        }
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}
