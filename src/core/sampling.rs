//! Log sampling for high-volume scenarios
//!
//! Within each tick, the first `initial` records sharing a level and message
//! are kept, then every `thereafter`-th one. Counters reset when the tick
//! elapses. Panic and Fatal records are never sampled out.
//!
//! # Example
//!
//! ```
//! use rust_log_facade::{Level, LogSampler, SamplingConfig};
//!
//! let sampler = LogSampler::new(SamplingConfig { initial: 2, thereafter: 0, tick_ms: 60_000 });
//! assert!(sampler.should_sample(Level::Info, "hot loop"));
//! assert!(sampler.should_sample(Level::Info, "hot loop"));
//! assert!(!sampler.should_sample(Level::Info, "hot loop"));
//! ```

use super::level::Level;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

const COUNTERS_PER_LEVEL: usize = 1024;

/// Configuration for log sampling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SamplingConfig {
    /// Records per level and message always kept within a tick
    pub initial: u64,

    /// After `initial`, keep every n-th record; zero drops the rest
    pub thereafter: u64,

    /// Length of the counting window in milliseconds
    pub tick_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            initial: 100,
            thereafter: 100,
            tick_ms: 1000,
        }
    }
}

impl SamplingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Counters for sampling observability
#[derive(Debug)]
pub struct SamplerMetrics {
    sampled_count: AtomicU64,
    dropped_count: AtomicU64,
}

impl SamplerMetrics {
    pub const fn new() -> Self {
        Self {
            sampled_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
        }
    }

    /// Records that passed sampling
    #[inline]
    pub fn sampled_count(&self) -> u64 {
        self.sampled_count.load(Ordering::Relaxed)
    }

    /// Records dropped by sampling
    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_count(&self) -> u64 {
        self.sampled_count() + self.dropped_count()
    }

    #[inline]
    fn record_sampled(&self) {
        self.sampled_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for SamplerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct Counter {
    /// Nanoseconds since the sampler epoch at which the count resets
    reset_at: AtomicI64,
    count: AtomicU64,
}

impl Counter {
    fn inc_check_reset(&self, now: i64, tick: i64) -> u64 {
        let reset_after = self.reset_at.load(Ordering::Relaxed);
        if reset_after > now {
            return self.count.fetch_add(1, Ordering::Relaxed) + 1;
        }

        self.count.store(1, Ordering::Relaxed);
        if self
            .reset_at
            .compare_exchange(reset_after, now + tick, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            // Another thread reset first and already counted itself.
            return self.count.fetch_add(1, Ordering::Relaxed) + 1;
        }
        1
    }
}

fn fnv32a(text: &str) -> u32 {
    const OFFSET: u32 = 2_166_136_261;
    const PRIME: u32 = 16_777_619;
    text.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(PRIME))
}

/// Thread-safe sampler keyed by level and message
pub struct LogSampler {
    config: SamplingConfig,
    counters: Box<[Counter]>,
    metrics: SamplerMetrics,
    epoch: Instant,
}

impl LogSampler {
    pub fn new(config: SamplingConfig) -> Self {
        let counters = (0..Level::ALL.len() * COUNTERS_PER_LEVEL)
            .map(|_| Counter::default())
            .collect();
        Self {
            config,
            counters,
            metrics: SamplerMetrics::new(),
            epoch: Instant::now(),
        }
    }

    /// Whether a record with this level and message should be written
    pub fn should_sample(&self, level: Level, message: &str) -> bool {
        if level >= Level::Panic {
            self.metrics.record_sampled();
            return true;
        }

        let slot = fnv32a(message) as usize % COUNTERS_PER_LEVEL;
        let counter = &self.counters[level.index() * COUNTERS_PER_LEVEL + slot];
        let now = self.epoch.elapsed().as_nanos() as i64;
        let tick = self.config.tick().as_nanos() as i64;

        let n = counter.inc_check_reset(now, tick);
        let keep = n <= self.config.initial
            || (self.config.thereafter > 0 && (n - self.config.initial) % self.config.thereafter == 0);

        if keep {
            self.metrics.record_sampled();
        } else {
            self.metrics.record_dropped();
        }
        keep
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }
}

impl std::fmt::Debug for LogSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSampler")
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .finish()
    }
}
