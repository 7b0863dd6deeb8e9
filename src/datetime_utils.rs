use chrono::prelude::*;

/// Time source for envelope construction and freshness checks.
///
/// Injected rather than read ambiently so both sides of the protocol can be
/// driven by a fixed clock under test without touching production behavior.
pub trait Clock: Send + Sync {
    /// Current time as fractional seconds since the Unix epoch.
    fn now(&self) -> f64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        epoch_seconds(&Utc::now())
    }
}

/// A clock pinned to a single instant.
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

pub fn epoch_seconds(time: &DateTime<Utc>) -> f64 {
    time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) / 1e9
}

/// How old a timestamp may be before it is rejected, and how far into the
/// future it may sit before clock skew stops being a plausible excuse.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessWindow {
    pub max_age_secs: f64,
    pub max_skew_secs: f64,
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self {
            max_age_secs: 300.0,
            max_skew_secs: 30.0,
        }
    }
}

impl FreshnessWindow {
    pub fn new(max_age_secs: f64, max_skew_secs: f64) -> Self {
        Self {
            max_age_secs,
            max_skew_secs,
        }
    }

    /// True when `timestamp` is neither older than the window nor further in
    /// the future than the skew allowance, relative to `now`.
    pub fn permits(&self, timestamp: f64, now: f64) -> bool {
        let age = now - timestamp;
        age <= self.max_age_secs && -age <= self.max_skew_secs
    }
}
