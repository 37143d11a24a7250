//! Poll interval policy
//!
//! Maps a retry count to the sleep before the next poll. Keyed on the
//! retry count rather than elapsed time, so a schedule is reproducible
//! (jitter aside).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use nimbus_domain::constants::{DEFAULT_BACKOFF_CAP_SECS, DEFAULT_BACKOFF_MULTIPLIER};
use nimbus_domain::{BackoffConfig, PollConfig};
use rand::Rng;

/// Maximum exponent for the exponential schedule to keep the math finite
const MAX_BACKOFF_EXPONENT: u32 = 30;

/// Caller-supplied interval function
pub type IntervalFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// Interval between polls as a function of the retry count
#[derive(Clone)]
pub enum PollInterval {
    /// Same sleep after every poll
    Constant(Duration),
    /// `min(cap, base * multiplier^retries)`, optionally jittered into
    /// `[base, interval]`
    Exponential { base: Duration, multiplier: f64, cap: Duration, jitter: bool },
    /// Any other schedule
    Custom(IntervalFn),
}

impl fmt::Debug for PollInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(d) => f.debug_tuple("Constant").field(d).finish(),
            Self::Exponential { base, multiplier, cap, jitter } => f
                .debug_struct("Exponential")
                .field("base", base)
                .field("multiplier", multiplier)
                .field("cap", cap)
                .field("jitter", jitter)
                .finish(),
            Self::Custom(_) => write!(f, "Custom(<function>)"),
        }
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self::Constant(Duration::from_secs(1))
    }
}

impl PollInterval {
    pub fn constant(interval: Duration) -> Self {
        Self::Constant(interval)
    }

    /// Doubling schedule capped at 60 seconds, without jitter.
    pub fn exponential(base: Duration) -> Self {
        Self::Exponential {
            base,
            multiplier: 2.0,
            cap: Duration::from_secs_f64(DEFAULT_BACKOFF_CAP_SECS),
            jitter: false,
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Build the policy described by a client's poll configuration.
    pub fn from_config(config: &PollConfig) -> Self {
        let base = secs_or(config.interval_secs, Duration::from_secs(1));
        match config.backoff {
            BackoffConfig::Constant => Self::Constant(base),
            BackoffConfig::Exponential { multiplier, cap_secs, jitter } => Self::Exponential {
                base,
                multiplier: if multiplier.is_finite() {
                    multiplier.max(1.0)
                } else {
                    DEFAULT_BACKOFF_MULTIPLIER
                },
                cap: secs_or(cap_secs, Duration::from_secs_f64(DEFAULT_BACKOFF_CAP_SECS)),
                jitter,
            },
        }
    }

    /// Sleep before the poll following `retries` unsuccessful polls.
    pub fn interval(&self, retries: u32) -> Duration {
        match self {
            Self::Constant(d) => *d,
            Self::Exponential { base, multiplier, cap, jitter } => {
                let exponent = retries.min(MAX_BACKOFF_EXPONENT) as i32;
                // Multipliers below 1 (or NaN) keep the base interval.
                let raw = base.as_secs_f64() * multiplier.max(1.0).powi(exponent);
                let interval = secs_or(raw, *cap).min(*cap);

                if *jitter && interval > *base {
                    rand::thread_rng().gen_range(*base..=interval)
                } else {
                    interval
                }
            }
            Self::Custom(f) => f(retries),
        }
    }
}

fn secs_or(secs: f64, fallback: Duration) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(fallback)
}
