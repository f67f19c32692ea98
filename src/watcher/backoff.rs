//! Exponential backoff with multiplicative jitter and an elapsed-time budget.
//!
//! Each delay is drawn uniformly from
//! `[interval * (1 - randomization_factor), interval * (1 + randomization_factor)]`,
//! after which the interval grows by `multiplier` up to `max_interval`. The
//! schedule stops once sleeping for the next delay would overrun
//! `max_elapsed`.

use std::time::Duration;

use tokio::time::Instant;

/// Tuning for [`ExponentialBackoff`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    /// Delay before the second attempt, before jitter.
    pub initial_interval: Duration,
    /// Growth factor applied to the interval after every delay.
    pub multiplier: f64,
    /// Jitter spread as a fraction of the interval, within `[0, 1]`.
    pub randomization_factor: f64,
    /// Cap on the un-jittered interval.
    pub max_interval: Duration,
    /// Total budget measured from the first attempt.
    pub max_elapsed: Duration,
}

impl BackoffConfig {
    /// Initial interval used when nothing else is configured.
    pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(800);
    /// Multiplier used when nothing else is configured.
    pub const DEFAULT_MULTIPLIER: f64 = 3.0;
    /// Randomization factor used when nothing else is configured.
    pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;
    /// Maximum interval used when nothing else is configured.
    pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(15);
    /// Total budget used when nothing else is configured.
    pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(20 * 60);
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_interval: Self::DEFAULT_INITIAL_INTERVAL,
            multiplier: Self::DEFAULT_MULTIPLIER,
            randomization_factor: Self::DEFAULT_RANDOMIZATION_FACTOR,
            max_interval: Self::DEFAULT_MAX_INTERVAL,
            max_elapsed: Self::DEFAULT_MAX_ELAPSED,
        }
    }
}

/// Stateful delay generator for one watch.
#[derive(Debug)]
pub struct ExponentialBackoff {
    config: BackoffConfig,
    current_interval: Duration,
    started_at: Instant,
}

impl ExponentialBackoff {
    /// Starts a schedule; the elapsed budget runs from now.
    #[must_use]
    pub fn start(config: BackoffConfig) -> Self {
        Self {
            config,
            current_interval: config.initial_interval,
            started_at: Instant::now(),
        }
    }

    /// Time spent since [`ExponentialBackoff::start`].
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Next delay with fresh jitter, or `None` once the budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        self.next_backoff_with(rand::random::<f64>())
    }

    /// Next delay using `random` (in `[0, 1)`) as the jitter sample.
    pub fn next_backoff_with(&mut self, random: f64) -> Option<Duration> {
        let delay = randomized_interval(
            self.current_interval,
            self.config.randomization_factor,
            random,
        );
        self.current_interval = grown_interval(
            self.current_interval,
            self.config.multiplier,
            self.config.max_interval,
        );

        let projected = self.elapsed().saturating_add(delay);
        if projected > self.config.max_elapsed {
            return None;
        }
        Some(delay)
    }
}

/// Picks a point in `interval ± interval * factor` using `random` in `[0, 1)`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "jitter is defined as a fractional spread around the interval"
)]
pub fn randomized_interval(interval: Duration, factor: f64, random: f64) -> Duration {
    let spread = factor.clamp(0.0, 1.0);
    let sample = random.clamp(0.0, 1.0);
    let base = interval.as_secs_f64();
    let low = base - base * spread;
    let high = base + base * spread;
    Duration::try_from_secs_f64(low + sample * (high - low)).unwrap_or(interval)
}

/// Multiplies `interval` by `multiplier`, capped at `max_interval`.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "the multiplier is fractional")]
pub fn grown_interval(interval: Duration, multiplier: f64, max_interval: Duration) -> Duration {
    Duration::try_from_secs_f64(interval.as_secs_f64() * multiplier)
        .map_or(max_interval, |grown| grown.min(max_interval))
}
