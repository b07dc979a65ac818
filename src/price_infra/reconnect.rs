use std::time::Duration;
use rand::Rng;
use crate::config::ReconnectSettings;

/// Exponential backoff with jitter. Retries never run out: the feed keeps
/// reconnecting until it is shut down.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter_factor: f64,
    current_delay: Duration,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(settings: &ReconnectSettings) -> Self {
        let initial_delay = Duration::from_millis(settings.initial_delay_ms);
        let max_delay = Duration::from_millis(settings.max_delay_ms.max(settings.initial_delay_ms));
        ReconnectPolicy {
            initial_delay,
            max_delay,
            multiplier: settings.multiplier.max(1.0),
            jitter_factor: settings.jitter_factor.clamp(0.0, 1.0),
            current_delay: initial_delay,
            attempts: 0,
        }
    }

    /// Delay to wait before the next attempt; grows the following one.
    pub fn next_delay(&mut self) -> Duration {
        self.attempts = self.attempts.saturating_add(1);
        let delay = self.with_jitter(self.current_delay);

        let grown = self.current_delay.as_secs_f64() * self.multiplier;
        self.current_delay = Duration::try_from_secs_f64(grown)
            .map_or(self.max_delay, |d| d.min(self.max_delay));

        delay
    }

    /// Called after a successful connection.
    pub fn reset(&mut self) {
        self.current_delay = self.initial_delay;
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn with_jitter(&self, delay: Duration) -> Duration {
        if self.jitter_factor <= 0.0 || delay.is_zero() {
            return delay;
        }
        let base = delay.as_secs_f64();
        let spread = base * self.jitter_factor;
        let jittered = base + rand::thread_rng().gen_range(-spread..=spread);
        Duration::from_secs_f64(jittered.max(0.001))
    }
}
