// ── Reconnection policy ──
//
// Decides whether and when a failed connection is re-opened, and whether
// the failure is worth telling the caller about.

use std::time::Duration;

/// Back-off schedule for automatic reconnects.
///
/// The defaults retry forever every five seconds. `multiplier` above 1.0
/// grows the delay geometrically up to `max_delay`; `max_attempts` caps
/// the number of consecutive reconnects (`Some(0)` disables reconnection).
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
            multiplier: 1.0,
            max_delay: Duration::from_secs(60),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// A policy that never reconnects.
    pub fn disabled() -> Self {
        Self {
            max_attempts: Some(0),
            ..Self::default()
        }
    }

    /// Delay before reconnect number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(self.delay.as_secs_f64() * factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Per-session reconnect bookkeeping.
#[derive(Debug, Clone)]
pub struct ReconnectState {
    policy: ReconnectPolicy,
    reconnecting: bool,
    attempt: u32,
}

impl ReconnectState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            reconnecting: false,
            attempt: 0,
        }
    }

    /// True once a failure has scheduled an automatic reconnect, until the
    /// session is authorized again.
    pub fn is_reconnecting(&self) -> bool {
        self.reconnecting
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Only the first failure of an unauthorized session reaches the caller.
    pub fn should_report(&self, authorized: bool) -> bool {
        !self.reconnecting && !authorized
    }

    /// Schedule the next reconnect, or `None` when attempts are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self
            .policy
            .max_attempts
            .is_some_and(|max| self.attempt >= max)
        {
            return None;
        }
        self.attempt += 1;
        self.reconnecting = true;
        Some(self.policy.delay_for(self.attempt))
    }

    /// The session recovered; the next failure starts a fresh cycle.
    pub fn reset(&mut self) {
        self.reconnecting = false;
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retries_forever_at_fixed_delay() {
        let mut state = ReconnectState::new(ReconnectPolicy::default());
        for attempt in 1..=50 {
            assert_eq!(state.next_delay(), Some(Duration::from_secs(5)));
            assert_eq!(state.attempt(), attempt);
        }
        assert!(state.is_reconnecting());
    }

    #[test]
    fn growth_is_capped() {
        let policy = ReconnectPolicy {
            delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(10),
            max_attempts: None,
        };
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(8));
        assert_eq!(policy.delay_for(5), Duration::from_secs(10));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn attempts_are_capped() {
        let mut state = ReconnectState::new(ReconnectPolicy {
            max_attempts: Some(2),
            ..ReconnectPolicy::default()
        });
        assert!(state.next_delay().is_some());
        assert!(state.next_delay().is_some());
        assert_eq!(state.next_delay(), None);

        let mut disabled = ReconnectState::new(ReconnectPolicy::disabled());
        assert_eq!(disabled.next_delay(), None);
        assert!(!disabled.is_reconnecting());
    }

    #[test]
    fn only_first_unauthorized_failure_is_reported() {
        let mut state = ReconnectState::new(ReconnectPolicy::default());
        assert!(state.should_report(false));
        assert!(!state.should_report(true));

        state.next_delay();
        assert!(!state.should_report(false));

        state.reset();
        assert!(state.should_report(false));
        assert_eq!(state.attempt(), 0);
    }
}
