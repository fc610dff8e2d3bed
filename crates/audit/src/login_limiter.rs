//! LoginLimiter - Failed-login lockout for OKR School

use shared::AppConfig;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Longest lockout applied, whatever the configuration asks for
pub const MAX_LOCKOUT: Duration = Duration::from_secs(u32::MAX as u64);

/// Emails tracked at once; the stalest record is evicted beyond this
pub const MAX_TRACKED_EMAILS: usize = 10_000;

/// Lockout policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPolicy {
    /// Failures allowed inside `window` before the email is locked
    pub max_failures: usize,
    pub window: Duration,
    pub lockout: Duration,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::from_secs(300),
            lockout: Duration::from_secs(900),
        }
    }
}

impl LoginPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_failures: config.max_failed_logins,
            window: Duration::from_secs(config.failure_window_secs),
            lockout: Duration::from_secs(config.lockout_secs).min(MAX_LOCKOUT),
        }
    }
}

/// Failure tracking for one email
#[derive(Debug, Clone, Default)]
struct FailureRecord {
    failures: VecDeque<Instant>,
    locked_until: Option<Instant>,
}

impl FailureRecord {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(first) = self.failures.front() {
            if now.saturating_duration_since(*first) >= window {
                self.failures.pop_front();
            } else {
                break;
            }
        }
        if self.locked_until.is_some_and(|until| until <= now) {
            self.locked_until = None;
        }
    }

    fn is_idle(&self) -> bool {
        self.failures.is_empty() && self.locked_until.is_none()
    }

    fn last_seen(&self) -> Option<Instant> {
        self.failures.back().copied().max(self.locked_until)
    }
}

/// Login limiter
#[derive(Debug)]
pub struct LoginLimiter {
    policy: LoginPolicy,
    records: HashMap<String, FailureRecord>,
    max_tracked: usize,
    enabled: bool,
}

impl LoginLimiter {
    /// Create a LoginLimiter; a policy allowing zero failures disables it
    pub fn new(mut policy: LoginPolicy) -> Self {
        let enabled = policy.max_failures > 0;
        policy.lockout = policy.lockout.min(MAX_LOCKOUT);
        Self {
            policy,
            records: HashMap::new(),
            max_tracked: MAX_TRACKED_EMAILS,
            enabled,
        }
    }

    /// Check whether `email` may attempt a login now
    pub fn check(&self, email: &str) -> LoginLimitResult {
        self.check_at(email, Instant::now())
    }

    pub fn check_at(&self, email: &str, now: Instant) -> LoginLimitResult {
        if !self.enabled {
            return LoginLimitResult::Allowed {
                remaining: self.policy.max_failures,
            };
        }

        let Some(record) = self.records.get(email) else {
            return LoginLimitResult::Allowed {
                remaining: self.policy.max_failures,
            };
        };

        if let Some(until) = record.locked_until.filter(|until| *until > now) {
            return LoginLimitResult::Locked {
                retry_after_secs: ceil_secs(until - now),
            };
        }

        let recent = record
            .failures
            .iter()
            .filter(|t| now.saturating_duration_since(**t) < self.policy.window)
            .count();
        LoginLimitResult::Allowed {
            remaining: self.policy.max_failures.saturating_sub(recent),
        }
    }

    /// Count a failed login
    pub fn record_failure(&mut self, email: &str) -> LoginLimitResult {
        self.record_failure_at(email, Instant::now())
    }

    pub fn record_failure_at(&mut self, email: &str, now: Instant) -> LoginLimitResult {
        if !self.enabled {
            return self.check_at(email, now);
        }

        self.prune_expired(now);
        if !self.records.contains_key(email) && self.records.len() >= self.max_tracked {
            self.evict_stalest();
        }

        let policy = &self.policy;
        let record = self.records.entry(email.to_string()).or_default();
        record.failures.push_back(now);

        if record.failures.len() >= policy.max_failures {
            record.failures.clear();
            record.locked_until = Some(
                now.checked_add(policy.lockout)
                    .or_else(|| now.checked_add(MAX_LOCKOUT))
                    .unwrap_or(now),
            );
            tracing::warn!(email, lockout_secs = policy.lockout.as_secs(), "login locked");
            return LoginLimitResult::Locked {
                retry_after_secs: ceil_secs(policy.lockout),
            };
        }

        LoginLimitResult::Allowed {
            remaining: policy.max_failures - record.failures.len(),
        }
    }

    /// A successful login clears the failure history
    pub fn record_success(&mut self, email: &str) {
        self.records.remove(email);
    }

    /// Lift a lockout (admin password reset)
    pub fn reset(&mut self, email: &str) {
        self.records.remove(email);
    }

    /// Forget failures outside the window and lockouts that have ended
    fn prune_expired(&mut self, now: Instant) {
        let window = self.policy.window;
        self.records.retain(|_, record| {
            record.prune(now, window);
            !record.is_idle()
        });
    }

    fn evict_stalest(&mut self) {
        let stalest = self
            .records
            .iter()
            .min_by_key(|(_, record)| record.last_seen())
            .map(|(email, _)| email.clone());
        if let Some(email) = stalest {
            self.records.remove(&email);
        }
    }

    pub fn tracked(&self) -> usize {
        self.records.len()
    }
}

impl Default for LoginLimiter {
    fn default() -> Self {
        Self::new(LoginPolicy::default())
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

/// Result of a login limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginLimitResult {
    Allowed { remaining: usize },
    Locked { retry_after_secs: u64 },
}

impl LoginLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LoginLimitResult::Allowed { .. })
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, LoginLimitResult::Locked { .. })
    }
}
