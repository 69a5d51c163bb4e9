use crate::config::SecurityConfig;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// Per-account login throttle. Failures inside a fixed window accumulate and
/// back off exponentially; hitting the window's failure cap locks the key out.
pub struct LoginThrottle {
    entries: RwLock<HashMap<String, LoginAttemptState>>,
    max_failures: u32,
    window_seconds: u64,
    lockout_seconds: u64,
    backoff_base_ms: u64,
}

impl LoginThrottle {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_failures: config.login_max_failures,
            window_seconds: config.login_window_seconds,
            lockout_seconds: config.login_lockout_seconds,
            backoff_base_ms: config.login_backoff_base_ms,
        }
    }

    pub fn key(account: &str, ip: Option<&str>) -> String {
        format!("{account}|{}", ip.unwrap_or("unknown"))
    }

    fn write_entries(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, LoginAttemptState>> {
        self.entries.write().unwrap_or_else(|e| {
            tracing::warn!("login throttle lock was poisoned, recovering the lock");
            e.into_inner()
        })
    }

    // An entry stays alive while it is locked out, still backing off, or its
    // failure window has not closed. Dropping it earlier would reset streaks
    // between attempts.
    fn cleanup_expired_entries(
        entries: &mut HashMap<String, LoginAttemptState>,
        now: DateTime<Utc>,
    ) {
        entries.retain(|_, state| {
            let latest_block = state
                .locked_until
                .into_iter()
                .chain(state.next_allowed_at)
                .chain(state.window_ends_at)
                .max();
            latest_block.is_some_and(|until| until > now)
        });
    }

    pub fn ensure_allowed(&self, key: &str) -> AppResult<()> {
        self.ensure_allowed_at(key, Utc::now())
    }

    fn ensure_allowed_at(&self, key: &str, now: DateTime<Utc>) -> AppResult<()> {
        let mut entries = self.write_entries();
        Self::cleanup_expired_entries(&mut entries, now);
        if let Some(state) = entries.get(key) {
            if state.locked_until.is_some_and(|until| until > now) {
                return Err(AppError::RateLimited);
            }
            if state.next_allowed_at.is_some_and(|next| next > now) {
                return Err(AppError::RateLimited);
            }
        }

        Ok(())
    }

    pub fn record_success(&self, key: &str) {
        let mut entries = self.write_entries();
        entries.remove(key);
    }

    /// Records a failure and returns the error the caller should surface.
    pub fn record_failure(&self, key: &str) -> AppError {
        self.record_failure_at(key, Utc::now())
    }

    fn record_failure_at(&self, key: &str, now: DateTime<Utc>) -> AppError {
        let mut entries = self.write_entries();
        Self::cleanup_expired_entries(&mut entries, now);
        let mut entry = entries.get(key).cloned().unwrap_or_default();

        if !entry.window_ends_at.is_some_and(|end| end > now) {
            entry.failures = 0;
            entry.window_ends_at = Some(now + Duration::seconds(self.window_seconds as i64));
        }
        entry.failures = entry.failures.saturating_add(1);

        let exponent = (entry.failures.saturating_sub(1)).min(8);
        let backoff_ms = self.backoff_base_ms.saturating_mul(1_u64 << exponent);
        entry.next_allowed_at = Some(now + Duration::milliseconds(backoff_ms as i64));

        if entry.failures >= self.max_failures {
            entry.failures = 0;
            entry.window_ends_at = None;
            entry.locked_until = Some(now + Duration::seconds(self.lockout_seconds as i64));
            entries.insert(key.to_string(), entry);
            return AppError::RateLimited;
        }

        entries.insert(key.to_string(), entry);
        AppError::Unauthorized
    }
}

#[derive(Clone, Default)]
pub struct LoginAttemptState {
    pub failures: u32,
    pub window_ends_at: Option<DateTime<Utc>>,
    pub locked_until: Option<DateTime<Utc>>,
    pub next_allowed_at: Option<DateTime<Utc>>,
}
