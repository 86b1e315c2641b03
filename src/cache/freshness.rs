//! Time-to-live policy for cached entries

use chrono::{DateTime, TimeDelta, Utc};

#[cfg(test)]
use mockall::automock;

use crate::module::ModuleId;

/// Default time-to-live in milliseconds
pub const DEFAULT_TTL_MS: i64 = 10_000;

/// Wildcard accepted in [`TtlRule`] fields
pub const ANY: &str = "*";

/// Source of the current time
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Per-module TTL override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlRule {
    pub organisation: String,
    pub module: String,
    pub ttl: TimeDelta,
}

impl TtlRule {
    fn matches(&self, module: &ModuleId) -> bool {
        let field = |pattern: &str, value: &str| pattern == ANY || pattern == value;
        field(&self.organisation, &module.organisation) && field(&self.module, &module.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessPolicy {
    default_ttl: TimeDelta,
    rules: Vec<TtlRule>,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(TimeDelta::milliseconds(DEFAULT_TTL_MS))
    }
}

impl FreshnessPolicy {
    pub fn new(default_ttl: TimeDelta) -> Self {
        Self {
            default_ttl,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: TtlRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// TTL of the first matching rule, else the default
    pub fn ttl_for(&self, module: &ModuleId) -> TimeDelta {
        self.rules
            .iter()
            .find(|rule| rule.matches(module))
            .map(|rule| rule.ttl)
            .unwrap_or(self.default_ttl)
    }

    /// Whether an entry stored at `stored_at` may still be trusted at `now`
    ///
    /// Without `check_ttl` every entry is trusted. A zero TTL never is.
    pub fn is_fresh(
        &self,
        module: &ModuleId,
        stored_at: DateTime<Utc>,
        now: DateTime<Utc>,
        check_ttl: bool,
    ) -> bool {
        if !check_ttl {
            return true;
        }
        let ttl = self.ttl_for(module);
        if ttl <= TimeDelta::zero() {
            return false;
        }
        now.signed_duration_since(stored_at) < ttl
    }
}
