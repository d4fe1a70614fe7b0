//! Resource limits shared by every solution method.

use std::time::Duration;

use serde::Serialize;

use qap_core::{QapError, QapResult};

/// Limits applied to a single method run.
///
/// `-1` is the sentinel for "no limit / solver default" on all three numeric
/// limits. `time_limit` is in seconds; `soft_mem_limit` is in GB and is
/// advisory for backends without a memory knob. `pre_crush` exists for
/// parity with engines that would otherwise drop user cuts in presolve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolveLimits {
    pub time_limit: f64,
    pub threads: i64,
    pub soft_mem_limit: i64,
    pub pre_crush: bool,
}

impl Default for SolveLimits {
    fn default() -> Self {
        Self {
            time_limit: -1.0,
            threads: -1,
            soft_mem_limit: -1,
            pre_crush: true,
        }
    }
}

impl SolveLimits {
    pub fn validate(&self) -> QapResult<()> {
        if self.time_limit != -1.0 && self.time_limit <= 0.0 {
            return Err(QapError::Config(format!(
                "time_limit setting is <= 0 and not -1 (got {})",
                self.time_limit
            )));
        }
        if self.threads != -1 && self.threads <= 0 {
            return Err(QapError::Config(format!(
                "threads setting is <= 0 and not -1 (got {})",
                self.threads
            )));
        }
        if self.soft_mem_limit != -1 && self.soft_mem_limit <= 0 {
            return Err(QapError::Config(format!(
                "soft_mem_limit setting is <= 0 and not -1 (got {})",
                self.soft_mem_limit
            )));
        }
        Ok(())
    }

    /// Wall-clock budget, when one is set.
    pub fn time_budget(&self) -> Option<Duration> {
        (self.time_limit != -1.0).then(|| Duration::from_secs_f64(self.time_limit))
    }

    /// Worker count for parallel work; `None` means library default.
    pub fn thread_count(&self) -> Option<usize> {
        (self.threads > 0).then_some(self.threads as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let limits = SolveLimits::default();
        assert!(limits.validate().is_ok());
        assert!(limits.time_budget().is_none());
        assert!(limits.thread_count().is_none());
    }

    #[test]
    fn test_sentinel_and_positive_accepted() {
        let limits = SolveLimits {
            time_limit: 30.0,
            threads: 4,
            soft_mem_limit: 8,
            pre_crush: false,
        };
        assert!(limits.validate().is_ok());
        assert_eq!(limits.time_budget(), Some(Duration::from_secs(30)));
        assert_eq!(limits.thread_count(), Some(4));
    }

    #[test]
    fn test_non_sentinel_non_positive_rejected() {
        for bad in [
            SolveLimits {
                time_limit: 0.0,
                ..Default::default()
            },
            SolveLimits {
                time_limit: -2.0,
                ..Default::default()
            },
            SolveLimits {
                threads: 0,
                ..Default::default()
            },
            SolveLimits {
                soft_mem_limit: -5,
                ..Default::default()
            },
        ] {
            assert!(matches!(bad.validate(), Err(QapError::Config(_))));
        }
    }
}
