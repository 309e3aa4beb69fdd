//! Failure tolerance: decides whether a run with failed segments may still produce an artifact.
//!
//! There is deliberately no `Default`: every caller states its own tolerance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any failed segment aborts the run.
    Strict,
    /// Failed segments are dropped while `failed / total <= max_failure_rate`.
    Tolerate { max_failure_rate: f64 },
}

/// Outcome of checking a failure count against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Proceed,
    Abort,
}

impl FailurePolicy {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            FailurePolicy::Strict => Ok(()),
            FailurePolicy::Tolerate { max_failure_rate } => {
                if (0.0..=1.0).contains(max_failure_rate) {
                    Ok(())
                } else {
                    Err(format!(
                        "max_failure_rate must be within [0, 1], got {max_failure_rate}"
                    ))
                }
            }
        }
    }

    pub fn evaluate(&self, failed: usize, total: usize) -> Verdict {
        if failed == 0 {
            return Verdict::Proceed;
        }
        match self {
            FailurePolicy::Strict => Verdict::Abort,
            FailurePolicy::Tolerate { max_failure_rate } => {
                let rate = failed as f64 / total.max(1) as f64;
                if rate > *max_failure_rate {
                    Verdict::Abort
                } else {
                    Verdict::Proceed
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_aborts_on_any_failure() {
        assert_eq!(FailurePolicy::Strict.evaluate(0, 5), Verdict::Proceed);
        assert_eq!(FailurePolicy::Strict.evaluate(1, 5), Verdict::Abort);
    }

    #[test]
    fn test_tolerate_compares_rate_against_threshold() {
        let policy = FailurePolicy::Tolerate {
            max_failure_rate: 0.4,
        };
        assert_eq!(policy.evaluate(2, 5), Verdict::Proceed);
        assert_eq!(policy.evaluate(3, 5), Verdict::Abort);
    }

    #[test]
    fn test_rate_out_of_range_is_invalid() {
        assert!(FailurePolicy::Tolerate {
            max_failure_rate: 1.5
        }
        .validate()
        .is_err());
        assert!(FailurePolicy::Tolerate {
            max_failure_rate: f64::NAN
        }
        .validate()
        .is_err());
        assert!(FailurePolicy::Strict.validate().is_ok());
    }

    #[test]
    fn test_policy_json_shape() {
        let policy: FailurePolicy =
            serde_json::from_str(r#"{"mode": "tolerate", "max_failure_rate": 0.25}"#).unwrap();
        assert_eq!(
            policy,
            FailurePolicy::Tolerate {
                max_failure_rate: 0.25
            }
        );
        let strict: FailurePolicy = serde_json::from_str(r#"{"mode": "strict"}"#).unwrap();
        assert_eq!(strict, FailurePolicy::Strict);
    }
}
