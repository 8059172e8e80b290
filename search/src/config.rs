//! Search configuration: defaults, user overrides, validation.
//!
//! Overrides are merged onto defaults once per run by [`build_config`]; the
//! resulting [`SearchConfigV1`] is read-only for the rest of the run.

use rewrite_kernel::proof::canon::canonical_json_bytes;
use rewrite_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

use crate::error::SearchError;

/// Default iteration budget.
pub const DEFAULT_MAX_ITERATIONS: u64 = 5000;

/// Run parameters for one search invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfigV1 {
    /// Hard cap on `step` calls. Always positive after validation.
    pub max_iterations: u64,
    /// Ask the strategy to prefer shorter proofs when a step finds several.
    pub optimal: bool,
    /// Keep stepping after the strategy reports `Exhausted`. The full
    /// `max_iterations` budget is then spent unless a step solves the goal.
    pub exhaustive: bool,
    /// Emit one trace event per iteration.
    pub trace: bool,
    /// Emit a summary trace event at the end of the run.
    pub trace_summary: bool,
    /// Emit the rule table before the search starts.
    pub trace_rules: bool,
    /// Render the proof into a script on success.
    pub explain: bool,
    /// Render scripts with `conv` navigation instead of occurrence indices.
    pub explain_using_conv: bool,
}

impl Default for SearchConfigV1 {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            optimal: true,
            exhaustive: false,
            trace: false,
            trace_summary: false,
            trace_rules: false,
            explain: false,
            explain_using_conv: true,
        }
    }
}

impl SearchConfigV1 {
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] if `max_iterations` is zero.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_iterations == 0 {
            return Err(SearchError::InvalidConfig {
                detail: "max_iterations must be positive, got 0".into(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "exhaustive": self.exhaustive,
            "explain": self.explain,
            "explain_using_conv": self.explain_using_conv,
            "max_iterations": self.max_iterations,
            "optimal": self.optimal,
            "trace": self.trace,
            "trace_rules": self.trace_rules,
            "trace_summary": self.trace_summary,
        })
    }

    /// Digest of the canonical JSON projection.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] if canonical serialization fails.
    pub fn digest(&self) -> Result<ContentHash, SearchError> {
        let bytes = canonical_json_bytes(&self.to_json_value()).map_err(|e| {
            SearchError::InvalidConfig {
                detail: e.to_string(),
            }
        })?;
        Ok(canonical_hash(HashDomain::SearchConfig, &bytes))
    }
}

/// User-supplied overrides. `None` keeps the default.
///
/// `max_iterations` is signed so that non-positive requests are rejected by
/// validation instead of being unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub max_iterations: Option<i64>,
    pub optimal: Option<bool>,
    pub exhaustive: Option<bool>,
    pub trace: Option<bool>,
    pub trace_summary: Option<bool>,
    pub trace_rules: Option<bool>,
    pub explain: Option<bool>,
    pub explain_using_conv: Option<bool>,
}

impl ConfigOverrides {
    /// Read overrides from a JSON object. Absent keys and `null` keep the
    /// default.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] for a non-object input, an
    /// unknown key, or a value of the wrong type.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, SearchError> {
        let map = value.as_object().ok_or_else(|| SearchError::InvalidConfig {
            detail: "config overrides must be a JSON object".into(),
        })?;
        let mut out = Self::default();
        for (key, v) in map {
            if v.is_null() {
                continue;
            }
            let slot = match key.as_str() {
                "max_iterations" => {
                    out.max_iterations = Some(v.as_i64().ok_or_else(|| wrong_type(key, "an integer"))?);
                    continue;
                }
                "optimal" => &mut out.optimal,
                "exhaustive" => &mut out.exhaustive,
                "trace" => &mut out.trace,
                "trace_summary" => &mut out.trace_summary,
                "trace_rules" => &mut out.trace_rules,
                "explain" => &mut out.explain,
                "explain_using_conv" => &mut out.explain_using_conv,
                other => {
                    return Err(SearchError::InvalidConfig {
                        detail: format!("unknown config key {other:?}"),
                    })
                }
            };
            *slot = Some(v.as_bool().ok_or_else(|| wrong_type(key, "a boolean"))?);
        }
        Ok(out)
    }

    /// JSON object holding only the fields that are set.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if let Some(n) = self.max_iterations {
            map.insert("max_iterations".into(), n.into());
        }
        let flags = [
            ("optimal", self.optimal),
            ("exhaustive", self.exhaustive),
            ("trace", self.trace),
            ("trace_summary", self.trace_summary),
            ("trace_rules", self.trace_rules),
            ("explain", self.explain),
            ("explain_using_conv", self.explain_using_conv),
        ];
        for (key, value) in flags {
            if let Some(b) = value {
                map.insert(key.into(), b.into());
            }
        }
        serde_json::Value::Object(map)
    }
}

fn wrong_type(key: &str, expected: &str) -> SearchError {
    SearchError::InvalidConfig {
        detail: format!("config key {key:?} must be {expected}"),
    }
}

/// Merge `overrides` onto the defaults and validate.
///
/// # Errors
///
/// Returns [`SearchError::InvalidConfig`] if `max_iterations <= 0`.
pub fn build_config(overrides: &ConfigOverrides) -> Result<SearchConfigV1, SearchError> {
    let defaults = SearchConfigV1::default();
    let max_iterations = match overrides.max_iterations {
        None => defaults.max_iterations,
        Some(n) => u64::try_from(n)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| SearchError::InvalidConfig {
                detail: format!("max_iterations must be positive, got {n}"),
            })?,
    };
    let config = SearchConfigV1 {
        max_iterations,
        optimal: overrides.optimal.unwrap_or(defaults.optimal),
        exhaustive: overrides.exhaustive.unwrap_or(defaults.exhaustive),
        trace: overrides.trace.unwrap_or(defaults.trace),
        trace_summary: overrides.trace_summary.unwrap_or(defaults.trace_summary),
        trace_rules: overrides.trace_rules.unwrap_or(defaults.trace_rules),
        explain: overrides.explain.unwrap_or(defaults.explain),
        explain_using_conv: overrides
            .explain_using_conv
            .unwrap_or(defaults.explain_using_conv),
    };
    config.validate()?;
    Ok(config)
}
