//! `SearchFixtureV1`: a self-contained search problem.
//!
//! ```json
//! {
//!   "fixture_id": "monoid.unit_cancel",
//!   "equation": "mul(a, one) = mul(one, a)",
//!   "rules": [{"name": "mul_one", "lhs": "mul(?a, one)", "rhs": "?a"}],
//!   "bidirectional": true,
//!   "config": {"max_iterations": 100}
//! }
//! ```
//!
//! `bidirectional` defaults to `true`; `config` defaults to no overrides.

use rewrite_kernel::proof::canon::canonical_json_bytes;
use rewrite_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use rewrite_kernel::rules::{RewriteRule, RuleEntry, RuleError, RuleTable};
use rewrite_kernel::term::{Equation, Expr};
use rewrite_search::config::{build_config, ConfigOverrides, SearchConfigV1};
use rewrite_search::error::SearchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureError {
    /// Input bytes are not JSON.
    NotJson { detail: String },
    /// A field is missing or has the wrong shape.
    Malformed { detail: String },
    /// A rule orientation cannot be used for rewriting.
    Rule(RuleError),
    /// The config overrides were rejected.
    Config(SearchError),
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotJson { detail } => write!(f, "fixture is not JSON: {detail}"),
            Self::Malformed { detail } => write!(f, "malformed fixture: {detail}"),
            Self::Rule(e) => write!(f, "fixture rule: {e}"),
            Self::Config(e) => write!(f, "fixture config: {e}"),
        }
    }
}

impl std::error::Error for FixtureError {}

fn malformed(detail: impl Into<String>) -> FixtureError {
    FixtureError::Malformed {
        detail: detail.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFixtureV1 {
    pub fixture_id: String,
    pub equation: Equation,
    pub rules: Vec<RewriteRule>,
    /// Register each rule in both directions.
    pub bidirectional: bool,
    pub config: ConfigOverrides,
}

impl SearchFixtureV1 {
    /// # Errors
    ///
    /// Returns [`FixtureError::Malformed`] for missing or mistyped fields and
    /// [`FixtureError::Config`] for rejected overrides.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, FixtureError> {
        let fixture_id = value["fixture_id"]
            .as_str()
            .ok_or_else(|| malformed("missing string field \"fixture_id\""))?
            .to_string();
        let equation_text = value["equation"]
            .as_str()
            .ok_or_else(|| malformed("missing string field \"equation\""))?;
        let equation =
            Equation::parse(equation_text).map_err(|e| malformed(format!("equation: {e}")))?;

        let items = value["rules"]
            .as_array()
            .ok_or_else(|| malformed("missing array field \"rules\""))?;
        let mut rules = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let text = |key: &str| {
                item[key]
                    .as_str()
                    .ok_or_else(|| malformed(format!("rule {i}: missing string field {key:?}")))
            };
            let expr = |key: &str| {
                Expr::parse(text(key)?).map_err(|e| malformed(format!("rule {i}: {key}: {e}")))
            };
            rules.push(RewriteRule::new(text("name")?, expr("lhs")?, expr("rhs")?));
        }

        let bidirectional = match &value["bidirectional"] {
            serde_json::Value::Null => true,
            v => v
                .as_bool()
                .ok_or_else(|| malformed("\"bidirectional\" must be a boolean"))?,
        };
        let config = match &value["config"] {
            serde_json::Value::Null => ConfigOverrides::default(),
            v => ConfigOverrides::from_json(v).map_err(FixtureError::Config)?,
        };

        Ok(Self {
            fixture_id,
            equation,
            rules,
            bidirectional,
            config,
        })
    }

    /// # Errors
    ///
    /// Returns [`FixtureError::NotJson`] or the errors of
    /// [`SearchFixtureV1::from_json_value`].
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, FixtureError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| FixtureError::NotJson {
                detail: e.to_string(),
            })?;
        Self::from_json_value(&value)
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "bidirectional": self.bidirectional,
            "config": self.config.to_json_value(),
            "equation": self.equation.to_string(),
            "fixture_id": self.fixture_id,
            "rules": self.rules.iter().map(|r| serde_json::json!({
                "lhs": r.lhs.to_string(),
                "name": r.name,
                "rhs": r.rhs.to_string(),
            })).collect::<Vec<_>>(),
        })
    }

    /// # Errors
    ///
    /// Returns [`FixtureError::Malformed`] if canonical serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, FixtureError> {
        canonical_json_bytes(&self.to_json_value()).map_err(|e| malformed(e.to_string()))
    }

    /// # Errors
    ///
    /// See [`SearchFixtureV1::to_canonical_json_bytes`].
    pub fn digest(&self) -> Result<ContentHash, FixtureError> {
        Ok(canonical_hash(
            HashDomain::SearchFixture,
            &self.to_canonical_json_bytes()?,
        ))
    }

    /// The rule table this fixture searches with.
    ///
    /// Bidirectional fixtures skip unusable orientations; one-way fixtures
    /// reject them.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Rule`] for an unusable forward rule in a
    /// one-way fixture.
    pub fn table(&self) -> Result<RuleTable, FixtureError> {
        if self.bidirectional {
            return Ok(RuleTable::bidirectional(self.rules.clone()));
        }
        let entries = self
            .rules
            .iter()
            .map(|rule| RuleEntry {
                rule: rule.clone(),
                reversed: false,
            })
            .collect();
        RuleTable::new(entries).map_err(FixtureError::Rule)
    }

    /// # Errors
    ///
    /// Returns [`FixtureError::Config`] if the overrides are invalid.
    pub fn search_config(&self) -> Result<SearchConfigV1, FixtureError> {
        build_config(&self.config).map_err(FixtureError::Config)
    }
}
