//! Rewrite rules and the oriented rule table.

use crate::proof::canon::{canonical_json_bytes, CanonError};
use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};
use crate::term::Expr;

/// A named equation `lhs = rhs` usable for rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub name: String,
    pub lhs: Expr,
    pub rhs: Expr,
}

impl RewriteRule {
    #[must_use]
    pub fn new(name: &str, lhs: Expr, rhs: Expr) -> Self {
        Self {
            name: name.to_string(),
            lhs,
            rhs,
        }
    }
}

/// One direction of a rule: rewrite instances of `pattern` into `template`.
///
/// `reversed = false` rewrites `lhs` to `rhs`; `reversed = true` rewrites
/// `rhs` to `lhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry {
    pub rule: RewriteRule,
    pub reversed: bool,
}

impl RuleEntry {
    /// The side that is matched against subterms.
    #[must_use]
    pub fn pattern(&self) -> &Expr {
        if self.reversed {
            &self.rule.rhs
        } else {
            &self.rule.lhs
        }
    }

    /// The side that replaces a matched subterm.
    #[must_use]
    pub fn template(&self) -> &Expr {
        if self.reversed {
            &self.rule.lhs
        } else {
            &self.rule.rhs
        }
    }

    /// Check that this orientation can rewrite ground terms to ground terms.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::PatternIsVariable`] if the pattern would match
    /// every subterm, or [`RuleError::UnboundTemplateVar`] if the template
    /// mentions a variable the pattern cannot bind.
    pub fn validate(&self) -> Result<(), RuleError> {
        if matches!(self.pattern(), Expr::Var(_)) {
            return Err(RuleError::PatternIsVariable {
                rule: self.rule.name.clone(),
                reversed: self.reversed,
            });
        }
        let bound = self.pattern().vars();
        if let Some(var) = self
            .template()
            .vars()
            .into_iter()
            .find(|v| !bound.contains(v))
        {
            return Err(RuleError::UnboundTemplateVar {
                rule: self.rule.name.clone(),
                reversed: self.reversed,
                var,
            });
        }
        Ok(())
    }
}

/// A rule orientation that cannot be used for rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The pattern is a bare variable.
    PatternIsVariable { rule: String, reversed: bool },
    /// The template uses a variable not bound by the pattern.
    UnboundTemplateVar {
        rule: String,
        reversed: bool,
        var: String,
    },
    /// A serialized table entry is malformed.
    Malformed { detail: String },
}

impl std::fmt::Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PatternIsVariable { rule, reversed } => {
                write!(f, "rule {rule} (reversed={reversed}): pattern is a bare variable")
            }
            Self::UnboundTemplateVar {
                rule,
                reversed,
                var,
            } => write!(
                f,
                "rule {rule} (reversed={reversed}): template variable ?{var} is not bound by the pattern"
            ),
            Self::Malformed { detail } => write!(f, "malformed rule table: {detail}"),
        }
    }
}

impl std::error::Error for RuleError {}

/// Ordered list of usable rule orientations.
///
/// Entry order is significant: rewrites are enumerated entry by entry, and
/// proof steps refer to entries by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    entries: Vec<RuleEntry>,
}

impl RuleTable {
    /// Build a table from explicit orientations, rejecting unusable ones.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`] found.
    pub fn new(entries: Vec<RuleEntry>) -> Result<Self, RuleError> {
        for entry in &entries {
            entry.validate()?;
        }
        Ok(Self { entries })
    }

    /// Register every rule forward and reversed, silently skipping
    /// orientations that fail [`RuleEntry::validate`].
    #[must_use]
    pub fn bidirectional(rules: Vec<RewriteRule>) -> Self {
        let mut entries = Vec::with_capacity(rules.len() * 2);
        for rule in rules {
            for reversed in [false, true] {
                let entry = RuleEntry {
                    rule: rule.clone(),
                    reversed,
                };
                if entry.validate().is_ok() {
                    entries.push(entry);
                }
            }
        }
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RuleEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON projection: `[{"lhs", "name", "reversed", "rhs"}, ...]`.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.entries
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "lhs": e.rule.lhs.to_string(),
                        "name": e.rule.name,
                        "reversed": e.reversed,
                        "rhs": e.rule.rhs.to_string(),
                    })
                })
                .collect(),
        )
    }

    /// Decode the projection produced by [`RuleTable::to_json_value`].
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Malformed`] on structural problems and the
    /// validation error of any unusable entry.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, RuleError> {
        let items = value.as_array().ok_or_else(|| RuleError::Malformed {
            detail: "rule table is not an array".into(),
        })?;
        let mut entries = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let field = |key: &str| {
                item[key].as_str().ok_or_else(|| RuleError::Malformed {
                    detail: format!("entry {i}: missing string field {key:?}"),
                })
            };
            let parse = |key: &str| {
                Expr::parse(field(key)?).map_err(|e| RuleError::Malformed {
                    detail: format!("entry {i}: {key}: {e}"),
                })
            };
            let reversed = item["reversed"]
                .as_bool()
                .ok_or_else(|| RuleError::Malformed {
                    detail: format!("entry {i}: missing bool field \"reversed\""),
                })?;
            entries.push(RuleEntry {
                rule: RewriteRule {
                    name: field("name")?.to_string(),
                    lhs: parse("lhs")?,
                    rhs: parse("rhs")?,
                },
                reversed,
            });
        }
        Self::new(entries)
    }

    /// Digest of the canonical JSON projection.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonical serialization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = canonical_json_bytes(&self.to_json_value())?;
        Ok(canonical_hash(HashDomain::RuleTable, &bytes))
    }
}
