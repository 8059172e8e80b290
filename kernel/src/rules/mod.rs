//! Rules module: rewrite rules, matching, rewrite enumeration and replay.
//!
//! Depends on `term`. Does not import from `proof::certificate`.

pub mod matching;
pub mod rewrite;
pub mod rule;

pub use rewrite::{apply_rewrite, enumerate_rewrites, Rewrite, RewriteError, RewriteHow};
pub use rule::{RewriteRule, RuleEntry, RuleError, RuleTable};
