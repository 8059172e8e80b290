//! Built-in rule sets and named fixtures.
//!
//! Rule sets are the standard presentations of monoids, groups, and monoids
//! with zero over the signature `mul/2`, `inv/1`, `one`, `zero`.

use rewrite_kernel::rules::RewriteRule;
use rewrite_kernel::term::{Equation, Expr};
use rewrite_search::config::ConfigOverrides;

use crate::fixture::SearchFixtureV1;

fn v(name: &str) -> Expr {
    Expr::var(name)
}

fn c(name: &str) -> Expr {
    Expr::atom(name)
}

fn mul(a: Expr, b: Expr) -> Expr {
    Expr::app("mul", vec![a, b])
}

fn inv(a: Expr) -> Expr {
    Expr::app("inv", vec![a])
}

/// `mul_one`, `one_mul`, `mul_assoc`.
#[must_use]
pub fn monoid_rules() -> Vec<RewriteRule> {
    vec![
        RewriteRule::new("mul_one", mul(v("a"), c("one")), v("a")),
        RewriteRule::new("one_mul", mul(c("one"), v("a")), v("a")),
        RewriteRule::new(
            "mul_assoc",
            mul(mul(v("a"), v("b")), v("c")),
            mul(v("a"), mul(v("b"), v("c"))),
        ),
    ]
}

/// Monoid rules plus inverse laws.
#[must_use]
pub fn group_rules() -> Vec<RewriteRule> {
    let mut rules = monoid_rules();
    rules.extend([
        RewriteRule::new("mul_inv", mul(v("a"), inv(v("a"))), c("one")),
        RewriteRule::new("inv_mul", mul(inv(v("a")), v("a")), c("one")),
        RewriteRule::new("inv_inv", inv(inv(v("a"))), v("a")),
        RewriteRule::new("inv_one", inv(c("one")), c("one")),
    ]);
    rules
}

/// Monoid rules plus absorbing zero.
#[must_use]
pub fn monoid_with_zero_rules() -> Vec<RewriteRule> {
    let mut rules = monoid_rules();
    rules.extend([
        RewriteRule::new("mul_zero", mul(v("a"), c("zero")), c("zero")),
        RewriteRule::new("zero_mul", mul(c("zero"), v("a")), c("zero")),
    ]);
    rules
}

fn fixture(
    id: &str,
    lhs: Expr,
    rhs: Expr,
    rules: Vec<RewriteRule>,
    config: ConfigOverrides,
) -> SearchFixtureV1 {
    SearchFixtureV1 {
        fixture_id: id.to_string(),
        equation: Equation::new(lhs, rhs),
        rules,
        bidirectional: true,
        config,
    }
}

fn explained() -> ConfigOverrides {
    ConfigOverrides {
        explain: Some(true),
        trace_summary: Some(true),
        ..ConfigOverrides::default()
    }
}

/// Every named fixture, in a stable order.
#[must_use]
pub fn all_fixtures() -> Vec<SearchFixtureV1> {
    let (a, b) = (c("a"), c("b"));
    let (cc, d) = (c("c"), c("d"));
    vec![
        fixture(
            "monoid.unit_cancel",
            mul(a.clone(), c("one")),
            mul(c("one"), a.clone()),
            monoid_rules(),
            explained(),
        ),
        fixture(
            "monoid.assoc_shift",
            mul(mul(a.clone(), b.clone()), mul(cc.clone(), d.clone())),
            mul(a.clone(), mul(b.clone(), mul(cc, d))),
            monoid_rules(),
            explained(),
        ),
        fixture(
            "monoid.reflexive",
            mul(a.clone(), b.clone()),
            mul(a.clone(), b.clone()),
            monoid_rules(),
            explained(),
        ),
        fixture(
            "monoid.distinct_atoms",
            mul(a.clone(), c("one")),
            b.clone(),
            monoid_rules(),
            ConfigOverrides {
                max_iterations: Some(50),
                ..ConfigOverrides::default()
            },
        ),
        fixture(
            "group.inv_inv_cancel",
            mul(inv(inv(a.clone())), c("one")),
            a.clone(),
            group_rules(),
            explained(),
        ),
        fixture(
            "group.mul_inv_cancel_left",
            mul(a.clone(), mul(inv(a.clone()), b.clone())),
            b.clone(),
            group_rules(),
            ConfigOverrides {
                explain: Some(true),
                explain_using_conv: Some(false),
                ..ConfigOverrides::default()
            },
        ),
        fixture(
            "group.capped",
            mul(a, c("one")),
            mul(b.clone(), c("one")),
            group_rules(),
            ConfigOverrides {
                max_iterations: Some(25),
                trace: Some(true),
                ..ConfigOverrides::default()
            },
        ),
        fixture(
            "monoid_zero.absorb",
            mul(mul(c("x"), c("zero")), b),
            mul(c("zero"), c("y")),
            monoid_with_zero_rules(),
            explained(),
        ),
    ]
}

/// Look up a fixture by id.
#[must_use]
pub fn fixture_by_id(id: &str) -> Option<SearchFixtureV1> {
    all_fixtures().into_iter().find(|f| f.fixture_id == id)
}
