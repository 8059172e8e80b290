//! Rewrite kernel: terms, rewrite rules, and checkable proof certificates.
//!
//! # API Surface
//!
//! - [`term::Expr::parse`] / [`term::Equation::parse`] -- read terms and goals
//! - [`rules::enumerate_rewrites`] -- every single-step rewrite of a term
//! - [`rules::apply_rewrite`] -- replay one recorded step
//! - [`proof::certificate::ProofTerm::check`] -- verify a proof by replay
//!
//! # Module Dependency Direction
//!
//! `term` ← `rules` ← `proof::certificate`
//!
//! `proof::hash` and `proof::canon` are leaves used by every layer.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod proof;
pub mod rules;
pub mod term;
