//! Rewrite search: a bounded, pluggable proof-search driver.
//!
//! Depends only on `rewrite_kernel`; the harness layers fixtures and
//! artifact bundles on top.
//!
//! # Crate dependency graph
//!
//! ```text
//! rewrite_kernel  ←  rewrite_search  ←  rewrite_harness
//! (terms, rules)     (driver, bfs)       (fixtures, bundles)
//! ```
//!
//! # Key types
//!
//! - [`config::SearchConfigV1`] / [`config::build_config`] -- run parameters
//! - [`contract::Strategy`] -- the pluggable algorithm (`init`, `startup`, `step`)
//! - [`state::SearchState`] -- the rewrite graph a strategy grows
//! - [`driver::run`] -- the bounded loop, producing [`driver::SearchOutcome`]
//! - [`graph::SearchGraphV1`] -- audit record of a run
//! - [`bfs::BreadthFirstFactory`] -- the default strategy

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bfs;
pub mod config;
pub mod contract;
pub mod driver;
pub mod error;
pub mod explain;
pub mod frontier;
pub mod graph;
pub mod state;
pub mod trace;
