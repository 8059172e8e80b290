//! Rewrite harness: fixtures, the built-in catalog, and artifact bundles.
//!
//! The harness does not search or check proofs itself. It feeds fixtures to
//! `rewrite_search::driver::run` and packages the outcome as a bundle whose
//! verification replays the proof through `rewrite_kernel`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bundle;
pub mod bundle_dir;
pub mod catalog;
pub mod fixture;
pub mod runner;
