//! Proof module: canonical hashing, canonical JSON, proof certificates.
//!
//! `certificate` depends on `term` and `rules`; `hash` and `canon` depend on
//! nothing internal.

pub mod canon;
pub mod certificate;
pub mod hash;
pub mod hash_domain;
