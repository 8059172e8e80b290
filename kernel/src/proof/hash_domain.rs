//! Typed domain separators for canonical hashing.
//!
//! Every hash computed in the workspace selects a domain via [`HashDomain`].
//! The enum, `as_bytes()`, `ALL`, and `Display` are generated from one
//! macro invocation so they cannot drift apart.

/// Declares `HashDomain` enum, `as_bytes()`, `ALL`, and `Display` from one list.
macro_rules! define_hash_domains {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $bytes:expr
        ),+ $(,)?
    ) => {
        /// Typed domain separator for [`super::hash::canonical_hash`].
        ///
        /// Every variant maps to a unique, null-terminated byte string used as
        /// a SHA-256 prefix.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashDomain {
            /// The raw domain-separator bytes (null-terminated).
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// All domain variants in declaration order.
            pub const ALL: &[HashDomain] = &[
                $( Self::$variant, )+
            ];
        }

        impl core::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => write!(f, stringify!($variant)), )+
                }
            }
        }
    };
}

define_hash_domains! {
    // -----------------------------------------------------------------------
    // Kernel
    // -----------------------------------------------------------------------

    /// Expression fingerprints (vertex deduplication).
    Expr => b"REWRITE::EXPR::V1\0",

    /// Equation fingerprints (search graph binding).
    Equation => b"REWRITE::EQUATION::V1\0",

    /// Rule table digests.
    RuleTable => b"REWRITE::RULE_TABLE::V1\0",

    /// Proof term digests.
    ProofTerm => b"REWRITE::PROOF_TERM::V1\0",

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Search configuration digests.
    SearchConfig => b"REWRITE::SEARCH_CONFIG::V1\0",

    /// Search graph hashing.
    SearchGraph => b"REWRITE::SEARCH_GRAPH::V1\0",

    // -----------------------------------------------------------------------
    // Harness
    // -----------------------------------------------------------------------

    /// Bundle artifact content hashing.
    BundleArtifact => b"REWRITE::BUNDLE_ARTIFACT::V1\0",

    /// Bundle digest (normative projection).
    BundleDigest => b"REWRITE::BUNDLE_DIGEST::V1\0",

    /// Search fixture hashing.
    SearchFixture => b"REWRITE::SEARCH_FIXTURE::V1\0",
}
