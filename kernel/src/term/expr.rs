//! First-order expressions and subterm addressing.

use std::collections::BTreeSet;
use std::fmt;

use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};

/// Path from the root of an expression to one of its subterms.
///
/// Each component is a zero-based argument index. The empty address is the
/// root itself.
pub type Address = Vec<usize>;

/// A first-order term.
///
/// Textual form: atoms are bare identifiers (`one`), pattern variables are
/// prefixed with `?` (`?x`), applications are `head(arg, ...)`. A nullary
/// application `f()` is a different term from the atom `f`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Expr {
    /// Constant symbol.
    Atom(String),
    /// Pattern variable. Rigid when it appears in a goal.
    Var(String),
    /// Function application.
    App(String, Vec<Expr>),
}

impl Expr {
    /// Convenience constructor for an atom.
    #[must_use]
    pub fn atom(name: &str) -> Self {
        Self::Atom(name.to_string())
    }

    /// Convenience constructor for a pattern variable.
    #[must_use]
    pub fn var(name: &str) -> Self {
        Self::Var(name.to_string())
    }

    /// Convenience constructor for an application.
    #[must_use]
    pub fn app(head: &str, args: Vec<Expr>) -> Self {
        Self::App(head.to_string(), args)
    }

    /// Immediate arguments (empty for atoms and variables).
    #[must_use]
    pub fn args(&self) -> &[Expr] {
        match self {
            Self::App(_, args) => args,
            Self::Atom(_) | Self::Var(_) => &[],
        }
    }

    /// Number of nodes in the term tree.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.args().iter().map(Expr::size).sum::<usize>()
    }

    /// Names of all pattern variables, sorted.
    #[must_use]
    pub fn vars(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_vars(&mut out);
        out
    }

    fn collect_vars(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Var(name) => {
                out.insert(name.clone());
            }
            Self::Atom(_) => {}
            Self::App(_, args) => {
                for arg in args {
                    arg.collect_vars(out);
                }
            }
        }
    }

    /// `true` if the term contains no pattern variables.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Var(_) => false,
            Self::Atom(_) => true,
            Self::App(_, args) => args.iter().all(Expr::is_ground),
        }
    }

    /// The subterm at `address`, or `None` if the path leaves the tree.
    #[must_use]
    pub fn subterm(&self, address: &[usize]) -> Option<&Expr> {
        let mut current = self;
        for &index in address {
            current = current.args().get(index)?;
        }
        Some(current)
    }

    /// A copy of `self` with the subterm at `address` replaced.
    ///
    /// Returns `None` if the address does not exist.
    #[must_use]
    pub fn replace_at(&self, address: &[usize], replacement: Expr) -> Option<Expr> {
        let Some((&first, rest)) = address.split_first() else {
            return Some(replacement);
        };
        match self {
            Self::App(head, args) => {
                let child = args.get(first)?.replace_at(rest, replacement)?;
                let mut new_args = args.clone();
                new_args[first] = child;
                Some(Self::App(head.clone(), new_args))
            }
            Self::Atom(_) | Self::Var(_) => None,
        }
    }

    /// All `(address, subterm)` pairs in preorder (root first, then
    /// arguments left to right).
    #[must_use]
    pub fn positions(&self) -> Vec<(Address, &Expr)> {
        let mut out = Vec::with_capacity(self.size());
        let mut stack: Vec<(Address, &Expr)> = vec![(Vec::new(), self)];
        while let Some((address, expr)) = stack.pop() {
            // Push children in reverse so the leftmost is visited first.
            for (i, child) in expr.args().iter().enumerate().rev() {
                let mut child_address = address.clone();
                child_address.push(i);
                stack.push((child_address, child));
            }
            out.push((address, expr));
        }
        out
    }

    /// Content fingerprint of the canonical text form.
    #[must_use]
    pub fn fingerprint(&self) -> ContentHash {
        canonical_hash(HashDomain::Expr, self.to_string().as_bytes())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(name) => f.write_str(name),
            Self::Var(name) => write!(f, "?{name}"),
            Self::App(head, args) => {
                write!(f, "{head}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}
