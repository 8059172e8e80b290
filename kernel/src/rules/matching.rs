//! First-order syntactic matching and substitution.

use std::collections::BTreeMap;

use crate::term::Expr;

/// Variable bindings produced by a successful match.
pub type Bindings = BTreeMap<String, Expr>;

/// Match `pattern` against `subject`.
///
/// Pattern variables bind arbitrary subterms; a variable that occurs more
/// than once must bind equal subterms. Variables inside `subject` are rigid:
/// they only match an identical variable or a pattern variable.
#[must_use]
pub fn match_pattern(pattern: &Expr, subject: &Expr) -> Option<Bindings> {
    let mut bindings = Bindings::new();
    if match_into(pattern, subject, &mut bindings) {
        Some(bindings)
    } else {
        None
    }
}

fn match_into(pattern: &Expr, subject: &Expr, bindings: &mut Bindings) -> bool {
    match pattern {
        Expr::Var(name) => match bindings.get(name) {
            Some(bound) => bound == subject,
            None => {
                bindings.insert(name.clone(), subject.clone());
                true
            }
        },
        Expr::Atom(name) => matches!(subject, Expr::Atom(other) if other == name),
        Expr::App(head, args) => match subject {
            Expr::App(other_head, other_args)
                if other_head == head && other_args.len() == args.len() =>
            {
                args.iter()
                    .zip(other_args)
                    .all(|(p, s)| match_into(p, s, bindings))
            }
            _ => false,
        },
    }
}

/// Substitute bound variables into `template`.
///
/// Returns `None` if the template mentions a variable missing from
/// `bindings`.
#[must_use]
pub fn instantiate(template: &Expr, bindings: &Bindings) -> Option<Expr> {
    match template {
        Expr::Var(name) => bindings.get(name).cloned(),
        Expr::Atom(_) => Some(template.clone()),
        Expr::App(head, args) => {
            let new_args = args
                .iter()
                .map(|a| instantiate(a, bindings))
                .collect::<Option<Vec<_>>>()?;
            Some(Expr::App(head.clone(), new_args))
        }
    }
}
