//! Positional matching of call arguments.
//!
//! Facts are ground and terms are flat, so there is no occurs check and no structure to descend
//! into. Two variables meet only when a call is matched against a rule head, where the caller's
//! variables and the clause's variables live in different scopes; those pairs are kept as links
//! and resolved once the clause body is solved.

use crate::binding::Binding;

use ::{
    sleuth_ir::{Symbol, Term, Var},
    smallvec::SmallVec,
};

/// Match a call pattern against the arguments of a ground fact.
///
/// Constant positions must be equal, named variables bind to the fact's value (consistently, if a
/// variable is repeated) and `_` matches anything.
pub fn unify_fact(pattern: &[Term], fact: &[Symbol]) -> Option<Binding> {
    if pattern.len() != fact.len() {
        return None;
    }

    let mut binding = Binding::new();
    for (term, value) in pattern.iter().zip(fact) {
        match term {
            Term::Const(expected) => {
                if expected != value {
                    return None;
                }
            }
            Term::Var(Var::Named(var)) => {
                if !binding.bind_mut(var.clone(), value.clone()) {
                    return None;
                }
            }
            Term::Var(Var::Anonymous) => {}
        }
    }

    Some(binding)
}

/// `(clause variable, caller variable)` pairs which were both unbound at call time.
type Links = SmallVec<[(Symbol, Symbol); 4]>;

/// The result of matching a call against a rule head.
#[derive(Debug, Clone)]
pub struct HeadMatch {
    /// Initial binding for the clause's own variables.
    pub clause: Binding,

    /// The caller's binding, extended with whatever the head's constants fixed.
    pub caller: Binding,

    links: Links,
}

impl HeadMatch {
    /// Carry a solved clause binding back into the caller's scope. Caller variables linked to the
    /// same unbound clause variable become aliases. Fails if two linked clause variables ended up
    /// bound differently while sharing a caller variable.
    pub fn export(&self, solved: &Binding) -> Option<Binding> {
        let mut out = self.caller.clone();
        let mut classes: SmallVec<[(&Symbol, &Symbol); 4]> = SmallVec::new();

        for (clause_var, caller_var) in &self.links {
            match solved.get(clause_var) {
                Some(value) => {
                    if !out.bind_mut(caller_var.clone(), value.clone()) {
                        return None;
                    }
                }
                None => {
                    let root = solved.root(clause_var);
                    let first = classes
                        .iter()
                        .find(|(seen, _)| *seen == root)
                        .map(|&(_, first)| first);
                    match first {
                        Some(first) => {
                            if !out.alias_mut(first, caller_var) {
                                return None;
                            }
                        }
                        None => classes.push((root, caller_var)),
                    }
                }
            }
        }

        Some(out)
    }
}

/// Match the arguments of a call, made under `caller`, against a rule head.
pub fn unify_head(args: &[Term], head: &[Term], caller: &Binding) -> Option<HeadMatch> {
    if args.len() != head.len() {
        return None;
    }

    let mut clause = Binding::new();
    let mut caller = caller.clone();
    let mut links = Links::new();

    for (arg, param) in args.iter().zip(head) {
        match (caller.resolve(arg), clause.resolve(param)) {
            (Term::Const(value), Term::Const(expected)) => {
                if value != expected {
                    return None;
                }
            }
            (Term::Const(value), Term::Var(Var::Named(clause_var))) => {
                clause.bind_mut(clause_var, value);
            }
            (Term::Var(Var::Named(caller_var)), Term::Const(value)) => {
                caller.bind_mut(caller_var, value);
            }
            (Term::Var(Var::Named(caller_var)), Term::Var(Var::Named(clause_var))) => {
                // A variable repeated on either side equates everything linked to it on the
                // other side.
                for (seen_clause, seen_caller) in &links {
                    if *seen_clause == clause_var && !caller.alias_mut(seen_caller, &caller_var) {
                        return None;
                    }
                    if *seen_caller == caller_var && !clause.alias_mut(seen_clause, &clause_var) {
                        return None;
                    }
                }
                links.push((clause_var, caller_var));
            }
            (Term::Var(Var::Anonymous), _) | (_, Term::Var(Var::Anonymous)) => {}
        }
    }

    // A link may now have one side bound by a later position; push values across until nothing
    // changes.
    let mut changed = true;
    while changed {
        changed = false;
        for (clause_var, caller_var) in &links {
            match (clause.get(clause_var).cloned(), caller.get(caller_var).cloned()) {
                (Some(a), Some(b)) => {
                    if a != b {
                        return None;
                    }
                }
                (Some(value), None) => {
                    caller.bind_mut(caller_var.clone(), value);
                    changed = true;
                }
                (None, Some(value)) => {
                    clause.bind_mut(clause_var.clone(), value);
                    changed = true;
                }
                (None, None) => {}
            }
        }
    }

    Some(HeadMatch {
        clause,
        caller,
        links,
    })
}
