//! Backward chaining over a [`KnowledgeBase`].
//!
//! Solving a goal produces a lazy stream of bindings. Conjunctions are nested iteration, left goal
//! outermost, so solutions come out in the same order a Prolog engine would produce them. The
//! conditional `(Cond -> Then ; Else)` is a committed choice: only the first solution of `Cond` is
//! ever looked at, and `Else` sees the bindings from before `Cond` was tried.

use crate::{
    binding::Binding,
    fact_store::FactStore,
    knowledge_base::KnowledgeBase,
    rule_store::RuleStore,
    unify::unify_head,
};

use ::{
    failure::Fail,
    sleuth_ir::{Call, Goal, Symbol},
    std::iter,
    tracing::{trace, warn},
};

pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum ResolveError {
    /// Rule expansion nested deeper than the configured bound. The knowledge base format does not
    /// rule out recursive or cyclic definitions, so this is how one shows up.
    #[fail(
        display = "resolving `{}` exceeded the maximum rule depth of {}",
        predicate, depth
    )]
    DepthExceeded { predicate: Symbol, depth: usize },
}

/// A lazy sequence of solutions. An error ends the useful part of the stream; callers collecting
/// into a `Result` stop at the first one.
pub type Solutions<'a> = Box<dyn Iterator<Item = Result<Binding, ResolveError>> + 'a>;

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'kb> {
    facts: &'kb FactStore,
    rules: &'kb RuleStore,
    max_depth: usize,
}

impl<'kb> Resolver<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self {
            facts: kb.facts(),
            rules: kb.rules(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Every binding, extending `binding`, under which `goal` holds.
    pub fn solve<'a>(self, goal: &'a Goal, binding: Binding) -> Solutions<'a>
    where
        'kb: 'a,
    {
        self.solve_at(goal, binding, 0)
    }

    fn solve_at<'a>(self, goal: &'a Goal, binding: Binding, depth: usize) -> Solutions<'a>
    where
        'kb: 'a,
    {
        match goal {
            Goal::True => Box::new(iter::once(Ok(binding))),
            Goal::Fail => Box::new(iter::empty()),
            Goal::Call(call) => self.solve_call(call, binding, depth),
            Goal::And(left, right) => Box::new(self.solve_at(left, binding, depth).flat_map(
                move |result| -> Solutions<'a> {
                    match result {
                        Ok(partial) => self.solve_at(right, partial, depth),
                        Err(err) => Box::new(iter::once(Err(err))),
                    }
                },
            )),
            Goal::IfThenElse(cond, then, otherwise) => {
                // Deferred so that nothing is evaluated until the stream is first pulled.
                Box::new(iter::once(()).flat_map(move |()| -> Solutions<'a> {
                    match self.solve_at(cond, binding.clone(), depth).next() {
                        Some(Ok(committed)) => self.solve_at(then, committed, depth),
                        Some(Err(err)) => Box::new(iter::once(Err(err))),
                        None => self.solve_at(otherwise, binding.clone(), depth),
                    }
                }))
            }
        }
    }

    fn solve_call<'a>(self, call: &'a Call, binding: Binding, depth: usize) -> Solutions<'a>
    where
        'kb: 'a,
    {
        let rules = self.rules.rules_for(&call.predicate);

        if rules.is_empty() {
            let pattern = call
                .args
                .iter()
                .map(|arg| binding.resolve(arg))
                .collect::<Vec<_>>();

            return Box::new(
                self.facts
                    .matching(&call.predicate, &pattern)
                    .filter_map(move |found| binding.merge(&found))
                    .map(Ok),
            );
        }

        if depth >= self.max_depth {
            warn!(
                predicate = %call.predicate,
                depth,
                "rule expansion exceeded the maximum depth"
            );
            return Box::new(iter::once(Err(ResolveError::DepthExceeded {
                predicate: call.predicate.clone(),
                depth: self.max_depth,
            })));
        }

        Box::new(rules.iter().flat_map(move |rule| -> Solutions<'a> {
            let head = match unify_head(&call.args, &rule.head.args, &binding) {
                Some(head) => head,
                None => return Box::new(iter::empty()),
            };

            trace!(call = %call, clause = %rule, depth, "expanding rule");

            let body = self.solve_at(&rule.body, head.clause.clone(), depth + 1);
            Box::new(body.filter_map(move |result| match result {
                Ok(solved) => head.export(&solved).map(Ok),
                Err(err) => Some(Err(err)),
            }))
        }))
    }
}
