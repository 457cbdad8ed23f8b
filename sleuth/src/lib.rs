//! Sleuth is a small backward-chaining inference engine over a knowledge base of suspects,
//! motives and evidence. It answers Prolog-style queries such as `is_guilty(X, vol).` by
//! enumerating every binding of the query's variables under which the query holds.
//!
//! The engine is deliberately modest. Terms are flat (a constant or a variable), facts are
//! ground, and rule bodies are built from calls, conjunction and the committed-choice conditional
//! `(Cond -> Then ; Else)`. What it does guarantee is the evaluation order of a Prolog engine:
//! conjunctions are solved left to right, rule clauses are tried in the order they were asserted,
//! and a conditional commits to the first solution of its condition.
//!
//! ```
//! use sleuth::{Config, QueryResult, SharedKnowledgeBase};
//!
//! # fn main() -> Result<(), failure::Error> {
//! let kb = SharedKnowledgeBase::load(Config::default())?;
//!
//! assert_eq!(kb.run_query("is_guilty(john, vol)")?, QueryResult::True);
//! assert_eq!(kb.run_query("is_guilty(bruno, escroquerie)")?, QueryResult::False);
//!
//! match kb.run_query("is_guilty(X, vol).")? {
//!     QueryResult::Bindings(answers) => assert_eq!(answers[0].to_string(), "X = john"),
//!     other => panic!("unexpected result {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The knowledge base lives behind a [`SharedKnowledgeBase`] handle. Queries only ever read it;
//! the one mutation is [`SharedKnowledgeBase::reload`], which clears every predicate and reasserts
//! the configured program while holding the write lock.

pub mod binding;
pub mod diagnostics;
pub mod fact_store;
pub mod knowledge_base;
pub mod lifecycle;
pub mod query;
pub mod resolver;
pub mod rule_store;
pub mod unify;

pub use crate::{
    binding::Binding,
    diagnostics::{Health, SelfTestEntry},
    fact_store::FactStore,
    knowledge_base::{KnowledgeBase, SharedKnowledgeBase},
    lifecycle::{Config, ProgramSource, ReloadFailure, ReloadReport, DOMAIN_PREDICATES},
    query::{run_query, Answer, QueryError, QueryResult},
    resolver::{ResolveError, Resolver, DEFAULT_MAX_DEPTH},
    rule_store::RuleStore,
};

pub use sleuth_ir::{ParseError, Symbol, Term};

pub mod prelude {
    pub use crate::{Config, QueryResult, SharedKnowledgeBase};
}
