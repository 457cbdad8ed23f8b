use crate::{
    diagnostics::{self, Health, SelfTestEntry},
    fact_store::FactStore,
    lifecycle::{Config, ReloadFailure, ReloadReport},
    query::{self, QueryError, QueryResult},
    rule_store::RuleStore,
};

use ::{
    parking_lot::{RwLock, RwLockReadGuard},
    sleuth_ir::{Clause, Fact, Program, Rule, Symbol},
    std::sync::Arc,
    tracing::{error, info, warn},
};

/// The fact store and rule store, kept together so that they are always loaded and cleared as one.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    facts: FactStore,
    rules: RuleStore,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn assert_fact(&mut self, fact: Fact) -> bool {
        self.facts.assert(fact)
    }

    pub fn assert_rule(&mut self, rule: Rule) -> bool {
        self.rules.assert(rule)
    }

    /// Add a clause. Returns false if it was already present.
    pub fn assert(&mut self, clause: Clause) -> bool {
        match clause {
            Clause::Fact(fact) => self.assert_fact(fact),
            Clause::Rule(rule) => self.assert_rule(rule),
        }
    }

    /// Remove every fact and rule clause for `predicate`, returning how many clauses went.
    pub fn retract_all(&mut self, predicate: &Symbol) -> usize {
        self.facts.retract_all(predicate) + self.rules.retract_all(predicate)
    }

    /// Assert every clause of `program`, in order, on top of whatever is already stored.
    pub fn consult(&mut self, program: &Program) {
        for clause in program {
            self.assert(clause.clone());
        }

        for predicate in self.shadowed_facts() {
            warn!(
                %predicate,
                "predicate has both facts and rules; its facts will never be consulted"
            );
        }
    }

    /// Predicates with both stored facts and rules. Resolution only tries the rules of such a
    /// predicate, so its facts are unreachable.
    pub fn shadowed_facts(&self) -> Vec<Symbol> {
        let mut shadowed = self
            .facts
            .predicates()
            .filter(|predicate| !self.rules.rules_for(predicate).is_empty())
            .cloned()
            .collect::<Vec<_>>();
        shadowed.sort();
        shadowed
    }

    /// Every predicate with at least one stored clause, sorted by name.
    pub fn predicates(&self) -> Vec<Symbol> {
        let mut predicates = self
            .facts
            .predicates()
            .chain(self.rules.predicates())
            .cloned()
            .collect::<Vec<_>>();
        predicates.sort();
        predicates.dedup();
        predicates
    }
}

/// A knowledge base shared between threads.
///
/// Queries take the read lock for as long as they enumerate solutions and a reload takes the
/// write lock for the whole clear and reassert, so no query ever observes a half-loaded store.
#[derive(Debug, Clone)]
pub struct SharedKnowledgeBase {
    inner: Arc<RwLock<KnowledgeBase>>,
    config: Arc<Config>,
}

impl SharedKnowledgeBase {
    /// An empty knowledge base. Nothing is loaded until [`reload`](Self::reload) is called.
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(KnowledgeBase::new())),
            config: Arc::new(config),
        }
    }

    /// Create a knowledge base and perform the initial load.
    pub fn load(config: Config) -> Result<Self, ReloadFailure> {
        let kb = Self::new(config);
        kb.reload()?;
        Ok(kb)
    }

    pub fn reload(&self) -> Result<ReloadReport, ReloadFailure> {
        info!(program = ?self.config.program, "reloading knowledge base");

        let program = self.config.program.load().map_err(|failure| {
            error!(%failure, "reload failed, keeping the previous knowledge base");
            failure
        })?;

        let report = self.inner.write().reload(&program);
        info!(
            facts = report.facts,
            rules = report.rules,
            "knowledge base reloaded"
        );

        Ok(report)
    }

    pub fn run_query(&self, text: &str) -> Result<QueryResult, QueryError> {
        let kb = self.inner.read();
        query::run_query(&kb, text, self.config.max_depth)
    }

    pub fn health(&self) -> Health {
        diagnostics::health(&self.inner.read(), self.config.max_depth)
    }

    pub fn self_test(&self) -> Vec<SelfTestEntry> {
        diagnostics::self_test(&self.inner.read(), self.config.max_depth)
    }

    /// Hold the read lock directly, for looking at the stores themselves.
    pub fn read(&self) -> RwLockReadGuard<KnowledgeBase> {
        self.inner.read()
    }
}

// The only purpose of this function is to fail compilation if these types do not
// implement `Send + Sync`.
#[allow(dead_code, unconditional_recursion)]
fn assert_send_sync<T: Send + Sync>() {
    assert_send_sync::<KnowledgeBase>();
    assert_send_sync::<SharedKnowledgeBase>();
}
