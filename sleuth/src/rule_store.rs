use ::{
    sleuth_ir::{Rule, Symbol},
    std::collections::HashMap,
};

/// Rule clauses, grouped by predicate name and kept in assertion order, which is the order the
/// resolver tries them in.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: HashMap<Symbol, Vec<Rule>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule clause after any existing clauses for its predicate. Returns false if an
    /// identical clause was already present.
    pub fn assert(&mut self, rule: Rule) -> bool {
        let clauses = self.rules.entry(rule.predicate().clone()).or_default();
        if clauses.contains(&rule) {
            false
        } else {
            clauses.push(rule);
            true
        }
    }

    pub fn retract_all(&mut self, predicate: &Symbol) -> usize {
        self.rules.remove(predicate).map_or(0, |clauses| clauses.len())
    }

    /// The clauses for `predicate`, in the order they were asserted. Empty if there are none.
    pub fn rules_for(&self, predicate: &Symbol) -> &[Rule] {
        self.rules
            .get(predicate)
            .map_or(&[][..], |clauses| clauses.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn predicates(&self) -> impl Iterator<Item = &Symbol> {
        self.rules.keys()
    }
}
