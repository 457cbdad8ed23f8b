use crate::{binding::Binding, unify::unify_fact};

use ::{
    roaring::RoaringBitmap,
    sleuth_ir::{Args, Fact, Symbol, Term},
    smallvec::SmallVec,
    std::{
        collections::{HashMap, HashSet},
        ops::Index,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactId(u32);

type FactArgs = SmallVec<[Symbol; 4]>;

/// Ids of the facts that may match a pattern, in insertion order.
type Candidates = smallvec::IntoIter<[FactId; 8]>;

/// Every fact asserted for one predicate name.
#[derive(Debug, Clone, Default)]
struct Relation {
    facts: Vec<FactArgs>,
    known: HashSet<FactArgs>,

    /// For each `(position, constant)`, the facts holding that constant at that position.
    const_sets: HashMap<(usize, Symbol), RoaringBitmap>,
}

impl Index<FactId> for Relation {
    type Output = [Symbol];

    fn index(&self, id: FactId) -> &Self::Output {
        &self.facts[id.0 as usize]
    }
}

impl Relation {
    fn insert(&mut self, args: FactArgs) -> bool {
        if self.known.contains(&args) {
            return false;
        }

        let id = self.facts.len() as u32;
        for (pos, value) in args.iter().enumerate() {
            self.const_sets
                .entry((pos, value.clone()))
                .or_insert_with(RoaringBitmap::new)
                .insert(id);
        }

        self.known.insert(args.clone());
        self.facts.push(args);
        true
    }

    fn search(&self, pattern: &[Term]) -> Candidates {
        let mut candidates: Option<RoaringBitmap> = None;

        for (pos, term) in pattern.iter().enumerate() {
            if let Term::Const(value) = term {
                match self.const_sets.get(&(pos, value.clone())) {
                    Some(set) => match candidates.as_mut() {
                        Some(acc) => *acc &= set,
                        None => candidates = Some(set.clone()),
                    },
                    // No fact has this constant here, so nothing can match.
                    None => return SmallVec::new().into_iter(),
                }
            }
        }

        let ids: SmallVec<[FactId; 8]> = match candidates {
            Some(set) => set.iter().map(FactId).collect(),
            None => (0..self.facts.len() as u32).map(FactId).collect(),
        };

        ids.into_iter()
    }
}

/// Ground facts, grouped by predicate name and kept in assertion order.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    relations: HashMap<Symbol, Relation>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fact. Returns false if an identical fact was already present.
    pub fn assert(&mut self, fact: Fact) -> bool {
        self.relations
            .entry(fact.predicate)
            .or_insert_with(Relation::default)
            .insert(fact.args)
    }

    /// Remove every fact for `predicate`, returning how many there were.
    pub fn retract_all(&mut self, predicate: &Symbol) -> usize {
        self.relations
            .remove(predicate)
            .map_or(0, |relation| relation.facts.len())
    }

    pub fn contains(&self, fact: &Fact) -> bool {
        self.relations
            .get(&fact.predicate)
            .map_or(false, |relation| relation.known.contains(&fact.args))
    }

    pub fn len(&self) -> usize {
        self.relations.values().map(|r| r.facts.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn predicates(&self) -> impl Iterator<Item = &Symbol> {
        self.relations.keys()
    }

    /// All facts for `predicate`, in assertion order.
    pub fn facts<'a>(&'a self, predicate: &Symbol) -> impl Iterator<Item = Fact> + 'a {
        let predicate = predicate.clone();
        self.relations
            .get(&predicate)
            .into_iter()
            .flat_map(|relation| relation.facts.iter())
            .map(move |args| Fact {
                predicate: predicate.clone(),
                args: args.clone(),
            })
    }

    /// Lazily enumerate the bindings of `pattern`'s variables against every fact of `predicate`,
    /// in assertion order. An unknown predicate simply has no matches.
    pub fn matching(&self, predicate: &Symbol, pattern: &[Term]) -> FactMatches {
        let relation = self.relations.get(predicate);
        let candidates = relation.map_or_else(
            || SmallVec::<[FactId; 8]>::new().into_iter(),
            |relation| relation.search(pattern),
        );

        FactMatches {
            relation,
            pattern: pattern.iter().cloned().collect(),
            candidates,
        }
    }
}

pub struct FactMatches<'a> {
    relation: Option<&'a Relation>,
    pattern: Args,
    candidates: Candidates,
}

impl<'a> Iterator for FactMatches<'a> {
    type Item = Binding;

    fn next(&mut self) -> Option<Binding> {
        let relation = self.relation?;
        for id in &mut self.candidates {
            if let Some(binding) = unify_fact(&self.pattern, &relation[id]) {
                return Some(binding);
            }
        }

        None
    }
}
