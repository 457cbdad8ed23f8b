use crate::{Call, Goal, Symbol, Term};

use ::{
    derive_more::From,
    im::Vector,
    smallvec::SmallVec,
    std::{convert::TryFrom, fmt},
};

/// A ground assertion: a predicate name and its constant arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fact {
    pub predicate: Symbol,
    pub args: SmallVec<[Symbol; 4]>,
}

impl Fact {
    pub fn new<P, I, A>(predicate: P, args: I) -> Self
    where
        P: Into<Symbol>,
        I: IntoIterator<Item = A>,
        A: Into<Symbol>,
    {
        Self {
            predicate: predicate.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn to_call(&self) -> Call {
        Call::new(
            self.predicate.clone(),
            self.args.iter().cloned().map(Term::Const),
        )
    }
}

impl TryFrom<Call> for Fact {
    type Error = Call;

    /// Fails, handing the call back, if any argument is a variable.
    fn try_from(call: Call) -> Result<Self, Call> {
        if !call.is_ground() {
            return Err(call);
        }

        let args = call
            .args
            .iter()
            .filter_map(Term::as_const)
            .cloned()
            .collect();

        Ok(Self {
            predicate: call.predicate,
            args,
        })
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.to_call().fmt(f)
    }
}

/// `head :- body`. The head may mix constants and variables; variables are local to one
/// invocation of the rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub head: Call,
    pub body: Goal,
}

impl Rule {
    pub fn new(head: Call, body: impl Into<Goal>) -> Self {
        Self {
            head,
            body: body.into(),
        }
    }

    pub fn predicate(&self) -> &Symbol {
        &self.head.predicate
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} :- {}", self.head, self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Clause {
    Fact(Fact),
    Rule(Rule),
}

impl Clause {
    pub fn predicate(&self) -> &Symbol {
        match self {
            Clause::Fact(fact) => &fact.predicate,
            Clause::Rule(rule) => rule.predicate(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Clause::Fact(fact) => write!(f, "{}.", fact),
            Clause::Rule(rule) => write!(f, "{}.", rule),
        }
    }
}

/// An ordered sequence of clauses. Order matters: it is the order facts are enumerated in and the
/// order rule clauses are tried in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub clauses: Vector<Clause>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, clause: impl Into<Clause>) {
        self.clauses.push_back(clause.into());
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Distinct predicate names defined by this program, in order of first definition.
    pub fn predicates(&self) -> Vec<Symbol> {
        let mut predicates: Vec<Symbol> = Vec::new();
        for clause in self.iter() {
            if !predicates.contains(clause.predicate()) {
                predicates.push(clause.predicate().clone());
            }
        }
        predicates
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Clause;
    type IntoIter = im::vector::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

/// A parsed query: the goal to solve and the variables whose values make up an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub goal: Goal,
    pub vars: Vec<Symbol>,
}

impl Query {
    pub fn new(goal: impl Into<Goal>) -> Self {
        let goal = goal.into();
        let vars = goal.vars();
        Self { goal, vars }
    }

    pub fn has_vars(&self) -> bool {
        !self.vars.is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.", self.goal)
    }
}
