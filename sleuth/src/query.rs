//! Running textual queries and classifying their answers.

use crate::{
    binding::Binding,
    knowledge_base::KnowledgeBase,
    resolver::{ResolveError, Resolver},
};

use ::{
    derive_more::From,
    failure::Fail,
    itertools::Itertools,
    serde::ser::{Serialize, SerializeMap, Serializer},
    serde_json::{json, Value},
    sleuth_ir::{parse_query_str, ParseError, Query, Symbol, Term, Var},
    std::{fmt, iter::FromIterator},
    tracing::debug,
};

#[derive(Debug, Fail, From)]
pub enum QueryError {
    #[fail(display = "{}", _0)]
    Parse(#[fail(cause)] ParseError),

    #[fail(display = "{}", _0)]
    Resolve(#[fail(cause)] ResolveError),
}

impl QueryError {
    /// The error document returned in place of a result.
    pub fn to_json(&self, query: &str) -> Value {
        let error = match self {
            QueryError::Parse(_) => "malformed query",
            QueryError::Resolve(_) => "query could not be resolved",
        };

        json!({
            "error": error,
            "details": self.to_string(),
            "query": normalize(query),
        })
    }
}

/// One solution: the value of every query variable, in order of first appearance in the query.
/// A variable the solution left unbound is reported as the earliest query variable it is aliased
/// to, or as `_` if there is none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    entries: Vec<(Symbol, Term)>,
}

impl Answer {
    fn from_binding(vars: &[Symbol], binding: &Binding) -> Self {
        let entries = vars
            .iter()
            .enumerate()
            .map(|(i, var)| {
                let value = match binding.get(var) {
                    Some(value) => Term::Const(value.clone()),
                    None => {
                        let root = binding.root(var);
                        vars[..i]
                            .iter()
                            .find(|earlier| binding.root(earlier) == root)
                            .map_or_else(Term::anonymous, |earlier| Term::var(earlier.clone()))
                    }
                };
                (var.clone(), value)
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, var: &str) -> Option<&Term> {
        self.entries
            .iter()
            .find(|(name, _)| name == var)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Term)> {
        self.entries.iter().map(|(var, value)| (var, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Answer
where
    K: Into<Symbol>,
    V: Into<Symbol>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(var, value)| (var.into(), Term::Const(value.into())))
            .collect();
        Self { entries }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.iter()
                .format_with(", ", |(var, value), f| f(&format_args!("{} = {}", var, value)))
        )
    }
}

impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (var, value) in &self.entries {
            match value {
                Term::Const(value) | Term::Var(Var::Named(value)) => {
                    map.serialize_entry(var, value)?
                }
                Term::Var(Var::Anonymous) => map.serialize_entry(var, "_")?,
            }
        }
        map.end()
    }
}

/// The outcome of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// No solutions.
    False,

    /// At least one solution to a query without variables.
    True,

    /// Every solution to a query with variables, in enumeration order, duplicates included.
    Bindings(Vec<Answer>),
}

impl QueryResult {
    pub fn classify(query: &Query, solutions: &[Binding]) -> Self {
        if solutions.is_empty() {
            QueryResult::False
        } else if !query.has_vars() {
            QueryResult::True
        } else {
            QueryResult::Bindings(
                solutions
                    .iter()
                    .map(|binding| Answer::from_binding(&query.vars, binding))
                    .collect(),
            )
        }
    }

    pub fn is_true(&self) -> bool {
        *self != QueryResult::False
    }

    /// Number of solutions, counting a bare `True` as one.
    pub fn count(&self) -> usize {
        match self {
            QueryResult::False => 0,
            QueryResult::True => 1,
            QueryResult::Bindings(answers) => answers.len(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            QueryResult::False => json!({
                "success": true,
                "result": "false",
                "message": "the query is false",
            }),
            QueryResult::True => json!({
                "success": true,
                "result": "true",
                "message": "the query is true",
            }),
            QueryResult::Bindings(answers) => json!({
                "success": true,
                "results": answers,
                "count": answers.len(),
            }),
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryResult::False => write!(f, "false."),
            QueryResult::True => write!(f, "true."),
            QueryResult::Bindings(answers) => {
                write!(f, "{}", answers.iter().format_with(" ;\n", |answer, f| f(answer)))?;
                write!(f, ".")
            }
        }
    }
}

/// Trim surrounding whitespace and supply the terminating `.` if it is missing. A trailing line
/// comment would swallow the terminator, so it goes on its own line whenever there is one.
pub fn normalize(text: &str) -> String {
    let text = text.trim();
    if text.ends_with('.') {
        text.to_owned()
    } else if text.contains("//") {
        format!("{}\n.", text)
    } else {
        format!("{}.", text)
    }
}

/// Parse `text` as a query and enumerate all of its solutions against `kb`.
pub fn run_query(
    kb: &KnowledgeBase,
    text: &str,
    max_depth: usize,
) -> Result<QueryResult, QueryError> {
    let normalized = normalize(text);
    let query = parse_query_str(&normalized)?;

    let solutions = Resolver::new(kb)
        .with_max_depth(max_depth)
        .solve(&query.goal, Binding::new())
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        query = %normalized,
        solutions = solutions.len(),
        "query resolved"
    );

    Ok(QueryResult::classify(&query, &solutions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::DEFAULT_MAX_DEPTH;
    use sleuth_ir::parse_program_str;

    fn kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.consult(
            &parse_program_str(
                "
                saw(ann, john).
                saw(bob, john).
                saw(bob, mary).
                anyone(X) :- true.
                ",
            )
            .unwrap(),
        );
        kb
    }

    fn query(text: &str) -> Result<QueryResult, QueryError> {
        run_query(&kb(), text, DEFAULT_MAX_DEPTH)
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize("  saw(ann, X)  "), "saw(ann, X).");
        assert_eq!(normalize("saw(ann, X)."), "saw(ann, X).");
        assert_eq!(normalize(""), ".");
        assert_eq!(normalize("saw(ann, X) // who"), "saw(ann, X) // who\n.");
    }

    #[test]
    fn trailing_comments() {
        assert_eq!(query("saw(ann, john) // seen at the dock").unwrap(), QueryResult::True);
        assert_eq!(
            query("saw(ann, S) // anyone").unwrap().to_string(),
            "S = john."
        );
    }

    #[test]
    fn classification() {
        assert_eq!(query("saw(ann, mary)").unwrap(), QueryResult::False);
        assert_eq!(query("saw(ann, john)").unwrap(), QueryResult::True);
        assert_eq!(query("saw(_, john)").unwrap(), QueryResult::True);
        assert_eq!(
            query("saw(W, john)").unwrap(),
            QueryResult::Bindings(vec![
                Some(("W", "ann")).into_iter().collect(),
                Some(("W", "bob")).into_iter().collect(),
            ])
        );
    }

    #[test]
    fn answers_follow_first_appearance() {
        let result = query("saw(bob, S), saw(W, S).").unwrap();
        let answers = match result {
            QueryResult::Bindings(answers) => answers,
            other => panic!("expected bindings, got {:?}", other),
        };

        assert_eq!(answers.len(), 3);
        assert_eq!(answers[0].to_string(), "S = john, W = ann");
        assert_eq!(answers[1].to_string(), "S = john, W = bob");
        assert_eq!(answers[2].to_string(), "S = mary, W = bob");
        assert_eq!(answers[2].get("W"), Some(&Term::constant("bob")));
    }

    #[test]
    fn unbound_variables_are_reported_as_anonymous() {
        let result = query("anyone(Who)").unwrap();
        assert_eq!(result.to_json()["results"][0]["Who"], "_");
    }

    #[test]
    fn aliased_variables_are_reported_by_name() {
        let kb = {
            let mut kb = KnowledgeBase::new();
            kb.consult(&parse_program_str("same(A, A) :- true.").unwrap());
            kb
        };

        let result = run_query(&kb, "same(X, Y), same(Z, W)", DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(result.to_string(), "X = _, Y = X, Z = _, W = Z.");
        assert_eq!(
            result.to_json()["results"][0],
            json!({"X": "_", "Y": "X", "Z": "_", "W": "Z"})
        );
    }

    #[test]
    fn malformed_queries() {
        for text in &["", "saw(ann, john", "saw(ann john)", "Saw(ann)"] {
            match query(text) {
                Err(QueryError::Parse(err)) => assert_eq!(err.src, normalize(text)),
                other => panic!("`{}` should not parse, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn json_documents() {
        assert_eq!(
            query("saw(ann, mary)").unwrap().to_json(),
            json!({"success": true, "result": "false", "message": "the query is false"})
        );
        assert_eq!(
            query("saw(bob, S)").unwrap().to_json(),
            json!({
                "success": true,
                "results": [{"S": "john"}, {"S": "mary"}],
                "count": 2,
            })
        );

        let err = query("saw(").unwrap_err();
        let doc = err.to_json("saw(");
        assert_eq!(doc["error"], "malformed query");
        assert_eq!(doc["query"], "saw(.");
    }

    #[test]
    fn display() {
        assert_eq!(query("saw(ann, mary)").unwrap().to_string(), "false.");
        assert_eq!(
            query("saw(bob, S)").unwrap().to_string(),
            "S = john ;\nS = mary."
        );
    }
}
