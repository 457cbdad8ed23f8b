//! Liveness probe and self test.

use crate::{
    knowledge_base::KnowledgeBase,
    query::{run_query, QueryResult},
};

use ::{
    serde::Serialize,
    serde_json::{json, Value},
    std::fmt,
};

/// The query the liveness probe runs.
pub const HEALTH_QUERY: &str = "suspect(john).";

pub const SELF_TEST_QUERIES: [&str; 4] = [
    "suspect(john)",
    "is_guilty(john, vol)",
    "is_guilty(mary, assassinat)",
    "is_guilty(alice, escroquerie)",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "UPPERCASE")]
pub enum Health {
    /// The probe query succeeded.
    Ok,

    /// The probe query ran but was false; the knowledge base is probably not loaded.
    Warning,

    Error(String),
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Health::Ok => write!(f, "OK"),
            Health::Warning => write!(f, "WARNING: `{}` is false", HEALTH_QUERY),
            Health::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

pub fn health(kb: &KnowledgeBase, max_depth: usize) -> Health {
    match run_query(kb, HEALTH_QUERY, max_depth) {
        Ok(QueryResult::False) => Health::Warning,
        Ok(_) => Health::Ok,
        Err(err) => Health::Error(err.to_string()),
    }
}

/// The outcome of one self test query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestEntry {
    pub query: &'static str,
    pub outcome: Result<QueryResult, String>,
}

impl SelfTestEntry {
    /// Whether the query ran and had at least one solution.
    pub fn passed(&self) -> bool {
        self.outcome.as_ref().map_or(false, QueryResult::is_true)
    }

    pub fn to_json(&self) -> Value {
        match &self.outcome {
            Ok(result) => json!({
                "success": true,
                "result": result.is_true(),
                "details": result.to_json(),
            }),
            Err(message) => json!({
                "success": false,
                "error": message,
            }),
        }
    }
}

impl fmt::Display for SelfTestEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.outcome {
            Ok(result) => write!(f, "{}: {}", self.query, result.is_true()),
            Err(message) => write!(f, "{}: error: {}", self.query, message),
        }
    }
}

pub fn self_test(kb: &KnowledgeBase, max_depth: usize) -> Vec<SelfTestEntry> {
    SELF_TEST_QUERIES
        .iter()
        .map(|&query| SelfTestEntry {
            query,
            outcome: run_query(kb, query, max_depth).map_err(|err| err.to_string()),
        })
        .collect()
}

/// The combined self test document, keyed by query.
pub fn self_test_json(entries: &[SelfTestEntry]) -> Value {
    let results = entries
        .iter()
        .map(|entry| (entry.query.to_owned(), entry.to_json()))
        .collect::<serde_json::Map<_, _>>();

    json!({
        "message": "self test complete",
        "results": results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleuth_ir::parse_program_str;

    #[test]
    fn health_reflects_the_probe() {
        let mut kb = KnowledgeBase::new();
        assert_eq!(health(&kb, 8), Health::Warning);

        kb.consult(&parse_program_str("suspect(john).").unwrap());
        assert_eq!(health(&kb, 8), Health::Ok);

        assert_eq!(
            serde_json::to_value(Health::Ok).unwrap(),
            json!({"status": "OK"})
        );
    }

    #[test]
    fn cyclic_probe_is_an_error() {
        let mut kb = KnowledgeBase::new();
        kb.consult(&parse_program_str("suspect(X) :- suspect(X).").unwrap());

        match health(&kb, 8) {
            Health::Error(message) => assert!(message.contains("suspect")),
            other => panic!("expected an error, got {:?}", other),
        }
    }

    #[test]
    fn self_test_reports_each_query() {
        let mut kb = KnowledgeBase::new();
        kb.consult(&parse_program_str("suspect(john).").unwrap());

        let entries = self_test(&kb, 8);
        assert_eq!(entries.len(), 4);
        assert!(entries[0].passed());
        assert!(entries[1..].iter().all(|entry| !entry.passed()));

        let doc = self_test_json(&entries);
        assert_eq!(doc["results"]["suspect(john)"]["result"], true);
        assert_eq!(doc["results"]["is_guilty(john, vol)"]["result"], false);
    }
}
