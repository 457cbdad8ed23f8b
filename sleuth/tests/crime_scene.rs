use sleuth::{
    lifecycle::SEED_PROGRAM, prelude::*, Answer, Health, QueryError, DOMAIN_PREDICATES,
};

use ::{
    failure::Error,
    serde_json::json,
    sleuth_ir::{parse_program_str, Clause},
};

fn kb() -> SharedKnowledgeBase {
    SharedKnowledgeBase::load(Config::default()).unwrap()
}

fn answers(pairs: &[&[(&str, &str)]]) -> QueryResult {
    QueryResult::Bindings(
        pairs
            .iter()
            .map(|answer| answer.iter().cloned().collect::<Answer>())
            .collect(),
    )
}

#[test]
fn every_seed_fact_holds() -> Result<(), Error> {
    let kb = kb();
    let program = parse_program_str(SEED_PROGRAM)?;

    let mut checked = 0;
    for clause in &program {
        if let Clause::Fact(fact) = clause {
            // Without the trailing terminator, which the query service supplies.
            let text = fact.to_string();
            assert_eq!(kb.run_query(&text)?, QueryResult::True, "{}", text);
            checked += 1;
        }
    }

    assert_eq!(checked, 19);
    Ok(())
}

#[test]
fn guilt_needs_motive_and_evidence() -> Result<(), Error> {
    let kb = kb();

    assert_eq!(kb.run_query("is_guilty(john, vol).")?, QueryResult::True);
    assert_eq!(kb.run_query("is_guilty(mary, assassinat).")?, QueryResult::True);
    assert_eq!(kb.run_query("is_guilty(alice, escroquerie).")?, QueryResult::True);

    // Bank transaction and fake identity are not enough without a motive.
    assert_eq!(kb.run_query("is_guilty(bruno, escroquerie).")?, QueryResult::False);
    assert_eq!(kb.run_query("is_guilty(sophie, escroquerie).")?, QueryResult::False);

    assert_eq!(kb.run_query("is_guilty(john, assassinat).")?, QueryResult::False);
    Ok(())
}

#[test]
fn guilty_of_theft() -> Result<(), Error> {
    let kb = kb();
    assert_eq!(
        kb.run_query("is_guilty(X, vol).")?,
        answers(&[&[("X", "john")]])
    );
    Ok(())
}

#[test]
fn every_guilty_pair() -> Result<(), Error> {
    let kb = kb();
    assert_eq!(
        kb.run_query("is_guilty(Who, Crime)")?,
        answers(&[
            &[("Who", "john"), ("Crime", "vol")],
            &[("Who", "mary"), ("Crime", "assassinat")],
            &[("Who", "alice"), ("Crime", "escroquerie")],
        ])
    );
    Ok(())
}

#[test]
fn conjunctive_queries() -> Result<(), Error> {
    let kb = kb();
    assert_eq!(
        kb.run_query("has_bank_transaction(S, C), suspect(S), has_motive(S, C).")?,
        answers(&[&[("S", "alice"), ("C", "escroquerie")]])
    );
    assert_eq!(
        kb.run_query("crime_type(C), (has_motive(S, C) -> true ; fail)")?,
        answers(&[
            &[("C", "vol"), ("S", "john")],
            &[("C", "assassinat"), ("S", "mary")],
            &[("C", "escroquerie"), ("S", "alice")],
        ])
    );
    Ok(())
}

#[test]
fn unknown_predicates_are_false() -> Result<(), Error> {
    let kb = kb();
    assert_eq!(kb.run_query("has_alibi(john)")?, QueryResult::False);
    assert_eq!(kb.run_query("has_alibi(X)")?, QueryResult::False);
    Ok(())
}

#[test]
fn reload_is_idempotent() -> Result<(), Error> {
    let kb = kb();
    let queries = [
        "suspect(X)",
        "is_guilty(X, C)",
        "has_bank_transaction(S, escroquerie)",
        "is_guilty(bruno, escroquerie)",
    ];

    let before = queries
        .iter()
        .map(|query| kb.run_query(query))
        .collect::<Result<Vec<_>, _>>()?;

    let first = kb.reload()?;
    let second = kb.reload()?;
    assert_eq!(first, second);
    assert_eq!((first.facts, first.rules), (19, 3));

    let after = queries
        .iter()
        .map(|query| kb.run_query(query))
        .collect::<Result<Vec<_>, _>>()?;

    assert_eq!(before, after);
    Ok(())
}

#[test]
fn malformed_queries_do_not_disturb_the_store() -> Result<(), Error> {
    let kb = kb();

    for text in &[
        "",
        "   ",
        "is_guilty(john, vol",
        "is_guilty(john, vol))",
        "is_guilty(john vol)",
        "is_guilty(john, vol) extra",
        "is_guilty(john, vol) ; suspect(mary)",
    ] {
        match kb.run_query(text) {
            Err(QueryError::Parse(err)) => assert!(err.src.ends_with('.')),
            other => panic!("`{}` should be rejected, got {:?}", text, other),
        }
    }

    assert_eq!(kb.run_query("is_guilty(X, vol)")?, answers(&[&[("X", "john")]]));
    Ok(())
}

#[test]
fn health_and_self_test() -> Result<(), Error> {
    let kb = kb();
    assert_eq!(kb.health(), Health::Ok);

    let entries = kb.self_test();
    assert_eq!(
        entries.iter().map(|entry| entry.query).collect::<Vec<_>>(),
        vec![
            "suspect(john)",
            "is_guilty(john, vol)",
            "is_guilty(mary, assassinat)",
            "is_guilty(alice, escroquerie)",
        ]
    );
    assert!(entries.iter().all(|entry| entry.passed()));
    Ok(())
}

#[test]
fn json_documents() -> Result<(), Error> {
    let kb = kb();

    assert_eq!(
        kb.run_query("is_guilty(john, vol)")?.to_json(),
        json!({"success": true, "result": "true", "message": "the query is true"})
    );
    assert_eq!(
        kb.run_query("has_motive(S, C)")?.to_json(),
        json!({
            "success": true,
            "results": [
                {"S": "john", "C": "vol"},
                {"S": "mary", "C": "assassinat"},
                {"S": "alice", "C": "escroquerie"},
            ],
            "count": 3,
        })
    );
    Ok(())
}

#[test]
fn seed_covers_only_the_domain() {
    let kb = kb();
    let stored = kb.read().predicates();
    let mut domain = DOMAIN_PREDICATES.to_vec();
    domain.sort();
    assert_eq!(stored, domain);
}
