use sleuth::{prelude::*, ProgramSource, QueryError, ReloadFailure, ResolveError};

use ::{
    failure::Error,
    std::{fs, io::Write, thread},
    tempfile::NamedTempFile,
};

fn program_file(src: &str) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    file.write_all(src.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn file_config(file: &NamedTempFile) -> Config {
    Config {
        program: ProgramSource::File(file.path().to_owned()),
        ..Config::default()
    }
}

#[test]
fn queries_never_see_a_half_loaded_store() -> Result<(), Error> {
    let kb = SharedKnowledgeBase::load(Config::default())?;

    let reloader = {
        let kb = kb.clone();
        thread::spawn(move || {
            for _ in 0..50 {
                kb.reload().unwrap();
            }
        })
    };

    let readers = (0..4)
        .map(|_| {
            let kb = kb.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    assert_eq!(kb.run_query("suspect(X)").unwrap().count(), 5);
                    assert_eq!(kb.run_query("is_guilty(X, C)").unwrap().count(), 3);
                    assert_eq!(
                        kb.run_query("is_guilty(alice, escroquerie)").unwrap(),
                        QueryResult::True
                    );
                }
            })
        })
        .collect::<Vec<_>>();

    reloader.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    Ok(())
}

#[test]
fn program_files_replace_the_seed() -> Result<(), Error> {
    let file = program_file(
        "
        suspect(eve).
        has_motive(eve, vol).
        is_guilty(S, vol) :- suspect(S), has_motive(S, vol).
        ",
    )?;

    let kb = SharedKnowledgeBase::load(file_config(&file))?;
    assert_eq!(kb.run_query("suspect(john)")?, QueryResult::False);
    assert_eq!(kb.run_query("is_guilty(X, vol)")?.to_string(), "X = eve.");

    fs::write(file.path(), "suspect(frank). alibi(frank).")?;
    let report = kb.reload()?;
    assert_eq!((report.facts, report.rules), (2, 0));

    // Nothing of the previous program survives, rules included.
    assert_eq!(kb.run_query("suspect(eve)")?, QueryResult::False);
    assert_eq!(kb.run_query("is_guilty(X, vol)")?, QueryResult::False);
    assert_eq!(kb.run_query("alibi(frank)")?, QueryResult::True);
    Ok(())
}

#[test]
fn failed_reload_keeps_the_previous_program() -> Result<(), Error> {
    let file = program_file("suspect(eve).")?;
    let kb = SharedKnowledgeBase::load(file_config(&file))?;

    fs::write(file.path(), "suspect(eve")?;
    match kb.reload() {
        Err(ReloadFailure::Parse(err)) => assert_eq!(err.src, "suspect(eve"),
        other => panic!("expected a parse failure, got {:?}", other),
    }
    assert_eq!(kb.run_query("suspect(eve)")?, QueryResult::True);

    fs::write(file.path(), "suspect(Anyone).")?;
    assert!(kb.reload().is_err());
    assert_eq!(kb.run_query("suspect(eve)")?, QueryResult::True);

    let path = file.path().to_owned();
    file.close()?;
    match kb.reload() {
        Err(ReloadFailure::Io { path: reported, .. }) => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("expected an I/O failure, got {:?}", other),
    }
    assert_eq!(kb.run_query("suspect(eve)")?, QueryResult::True);

    // Once the file is back, the next reload succeeds in full.
    fs::write(&path, "suspect(frank).")?;
    kb.reload()?;
    assert_eq!(kb.run_query("suspect(X)")?.to_string(), "X = frank.");
    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn cyclic_programs_fail_fast() -> Result<(), Error> {
    let file = program_file(
        "
        suspect(john).
        covers_for(A, B) :- covers_for(B, A).
        ",
    )?;
    let kb = SharedKnowledgeBase::load(Config {
        max_depth: 16,
        ..file_config(&file)
    })?;

    match kb.run_query("covers_for(john, X)") {
        Err(QueryError::Resolve(ResolveError::DepthExceeded { predicate, depth })) => {
            assert_eq!(predicate, "covers_for");
            assert_eq!(depth, 16);
        }
        other => panic!("expected the depth bound to trip, got {:?}", other),
    }

    // The failure is local to that query.
    assert_eq!(kb.run_query("suspect(john)")?, QueryResult::True);
    Ok(())
}
