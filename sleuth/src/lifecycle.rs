//! Loading and reloading the knowledge base.
//!
//! A reload is always total: every predicate is retracted before any clause of the new program is
//! asserted, so the store never mixes an old program with a new one. The program text is read and
//! parsed before anything is retracted, which means a reload that fails leaves the previous
//! contents untouched.

use crate::{knowledge_base::KnowledgeBase, resolver::DEFAULT_MAX_DEPTH};

use ::{
    derive_more::From,
    failure::Fail,
    sleuth_ir::{parse_program_str, ParseError, Program, Symbol},
    std::{fs, io, path::PathBuf},
};

/// The predicates making up the crime scene knowledge base.
pub const DOMAIN_PREDICATES: [&str; 9] = [
    "crime_type",
    "suspect",
    "has_motive",
    "was_near_crime_scene",
    "has_fingerprint_on_weapon",
    "has_bank_transaction",
    "owns_fake_identity",
    "eyewitness_identification",
    "is_guilty",
];

/// The built-in program: suspects, evidence and the three `is_guilty` clauses.
pub const SEED_PROGRAM: &str = include_str!("crime_scene.sl");

/// Where a reload takes its clauses from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramSource {
    Builtin,
    File(PathBuf),
}

impl Default for ProgramSource {
    fn default() -> Self {
        ProgramSource::Builtin
    }
}

impl ProgramSource {
    pub fn load(&self) -> Result<Program, ReloadFailure> {
        match self {
            ProgramSource::Builtin => Ok(parse_program_str(SEED_PROGRAM)?),
            ProgramSource::File(path) => {
                let src = fs::read_to_string(path).map_err(|cause| ReloadFailure::Io {
                    path: path.display().to_string(),
                    cause,
                })?;
                Ok(parse_program_str(&src)?)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub program: ProgramSource,

    /// How deeply rule expansions may nest before resolution gives up.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program: ProgramSource::Builtin,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// How many clauses a successful reload left in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadReport {
    pub facts: usize,
    pub rules: usize,
}

#[derive(Debug, Fail, From)]
pub enum ReloadFailure {
    #[fail(display = "could not read program `{}`: {}", path, cause)]
    #[from(ignore)]
    Io {
        path: String,
        #[fail(cause)]
        cause: io::Error,
    },

    #[fail(display = "invalid program: {}", _0)]
    Parse(#[fail(cause)] ParseError),
}

impl KnowledgeBase {
    /// Retract every domain predicate, and anything else a previous program defined.
    pub fn clear(&mut self) {
        let mut predicates = DOMAIN_PREDICATES
            .iter()
            .map(|&name| Symbol::new(name))
            .collect::<Vec<_>>();
        predicates.extend(self.predicates());

        for predicate in &predicates {
            self.retract_all(predicate);
        }
    }

    /// Replace the whole contents of the store with `program`.
    pub fn reload(&mut self, program: &Program) -> ReloadReport {
        self.clear();
        self.consult(program);

        ReloadReport {
            facts: self.facts().len(),
            rules: self.rules().len(),
        }
    }
}
