//! The intermediate representation of Sleuth programs: interned symbols, flat terms, predicate
//! calls, goal bodies and the clauses they make up, plus a parser for the Prolog-flavoured
//! surface syntax.
//!
//! Terms in Sleuth are deliberately flat. A term is either a constant or a variable, and the only
//! compound structure is the predicate call itself, `name(arg, ...)`. Goal bodies are built from
//! calls, conjunction (`,`) and the committed-choice conditional `(Cond -> Then ; Else)`.
//!
//! ```text
//! suspect(john).
//! is_guilty(Suspect, vol) :-
//!     suspect(Suspect),
//!     has_motive(Suspect, vol),
//!     (has_fingerprint_on_weapon(Suspect, vol) -> true ; eyewitness_identification(Suspect, vol)).
//! ```
//!
//! Parsing goes through `syn`, so the tokenizer is Rust's: `//` and `/* */` comments are skipped,
//! strings are double-quoted, and unbalanced delimiters are rejected before parsing even starts.

pub mod clause;
pub mod parse;
pub mod symbol;
pub mod term;

pub use crate::{
    clause::{Clause, Fact, Program, Query, Rule},
    parse::{parse_clause_str, parse_program_str, parse_query_str, ParseError},
    symbol::{Atom, Symbol},
    term::{Args, Call, Goal, Term, Var},
};
