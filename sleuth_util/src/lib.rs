use ::{
    derive_more::From,
    failure::Fail,
    serde_json::{json, Value},
    sleuth::{
        diagnostics::self_test_json, prelude::*, Health, ProgramSource, QueryError,
        ReloadFailure, DEFAULT_MAX_DEPTH,
    },
    std::{
        fmt,
        io::{self, BufRead, Write},
        path::PathBuf,
    },
    structopt::StructOpt,
    tracing::{debug, warn},
    tracing_subscriber::EnvFilter,
};

/// Environment variable holding the log filter, in `tracing_subscriber::EnvFilter` syntax.
pub const LOG_ENV: &str = "SLEUTH_LOG";

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sleuth",
    about = "Query the crime scene knowledge base: who had the motive, the means and the evidence against them."
)]
pub struct Opt {
    /// Load this program instead of the built-in crime scene.
    #[structopt(long, parse(from_os_str))]
    pub program: Option<PathBuf>,

    /// Maximum nesting of rule expansions before a query is abandoned.
    #[structopt(long)]
    pub max_depth: Option<usize>,

    /// Print results as JSON documents, one per line.
    #[structopt(long)]
    pub json: bool,

    /// Log at debug level unless `SLEUTH_LOG` says otherwise.
    #[structopt(short, long)]
    pub verbose: bool,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Run a single query, e.g. `is_guilty(X, vol)`.
    Query { query: String },

    /// Read queries from standard input, one per line. `:reload` reloads the program and `:quit`
    /// exits.
    Repl,

    /// Run the self test queries.
    Check,

    /// Run the liveness probe.
    Health,

    /// Reload the program and report how many clauses it holds.
    Reload,
}

impl Opt {
    pub fn config(&self) -> Config {
        Config {
            program: match &self.program {
                Some(path) => ProgramSource::File(path.clone()),
                None => ProgramSource::Builtin,
            },
            max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        }
    }

    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
            EnvFilter::new(if self.verbose { "debug" } else { "info" })
        })
    }
}

/// Install the global `tracing` subscriber. Logs go to stderr so that stdout only carries results.
pub fn init_logging(opt: &Opt) {
    tracing_subscriber::fmt()
        .with_env_filter(opt.log_filter())
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug, Fail, From)]
pub enum ErrorKind {
    #[fail(display = "IO error: `{}`", _0)]
    Io(#[cause] io::Error),

    #[fail(display = "error loading the knowledge base: `{}`", _0)]
    Reload(#[cause] ReloadFailure),

    #[fail(display = "error running query: `{}`", _0)]
    Query(#[cause] QueryError),

    #[fail(display = "error writing JSON: `{}`", _0)]
    Json(#[cause] serde_json::Error),

    #[fail(display = "{} of {} self test queries failed", failed, total)]
    #[from(ignore)]
    SelfTest { failed: usize, total: usize },

    #[fail(display = "health check failed: {}", _0)]
    #[from(ignore)]
    Unhealthy(String),
}

struct Printer<'a, W> {
    out: &'a mut W,
    json: bool,
}

impl<'a, W: Write> Printer<'a, W> {
    /// Write `text`, or the document built by `doc` in JSON mode.
    fn print<T, F>(&mut self, text: T, doc: F) -> Result<(), ErrorKind>
    where
        T: fmt::Display,
        F: FnOnce() -> Value,
    {
        if self.json {
            serde_json::to_writer(&mut *self.out, &doc())?;
            writeln!(self.out)?;
        } else {
            writeln!(self.out, "{}", text)?;
        }

        Ok(())
    }

    fn query(&mut self, kb: &SharedKnowledgeBase, text: &str) -> Result<(), ErrorKind> {
        match kb.run_query(text) {
            Ok(result) => self.print(&result, || result.to_json()),
            Err(err) => {
                self.print(format!("error: {}", err), || err.to_json(text))?;
                Err(err.into())
            }
        }
    }

    fn reload(&mut self, kb: &SharedKnowledgeBase) -> Result<(), ErrorKind> {
        let report = kb.reload()?;
        self.print(
            format!("loaded {} facts and {} rules", report.facts, report.rules),
            || {
                json!({
                    "message": "knowledge base reloaded",
                    "facts": report.facts,
                    "rules": report.rules,
                })
            },
        )
    }
}

/// Carry out `opt.command` against `kb`, which should already be loaded. The REPL reads from
/// `input`; everything is written to `out`.
pub fn run<R, W>(
    kb: &SharedKnowledgeBase,
    opt: &Opt,
    input: R,
    out: &mut W,
) -> Result<(), ErrorKind>
where
    R: BufRead,
    W: Write,
{
    let mut printer = Printer {
        out,
        json: opt.json,
    };

    match &opt.command {
        Command::Query { query } => printer.query(kb, query),
        Command::Repl => repl(kb, &mut printer, input),
        Command::Check => {
            let entries = kb.self_test();
            let failed = entries.iter().filter(|entry| !entry.passed()).count();

            if opt.json {
                printer.print("", || self_test_json(&entries))?;
            } else {
                for entry in &entries {
                    printer.print(entry, Value::default)?;
                }
            }

            if failed > 0 {
                Err(ErrorKind::SelfTest {
                    failed,
                    total: entries.len(),
                })
            } else {
                Ok(())
            }
        }
        Command::Health => {
            let health = kb.health();
            printer.print(&health, || json!(health))?;
            match health {
                Health::Error(message) => Err(ErrorKind::Unhealthy(message)),
                _ => Ok(()),
            }
        }
        Command::Reload => printer.reload(kb),
    }
}

fn repl<R, W>(
    kb: &SharedKnowledgeBase,
    printer: &mut Printer<W>,
    input: R,
) -> Result<(), ErrorKind>
where
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        let line = line.trim();

        let outcome = match line {
            "" => continue,
            ":quit" | ":q" => break,
            ":reload" => printer.reload(kb),
            _ => printer.query(kb, line),
        };

        // A bad line has already been reported; carry on with the next one.
        match outcome {
            Err(ErrorKind::Query(err)) => debug!(%err, "query failed"),
            Err(ErrorKind::Reload(err)) => {
                warn!(%err, "reload failed");
                printer.print(format!("error: {}", err), || {
                    json!({"error": "reload failed", "details": err.to_string()})
                })?;
            }
            other => other?,
        }
    }

    Ok(())
}
