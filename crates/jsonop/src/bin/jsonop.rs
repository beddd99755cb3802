//! `jsonop` — apply a chain of operations to a JSON document.
//!
//! Usage:
//!   jsonop [-f FILE] [-c] [-d] --OPERATION [EXPR] ...
//!
//! The document is read from stdin unless `-f` is given. Operations run in
//! the order their flags appear.

use anyhow::{Context, Result};
use jsonop::cli::{render, Config, Input};
use jsonop::pipeline::{process, DEBUG_TARGET};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = Config::from_args(std::env::args_os()).unwrap_or_else(|e| e.exit());
    init_tracing(config.debug);
    if let Err(e) = run(&config) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<()> {
    let text = config.read_input().with_context(|| match &config.input {
        Input::Stdin => "cannot read stdin".to_string(),
        Input::File(path) => format!("cannot read {}", path.display()),
    })?;
    let value = process(&text, &config.operations, config.debug)?;
    let rendered = render(&value, config.compact)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}

/// Logs go to stderr. `RUST_LOG` sets the level, `--debug` always enables
/// the per-step events.
fn init_tracing(debug: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if debug {
        if let Ok(directive) = format!("{DEBUG_TARGET}=info").parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
