//! indicator-formula — translate indicator formulas from the command line.
//!
//! Formulas are taken from the arguments, or one per line from stdin when
//! none are given. Each translation is printed on its own line.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use indicator_formula::formula::config::{load_config, load_config_from};
use indicator_formula::formula::{tokenize, ConfigError, FormulaError, Translator};

#[derive(Debug, Parser)]
#[command(name = "indicator-formula", version, about)]
struct Cli {
    /// Formulas to translate. Reads stdin when omitted.
    formulas: Vec<String>,

    /// Config file (defaults to ~/.indicator-formula/config.yaml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the token stream instead of translating.
    #[arg(long, conflicts_with = "ast")]
    tokens: bool,

    /// Print the parsed expression tree instead of translating.
    #[arg(long)]
    ast: bool,

    /// Print the allow-listed function names and exit.
    #[arg(long)]
    list_functions: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn build_translator(path: Option<&PathBuf>) -> Result<Translator, ConfigError> {
    let config = match path {
        Some(path) => Some(load_config_from(path)?),
        None => load_config()?,
    };
    match config {
        Some(config) => Translator::from_config(&config),
        None => Ok(Translator::new()),
    }
}

fn run_one(cli: &Cli, translator: &Translator, formula: &str) -> Result<String, FormulaError> {
    if cli.tokens {
        let tokens = tokenize(formula)?;
        let lines: Vec<String> = tokens
            .iter()
            .map(|t| format!("{:?} {:?} @{}", t.kind, t.text, t.offset))
            .collect();
        Ok(lines.join("\n"))
    } else if cli.ast {
        Ok(format!("{:#?}", translator.parse(formula)?))
    } else {
        translator.translate(formula)
    }
}

fn read_stdin() -> io::Result<Vec<String>> {
    let mut formulas = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            formulas.push(line);
        }
    }
    Ok(formulas)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let translator = match build_translator(cli.config.as_ref()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };

    if cli.list_functions {
        for name in translator.functions().names() {
            println!("{name}");
        }
        return;
    }

    let formulas = if cli.formulas.is_empty() {
        match read_stdin() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("error: failed to read stdin: {e}");
                process::exit(2);
            }
        }
    } else {
        cli.formulas.clone()
    };

    let mut failed = false;
    for formula in &formulas {
        match run_one(&cli, &translator, formula) {
            Ok(output) => println!("{output}"),
            Err(e) => {
                eprintln!("error: {e}");
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_keeps_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let err = build_translator(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("missing.yaml"));
    }
}
