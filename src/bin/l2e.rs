//! tex2expr CLI - LaTeX math to infix expression translator

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, BufRead, Write};
#[cfg(feature = "cli")]
use tex2expr::{
    translate_with_options, ErrorKind, LogBase, PlusMinus, TranslateError, TranslateOptions,
    TranslationWarning,
};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "l2e")]
#[command(version)]
#[command(about = "tex2expr - translate LaTeX math into evaluator-ready infix expressions", long_about = None)]
struct Cli {
    /// Expressions to translate (reads lines from --input or stdin if none)
    expressions: Vec<String>,

    /// Input file with one expression per line
    #[arg(short, long)]
    input: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Keep going past malformed input, reporting warnings instead of errors
    #[arg(long)]
    lenient: bool,

    /// Sign used for \pm (\mp takes the other one)
    #[arg(long, value_enum, default_value_t = PmArg::Plus)]
    pm: PmArg,

    /// Meaning of an unlabelled \log
    #[arg(long, value_enum, default_value_t = LogBaseArg::Common)]
    log_base: LogBaseArg,

    /// Print one JSON object per expression
    #[arg(long)]
    json: bool,

    /// Log every pipeline stage to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum PmArg {
    /// \pm is +
    Plus,
    /// \pm is -
    Minus,
}

#[cfg(feature = "cli")]
impl From<PmArg> for PlusMinus {
    fn from(arg: PmArg) -> Self {
        match arg {
            PmArg::Plus => PlusMinus::Plus,
            PmArg::Minus => PlusMinus::Minus,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum LogBaseArg {
    /// \log is log10
    Common,
    /// \log is the natural log
    Natural,
}

#[cfg(feature = "cli")]
impl From<LogBaseArg> for LogBase {
    fn from(arg: LogBaseArg) -> Self {
        match arg {
            LogBaseArg::Common => LogBase::Common,
            LogBaseArg::Natural => LogBase::Natural,
        }
    }
}

/// Failure details in JSON output
#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ErrorRecord {
    kind: ErrorKind,
    offset: usize,
    message: String,
}

#[cfg(feature = "cli")]
impl From<&TranslateError> for ErrorRecord {
    fn from(err: &TranslateError) -> Self {
        ErrorRecord {
            kind: err.kind(),
            offset: err.offset(),
            message: err.to_string(),
        }
    }
}

/// One line of JSON output
#[cfg(feature = "cli")]
#[derive(Serialize)]
struct Record<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expression: Option<String>,
    warnings: Vec<TranslationWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorRecord>,
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tex2expr=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn read_expressions(cli: &Cli) -> io::Result<Vec<String>> {
    if !cli.expressions.is_empty() {
        return Ok(cli.expressions.clone());
    }
    let lines: Vec<String> = match cli.input {
        Some(ref path) => fs::read_to_string(path)?
            .lines()
            .map(str::to_string)
            .collect(),
        None => io::stdin().lock().lines().collect::<io::Result<_>>()?,
    };
    Ok(lines.into_iter().filter(|l| !l.trim().is_empty()).collect())
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = TranslateOptions {
        strict: !cli.lenient,
        plus_minus: cli.pm.into(),
        log_base: cli.log_base.into(),
    };

    let expressions = read_expressions(&cli)?;
    let mut output = String::new();
    let mut failed = false;

    for input in &expressions {
        let result = translate_with_options(input, &options);
        if cli.json {
            let record = match &result {
                Ok(translation) => Record {
                    input,
                    expression: Some(translation.expression.clone()),
                    warnings: translation.warnings.clone(),
                    error: None,
                },
                Err(err) => Record {
                    input,
                    expression: None,
                    warnings: Vec::new(),
                    error: Some(ErrorRecord::from(err)),
                },
            };
            let line = serde_json::to_string(&record)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            output.push_str(&line);
            output.push('\n');
        } else {
            match &result {
                Ok(translation) => {
                    for warning in &translation.warnings {
                        eprintln!("warning: {}", warning);
                    }
                    output.push_str(&translation.expression);
                    output.push('\n');
                }
                Err(err) => eprintln!("✗ {}: {}", input, err),
            }
        }
        failed |= result.is_err();
    }

    match cli.output {
        Some(ref path) => {
            fs::write(path, &output)?;
            eprintln!("✓ Output written to: {}", path);
        }
        None => io::stdout().write_all(output.as_bytes())?,
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install tex2expr --features cli");
    eprintln!("  l2e [OPTIONS] [EXPRESSION]...");
}
