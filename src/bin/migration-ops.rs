//! Command-line front end: compile a migrations directory and print the
//! resulting operations, the request plan, or a summary.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use migration_ops::apply::Request;
use migration_ops::{CompiledMigrations, compile_dir};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    /// Pretty JSON array of operations.
    #[default]
    Json,
    /// One JSON request per line.
    Plan,
    /// Operation counts per kind and per file.
    Summary,
}

/// Compile SQL migration files into schema-change operations.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the `*.sql` migration files.
    #[arg(long, env = "MIGRATIONS_DIR", default_value = "migrations")]
    dir: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: Format,

    /// Enable debug logging (overrides RUST_LOG).
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn write_json(out: &mut impl Write, compiled: &CompiledMigrations) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &compiled.operations)?;
    writeln!(out)
}

fn write_plan(out: &mut impl Write, compiled: &CompiledMigrations) -> io::Result<()> {
    for operation in &compiled.operations {
        serde_json::to_writer(&mut *out, &Request::for_operation(operation))?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, compiled: &CompiledMigrations) -> io::Result<()> {
    let mut per_kind: BTreeMap<&str, usize> = BTreeMap::new();
    let mut per_file: BTreeMap<&str, usize> = BTreeMap::new();
    for operation in &compiled.operations {
        *per_kind.entry(operation.kind()).or_default() += 1;
        *per_file.entry(operation.source_file.as_str()).or_default() += 1;
    }

    let sep = "=".repeat(60);
    writeln!(out, "{sep}\nSUMMARY\n{sep}")?;
    for (kind, count) in &per_kind {
        writeln!(out, "{kind:<14}{count}")?;
    }
    writeln!(out, "{sep}")?;
    for file in &compiled.files {
        let count = per_file.get(file.as_str()).copied().unwrap_or(0);
        writeln!(out, "{file:<40}{count}")?;
    }
    for failure in &compiled.failures {
        writeln!(out, "{:<40}unreadable", failure.file)?;
    }
    writeln!(out, "{sep}")?;
    writeln!(
        out,
        "{} operations in {} files",
        compiled.operations.len(),
        compiled.files.len()
    )
}

/// Compile `args.dir` and write the requested format to `out`.
///
/// Fails when the directory cannot be listed, the output cannot be written,
/// or any migration file could not be read.
fn run(args: &Args, out: &mut impl Write) -> ExitCode {
    let compiled = match compile_dir(&args.dir) {
        Ok(compiled) => compiled,
        Err(error) => {
            tracing::error!(%error, "cannot compile migrations");
            return ExitCode::FAILURE;
        }
    };

    if compiled.is_empty() {
        tracing::warn!(dir = %args.dir.display(), "no migration files found");
        return ExitCode::SUCCESS;
    }
    tracing::info!(
        operations = compiled.operations.len(),
        files = compiled.files.len(),
        "compiled migrations"
    );

    let written = match args.format {
        Format::Json => write_json(out, &compiled),
        Format::Plan => write_plan(out, &compiled),
        Format::Summary => write_summary(out, &compiled),
    };
    if let Err(error) = written {
        tracing::error!(%error, "cannot write output");
        return ExitCode::FAILURE;
    }

    if compiled.is_complete() {
        ExitCode::SUCCESS
    } else {
        for failure in &compiled.failures {
            tracing::error!(file = %failure.file, error = %failure.error, "migration not compiled");
        }
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);
    run(&args, &mut io::stdout().lock())
}
