//! The `uniplist` CLI: converts the Marshal-serialized unicode dataset into
//! a property-list document.

use clap::{error::ErrorKind, Parser};
use eyre::{Result, WrapErr};
use std::{fs, path::PathBuf, process};
use tracing::debug;

/// Regenerate `unicode_table.plist` from addressable's `unicode.data`.
#[derive(Clone, Debug, Parser)]
#[command(name = "uniplist", version, about)]
struct UniplistArgs {
    /// Path to the Marshal-serialized unicode dataset.
    #[arg(value_name = "UNICODE_DATA")]
    input: PathBuf,

    /// Destination path for the generated property list. Overwritten in full.
    #[arg(value_name = "PLIST")]
    output: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    subscriber();
    run(parse_args())
}

/// Parses the command line, exiting with status 1 on usage errors.
///
/// clap exits with status 2 on its own; callers of this tool expect the
/// historical status 1 for a wrong argument count. Help and version keep
/// their normal exit behavior.
fn parse_args() -> UniplistArgs {
    UniplistArgs::try_parse().unwrap_or_else(|err| {
        if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
            err.exit();
        }
        let _ = err.print();
        process::exit(1);
    })
}

/// Initializes a tracing subscriber filtered from the environment.
fn subscriber() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

fn run(args: UniplistArgs) -> Result<()> {
    let bytes =
        fs::read(&args.input).wrap_err_with(|| format!("failed to read {}", args.input.display()))?;
    debug!(bytes = bytes.len(), "read input dataset");

    let table = uniplist::load_table(&bytes)
        .wrap_err_with(|| format!("failed to decode {}", args.input.display()))?;
    debug!(entries = table.len(), "decoded unicode table");

    let doc = uniplist::plist::render(&table);
    fs::write(&args.output, &doc)
        .wrap_err_with(|| format!("failed to write {}", args.output.display()))?;
    debug!(bytes = doc.len(), "wrote property list");

    Ok(())
}
