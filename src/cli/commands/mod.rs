//! CLI command dispatch and handlers.
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod codec;
pub mod completions;
pub mod hierarchy;
pub mod inspect;
pub mod version;
pub mod zquest;

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::cli::args::{Cli, Commands, OutputFormat, ZquestSubcommand};
use crate::error::AthenaError;
use crate::io::{TransactionalFileWriter, Writer};

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub fn dispatch(cli: Cli) -> Result<(), AthenaError> {
    match cli.command {
        Commands::Compress(args) => codec::compress(&args),
        Commands::Decompress(args) => codec::decompress(&args),
        Commands::Checksum(args) => codec::checksum(&args),
        Commands::Inspect(args) => inspect::inspect(&args),
        Commands::FixChecksums(args) => inspect::fix_checksums(&args, cli.quiet),
        Commands::Zquest(cmd) => match cmd.subcommand {
            ZquestSubcommand::Pack(args) => zquest::pack(&args),
            ZquestSubcommand::Unpack(args) => zquest::unpack(&args),
        },
        Commands::Hierarchy(args) => hierarchy::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Reads a whole input file.
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>, AthenaError> {
    let data = std::fs::read(path)?;
    debug!(path = %path.display(), len = data.len(), "read input");
    Ok(data)
}

/// Writes `data` to `path`, or to stdout when no path is given.
pub(crate) fn write_output(path: Option<&Path>, data: &[u8]) -> Result<(), AthenaError> {
    match path {
        Some(path) => {
            let mut writer = TransactionalFileWriter::new(path);
            writer.write_ubytes(data)?;
            writer.commit()?;
            debug!(path = %path.display(), len = data.len(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Prints a serializable report as JSON, or as YAML for humans.
pub(crate) fn print_report<T: serde::Serialize>(
    report: &T,
    format: OutputFormat,
) -> Result<(), AthenaError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Human => {
            let text = serde_yaml::to_string(report).map_err(crate::error::DnaError::from)?;
            print!("{text}");
        }
    }
    Ok(())
}
