//! CLI argument definitions.
//!
//! All Clap derive structs for `athena` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::doctree::DEFAULT_MAX_DEPTH;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Inspect, convert and repair game save files and compressed blobs.
#[derive(Parser, Debug)]
#[command(name = "athena", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "ATHENA_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "ATHENA_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress a file.
    Compress(CompressArgs),

    /// Decompress a file.
    Decompress(DecompressArgs),

    /// Print a checksum of a file.
    Checksum(ChecksumArgs),

    /// Describe a save or container file.
    Inspect(InspectArgs),

    /// Recompute and store save slot checksums.
    FixChecksums(FixChecksumsArgs),

    /// Pack or unpack ZQuest containers.
    Zquest(ZquestCommand),

    /// Validate and print a documentation hierarchy listing.
    Hierarchy(HierarchyArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version and build information.
    Version(VersionArgs),
}

// ============================================================================
// Compression Commands
// ============================================================================

/// Arguments for `compress`.
#[derive(Args, Debug)]
pub struct CompressArgs {
    /// File to compress.
    pub input: PathBuf,

    /// Output file (stdout if omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Codec to use.
    #[arg(short, long, default_value = "zlib")]
    pub format: CompressFormat,
}

/// Arguments for `decompress`.
#[derive(Args, Debug)]
pub struct DecompressArgs {
    /// File to decompress.
    pub input: PathBuf,

    /// Output file (stdout if omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Codec to use; `auto` looks at the header.
    #[arg(short, long, default_value = "auto")]
    pub format: DecompressFormat,
}

/// Arguments for `checksum`.
#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// File to checksum.
    pub input: PathBuf,

    /// Checksum algorithm.
    #[arg(short, long, default_value = "crc32")]
    pub algorithm: ChecksumAlgorithm,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Save File Commands
// ============================================================================

/// Arguments for `inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// File to inspect.
    pub file: PathBuf,

    /// File format.
    #[arg(short, long)]
    pub kind: FileKind,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `fix-checksums`.
#[derive(Args, Debug)]
pub struct FixChecksumsArgs {
    /// Save file to repair.
    pub file: PathBuf,

    /// Save format.
    #[arg(short, long)]
    pub kind: ChecksummedKind,

    /// Write the repaired save here instead of in place.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ============================================================================
// ZQuest Command
// ============================================================================

/// ZQuest container commands.
#[derive(Args, Debug)]
pub struct ZquestCommand {
    /// ZQuest subcommand.
    #[command(subcommand)]
    pub subcommand: ZquestSubcommand,
}

/// ZQuest subcommands.
#[derive(Subcommand, Debug)]
pub enum ZquestSubcommand {
    /// Wrap a payload in a ZQuest container.
    Pack(ZquestPackArgs),

    /// Extract the payload of a ZQuest container.
    Unpack(ZquestUnpackArgs),
}

/// Arguments for `zquest pack`.
#[derive(Args, Debug)]
pub struct ZquestPackArgs {
    /// Payload file.
    pub input: PathBuf,

    /// Container to write.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Game index, 0-18 (see `inspect --kind zquest`).
    #[arg(short, long, default_value_t = 0)]
    pub game: u32,

    /// Store the payload big-endian.
    #[arg(long)]
    pub big_endian: bool,

    /// Store the payload uncompressed.
    #[arg(long)]
    pub no_compress: bool,
}

/// Arguments for `zquest unpack`.
#[derive(Args, Debug)]
pub struct ZquestUnpackArgs {
    /// Container file.
    pub input: PathBuf,

    /// Payload output (stdout if omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ============================================================================
// Hierarchy Command
// ============================================================================

/// Arguments for `hierarchy`.
#[derive(Args, Debug)]
pub struct HierarchyArgs {
    /// Listing file, bare JSON or `var hierarchy = [...];`.
    pub file: PathBuf,

    /// Maximum nesting depth before a node is reported.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Print only the node with this exact label.
    #[arg(long)]
    pub find: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell.
    pub shell: clap_complete::Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Human,
    /// JSON.
    Json,
}

/// Codecs accepted by `compress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompressFormat {
    Zlib,
    Yaz0,
    /// LZ77 type 0x10.
    Lz10,
    /// LZ77 type 0x11.
    Lz11,
}

/// Codecs accepted by `decompress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecompressFormat {
    Auto,
    Zlib,
    Yaz0,
    /// LZ77, either type.
    Lz77,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChecksumAlgorithm {
    Crc32,
    Crc64,
    Crc16,
    #[value(name = "crc16-ccitt")]
    Crc16Ccitt,
}

/// Formats understood by `inspect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileKind {
    Alttp,
    SkywardSword,
    Zquest,
    Sprite,
    MinishCap,
}

/// Formats whose slot checksums `fix-checksums` can repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChecksummedKind {
    Alttp,
    SkywardSword,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["athena", "checksum", "f.bin", "-vv", "--quiet"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Checksum(ref a) if a.algorithm == ChecksumAlgorithm::Crc32));
    }

    #[test]
    fn parses_kebab_case_values() {
        let cli = Cli::try_parse_from([
            "athena",
            "checksum",
            "f.bin",
            "--algorithm",
            "crc16-ccitt",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Checksum(ref a) if a.algorithm == ChecksumAlgorithm::Crc16Ccitt));

        let cli = Cli::try_parse_from(["athena", "inspect", "s.sav", "--kind", "skyward-sword"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Inspect(ref a) if a.kind == FileKind::SkywardSword));

        let cli =
            Cli::try_parse_from(["athena", "fix-checksums", "z.srm", "-k", "alttp"]).unwrap();
        assert!(matches!(cli.command, Commands::FixChecksums(ref a) if a.kind == ChecksummedKind::Alttp));
    }

    #[test]
    fn inspect_requires_kind() {
        assert!(Cli::try_parse_from(["athena", "inspect", "s.sav"]).is_err());
    }

    #[test]
    fn zquest_pack_defaults() {
        let cli = Cli::try_parse_from(["athena", "zquest", "pack", "in.bin", "-o", "out.zqs"])
            .unwrap();
        let Commands::Zquest(ZquestCommand {
            subcommand: ZquestSubcommand::Pack(args),
        }) = cli.command
        else {
            panic!("expected zquest pack");
        };
        assert_eq!(args.game, 0);
        assert!(!args.big_endian);
        assert!(!args.no_compress);
    }
}
