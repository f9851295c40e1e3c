//! `inspect` and `fix-checksums`.

use tracing::{info, warn};

use crate::cli::args::{ChecksummedKind, FileKind, FixChecksumsArgs, InspectArgs};
use crate::cli::commands::{print_report, read_input, write_output};
use crate::error::AthenaError;
use crate::formats::{MinishCapFile, SkywardSwordFile, SpriteFile, ZQuestFile, alttp};

/// Describes a save or container file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not of the given kind.
pub fn inspect(args: &InspectArgs) -> Result<(), AthenaError> {
    let data = read_input(&args.file)?;
    match args.kind {
        FileKind::Alttp => print_report(&alttp::summarize(&data)?, args.format),
        FileKind::SkywardSword => {
            print_report(&SkywardSwordFile::from_bytes(&data)?.summary(), args.format)
        }
        FileKind::Zquest => print_report(&ZQuestFile::from_bytes(&data)?.summary(), args.format),
        FileKind::Sprite => print_report(&SpriteFile::from_bytes(&data)?, args.format),
        FileKind::MinishCap => print_report(&MinishCapFile::from_bytes(data)?.summary(), args.format),
    }
}

/// Recomputes slot checksums and writes the repaired save.
///
/// # Errors
///
/// Returns an error if the save cannot be read, parsed, or written.
pub fn fix_checksums(args: &FixChecksumsArgs, quiet: bool) -> Result<(), AthenaError> {
    let mut data = read_input(&args.file)?;
    let fixed = match args.kind {
        ChecksummedKind::Alttp => alttp::fix_checksums(&mut data)?,
        ChecksummedKind::SkywardSword => {
            let mut file = SkywardSwordFile::from_bytes(&data)?;
            let fixed = file.fix_checksums();
            data = file.to_bytes()?;
            fixed
        }
    };

    let target = args.output.as_deref().unwrap_or(&args.file);
    if fixed == 0 && args.output.is_none() {
        info!(path = %target.display(), "all checksums valid, file left untouched");
    } else {
        if fixed > 0 {
            warn!(slots = fixed, "repaired slot checksums");
        }
        write_output(Some(target), &data)?;
    }

    if !quiet {
        println!("{fixed} checksum(s) fixed in {}", target.display());
    }
    Ok(())
}
