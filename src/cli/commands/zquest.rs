//! `zquest pack` and `zquest unpack`.

use tracing::info;

use crate::cli::args::{ZquestPackArgs, ZquestUnpackArgs};
use crate::cli::commands::{read_input, write_output};
use crate::error::AthenaError;
use crate::formats::ZQuestFile;
use crate::formats::zquest::Game;
use crate::io::Endian;

/// Wraps a payload in a ZQuest container.
///
/// # Errors
///
/// Returns [`AthenaError::Usage`] for an unknown game index, or an I/O or
/// format error.
pub fn pack(args: &ZquestPackArgs) -> Result<(), AthenaError> {
    let game = Game::from_index(args.game).ok_or_else(|| {
        AthenaError::Usage(format!(
            "unknown game index {}, expected 0-{}",
            args.game,
            Game::ALL.len() - 1
        ))
    })?;
    let endian = if args.big_endian { Endian::Big } else { Endian::Little };
    let payload = read_input(&args.input)?;
    let file = ZQuestFile::new(game, endian, payload);
    let bytes = file.to_bytes(!args.no_compress)?;
    info!(game = game.name(), payload = file.length(), container = bytes.len(), "packed ZQuest");
    write_output(Some(&args.output), &bytes)
}

/// Extracts the payload of a ZQuest container.
///
/// # Errors
///
/// Returns an error if the container is malformed or the output cannot be
/// written.
pub fn unpack(args: &ZquestUnpackArgs) -> Result<(), AthenaError> {
    let data = read_input(&args.input)?;
    let file = ZQuestFile::from_bytes(&data)?;
    info!(game = file.game.name(), payload = file.length(), "unpacked ZQuest");
    write_output(args.output.as_deref(), &file.data)
}
