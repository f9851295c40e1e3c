//! Shared integration-test helpers for running the `athena` binary and
//! building sample files.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use athena::formats::AlttpFile;
use athena::formats::skyward_sword::{
    QUEST_SIZE, Region, SKIP_SIZE, SkywardSwordFile, SkywardSwordQuest,
};

/// Runs `athena` with `args`, logging disabled.
#[allow(clippy::missing_panics_doc)]
pub fn run_athena(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_athena"))
        .args(args)
        .env_remove("ATHENA_LOG_LEVEL")
        .env_remove("ATHENA_COLOR")
        .env_remove("ATHENA_LOG_FORMAT")
        .output()
        .expect("failed to spawn athena")
}

/// Path as a `&str`, for building argument lists.
#[allow(clippy::missing_panics_doc)]
pub fn arg(path: &Path) -> &str {
    path.to_str().expect("non-UTF-8 temp path")
}

/// Writes `data` to `name` inside `dir` and returns the full path.
#[allow(clippy::missing_panics_doc)]
pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("failed to write fixture");
    path
}

/// Compressible payload with some variety.
pub fn sample_payload(len: usize) -> Vec<u8> {
    b"The Legend of Zelda: A Link to the Past. "
        .iter()
        .copied()
        .cycle()
        .enumerate()
        .map(|(i, b)| if i % 97 == 0 { b.wrapping_add(1) } else { b })
        .take(len)
        .collect()
}

/// A fresh ALTTP SRAM image with valid checksums and a named first slot.
#[allow(clippy::missing_panics_doc)]
pub fn sample_alttp() -> Vec<u8> {
    let mut file = AlttpFile::default();
    let quest = file.quest_mut(0).expect("slot 0");
    quest.set_player_name("LINK");
    quest.rupee_current = 123;
    quest.health = 24;
    quest.health_max = 24;
    file.to_bytes().expect("ALTTP write")
}

/// A Skyward Sword save with three blank quests.
#[allow(clippy::missing_panics_doc)]
pub fn sample_skyward_sword() -> Vec<u8> {
    let mut file = SkywardSwordFile::new(Region::Ntsc);
    for _ in 0..3 {
        let quest = SkywardSwordQuest::from_parts(vec![0; QUEST_SIZE], &[0; SKIP_SIZE])
            .expect("quest parts");
        assert!(file.add_quest(quest));
    }
    file.to_bytes().expect("Skyward Sword write")
}

/// The hierarchy listing shape emitted by the documentation generator.
pub const HIERARCHY: &str = r#"var hierarchy =
[
    [ "alignas", "unionalignas.html", null ],
    [ "athena::io::DNA< DNAE >", "structathena_1_1io_1_1_d_n_a.html", [
      [ "athena::io::DNAYaml< DNAE >", "structathena_1_1io_1_1_d_n_a_yaml.html", null ]
    ] ],
    [ "athena::Sakura::Sprite", "classathena_1_1_sakura_1_1_sprite.html", null ]
];
"#;
