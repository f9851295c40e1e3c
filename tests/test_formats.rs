mod common;

use athena::error::FormatError;
use athena::formats::minish_cap::{self, MinishCapFile, SlotMarker};
use athena::formats::sprite::{Sprite, SpriteFile, SpriteFrame, SpritePart, Texture};
use athena::formats::zquest::{Game, ZQuestFile};
use athena::formats::{AlttpFile, SkywardSwordFile};
use athena::io::{Endian, FileReader, FileWriter, Reader, Stream, TransactionalFileWriter};
use common::{sample_alttp, sample_payload, sample_skyward_sword, write_file};

#[test]
fn alttp_through_file_streams() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zelda.srm");

    let original = AlttpFile::from_bytes(&sample_alttp()).unwrap();
    let mut writer = FileWriter::create(&path, true).unwrap();
    original.write(&mut writer).unwrap();
    drop(writer);

    let mut reader = FileReader::open(&path).unwrap();
    let loaded = AlttpFile::read(&mut reader).unwrap();
    assert_eq!(loaded.quest(0).unwrap().player_name_string(), "LINK");
    assert_eq!(loaded.quest(0).unwrap().rupee_current, 123);
    assert_eq!(loaded.backups[0].rupee_current, 123);
    assert_eq!(std::fs::read(&path).unwrap(), sample_alttp());
}

#[test]
fn skyward_sword_name_survives_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "wiiking2.sav", &sample_skyward_sword());

    let mut file = SkywardSwordFile::from_bytes(&std::fs::read(&path).unwrap()).unwrap();
    file.quest_mut(1).unwrap().set_player_name("Link");
    file.quest_mut(1).unwrap().set_rupee_count(500);
    let mut writer = TransactionalFileWriter::new(&path);
    file.write(&mut writer).unwrap();
    writer.commit().unwrap();

    let reloaded = SkywardSwordFile::from_bytes(&std::fs::read(&path).unwrap()).unwrap();
    let quest = reloaded.quest(1).unwrap();
    assert_eq!(quest.player_name(), "Link");
    assert_eq!(quest.rupee_count(), 500);
    assert!(reloaded.verify_checksums().iter().all(|c| c.is_valid()));
}

#[test]
fn zquest_big_endian_container_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let payload = sample_payload(1500);
    let file = ZQuestFile::new(Game::SkywardSword, Endian::Big, payload.clone());
    let path = write_file(dir.path(), "quest.zqs", &file.to_bytes(true).unwrap());

    let mut reader = FileReader::open(&path).unwrap();
    let loaded = ZQuestFile::read(&mut reader).unwrap();
    assert_eq!(loaded.game, Game::SkywardSword);
    assert_eq!(loaded.endian, Endian::Big);
    assert_eq!(loaded.data, payload);
}

#[test]
fn zquest_corrupted_payload_is_rejected() {
    let file = ZQuestFile::new(Game::MinishCap, Endian::Little, sample_payload(256));
    let mut bytes = file.to_bytes(false).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    assert!(matches!(
        ZQuestFile::from_bytes(&bytes),
        Err(FormatError::ChecksumMismatch { .. })
    ));
}

#[test]
fn sprite_container_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("link.sprs");

    let mut file = SpriteFile::new(256, 128, 16.0, 32.0);
    assert!(file.add_texture(Texture {
        path: "link.png".to_string(),
        preload: true,
    }));
    let mut sprite = Sprite::new("Walk");
    sprite.add_state_id(0);
    let mut frame = SpriteFrame::new(0.25);
    let mut part = SpritePart::new("body");
    part.size = [16, 24];
    part.offset = [-8.0, -24.0];
    frame.parts.push(part);
    assert!(sprite.add_frame(frame));
    file.add_sprite(sprite).unwrap();

    let mut writer = FileWriter::create(&path, true).unwrap();
    file.write(&mut writer).unwrap();
    drop(writer);

    let mut reader = FileReader::open(&path).unwrap();
    assert_eq!(reader.length(), std::fs::metadata(&path).unwrap().len());
    let loaded = SpriteFile::read(&mut reader).unwrap();
    assert_eq!(loaded.size, [256, 128]);
    let walk = loaded.sprite("walk").unwrap();
    assert_eq!(walk.frames()[0].parts[0].size, [16, 24]);
    assert_eq!(loaded, file);
}

#[test]
fn minish_cap_scrambled_dump() {
    let mut plain = vec![0u8; minish_cap::MIN_SIZE];
    plain[..minish_cap::VERSION_EU_JP.len()].copy_from_slice(minish_cap::VERSION_EU_JP);
    plain[0x30..0x34].copy_from_slice(&SlotMarker::Valid.as_u32().to_le_bytes());
    let mut scrambled = plain.clone();
    minish_cap::unscramble(&mut scrambled);

    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "minish.sav", &scrambled);
    let file = MinishCapFile::from_bytes(std::fs::read(&path).unwrap()).unwrap();
    assert!(file.was_scrambled());
    assert_eq!(file.version(), Some(minish_cap::Version::EuJp));
    assert_eq!(file.slot(0).unwrap().marker(), Some(SlotMarker::Valid));
    assert_eq!(file.to_bytes(true), scrambled);
}

#[test]
fn file_reader_reads_strings_in_fixed_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "strings.bin", b"abc\0\0\0\0\0tail\0");
    let mut reader = FileReader::open(&path).unwrap();
    assert_eq!(reader.read_string(Some(8)).unwrap(), "abc");
    assert_eq!(reader.position(), 8);
    assert_eq!(reader.read_string(None).unwrap(), "tail");
    assert!(reader.at_end());
}
