mod common;

use athena::formats::alttp;
use athena::formats::{SkywardSwordFile, ZQuestFile};
use common::{HIERARCHY, arg, run_athena, sample_alttp, sample_payload, sample_skyward_sword, write_file};

#[test]
fn version_human() {
    let output = run_athena(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("athena "), "unexpected output: {stdout}");
}

#[test]
fn version_json() {
    let output = run_athena(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("output should be valid JSON");
    assert_eq!(parsed["name"], "athena");
    assert!(parsed["zquest_version"].is_u64());
}

#[test]
fn completions_bash() {
    let output = run_athena(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("athena"));
}

#[test]
fn checksum_crc32_human_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "check.txt", b"123456789");

    let output = run_athena(&["checksum", arg(&path)]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("cbf43926  "));

    let output = run_athena(&["checksum", arg(&path), "-a", "crc16-ccitt", "-f", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["algorithm"], "crc16-ccitt");
    assert_eq!(parsed["value"], 0x29B1);
    assert_eq!(parsed["hex"], "29b1");
}

#[test]
fn missing_input_is_an_io_error() {
    let output = run_athena(&["checksum", "/nonexistent/athena_test_input.bin"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn compress_then_decompress_every_codec() {
    let dir = tempfile::tempdir().unwrap();
    let payload = sample_payload(4096);
    let input = write_file(dir.path(), "payload.bin", &payload);

    for codec in ["zlib", "yaz0", "lz10", "lz11"] {
        let packed = dir.path().join(format!("payload.{codec}"));
        let output = run_athena(&["compress", arg(&input), "-f", codec, "-o", arg(&packed)]);
        assert!(
            output.status.success(),
            "compress {codec} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert!(std::fs::metadata(&packed).unwrap().len() < payload.len() as u64);

        let output = run_athena(&["decompress", arg(&packed)]);
        assert!(
            output.status.success(),
            "decompress {codec} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert_eq!(output.stdout, payload, "round trip through {codec}");
    }
}

#[test]
fn decompress_garbage_is_a_compression_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "garbage.bin", &[0xAB; 64]);
    let output = run_athena(&["decompress", arg(&path), "--format", "zlib"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn inspect_alttp_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "zelda.srm", &sample_alttp());

    let output = run_athena(&["inspect", arg(&path), "--kind", "alttp", "--format", "json"]);
    assert!(
        output.status.success(),
        "inspect failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let slots = parsed["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 6);
    assert_eq!(slots[0]["player_name"], "LINK");
    assert_eq!(slots[0]["rupees"], 123);
    assert_eq!(slots[3]["backup"], true);
}

#[test]
fn inspect_human_is_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "zelda.srm", &sample_alttp());
    let output = run_athena(&["inspect", arg(&path), "-k", "alttp"]);
    assert!(output.status.success());
    let parsed: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert!(parsed.get("slots").is_some());
}

#[test]
fn inspect_wrong_kind_is_a_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "short.bin", &[0; 16]);
    let output = run_athena(&["inspect", arg(&path), "--kind", "skyward-sword"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn fix_checksums_alttp_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let mut data = sample_alttp();
    data[0x10] ^= 0xFF;
    let path = write_file(dir.path(), "zelda.srm", &data);

    let output = run_athena(&["fix-checksums", arg(&path), "--kind", "alttp"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("1 checksum(s) fixed"));

    let fixed = std::fs::read(&path).unwrap();
    assert!(alttp::verify_checksums(&fixed).unwrap().iter().all(|c| c.is_valid()));
    assert_eq!(fixed[0x10], data[0x10]);
}

#[test]
fn fix_checksums_skyward_sword_to_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut data = sample_skyward_sword();
    data[0x20 + 0x100] = 0x42;
    let input = write_file(dir.path(), "wiiking2.sav", &data);
    let repaired = dir.path().join("fixed.sav");

    let output = run_athena(&[
        "fix-checksums",
        arg(&input),
        "-k",
        "skyward-sword",
        "-o",
        arg(&repaired),
        "--quiet",
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    assert_eq!(std::fs::read(&input).unwrap(), data);
    let file = SkywardSwordFile::from_bytes(&std::fs::read(&repaired).unwrap()).unwrap();
    assert!(file.verify_checksums().iter().all(|c| c.is_valid()));
}

#[test]
fn zquest_pack_and_unpack() {
    let dir = tempfile::tempdir().unwrap();
    let payload = sample_payload(2000);
    let input = write_file(dir.path(), "quest.bin", &payload);
    let container = dir.path().join("quest.zqs");
    let unpacked = dir.path().join("quest.out");

    let output = run_athena(&["zquest", "pack", arg(&input), "-o", arg(&container), "-g", "3"]);
    assert!(output.status.success());

    let file = ZQuestFile::from_bytes(&std::fs::read(&container).unwrap()).unwrap();
    assert_eq!(file.game.name(), "A Link to the Past");
    assert_eq!(file.data, payload);

    let output = run_athena(&["zquest", "unpack", arg(&container), "-o", arg(&unpacked)]);
    assert!(output.status.success());
    assert_eq!(std::fs::read(&unpacked).unwrap(), payload);
}

#[test]
fn zquest_unknown_game_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(dir.path(), "quest.bin", b"data");
    let container = dir.path().join("quest.zqs");
    let output = run_athena(&["zquest", "pack", arg(&input), "-o", arg(&container), "-g", "99"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn hierarchy_prints_outline() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "hierarchy.js", HIERARCHY.as_bytes());

    let output = run_athena(&["hierarchy", arg(&path)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\n  athena::io::DNAYaml< DNAE > (structathena_1_1io_1_1_d_n_a_yaml.html)\n"));
}

#[test]
fn hierarchy_find_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "hierarchy.js", HIERARCHY.as_bytes());

    let output = run_athena(&[
        "hierarchy",
        arg(&path),
        "--find",
        "athena::io::DNA< DNAE >",
        "--format",
        "json",
    ]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["nodes"], 2);
    assert_eq!(parsed["issues"].as_array().unwrap().len(), 0);

    let output = run_athena(&["hierarchy", arg(&path), "--find", "missing"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn hierarchy_accepts_null_href() {
    let dir = tempfile::tempdir().unwrap();
    let listing = br#"var hierarchy =
[
    [ "string", null, [
      [ "athena::io::String< sizeVar, VE >", "structathena_1_1io_1_1_string.html", null ]
    ] ],
    [ "alignas", "unionalignas.html", null ]
];
"#;
    let path = write_file(dir.path(), "hierarchy.js", listing);

    let output = run_athena(&["hierarchy", arg(&path)]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("string\n  athena::io::String< sizeVar, VE > (structathena_1_1io_1_1_string.html)\n"));

    let output = run_athena(&["hierarchy", arg(&path), "--find", "string", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed["tree"][0]["href"].is_null());
    assert_eq!(parsed["nodes"], 2);
}

#[test]
fn hierarchy_issues_fail() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "bad.js", br#"[["", "a.html", null]]"#);
    let output = run_athena(&["hierarchy", arg(&path)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty label"));

    let path = write_file(dir.path(), "malformed.js", br#"[["a", "a.html", 7]]"#);
    let output = run_athena(&["hierarchy", arg(&path)]);
    assert_eq!(output.status.code(), Some(2));
}
