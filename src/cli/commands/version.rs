//! `version`: crate version plus the container versions it writes.

use serde_json::json;

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::formats::{sprite, zquest};

fn dotted(version: u32) -> String {
    let [major, minor, revision, _] = version.to_le_bytes();
    format!("{major}.{minor}.{revision}")
}

pub fn run(args: &VersionArgs) {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => {
            println!("{name} {version}");
            println!("  zquest container {}", dotted(zquest::VERSION));
            println!("  sprite container {}", dotted(sprite::VERSION));
        }
        OutputFormat::Json => {
            let info = json!({
                "name": name,
                "version": version,
                "zquest_version": zquest::VERSION,
                "sprite_version": sprite::VERSION,
            });
            println!("{info}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_reads_low_bytes_first() {
        assert_eq!(dotted(zquest::VERSION), "2.0.0");
        assert_eq!(dotted(sprite::VERSION), "1.0.2");
    }
}
