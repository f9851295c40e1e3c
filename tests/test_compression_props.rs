//! Property tests for the compression codecs.

use athena::compression::{Codec, decompress_auto, decompress_lz77, yaz0_decode, yaz0_encode};
use proptest::prelude::*;

const CODECS: [Codec; 4] = [Codec::Zlib, Codec::Yaz0, Codec::Lz10, Codec::Lz11];

/// Payloads that mix literal noise with runs, so every codec emits matches.
fn payload() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            prop::collection::vec(any::<u8>(), 1..16),
            (any::<u8>(), 3usize..300).prop_map(|(byte, len)| vec![byte; len]),
        ],
        1..24,
    )
    .prop_map(|chunks| chunks.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_codec_restores_its_input(data in payload()) {
        for codec in CODECS {
            let packed = codec.compress(&data).unwrap();
            prop_assert_eq!(codec.decompress(&packed).unwrap(), data.clone(), "codec {:?}", codec);
        }
    }

    #[test]
    fn detection_finds_the_codec_that_packed(data in payload()) {
        for codec in CODECS {
            let packed = codec.compress(&data).unwrap();
            let (found, plain) = decompress_auto(&packed).unwrap();
            prop_assert_eq!(found, codec);
            prop_assert_eq!(plain, data.clone());
        }
    }

    #[test]
    fn raw_yaz0_stream_restores_its_input(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let encoded = yaz0_encode(&data);
        prop_assert_eq!(yaz0_decode(&encoded, data.len()).unwrap(), data);
    }

    #[test]
    fn lz77_never_panics_on_noise(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decompress_lz77(&data);
    }

    #[test]
    fn runs_shrink(byte in any::<u8>(), len in 512usize..4096) {
        let data = vec![byte; len];
        for codec in CODECS {
            prop_assert!(codec.compress(&data).unwrap().len() < len / 4, "codec {:?}", codec);
        }
    }
}
