#![no_main]

use libfuzzer_sys::fuzz_target;
use zxpack::{Codec, CodecKind};

fuzz_target!(|data: &[u8]| {
    // Every codec must reproduce its input exactly, whatever the bytes.
    if data.len() > 4 * 1024 {
        return;
    }
    for kind in CodecKind::ALL {
        let codec = kind.codec();
        let packed = match codec.compress(data) {
            Ok(packed) => packed,
            Err(_) => continue,
        };
        let unpacked = codec.decompress(&packed).expect("own stream must decode");
        assert_eq!(unpacked, data, "{} round-trip mismatch", kind.name());
    }
});
