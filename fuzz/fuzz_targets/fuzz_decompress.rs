#![no_main]

use libfuzzer_sys::fuzz_target;
use zxpack::{Codec, CodecKind};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes into every decoder: a typed error is fine, a panic
    // is not.
    if data.len() > 64 * 1024 {
        return;
    }
    for kind in CodecKind::ALL {
        let codec = kind.codec();
        let _ = codec.decompress(data);
    }
});
