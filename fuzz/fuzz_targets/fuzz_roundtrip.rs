#![no_main]
use libfuzzer_sys::fuzz_target;
use zenbmp::*;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_memory_bytes: Some(64 * 1024 * 1024),
        ..Default::default()
    };

    // If we can decode it, re-encoding and decoding again must produce identical pixels
    let Ok(decoded) = decode_with_limits(data, Some(&limits)) else {
        return;
    };

    let bit_depth = match decoded.channels() {
        1 => BitDepth::Mono,
        3 => BitDepth::Rgb24,
        _ => return, // 32 bpp has no encoder
    };

    let reencoded = encode(&decoded, bit_depth).expect("decoded buffer must encode");
    let Ok(decoded2) = decode(&reencoded) else {
        panic!("re-encoded data failed to decode");
    };

    assert_eq!(decoded.to_packed_vec(), decoded2.to_packed_vec(), "roundtrip pixel mismatch");
    assert_eq!(decoded.width(), decoded2.width());
    assert_eq!(decoded.height(), decoded2.height());
});
