#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap allocations so huge declared dimensions fail fast instead of OOMing.
    let limits = zenbmp::Limits {
        max_memory_bytes: Some(64 * 1024 * 1024),
        ..Default::default()
    };

    // Must never panic
    let _ = zenbmp::probe(data);
    let _ = zenbmp::decode_with_limits(data, Some(&limits));
});
