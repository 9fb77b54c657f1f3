#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = flatimg::Limits {
        max_width: Some(1024),
        max_height: Some(1024),
        max_pixels: Some(1 << 20),
        max_memory_bytes: Some(1 << 26),
        max_frames: Some(64),
    };

    // Two-pass GIF compositing over arbitrary bytes — must never panic
    let _ = flatimg::DecodeRequest::new(data)
        .with_limits(&limits)
        .decode_frames();
});
