#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap allocations so the fuzzer spends its time on parsing, not on
    // servicing huge headers.
    let limits = flatimg::Limits {
        max_width: Some(4096),
        max_height: Some(4096),
        max_pixels: Some(1 << 22),
        max_memory_bytes: Some(1 << 26),
        max_frames: Some(256),
    };

    // Auto-detect decode across every candidate format — must never panic
    let _ = flatimg::DecodeRequest::new(data).with_limits(&limits).decode();

    // Probe and explicit first-frame paths — must never panic
    let _ = flatimg::ImageInfo::from_bytes(data);
    let _ = flatimg::DecodeRequest::new(data)
        .with_limits(&limits)
        .order(flatimg::PixelOrder::Rgba)
        .decode_first_frame();
});
