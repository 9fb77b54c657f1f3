#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn main() {
    use std::fs;

    // 1x1 black GIF, the smallest well-formed decode input.
    let gif_1x1: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, // GIF89a
        0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, // 1x1, 2-color global table
        0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, // palette: black, white
        0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, // image descriptor
        0x02, 0x02, 0x44, 0x01, 0x00, // LZW data
        0x3B, // trailer
    ];

    // Two frames; the second carries a graphic control block (keep, 100 ms).
    let mut gif_2frame = gif_1x1[..gif_1x1.len() - 1].to_vec();
    gif_2frame.extend_from_slice(&[
        0x21, 0xF9, 0x04, 0x04, 0x0A, 0x00, 0x00, 0x00, //
        0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, //
        0x02, 0x02, 0x44, 0x01, 0x00, //
        0x3B,
    ]);

    // 1x1 24-bit BMP.
    let mut bmp = vec![0u8; 58]; // 54 header + 3 pixel bytes + 1 padding
    bmp[0] = b'B';
    bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&58u32.to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&1i32.to_le_bytes()); // width
    bmp[22..26].copy_from_slice(&1i32.to_le_bytes()); // height
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
    bmp[54] = 0xFF; // blue channel of the only pixel

    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();
    fs::write(format!("{dir}/gif_1x1.gif"), gif_1x1).unwrap();
    fs::write(format!("{dir}/bmp_1x1.bmp"), &bmp).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(
        format!("{dir}/png_truncated.bin"),
        b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR",
    )
    .unwrap();
    fs::write(format!("{dir}/jpeg_soi.bin"), b"\xff\xd8\xff\xe0\x00\x10JFIF\x00").unwrap();
    fs::write(format!("{dir}/webp_riff.bin"), b"RIFF\x24\x00\x00\x00WEBPVP8 ").unwrap();
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();

    let dir = "fuzz/corpus/fuzz_frames";
    fs::create_dir_all(dir).unwrap();
    fs::write(format!("{dir}/gif_1x1.gif"), gif_1x1).unwrap();
    fs::write(format!("{dir}/gif_2frame.gif"), &gif_2frame).unwrap();
    fs::write(
        format!("{dir}/gif_no_frames.bin"),
        b"GIF89a\x01\x00\x01\x00\x00\x00\x00\x3b",
    )
    .unwrap();

    println!("Generated seed corpora under fuzz/corpus/");
}
