#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn info_bmp(width: i32, height: i32, bpp: u16, palette: &[u8], pixels: &[u8]) -> Vec<u8> {
    let offset = 54 + palette.len() as u32;
    let mut bmp = Vec::new();
    bmp.extend_from_slice(b"BM");
    bmp.extend_from_slice(&(offset + pixels.len() as u32).to_le_bytes()); // file size
    bmp.extend_from_slice(&[0; 4]);
    bmp.extend_from_slice(&offset.to_le_bytes()); // data offset
    bmp.extend_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp.extend_from_slice(&width.to_le_bytes());
    bmp.extend_from_slice(&height.to_le_bytes());
    bmp.extend_from_slice(&1u16.to_le_bytes()); // planes
    bmp.extend_from_slice(&bpp.to_le_bytes());
    bmp.extend_from_slice(&[0; 24]); // compression .. important colors
    bmp.extend_from_slice(palette);
    bmp.extend_from_slice(pixels);
    bmp
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    let bw = [0, 0, 0, 0, 0xff, 0xff, 0xff, 0];
    fs::write(format!("{dir}/mono_10x2.bmp"), info_bmp(10, -2, 1, &bw, &[0xa5, 0x40, 0, 0, 0x5a, 0x80, 0, 0])).unwrap();

    let pal16: Vec<u8> = (0..16u8).flat_map(|i| [i * 16, 255 - i * 16, i, 0]).collect();
    fs::write(format!("{dir}/pal4_3x1.bmp"), info_bmp(3, 1, 4, &pal16, &[0x1f, 0x80, 0, 0])).unwrap();

    let pal256: Vec<u8> = (0..=255u8).flat_map(|i| [i, i, i, 0]).collect();
    fs::write(format!("{dir}/pal8_2x2.bmp"), info_bmp(2, 2, 8, &pal256, &[0, 255, 0, 0, 128, 64, 0, 0])).unwrap();

    fs::write(format!("{dir}/rgb24_1x1.bmp"), info_bmp(1, 1, 24, &[], &[0xff, 0x00, 0x00, 0x00])).unwrap();
    fs::write(format!("{dir}/rgba32_2x1.bmp"), info_bmp(2, -1, 32, &[], &[1, 2, 3, 4, 5, 6, 7, 8])).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    fs::write(format!("{dir}/rgb16_1x1.bmp"), info_bmp(1, 1, 16, &[], &[0; 4])).unwrap();

    println!("Generated seed corpus in {dir}/");
}
