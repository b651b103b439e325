//! Test corpus: roundtrip tests with various patterns, sizes, and bit depths.

use zenbmp::*;

fn checkerboard(w: usize, h: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * bpp];
    for y in 0..h {
        for x in 0..w {
            let off = (y * w + x) * bpp;
            if (x + y) % 2 == 0 {
                for c in 0..bpp {
                    pixels[off + c] = 200 + (c as u8 * 20);
                }
            } else {
                for c in 0..bpp {
                    pixels[off + c] = 10 + (c as u8 * 30);
                }
            }
        }
    }
    pixels
}

fn noise_pattern(w: usize, h: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * bpp];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in pixels.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8;
    }
    pixels
}

/// Noise thresholded to 0/255.
fn mono_pattern(w: usize, h: usize) -> Vec<u8> {
    noise_pattern(w, h, 1)
        .into_iter()
        .map(|v| if v & 1 == 0 { 0 } else { 255 })
        .collect()
}

fn buffer(pixels: Vec<u8>, w: usize, h: usize, channels: usize) -> PixelBuffer<'static> {
    PixelBuffer::from_vec(pixels, w, h, channels, 0).unwrap()
}

// ── 24 bpp roundtrips ───────────────────────────────────────────────

#[test]
fn flat_rgb24_roundtrip() {
    let pixels = checkerboard(8, 6, 3);
    let encoded = encode(&buffer(pixels.clone(), 8, 6, 3), BitDepth::Rgb24).unwrap();
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.layout(), Some(PixelLayout::Rgb8));
    assert_eq!(decoded.to_packed_vec(), pixels);
}

#[test]
fn noise_rgb24_roundtrip() {
    let pixels = noise_pattern(16, 12, 3);
    let encoded = encode(&buffer(pixels.clone(), 16, 12, 3), BitDepth::Rgb24).unwrap();
    assert_eq!(decode(&encoded).unwrap().to_packed_vec(), pixels);
}

#[test]
fn rgb24_every_padding_remainder() {
    // Covers every row padding remainder twice.
    for w in 1..=8 {
        let pixels = noise_pattern(w, 3, 3);
        let encoded = encode(&buffer(pixels.clone(), w, 3, 3), BitDepth::Rgb24).unwrap();
        let row_size = (w * 3).div_ceil(4) * 4;
        assert_eq!(encoded.len(), 54 + row_size * 3, "width {w}");
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.pitch(), row_size, "width {w}");
        assert_eq!(decoded.to_packed_vec(), pixels, "width {w}");
    }
}

#[test]
fn padded_source_rows_are_not_written() {
    // Source pitch 10 for a 3-pixel row; the two extra bytes must not leak.
    let mut data = vec![0xEE; 10 * 2];
    data[..9].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    data[10..19].copy_from_slice(&[9, 8, 7, 6, 5, 4, 3, 2, 1]);
    let source = PixelBuffer::from_vec(data, 3, 2, 3, 10).unwrap();
    let encoded = encode(&source, BitDepth::Rgb24).unwrap();
    assert_eq!(&encoded[54 + 9..54 + 12], &[0, 0, 0]);
    assert_eq!(decode(&encoded).unwrap().to_packed_vec(), source.to_packed_vec());
}

// ── 1 bpp roundtrips ────────────────────────────────────────────────

#[test]
fn mono_roundtrip_various_widths() {
    for w in [1, 7, 8, 9, 31, 32, 33, 65] {
        let pixels = mono_pattern(w, 5);
        let encoded = encode(&buffer(pixels.clone(), w, 5, 1), BitDepth::Mono).unwrap();
        let row_size = w.div_ceil(32) * 4;
        assert_eq!(encoded.len(), 62 + row_size * 5, "width {w}");
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.layout(), Some(PixelLayout::Gray8), "width {w}");
        assert_eq!(decoded.to_packed_vec(), pixels, "width {w}");
    }
}

#[test]
fn mono_encode_uses_top_bit_only() {
    // 128..=255 become white, 0..=127 black.
    let pixels: Vec<u8> = (0..=255u8).collect();
    let encoded = encode(&buffer(pixels.clone(), 256, 1, 1), BitDepth::Mono).unwrap();
    let decoded = decode(&encoded).unwrap();
    let expected: Vec<u8> = pixels.iter().map(|&p| if p >= 128 { 255 } else { 0 }).collect();
    assert_eq!(decoded.to_packed_vec(), expected);
}

// ── Edge cases ──────────────────────────────────────────────────────

#[test]
fn single_pixel_rgb24() {
    let pixels = vec![12, 34, 56];
    let encoded = encode(&buffer(pixels.clone(), 1, 1, 3), BitDepth::Rgb24).unwrap();
    assert_eq!(encoded.len(), 58);
    assert_eq!(decode(&encoded).unwrap().to_packed_vec(), pixels);
}

#[test]
fn single_pixel_mono() {
    let encoded = encode(&buffer(vec![255], 1, 1, 1), BitDepth::Mono).unwrap();
    assert_eq!(encoded.len(), 66);
    assert_eq!(encoded[62], 0b1000_0000);
    assert_eq!(decode(&encoded).unwrap().to_packed_vec(), [255]);
}

#[test]
fn wide_and_tall_images() {
    let wide = noise_pattern(1000, 1, 3);
    let encoded = encode(&buffer(wide.clone(), 1000, 1, 3), BitDepth::Rgb24).unwrap();
    assert_eq!(decode(&encoded).unwrap().to_packed_vec(), wide);

    let tall = noise_pattern(1, 1000, 3);
    let encoded = encode(&buffer(tall.clone(), 1, 1000, 3), BitDepth::Rgb24).unwrap();
    assert_eq!(decode(&encoded).unwrap().to_packed_vec(), tall);
}

#[test]
fn decode_into_reuses_allocation_for_same_extent() {
    let first = encode(&buffer(noise_pattern(4, 4, 3), 4, 4, 3), BitDepth::Rgb24).unwrap();
    let second_pixels = checkerboard(4, 4, 3);
    let second = encode(&buffer(second_pixels.clone(), 4, 4, 3), BitDepth::Rgb24).unwrap();

    let mut target = PixelBuffer::default();
    decode_into(&mut SliceReader::new(&first), &mut target, None).unwrap();
    let before = target.data().as_ptr();
    decode_into(&mut SliceReader::new(&second), &mut target, None).unwrap();
    assert_eq!(target.data().as_ptr(), before);
    assert_eq!(target.to_packed_vec(), second_pixels);
}

#[test]
fn decode_into_switches_layout() {
    let rgb = encode(&buffer(checkerboard(3, 3, 3), 3, 3, 3), BitDepth::Rgb24).unwrap();
    let mono = encode(&buffer(mono_pattern(3, 3), 3, 3, 1), BitDepth::Mono).unwrap();

    let mut target = PixelBuffer::default();
    decode_into(&mut SliceReader::new(&rgb), &mut target, None).unwrap();
    assert_eq!(target.channels(), 3);
    decode_into(&mut SliceReader::new(&mono), &mut target, None).unwrap();
    assert_eq!(target.channels(), 1);
    assert_eq!(target.to_packed_vec(), mono_pattern(3, 3));
}

// ── Limits ──────────────────────────────────────────────────────────

#[test]
fn limits_max_width() {
    let encoded = encode(&buffer(checkerboard(10, 2, 3), 10, 2, 3), BitDepth::Rgb24).unwrap();
    let limits = Limits {
        max_width: Some(9),
        ..Default::default()
    };
    assert!(matches!(
        decode_with_limits(&encoded, Some(&limits)),
        Err(BmpError::LimitExceeded(_))
    ));
}

#[test]
fn limits_max_height() {
    let encoded = encode(&buffer(checkerboard(2, 10, 3), 2, 10, 3), BitDepth::Rgb24).unwrap();
    let limits = Limits {
        max_height: Some(9),
        ..Default::default()
    };
    assert!(matches!(
        decode_with_limits(&encoded, Some(&limits)),
        Err(BmpError::LimitExceeded(_))
    ));
}

#[test]
fn limits_allow_exact_fit() {
    let encoded = encode(&buffer(checkerboard(4, 4, 3), 4, 4, 3), BitDepth::Rgb24).unwrap();
    let limits = Limits {
        max_width: Some(4),
        max_height: Some(4),
        max_pixels: Some(16),
        max_memory_bytes: Some(48),
    };
    assert!(decode_with_limits(&encoded, Some(&limits)).is_ok());
}

#[test]
fn huge_declared_dimensions_fail_without_allocating() {
    let mut encoded = encode(&buffer(vec![0; 3], 1, 1, 3), BitDepth::Rgb24).unwrap();
    encoded[18..22].copy_from_slice(&i32::MAX.to_le_bytes());
    encoded[22..26].copy_from_slice(&i32::MIN.to_le_bytes());
    let limits = Limits {
        max_memory_bytes: Some(1 << 30),
        ..Default::default()
    };
    assert!(decode_with_limits(&encoded, Some(&limits)).is_err());
}

#[test]
fn pixel_array_beyond_address_space_is_rejected_without_limits() {
    // 24 bpp, 2147483647 x 2147483647 top-down: pitch * height overflows isize.
    let mut encoded = encode(&buffer(vec![0; 3], 1, 1, 3), BitDepth::Rgb24).unwrap();
    assert_eq!(encoded.len(), 58);
    encoded[18..22].copy_from_slice(&i32::MAX.to_le_bytes());
    encoded[22..26].copy_from_slice(&(i32::MIN + 1).to_le_bytes());
    encoded.truncate(54);
    match decode(&encoded) {
        Err(BmpError::DimensionsTooLarge { .. }) => {}
        other => panic!("expected DimensionsTooLarge, got {:?}", other.map(|b| b.width())),
    }
}

// ── BMP conformance corpus tests (codec-corpus crate) ────────────────

#[cfg(not(target_arch = "wasm32"))]
mod bmp_corpus {
    use zenbmp::*;

    fn get_corpus(subdir: &str) -> Option<std::path::PathBuf> {
        let corpus = codec_corpus::Corpus::new().ok()?;
        corpus.get(&format!("bmp-conformance/{subdir}")).ok()
    }

    fn bmp_files(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
        let mut files: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "bmp"))
            .collect();
        files.sort();
        files
    }

    fn file_name(p: &std::path::Path) -> String {
        p.file_name().unwrap().to_string_lossy().into_owned()
    }

    /// Errors that name a feature this decoder does not implement.
    fn is_unsupported(e: &BmpError) -> bool {
        matches!(
            e,
            BmpError::UnsupportedBitDepth { .. }
                | BmpError::UnsupportedCompression { .. }
                | BmpError::UnsupportedDescriptorSize { .. }
        )
    }

    /// Valid files either decode or fail with an "unsupported" error.
    #[test]
    #[ignore]
    fn valid_decode_or_unsupported() {
        let Some(dir) = get_corpus("valid") else {
            eprintln!("Skipping: bmp-conformance corpus not available");
            return;
        };
        let files = bmp_files(&dir);
        assert!(!files.is_empty(), "no BMP files found in valid/");

        let mut failures = Vec::new();
        let mut decoded = 0u32;
        for path in &files {
            let data = std::fs::read(path).unwrap();
            match decode(&data) {
                Ok(_) => decoded += 1,
                Err(e) if is_unsupported(&e) => {}
                Err(e) => failures.push(format!("{}: {e}", file_name(path))),
            }
        }
        assert!(
            failures.is_empty(),
            "valid/ files that failed:\n  {}",
            failures.join("\n  ")
        );
        eprintln!("valid/: {decoded}/{} decoded", files.len());
    }

    /// Decoded RGB files survive a 24 bpp re-encode unchanged.
    #[test]
    #[ignore]
    fn valid_rgb_reencode_is_stable() {
        let Some(dir) = get_corpus("valid") else {
            eprintln!("Skipping: bmp-conformance corpus not available");
            return;
        };
        for path in bmp_files(&dir) {
            let data = std::fs::read(&path).unwrap();
            let Ok(first) = decode(&data) else { continue };
            if first.channels() != 3 {
                continue;
            }
            let reencoded = encode(&first, BitDepth::Rgb24).unwrap();
            let second = decode(&reencoded).unwrap();
            assert_eq!(
                first.to_packed_vec(),
                second.to_packed_vec(),
                "{}",
                file_name(&path)
            );
        }
    }

    /// Nothing in any corpus directory may panic.
    #[test]
    #[ignore]
    fn all_files_no_panic() {
        for subdir in ["valid", "non-conformant", "invalid"] {
            let Some(dir) = get_corpus(subdir) else {
                eprintln!("Skipping {subdir}: corpus not available");
                continue;
            };
            let limits = Limits {
                max_memory_bytes: Some(256 * 1024 * 1024),
                ..Default::default()
            };
            for path in bmp_files(&dir) {
                let data = std::fs::read(&path).unwrap();
                let _ = probe(&data);
                let _ = decode_with_limits(&data, Some(&limits));
            }
        }
    }
}
