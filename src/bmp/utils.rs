//! Row geometry and bit/channel shuffling shared by the decoder and encoder.
//!
//! Forked from zune-bmp 0.5.2 by Caleb Etemesi (MIT/Apache-2.0/Zlib).

use crate::error::BmpError;

/// Bytes in one on-disk row: `bit_depth * width` bits rounded up to a
/// multiple of 32 bits.
pub(crate) fn row_size(bit_depth: u16, width: usize) -> Result<usize, BmpError> {
    usize::from(bit_depth)
        .checked_mul(width)
        .and_then(|bits| bits.checked_add(31))
        .map(|bits| bits / 32 * 4)
        .ok_or(BmpError::DimensionsTooLarge {
            width: width as u32,
            height: 0,
        })
}

/// Expand MSB-first 1-bit samples to 0/255 luminance. Output length decides
/// how many pixels are produced; a trailing partial byte is truncated there.
pub(crate) fn expand_1bpp_luma(input: &[u8], out: &mut [u8]) {
    let mut in_iter = input.iter();
    let mut out_iter = out.chunks_exact_mut(8);

    (&mut out_iter)
        .zip(&mut in_iter)
        .for_each(|(out_vals, &in_val)| {
            for (bit, o) in out_vals.iter_mut().enumerate() {
                *o = 0xFF_u8.wrapping_mul((in_val >> (7 - bit)) & 0x01);
            }
        });

    if let Some(&in_val) = in_iter.next() {
        for (pos, o) in out_iter.into_remainder().iter_mut().enumerate() {
            *o = 0xFF_u8.wrapping_mul((in_val >> (7 - pos)) & 0x01);
        }
    }
}

/// Split packed sub-byte samples (1 or 4 bits, MSB-first) into one index per
/// byte. `out.len()` is the pixel count; surplus low bits are ignored.
pub(crate) fn expand_indices(depth: u16, input: &[u8], out: &mut [u8]) {
    let per_byte = 8 / usize::from(depth);
    let mask = (1u8 << depth) - 1;

    for (chunk, &in_val) in out.chunks_mut(per_byte).zip(input) {
        for (pos, o) in chunk.iter_mut().enumerate() {
            let shift = 8 - usize::from(depth) * (pos + 1);
            *o = (in_val >> shift) & mask;
        }
    }
}

/// Swap the first and third byte of every `channels`-sized pixel.
#[inline]
pub(crate) fn swap_red_blue(row: &mut [u8], channels: usize) {
    for px in row.chunks_exact_mut(channels) {
        px.swap(0, 2);
    }
}

/// Pack 0/255 luminance into MSB-first bits using each sample's top bit.
/// `out` must hold `ceil(input.len() / 8)` bytes.
pub(crate) fn pack_1bpp(input: &[u8], out: &mut [u8]) {
    for (byte, px) in out.iter_mut().zip(input.chunks(8)) {
        let mut value = 0u8;
        for (i, &p) in px.iter().enumerate() {
            value |= (p >> 7) << (7 - i);
        }
        *byte = value;
    }
}
