//! # zenbmp
//!
//! Decoder and encoder for uncompressed BMP images.
//!
//! ## Supported Formats
//!
//! - Decode: 1, 4 and 8 bits per pixel (palette), 24-bit RGB, 32-bit RGBA
//! - Header variants: 12-byte core, 40-byte info, 64-byte OS/2, and any
//!   other declared size from 16 to 64 bytes
//! - Encode: 1-bit monochrome and 24-bit RGB, always top-down
//!
//! Decoded rows are top-first regardless of the on-disk orientation. A 1 bpp
//! image with a black/white palette decodes to one luminance channel (0/255);
//! every other indexed image decodes to RGB.
//!
//! ## Non-Goals
//!
//! - RLE, bitfield, JPEG and PNG compression
//! - 16 bpp
//! - Color management
//!
//! ## Usage
//!
//! ```
//! use zenbmp::{BitDepth, PixelBuffer, decode, encode};
//!
//! let mut pixels = PixelBuffer::new(3, 2, 3)?;
//! pixels.row_mut(1).copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
//!
//! let bytes = encode(&pixels, BitDepth::Rgb24)?;
//! let info = zenbmp::probe(&bytes)?;
//! assert_eq!((info.width, info.height, info.bit_depth), (3, 2, 24));
//!
//! let decoded = decode(&bytes)?;
//! assert_eq!(decoded.row(1), pixels.row(1));
//! # Ok::<(), zenbmp::BmpError>(())
//! ```
//!
//! Streams other than byte slices go through [`InputStream`] and
//! [`OutputStream`]; with the `std` feature, [`FileReader`] and
//! [`FileWriter`] read and write paths directly.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
mod error;
mod limits;
mod log;
mod pixel;
mod stream;

pub mod bmp;

pub use bmp::{BitDepth, BmpHeaders, BmpInfo, EncodeRequest};
pub use buffer::PixelBuffer;
pub use error::BmpError;
pub use limits::Limits;
#[cfg(feature = "rgb")]
pub use pixel::BufferPixel;
pub use pixel::PixelLayout;
#[cfg(feature = "std")]
pub use stream::{FileReader, FileWriter, IoReader, IoWriter};
pub use stream::{InputStream, OutputStream, ReadSession, SliceReader, VecWriter, WriteSession};

use alloc::vec::Vec;

/// Decode BMP bytes into a new owned buffer.
pub fn decode(data: &[u8]) -> Result<PixelBuffer<'static>, BmpError> {
    decode_with_limits(data, None)
}

/// Decode BMP bytes, refusing images that exceed `limits`.
pub fn decode_with_limits(
    data: &[u8],
    limits: Option<&Limits>,
) -> Result<PixelBuffer<'static>, BmpError> {
    let mut buffer = PixelBuffer::default();
    bmp::decode_into(&mut SliceReader::new(data), &mut buffer, limits)?;
    Ok(buffer)
}

/// Decode from any stream into an existing buffer, reusing its memory when
/// the extent matches.
pub fn decode_into<S: InputStream + ?Sized>(
    stream: &mut S,
    buffer: &mut PixelBuffer<'_>,
    limits: Option<&Limits>,
) -> Result<BmpHeaders, BmpError> {
    bmp::decode_into(stream, buffer, limits)
}

/// Parse headers and color table without decoding pixels.
pub fn probe(data: &[u8]) -> Result<BmpInfo, BmpError> {
    bmp::probe(&mut SliceReader::new(data))
}

/// Encode a buffer with default settings.
///
/// [`BitDepth::Mono`] needs a one-channel buffer, [`BitDepth::Rgb24`] a
/// three-channel one.
pub fn encode(buffer: &PixelBuffer<'_>, bit_depth: BitDepth) -> Result<Vec<u8>, BmpError> {
    EncodeRequest::new(bit_depth).encode(buffer)
}
