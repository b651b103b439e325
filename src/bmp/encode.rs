//! BMP encoder: uncompressed 1-bit monochrome and 24-bit RGB.
//!
//! Output is always top-down (negative height): buffer row 0 is written
//! first. Callers pre-orient their pixels accordingly.

use alloc::vec;
use alloc::vec::Vec;

use crate::buffer::PixelBuffer;
use crate::error::BmpError;
use crate::log::debug;
use crate::stream::{OutputStream, VecWriter, WriteSession};

use super::header::{FILE_HEADER_SIZE, FileHeader, InfoHeader};
use super::utils::{pack_1bpp, row_size, swap_red_blue};

/// Two color table entries (black, white) written ahead of 1 bpp pixel data.
const MONO_MASKS: [u8; 8] = [0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];

/// 72 DPI in pixels per meter.
pub const DEFAULT_PIXELS_PER_METER: i32 = 2835;

/// Bit depths the encoder can write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitDepth {
    /// 1 bit per pixel from a single-channel 0/255 buffer.
    Mono,
    /// 24 bits per pixel from a three-channel RGB buffer.
    Rgb24,
}

impl BitDepth {
    /// Map a bit depth to an encodable one.
    pub fn from_bits(bit_depth: u16) -> Result<Self, BmpError> {
        match bit_depth {
            1 => Ok(Self::Mono),
            24 => Ok(Self::Rgb24),
            _ => Err(BmpError::UnsupportedBitDepth { bit_depth }),
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Rgb24 => 24,
        }
    }

    /// Channels the source buffer must have.
    pub fn channels(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Rgb24 => 3,
        }
    }
}

/// Encoder settings.
///
/// ```
/// use zenbmp::{EncodeRequest, PixelBuffer, decode};
///
/// let mut pixels = PixelBuffer::new(2, 1, 3)?;
/// pixels.row_mut(0).copy_from_slice(&[255, 0, 0, 0, 0, 255]);
/// let bytes = EncodeRequest::rgb24().encode(&pixels)?;
/// assert_eq!(decode(&bytes)?.row(0), pixels.row(0));
/// # Ok::<(), zenbmp::BmpError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeRequest {
    bit_depth: BitDepth,
    x_pixels_per_meter: i32,
    y_pixels_per_meter: i32,
}

impl EncodeRequest {
    pub fn new(bit_depth: BitDepth) -> Self {
        Self {
            bit_depth,
            x_pixels_per_meter: DEFAULT_PIXELS_PER_METER,
            y_pixels_per_meter: DEFAULT_PIXELS_PER_METER,
        }
    }

    /// 1 bpp black/white.
    pub fn mono() -> Self {
        Self::new(BitDepth::Mono)
    }

    /// 24 bpp RGB.
    pub fn rgb24() -> Self {
        Self::new(BitDepth::Rgb24)
    }

    /// Resolution stored in the header, in pixels per meter.
    pub fn with_resolution(mut self, x_pixels_per_meter: i32, y_pixels_per_meter: i32) -> Self {
        self.x_pixels_per_meter = x_pixels_per_meter;
        self.y_pixels_per_meter = y_pixels_per_meter;
        self
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Encode into a new `Vec`.
    pub fn encode(&self, buffer: &PixelBuffer<'_>) -> Result<Vec<u8>, BmpError> {
        let mut out = VecWriter::new();
        self.encode_to(&mut out, buffer)?;
        Ok(out.into_inner())
    }

    /// Encode into `stream`, opening it first and closing it on return.
    pub fn encode_to<S: OutputStream + ?Sized>(
        &self,
        stream: &mut S,
        buffer: &PixelBuffer<'_>,
    ) -> Result<(), BmpError> {
        let layout = Layout::compute(self.bit_depth, buffer)?;
        let mut session = WriteSession::open(stream)?;

        session.write(&layout.file_header().to_bytes())?;
        session.write(&self.info_header(&layout).to_bytes())?;

        match self.bit_depth {
            BitDepth::Mono => {
                session.write(&MONO_MASKS)?;
                write_mono_rows(&mut session, buffer, &layout)?;
            }
            BitDepth::Rgb24 => write_rgb24_rows(&mut session, buffer, &layout)?,
        }
        session.flush()
    }

    fn info_header(&self, layout: &Layout) -> InfoHeader {
        InfoHeader {
            width: layout.width,
            height: -layout.height,
            planes: 1,
            bit_depth: self.bit_depth.bits(),
            compression: 0,
            image_size: layout.image_size,
            x_pixels_per_meter: self.x_pixels_per_meter,
            y_pixels_per_meter: self.y_pixels_per_meter,
            palette_colors: match self.bit_depth {
                BitDepth::Mono => 2,
                BitDepth::Rgb24 => 0,
            },
            important_colors: 0,
        }
    }
}

/// Header fields derived from the buffer geometry.
struct Layout {
    width: i32,
    height: i32,
    row_size: usize,
    pixel_data_offset: u32,
    image_size: u32,
    file_size: u32,
}

impl Layout {
    fn compute(depth: BitDepth, buffer: &PixelBuffer<'_>) -> Result<Self, BmpError> {
        if buffer.channels() != depth.channels() {
            return Err(BmpError::ChannelMismatch {
                expected: depth.channels(),
                actual: buffer.channels(),
            });
        }

        let too_large = || BmpError::DimensionsTooLarge {
            width: buffer.width() as u32,
            height: buffer.height() as u32,
        };
        let width = i32::try_from(buffer.width()).map_err(|_| too_large())?;
        let height = i32::try_from(buffer.height()).map_err(|_| too_large())?;
        if width == 0 || height == 0 {
            return Err(BmpError::InvalidDimensions { width, height });
        }

        let row_size = row_size(depth.bits(), buffer.width())?;
        let masks = match depth {
            BitDepth::Mono => MONO_MASKS.len() as u32,
            BitDepth::Rgb24 => 0,
        };
        let pixel_data_offset = FILE_HEADER_SIZE + InfoHeader::SIZE + masks;
        let image_size = row_size
            .checked_mul(buffer.height())
            .and_then(|s| u32::try_from(s).ok())
            .ok_or_else(too_large)?;
        let file_size = pixel_data_offset
            .checked_add(image_size)
            .filter(|&s| s <= i32::MAX as u32)
            .ok_or_else(too_large)?;

        debug!(
            "encode {}x{} @ {} bpp: pixel data at {pixel_data_offset}, file size {file_size}",
            width,
            height,
            depth.bits()
        );

        Ok(Self {
            width,
            height,
            row_size,
            pixel_data_offset,
            image_size,
            file_size,
        })
    }

    fn file_header(&self) -> FileHeader {
        FileHeader {
            magic: FileHeader::MAGIC,
            file_size: self.file_size as i32,
            reserved1: 0,
            reserved2: 0,
            pixel_data_offset: self.pixel_data_offset as i32,
        }
    }
}

fn write_mono_rows<S: OutputStream + ?Sized>(
    session: &mut WriteSession<'_, S>,
    buffer: &PixelBuffer<'_>,
    layout: &Layout,
) -> Result<(), BmpError> {
    let mut line = vec![0u8; layout.row_size];
    for row in buffer.rows() {
        pack_1bpp(row, &mut line);
        session.write(&line)?;
    }
    Ok(())
}

fn write_rgb24_rows<S: OutputStream + ?Sized>(
    session: &mut WriteSession<'_, S>,
    buffer: &PixelBuffer<'_>,
    layout: &Layout,
) -> Result<(), BmpError> {
    let mut line = vec![0u8; layout.row_size];
    for row in buffer.rows() {
        let (pixels, _padding) = line.split_at_mut(row.len());
        pixels.copy_from_slice(row);
        swap_red_blue(pixels, 3);
        session.write(&line)?;
    }
    Ok(())
}
