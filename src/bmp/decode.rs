//! BMP decoder: uncompressed 1, 4, 8, 24 and 32 bits per pixel.
//!
//! Buffer row 0 is always the top of the image. Bottom-up files (positive
//! height) write their first on-disk row to the last buffer row.

use alloc::vec;

use crate::buffer::{PixelBuffer, extent};
use crate::error::BmpError;
use crate::limits::Limits;
use crate::log::{debug, trace};
use crate::pixel::PixelLayout;
use crate::stream::{InputStream, ReadSession};

use super::header::{FILE_HEADER_SIZE, FileHeader, ImageDescriptor};
use super::palette::PaletteTable;
use super::utils::{expand_1bpp_luma, expand_indices, row_size, swap_red_blue};

/// `BI_RGB`: no compression.
const COMPRESSION_NONE: u32 = 0;

/// Headers of a decoded file, returned alongside the pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BmpHeaders {
    pub file: FileHeader,
    pub descriptor: ImageDescriptor,
}

/// Header-level facts about a BMP file, available without decoding pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BmpInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u16,
    /// Rows are stored top-down on disk (negative declared height).
    pub top_down: bool,
    /// Layout [`decode`](crate::decode) will produce.
    pub layout: PixelLayout,
    pub headers: BmpHeaders,
}

/// Validated pixel array geometry.
#[derive(Clone, Copy, Debug)]
struct Geometry {
    width: usize,
    height: usize,
    bit_depth: u16,
    /// Rows are stored bottom-up on disk.
    flipped: bool,
    row_size: usize,
    pixel_data_offset: u64,
}

impl Geometry {
    fn resolve(file: &FileHeader, descriptor: &ImageDescriptor) -> Result<Self, BmpError> {
        let bit_depth = descriptor.bit_depth();
        if !matches!(bit_depth, 1 | 4 | 8 | 24 | 32) {
            return Err(BmpError::UnsupportedBitDepth { bit_depth });
        }

        let compression = descriptor.compression();
        if compression != COMPRESSION_NONE {
            return Err(BmpError::UnsupportedCompression { compression });
        }

        let (w, h) = (descriptor.width(), descriptor.height());
        if w <= 0 || h == 0 {
            return Err(BmpError::InvalidDimensions {
                width: w,
                height: h,
            });
        }

        let header_end = u64::from(FILE_HEADER_SIZE) + u64::from(descriptor.size());
        if file.pixel_data_offset < 0 || (file.pixel_data_offset as u64) < header_end {
            return Err(BmpError::InvalidPixelOffset {
                offset: file.pixel_data_offset,
                header_end,
            });
        }

        let width = w as usize;
        Ok(Self {
            width,
            height: h.unsigned_abs() as usize,
            bit_depth,
            flipped: h > 0,
            row_size: row_size(bit_depth, width)?,
            pixel_data_offset: file.pixel_data_offset as u64,
        })
    }

    /// Buffer row that on-disk row `disk_row` lands in.
    #[inline]
    fn target_row(&self, disk_row: usize) -> usize {
        if self.flipped {
            self.height - 1 - disk_row
        } else {
            disk_row
        }
    }

    /// Size the buffer will need, checked against `limits` before anything
    /// is allocated.
    fn check_limits(
        &self,
        limits: Option<&Limits>,
        channels: usize,
        pitch: usize,
    ) -> Result<(), BmpError> {
        let row_bytes = self
            .width
            .checked_mul(channels)
            .ok_or(BmpError::DimensionsTooLarge {
                width: self.width as u32,
                height: self.height as u32,
            })?
            .max(pitch);
        let bytes = extent(row_bytes, self.width, self.height)?;
        if let Some(limits) = limits {
            limits.check_pixel_array(self.width, self.height, bytes)?;
        }
        Ok(())
    }
}

/// Headers plus everything decoded before the pixel array.
struct Prelude {
    headers: BmpHeaders,
    geometry: Geometry,
    palette: PaletteTable,
}

fn read_prelude<S: InputStream + ?Sized>(
    session: &mut ReadSession<'_, S>,
) -> Result<Prelude, BmpError> {
    let file = FileHeader::read(session)?;
    let descriptor = ImageDescriptor::read(session)?;
    debug!(
        "BMP {:?} descriptor: {}x{} @ {} bpp, pixel data at {}",
        descriptor.kind(),
        descriptor.width(),
        descriptor.height(),
        descriptor.bit_depth(),
        file.pixel_data_offset
    );

    let geometry = Geometry::resolve(&file, &descriptor)?;
    let palette = if geometry.bit_depth <= 8 {
        PaletteTable::read(session, &descriptor)?
    } else {
        PaletteTable::default()
    };

    Ok(Prelude {
        headers: BmpHeaders { file, descriptor },
        geometry,
        palette,
    })
}

fn output_layout(bit_depth: u16, palette: &PaletteTable) -> PixelLayout {
    match bit_depth {
        1 if palette.is_black_white() => PixelLayout::Gray8,
        32 => PixelLayout::Rgba8,
        _ => PixelLayout::Rgb8,
    }
}

/// Read the headers (and color table) without touching the pixel array.
pub fn probe<S: InputStream + ?Sized>(stream: &mut S) -> Result<BmpInfo, BmpError> {
    let mut session = ReadSession::open(stream)?;
    let prelude = read_prelude(&mut session)?;
    let geometry = prelude.geometry;
    Ok(BmpInfo {
        width: geometry.width as u32,
        height: geometry.height as u32,
        bit_depth: geometry.bit_depth,
        top_down: !geometry.flipped,
        layout: output_layout(geometry.bit_depth, &prelude.palette),
        headers: prelude.headers,
    })
}

/// Decode a whole BMP stream into `buffer`, resizing it as needed.
///
/// On error the buffer may already have been resized; its contents are
/// unspecified.
pub fn decode_into<S: InputStream + ?Sized>(
    stream: &mut S,
    buffer: &mut PixelBuffer<'_>,
    limits: Option<&Limits>,
) -> Result<BmpHeaders, BmpError> {
    let mut session = ReadSession::open(stream)?;
    let Prelude {
        headers,
        geometry,
        palette,
    } = read_prelude(&mut session)?;

    let layout = output_layout(geometry.bit_depth, &palette);
    let pitch = match geometry.bit_depth {
        24 | 32 => geometry.row_size,
        _ => 0,
    };
    geometry.check_limits(limits, layout.channels(), pitch)?;

    session.seek(geometry.pixel_data_offset)?;

    match geometry.bit_depth {
        1 => read_1bpp(&mut session, buffer, &geometry, &palette)?,
        4 => read_4bpp(&mut session, buffer, &geometry, &palette)?,
        8 => read_8bpp(&mut session, buffer, &geometry, &palette)?,
        24 | 32 => read_direct(&mut session, buffer, &geometry)?,
        bit_depth => return Err(BmpError::UnsupportedBitDepth { bit_depth }),
    }
    Ok(headers)
}

/// Expand palette indices to RGB triples.
#[inline]
fn expand_palette(indices: &[u8], out: &mut [u8], palette: &PaletteTable) {
    for (&idx, px) in indices.iter().zip(out.chunks_exact_mut(3)) {
        px.copy_from_slice(&palette.rgb(idx));
    }
}

fn read_1bpp<S: InputStream + ?Sized>(
    session: &mut ReadSession<'_, S>,
    buffer: &mut PixelBuffer<'_>,
    geometry: &Geometry,
    palette: &PaletteTable,
) -> Result<(), BmpError> {
    let luma = palette.is_black_white();
    trace!("1 bpp: {}", if luma { "black/white fast path" } else { "palette path" });

    buffer.reset(geometry.width, geometry.height, if luma { 1 } else { 3 }, 0)?;
    let mut line = vec![0u8; geometry.row_size];
    let mut indices = vec![0u8; if luma { 0 } else { geometry.width }];

    for disk_row in 0..geometry.height {
        session.read(&mut line)?;
        let out = buffer.row_mut(geometry.target_row(disk_row));
        if luma {
            expand_1bpp_luma(&line, out);
        } else {
            expand_indices(1, &line, &mut indices);
            expand_palette(&indices, out, palette);
        }
    }
    Ok(())
}

fn read_4bpp<S: InputStream + ?Sized>(
    session: &mut ReadSession<'_, S>,
    buffer: &mut PixelBuffer<'_>,
    geometry: &Geometry,
    palette: &PaletteTable,
) -> Result<(), BmpError> {
    buffer.reset(geometry.width, geometry.height, 3, 0)?;
    let mut line = vec![0u8; geometry.row_size];
    let mut indices = vec![0u8; geometry.width];

    for disk_row in 0..geometry.height {
        session.read(&mut line)?;
        expand_indices(4, &line, &mut indices);
        expand_palette(&indices, buffer.row_mut(geometry.target_row(disk_row)), palette);
    }
    Ok(())
}

fn read_8bpp<S: InputStream + ?Sized>(
    session: &mut ReadSession<'_, S>,
    buffer: &mut PixelBuffer<'_>,
    geometry: &Geometry,
    palette: &PaletteTable,
) -> Result<(), BmpError> {
    buffer.reset(geometry.width, geometry.height, 3, 0)?;
    let mut line = vec![0u8; geometry.row_size];

    for disk_row in 0..geometry.height {
        session.read(&mut line)?;
        expand_palette(
            &line[..geometry.width],
            buffer.row_mut(geometry.target_row(disk_row)),
            palette,
        );
    }
    Ok(())
}

/// 24 and 32 bpp: the pixel array is read verbatim with the on-disk row size
/// as pitch, then rows are put in top-down order and B/R swapped in place.
/// For 32 bpp the fourth byte is carried through unchanged.
fn read_direct<S: InputStream + ?Sized>(
    session: &mut ReadSession<'_, S>,
    buffer: &mut PixelBuffer<'_>,
    geometry: &Geometry,
) -> Result<(), BmpError> {
    let channels = usize::from(geometry.bit_depth / 8);
    buffer.reset(geometry.width, geometry.height, channels, geometry.row_size)?;
    session.read(buffer.data_mut())?;

    let height = geometry.height;
    if !geometry.flipped {
        for y in 0..height {
            swap_red_blue(buffer.row_mut(y), channels);
        }
        return Ok(());
    }

    let pitch = buffer.pitch();
    let row_bytes = geometry.width * channels;
    let data = buffer.data_mut();
    for top in 0..height / 2 {
        let bottom = height - 1 - top;
        let (upper, lower) = data.split_at_mut(bottom * pitch);
        let a = &mut upper[top * pitch..top * pitch + row_bytes];
        let b = &mut lower[..row_bytes];
        a.swap_with_slice(b);
        swap_red_blue(a, channels);
        swap_red_blue(b, channels);
    }
    if height % 2 == 1 {
        swap_red_blue(buffer.row_mut(height / 2), channels);
    }
    Ok(())
}
