//! Color table resolution for indexed (≤ 8 bpp) images.

use crate::error::BmpError;
use crate::log::{trace, warn};
use crate::stream::{InputStream, ReadSession};

use super::header::ImageDescriptor;

/// Packed `0x00RRGGBB` black.
pub const BLACK: u32 = 0x00_00_00;
/// Packed `0x00RRGGBB` white.
pub const WHITE: u32 = 0xFF_FF_FF;

/// Up to 256 colors indexed by on-disk pixel codes, stored as packed
/// `0x00RRGGBB`. Indices past the resolved count stay zero (black).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteTable {
    entries: [u32; 256],
    len: usize,
}

impl Default for PaletteTable {
    fn default() -> Self {
        Self {
            entries: [0; 256],
            len: 0,
        }
    }
}

impl PaletteTable {
    /// Number of entries a descriptor asks for: its declared color count,
    /// or `2^bit_depth` when that is zero, capped at 256.
    pub fn resolved_len(descriptor: &ImageDescriptor) -> usize {
        let declared = descriptor.palette_colors() as usize;
        let count = if declared != 0 {
            declared
        } else {
            1usize << descriptor.bit_depth().min(8)
        };
        count.min(256)
    }

    /// Read the color table that immediately follows the descriptor.
    pub fn read<S: InputStream + ?Sized>(
        stream: &mut ReadSession<'_, S>,
        descriptor: &ImageDescriptor,
    ) -> Result<Self, BmpError> {
        let len = Self::resolved_len(descriptor);
        if descriptor.palette_colors() as usize > len {
            warn!(
                "palette declares {} colors, reading {len}",
                descriptor.palette_colors()
            );
        }
        let entry_size = descriptor.palette_entry_size();
        let mut raw = [0u8; 256 * 4];
        let raw = &mut raw[..len * entry_size];
        stream.read(raw)?;

        let mut table = Self::default();
        for (slot, entry) in table.entries.iter_mut().zip(raw.chunks_exact(entry_size)) {
            let (b, g, r) = (entry[0], entry[1], entry[2]);
            *slot = pack_rgb(r, g, b);
        }
        table.len = len;
        trace!("palette: {len} entries of {entry_size} bytes");
        Ok(table)
    }

    /// Build a table from packed colors (extra colors past 256 are ignored).
    pub fn from_colors(colors: &[u32]) -> Self {
        let mut table = Self::default();
        let len = colors.len().min(256);
        for (slot, &c) in table.entries.iter_mut().zip(&colors[..len]) {
            *slot = c & 0x00FF_FFFF;
        }
        table.len = len;
        table
    }

    /// Number of entries read from the file.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed color for a pixel code.
    #[inline]
    pub fn get(&self, index: u8) -> u32 {
        self.entries[usize::from(index)]
    }

    /// Color for a pixel code as `[r, g, b]`.
    #[inline]
    pub fn rgb(&self, index: u8) -> [u8; 3] {
        let c = self.get(index);
        [(c >> 16) as u8, (c >> 8) as u8, c as u8]
    }

    /// Entry 0 is black and entry 1 is white, so 1 bpp data can expand
    /// straight to luminance.
    pub fn is_black_white(&self) -> bool {
        self.entries[0] == BLACK && self.entries[1] == WHITE
    }
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}
