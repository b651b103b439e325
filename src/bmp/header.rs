//! File header and the size-tagged info header ("descriptor").
//!
//! All multi-byte fields are little-endian.

use core::fmt;

use crate::error::BmpError;
use crate::stream::{InputStream, ReadSession};

/// Size of the fixed file header.
pub const FILE_HEADER_SIZE: u32 = 14;

/// Largest info header this crate reads.
pub const MAX_DESCRIPTOR_SIZE: u32 = 64;

/// Smallest non-core info header: size, width, height, planes, bit depth.
const MIN_GENERIC_SIZE: u32 = 16;

fn u16_at(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn u32_at(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

fn i32_at(b: &[u8], at: usize) -> i32 {
    u32_at(b, at) as i32
}

// ── File header ─────────────────────────────────────────────────────

/// The 14-byte `BITMAPFILEHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: [u8; 2],
    pub file_size: i32,
    pub reserved1: i16,
    pub reserved2: i16,
    /// Absolute offset of the pixel array.
    pub pixel_data_offset: i32,
}

impl FileHeader {
    pub const MAGIC: [u8; 2] = *b"BM";

    /// Read and validate the file header. Fails on a bad magic number
    /// without consuming anything past these 14 bytes.
    pub fn read<S: InputStream + ?Sized>(
        stream: &mut ReadSession<'_, S>,
    ) -> Result<Self, BmpError> {
        let b = stream.read_array::<14>()?;
        Self::from_bytes(&b)
    }

    pub fn from_bytes(b: &[u8; 14]) -> Result<Self, BmpError> {
        let magic = [b[0], b[1]];
        if magic != Self::MAGIC {
            return Err(BmpError::BadMagicNumber { found: magic });
        }
        Ok(Self {
            magic,
            file_size: i32_at(b, 2),
            reserved1: u16_at(b, 6) as i16,
            reserved2: u16_at(b, 8) as i16,
            pixel_data_offset: i32_at(b, 10),
        })
    }

    pub fn to_bytes(&self) -> [u8; 14] {
        let mut b = [0u8; 14];
        b[0..2].copy_from_slice(&self.magic);
        b[2..6].copy_from_slice(&self.file_size.to_le_bytes());
        b[6..8].copy_from_slice(&self.reserved1.to_le_bytes());
        b[8..10].copy_from_slice(&self.reserved2.to_le_bytes());
        b[10..14].copy_from_slice(&self.pixel_data_offset.to_le_bytes());
        b
    }
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File header:")?;
        writeln!(f, "Size: {}", self.file_size)?;
        writeln!(f, "Reserved1: {}", self.reserved1)?;
        writeln!(f, "Reserved2: {}", self.reserved2)?;
        writeln!(f, "Offset: {}", self.pixel_data_offset)
    }
}

// ── Descriptor variants ─────────────────────────────────────────────

/// Which info header layout a declared size selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    /// 12 bytes: `BITMAPCOREHEADER` / OS/2 1.x.
    Core,
    /// 40 bytes: `BITMAPINFOHEADER`.
    Info,
    /// 64 bytes: OS/2 2.x `BITMAPINFOHEADER2`.
    Os2,
    /// Any other size from 16 to 64 bytes, read with the info header field
    /// order as far as the declared size reaches.
    ///
    /// Sizes 4 to 15 (other than 12) are rejected rather than read as
    /// generic: they end before the bit depth field at offset 14.
    Generic,
}

impl DescriptorKind {
    /// Resolve the layout for a declared info header size.
    pub fn from_declared_size(declared: i32) -> Result<Self, BmpError> {
        match declared {
            12 => Ok(Self::Core),
            40 => Ok(Self::Info),
            64 => Ok(Self::Os2),
            d if d >= MIN_GENERIC_SIZE as i32 && d <= MAX_DESCRIPTOR_SIZE as i32 => {
                Ok(Self::Generic)
            }
            _ => Err(BmpError::UnsupportedDescriptorSize { declared }),
        }
    }

    /// Fixed on-disk size of the layout, `None` for [`DescriptorKind::Generic`].
    pub fn layout_size(self) -> Option<u32> {
        match self {
            Self::Core => Some(12),
            Self::Info => Some(40),
            Self::Os2 => Some(64),
            Self::Generic => None,
        }
    }
}

/// `BITMAPCOREHEADER` fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreHeader {
    pub width: u16,
    pub height: u16,
    pub planes: u16,
    pub bit_depth: u16,
}

/// `BITMAPINFOHEADER` fields (without the leading size).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InfoHeader {
    pub width: i32,
    /// Positive: rows stored bottom-up. Negative: top-down.
    pub height: i32,
    pub planes: u16,
    pub bit_depth: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub palette_colors: u32,
    pub important_colors: u32,
}

impl InfoHeader {
    pub const SIZE: u32 = 40;

    /// Parse from the bytes following the size field. Missing trailing
    /// fields must already be zero-filled (`b.len() >= 36`).
    fn parse(b: &[u8]) -> Self {
        Self {
            width: i32_at(b, 0),
            height: i32_at(b, 4),
            planes: u16_at(b, 8),
            bit_depth: u16_at(b, 10),
            compression: u32_at(b, 12),
            image_size: u32_at(b, 16),
            x_pixels_per_meter: i32_at(b, 20),
            y_pixels_per_meter: i32_at(b, 24),
            palette_colors: u32_at(b, 28),
            important_colors: u32_at(b, 32),
        }
    }

    /// Serialize including the leading size field.
    pub fn to_bytes(&self) -> [u8; 40] {
        let mut b = [0u8; 40];
        b[0..4].copy_from_slice(&Self::SIZE.to_le_bytes());
        b[4..8].copy_from_slice(&self.width.to_le_bytes());
        b[8..12].copy_from_slice(&self.height.to_le_bytes());
        b[12..14].copy_from_slice(&self.planes.to_le_bytes());
        b[14..16].copy_from_slice(&self.bit_depth.to_le_bytes());
        b[16..20].copy_from_slice(&self.compression.to_le_bytes());
        b[20..24].copy_from_slice(&self.image_size.to_le_bytes());
        b[24..28].copy_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        b[28..32].copy_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        b[32..36].copy_from_slice(&self.palette_colors.to_le_bytes());
        b[36..40].copy_from_slice(&self.important_colors.to_le_bytes());
        b
    }
}

/// OS/2 2.x `BITMAPINFOHEADER2`: the info header fields plus half-toning
/// and color encoding extras.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Os2Header {
    pub info: InfoHeader,
    pub units: u16,
    pub reserved: u16,
    pub recording: u16,
    pub rendering: u16,
    pub halftone_size1: u32,
    pub halftone_size2: u32,
    pub color_encoding: u32,
    pub identifier: u32,
}

/// The image descriptor, one variant per recognized layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageDescriptor {
    Core(CoreHeader),
    Info(InfoHeader),
    Os2(Os2Header),
    Generic {
        /// Size the file declared, between 16 and 64.
        declared_size: u32,
        info: InfoHeader,
    },
}

impl ImageDescriptor {
    /// Read the size tag, resolve the layout, and read exactly the declared
    /// number of bytes.
    pub fn read<S: InputStream + ?Sized>(
        stream: &mut ReadSession<'_, S>,
    ) -> Result<Self, BmpError> {
        let declared = i32::from_le_bytes(stream.read_array::<4>()?);
        let kind = DescriptorKind::from_declared_size(declared)?;

        // The body length comes from the declared size, which the kind
        // resolution above bounded to 12..=64.
        let body_len = declared as usize - 4;
        let mut body = [0u8; MAX_DESCRIPTOR_SIZE as usize - 4];
        stream.read(&mut body[..body_len])?;
        Ok(Self::from_body(kind, declared as u32, &body))
    }

    /// Build a descriptor from its zero-padded body (bytes after the size field).
    fn from_body(kind: DescriptorKind, declared: u32, b: &[u8; 60]) -> Self {
        match kind {
            DescriptorKind::Core => Self::Core(CoreHeader {
                width: u16_at(b, 0),
                height: u16_at(b, 2),
                planes: u16_at(b, 4),
                bit_depth: u16_at(b, 6),
            }),
            DescriptorKind::Info => Self::Info(InfoHeader::parse(b)),
            DescriptorKind::Os2 => Self::Os2(Os2Header {
                info: InfoHeader::parse(b),
                units: u16_at(b, 36),
                reserved: u16_at(b, 38),
                recording: u16_at(b, 40),
                rendering: u16_at(b, 42),
                halftone_size1: u32_at(b, 44),
                halftone_size2: u32_at(b, 48),
                color_encoding: u32_at(b, 52),
                identifier: u32_at(b, 56),
            }),
            DescriptorKind::Generic => Self::Generic {
                declared_size: declared,
                info: InfoHeader::parse(b),
            },
        }
    }

    pub fn kind(&self) -> DescriptorKind {
        match self {
            Self::Core(_) => DescriptorKind::Core,
            Self::Info(_) => DescriptorKind::Info,
            Self::Os2(_) => DescriptorKind::Os2,
            Self::Generic { .. } => DescriptorKind::Generic,
        }
    }

    /// On-disk size of this descriptor, size field included.
    pub fn size(&self) -> u32 {
        match self {
            Self::Generic { declared_size, .. } => *declared_size,
            other => other.kind().layout_size().unwrap_or(MAX_DESCRIPTOR_SIZE),
        }
    }

    fn info(&self) -> Option<&InfoHeader> {
        match self {
            Self::Core(_) => None,
            Self::Info(info) | Self::Os2(Os2Header { info, .. }) | Self::Generic { info, .. } => {
                Some(info)
            }
        }
    }

    pub fn width(&self) -> i32 {
        match self {
            Self::Core(core) => i32::from(core.width),
            _ => self.info().map_or(0, |i| i.width),
        }
    }

    /// Signed height; positive means rows are stored bottom-up.
    pub fn height(&self) -> i32 {
        match self {
            Self::Core(core) => i32::from(core.height),
            _ => self.info().map_or(0, |i| i.height),
        }
    }

    pub fn planes(&self) -> u16 {
        match self {
            Self::Core(core) => core.planes,
            _ => self.info().map_or(0, |i| i.planes),
        }
    }

    pub fn bit_depth(&self) -> u16 {
        match self {
            Self::Core(core) => core.bit_depth,
            _ => self.info().map_or(0, |i| i.bit_depth),
        }
    }

    pub fn compression(&self) -> u32 {
        self.info().map_or(0, |i| i.compression)
    }

    pub fn image_size(&self) -> u32 {
        self.info().map_or(0, |i| i.image_size)
    }

    pub fn x_pixels_per_meter(&self) -> i32 {
        self.info().map_or(0, |i| i.x_pixels_per_meter)
    }

    pub fn y_pixels_per_meter(&self) -> i32 {
        self.info().map_or(0, |i| i.y_pixels_per_meter)
    }

    pub fn palette_colors(&self) -> u32 {
        self.info().map_or(0, |i| i.palette_colors)
    }

    pub fn important_colors(&self) -> u32 {
        self.info().map_or(0, |i| i.important_colors)
    }

    /// Bytes per color table entry: 3 for the core layout, 4 otherwise.
    pub fn palette_entry_size(&self) -> usize {
        match self {
            Self::Core(_) => 3,
            _ => 4,
        }
    }
}

impl fmt::Display for ImageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DIB header ({:?}, {} bytes):", self.kind(), self.size())?;
        writeln!(f, "Width: {}", self.width())?;
        writeln!(f, "Height: {}", self.height())?;
        writeln!(f, "Planes: {}", self.planes())?;
        writeln!(f, "Bit Count: {}", self.bit_depth())?;
        writeln!(f, "Compression: {}", self.compression())?;
        writeln!(f, "Image Size: {}", self.image_size())?;
        writeln!(f, "X Pixels Per Meter: {}", self.x_pixels_per_meter())?;
        writeln!(f, "Y Pixels Per Meter: {}", self.y_pixels_per_meter())?;
        writeln!(f, "Palette Colors: {}", self.palette_colors())?;
        writeln!(f, "Important Colors: {}", self.important_colors())
    }
}
