//! BMP container: headers, color tables, and the pixel codecs.
//!
//! The top-level [`crate::decode`] and [`crate::encode`] cover the common
//! cases; this module exposes the stream-based entry points and the header
//! model for callers that need them.

mod decode;
mod encode;
mod header;
mod palette;
mod utils;

pub use decode::{BmpHeaders, BmpInfo, decode_into, probe};
pub use encode::{BitDepth, DEFAULT_PIXELS_PER_METER, EncodeRequest};
pub use header::{
    CoreHeader, DescriptorKind, FILE_HEADER_SIZE, FileHeader, ImageDescriptor, InfoHeader,
    MAX_DESCRIPTOR_SIZE, Os2Header,
};
pub use palette::{BLACK, PaletteTable, WHITE, pack_rgb};
