use alloc::string::String;

/// Errors from BMP decoding and encoding.
///
/// Every variant is terminal for the call that produced it; nothing is
/// retried and no partially decoded image is reported as success.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BmpError {
    #[error("bad magic number {found:02x?}, a BMP file must begin with \"BM\"")]
    BadMagicNumber { found: [u8; 2] },

    #[error("unsupported BMP info header size: {declared}")]
    UnsupportedDescriptorSize { declared: i32 },

    #[error("BMP pixel data offset {offset} points inside the headers (which end at {header_end})")]
    InvalidPixelOffset { offset: i32, header_end: u64 },

    #[error("BMP bit depth {bit_depth} unsupported")]
    UnsupportedBitDepth { bit_depth: u16 },

    #[error("unsupported BMP compression scheme {compression}")]
    UnsupportedCompression { compression: u32 },

    #[error("invalid BMP dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("short read: requested {requested} bytes, {available} available")]
    ShortRead { requested: usize, available: usize },

    #[error("short write: requested {requested} bytes, wrote {written}")]
    ShortWrite { requested: usize, written: usize },

    #[error("pitch {pitch} is smaller than the minimum row size {min_row}")]
    InvalidStride { pitch: usize, min_row: usize },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("could not allocate {bytes} bytes for the pixel buffer")]
    AllocationFailed { bytes: usize },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
