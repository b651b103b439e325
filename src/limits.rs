use alloc::format;

use crate::error::BmpError;

/// Caps applied to a file's declared geometry before the pixel buffer is
/// allocated.
///
/// All fields default to `None` (no limit). Without limits a decode still
/// refuses pixel arrays larger than `isize::MAX` bytes, but will try to
/// allocate anything below that; set `max_memory_bytes` for untrusted input.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum size of the decoded pixel array, row padding included.
    pub max_memory_bytes: Option<u64>,
}

fn within(what: &str, value: u64, max: Option<u64>) -> Result<(), BmpError> {
    match max {
        Some(max) if value > max => Err(BmpError::LimitExceeded(format!(
            "{what} {value} exceeds limit {max}"
        ))),
        _ => Ok(()),
    }
}

impl Limits {
    /// Check a `width` x `height` pixel array that needs `bytes` of buffer.
    pub(crate) fn check_pixel_array(
        &self,
        width: usize,
        height: usize,
        bytes: usize,
    ) -> Result<(), BmpError> {
        let (width, height) = (width as u64, height as u64);
        within("width", width, self.max_width)?;
        within("height", height, self.max_height)?;
        within("pixel count", width.saturating_mul(height), self.max_pixels)?;
        within("pixel buffer size", bytes as u64, self.max_memory_bytes)
    }
}
