use alloc::vec::Vec;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::error::BmpError;

/// Backing memory of a [`PixelBuffer`].
#[derive(Debug)]
enum Storage<'a> {
    /// Exclusively owned allocation, released when replaced or dropped.
    Owned(Vec<u8>),
    /// Caller-supplied memory. Never released by the buffer.
    Borrowed(&'a mut [u8]),
}

impl Storage<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            Storage::Owned(v) => v,
            Storage::Borrowed(s) => s,
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Storage::Owned(v) => v,
            Storage::Borrowed(s) => s,
        }
    }
}

/// A 2-D, 8-bit-per-channel pixel buffer with an explicit row stride.
///
/// Row 0 is the visually topmost row. Each row starts `pitch` bytes after the
/// previous one; bytes between `width * channels` and `pitch` are row padding.
///
/// The buffer either owns its allocation or is a view over caller memory
/// (see [`PixelBuffer::from_borrowed`]). Cloning always produces an owning
/// deep copy; [`PixelBuffer::take`] moves the contents out and leaves an empty
/// owning buffer behind.
#[derive(Debug)]
pub struct PixelBuffer<'a> {
    width: usize,
    height: usize,
    channels: usize,
    pitch: usize,
    storage: Storage<'a>,
}

impl Default for PixelBuffer<'_> {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            channels: 0,
            pitch: 0,
            storage: Storage::Owned(Vec::new()),
        }
    }
}

impl Clone for PixelBuffer<'_> {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            channels: self.channels,
            pitch: self.pitch,
            storage: Storage::Owned(self.data().to_vec()),
        }
    }
}

fn min_row_size(width: usize, channels: usize) -> Result<usize, BmpError> {
    width
        .checked_mul(channels)
        .ok_or(BmpError::DimensionsTooLarge {
            width: width as u32,
            height: 0,
        })
}

/// Pitch to use for a requested `pitch` (0 means tightly packed).
fn resolve_pitch(width: usize, channels: usize, pitch: usize) -> Result<usize, BmpError> {
    let min_row = min_row_size(width, channels)?;
    if pitch == 0 {
        return Ok(min_row);
    }
    if pitch < min_row {
        return Err(BmpError::InvalidStride { pitch, min_row });
    }
    Ok(pitch)
}

/// Byte extent `pitch * height`, capped at the largest possible allocation.
pub(crate) fn extent(pitch: usize, width: usize, height: usize) -> Result<usize, BmpError> {
    pitch
        .checked_mul(height)
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(BmpError::DimensionsTooLarge {
            width: width as u32,
            height: height as u32,
        })
}

fn zeroed(bytes: usize) -> Result<Vec<u8>, BmpError> {
    let mut data = Vec::new();
    data.try_reserve_exact(bytes)
        .map_err(|_| BmpError::AllocationFailed { bytes })?;
    data.resize(bytes, 0);
    Ok(data)
}

impl PixelBuffer<'static> {
    /// Allocate a zeroed, tightly packed buffer.
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self, BmpError> {
        Self::with_pitch(width, height, channels, 0)
    }

    /// Allocate a zeroed buffer with an explicit row pitch (0 = tightly packed).
    pub fn with_pitch(
        width: usize,
        height: usize,
        channels: usize,
        pitch: usize,
    ) -> Result<Self, BmpError> {
        let mut buffer = PixelBuffer::default();
        buffer.reset(width, height, channels, pitch)?;
        Ok(buffer)
    }

    /// Wrap an existing allocation. `data` must hold `pitch * height` bytes.
    pub fn from_vec(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
        pitch: usize,
    ) -> Result<Self, BmpError> {
        let pitch = resolve_pitch(width, channels, pitch)?;
        let needed = extent(pitch, width, height)?;
        if data.len() < needed {
            return Err(BmpError::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            pitch,
            storage: Storage::Owned(data),
        })
    }
}

impl<'a> PixelBuffer<'a> {
    /// A non-owning view over caller memory. `data` must hold `pitch * height` bytes.
    pub fn from_borrowed(
        data: &'a mut [u8],
        width: usize,
        height: usize,
        channels: usize,
        pitch: usize,
    ) -> Result<Self, BmpError> {
        let mut buffer = PixelBuffer::default();
        buffer.reset_borrowed(width, height, channels, pitch, data)?;
        Ok(buffer)
    }

    /// Change the geometry, allocating when needed.
    ///
    /// A `pitch` of 0 selects `width * channels`. If the new byte extent
    /// (`pitch * height`) equals the current one, the existing memory is kept,
    /// including caller memory of a borrowed view; its contents are left as
    /// they are. Otherwise a fresh zeroed allocation replaces it.
    pub fn reset(
        &mut self,
        width: usize,
        height: usize,
        channels: usize,
        pitch: usize,
    ) -> Result<(), BmpError> {
        let pitch = resolve_pitch(width, channels, pitch)?;
        let new_extent = extent(pitch, width, height)?;

        if self.byte_len() != new_extent || self.storage.bytes().len() < new_extent {
            self.storage = Storage::Owned(zeroed(new_extent)?);
        }

        self.width = width;
        self.height = height;
        self.channels = channels;
        self.pitch = pitch;
        Ok(())
    }

    /// Turn this buffer into a view over `data`, releasing any owned allocation.
    pub fn reset_borrowed(
        &mut self,
        width: usize,
        height: usize,
        channels: usize,
        pitch: usize,
        data: &'a mut [u8],
    ) -> Result<(), BmpError> {
        let pitch = resolve_pitch(width, channels, pitch)?;
        let needed = extent(pitch, width, height)?;
        if data.len() < needed {
            return Err(BmpError::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        self.width = width;
        self.height = height;
        self.channels = channels;
        self.pitch = pitch;
        self.storage = Storage::Borrowed(data);
        Ok(())
    }

    /// Move the contents out, leaving an empty owning buffer behind.
    pub fn take(&mut self) -> PixelBuffer<'a> {
        core::mem::take(self)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Byte distance between the starts of consecutive rows.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Whether the buffer owns its memory (an empty buffer counts as owning).
    pub fn is_owned(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Pixel layout implied by the channel count, if it is one BMP produces.
    pub fn layout(&self) -> Option<crate::PixelLayout> {
        crate::PixelLayout::from_channels(self.channels)
    }

    fn byte_len(&self) -> usize {
        self.pitch * self.height
    }

    /// All `pitch * height` bytes, row padding included.
    pub fn data(&self) -> &[u8] {
        &self.storage.bytes()[..self.byte_len()]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        let len = self.byte_len();
        &mut self.storage.bytes_mut()[..len]
    }

    /// Pixel bytes of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.pitch;
        &self.storage.bytes()[start..start + self.width * self.channels]
    }

    /// Mutable pixel bytes of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        let start = y * self.pitch;
        let len = self.width * self.channels;
        &mut self.storage.bytes_mut()[start..start + len]
    }

    /// Iterate the pixel bytes of each row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let row_bytes = self.width * self.channels;
        self.data()
            .chunks(self.pitch.max(1))
            .take(self.height)
            .map(move |r| &r[..row_bytes])
    }

    /// Copy the pixels into a tightly packed `Vec` (no row padding).
    pub fn to_packed_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.channels * self.height);
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        out
    }

    /// Detach from borrowed memory by copying it into an owned allocation.
    pub fn into_owned(self) -> PixelBuffer<'static> {
        let storage = match self.storage {
            Storage::Owned(v) => Storage::Owned(v),
            Storage::Borrowed(s) => Storage::Owned(s.to_vec()),
        };
        PixelBuffer {
            width: self.width,
            height: self.height,
            channels: self.channels,
            pitch: self.pitch,
            storage,
        }
    }

    /// Take the backing bytes (`pitch * height`), copying if borrowed.
    pub fn into_vec(self) -> Vec<u8> {
        let len = self.byte_len();
        match self.storage {
            Storage::Owned(mut v) => {
                v.truncate(len);
                v
            }
            Storage::Borrowed(s) => s[..len].to_vec(),
        }
    }

    #[cfg(feature = "rgb")]
    fn check_layout<P: crate::pixel::BufferPixel>(&self) -> Result<(), BmpError> {
        let expected = P::layout().channels();
        if self.channels != expected {
            return Err(BmpError::ChannelMismatch {
                expected,
                actual: self.channels,
            });
        }
        Ok(())
    }

    /// Reinterpret one row as typed pixels.
    ///
    /// Returns [`BmpError::ChannelMismatch`] if the channel count doesn't match `P`.
    #[cfg(feature = "rgb")]
    pub fn row_as_pixels<P: crate::pixel::BufferPixel>(&self, y: usize) -> Result<&[P], BmpError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        self.check_layout::<P>()?;
        Ok(self.row(y).as_pixels())
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of typed pixels.
    ///
    /// The pitch must be a whole number of pixels (24 bpp decodes of widths
    /// that are not a multiple of 4 are not); use [`PixelBuffer::to_imgvec`]
    /// for those.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P: crate::pixel::BufferPixel>(
        &self,
    ) -> Result<imgref::ImgRef<'_, P>, BmpError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        self.check_layout::<P>()?;
        if self.pitch % self.channels != 0 {
            return Err(BmpError::InvalidStride {
                pitch: self.pitch,
                min_row: self.width * self.channels,
            });
        }
        let pixels: &[P] = self.data().as_pixels();
        Ok(imgref::ImgRef::new_stride(
            pixels,
            self.width,
            self.height,
            self.pitch / self.channels,
        ))
    }

    /// Copy into a tightly packed [`imgref::ImgVec`] of typed pixels.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec<P: crate::pixel::BufferPixel>(&self) -> Result<imgref::ImgVec<P>, BmpError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        self.check_layout::<P>()?;
        let packed = self.to_packed_vec();
        let pixels: &[P] = packed.as_pixels();
        Ok(imgref::ImgVec::new(pixels.to_vec(), self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn tight_pitch_by_default() {
        let buf = PixelBuffer::new(5, 2, 3).unwrap();
        assert_eq!(buf.pitch(), 15);
        assert_eq!(buf.data().len(), 30);
        assert!(buf.is_owned());
    }

    #[test]
    fn extent_past_isize_max_is_rejected() {
        let pitch = (isize::MAX as usize) / 2 + 1;
        match PixelBuffer::with_pitch(1, 2, 1, pitch) {
            Err(BmpError::DimensionsTooLarge { width: 1, height: 2 }) => {}
            other => panic!("expected DimensionsTooLarge, got {other:?}"),
        }
        assert!(extent(pitch, 1, 1).is_ok());
    }

    #[test]
    fn pitch_smaller_than_row_is_rejected() {
        match PixelBuffer::with_pitch(5, 2, 3, 14) {
            Err(BmpError::InvalidStride { pitch, min_row }) => {
                assert_eq!(pitch, 14);
                assert_eq!(min_row, 15);
            }
            other => panic!("expected InvalidStride, got {other:?}"),
        }
    }

    #[test]
    fn rows_skip_padding() {
        let mut buf = PixelBuffer::with_pitch(1, 2, 3, 4).unwrap();
        buf.row_mut(0).copy_from_slice(&[1, 2, 3]);
        buf.row_mut(1).copy_from_slice(&[4, 5, 6]);
        assert_eq!(buf.data(), &[1, 2, 3, 0, 4, 5, 6, 0]);
        assert_eq!(buf.to_packed_vec(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn same_extent_reset_keeps_contents() {
        let mut buf = PixelBuffer::new(4, 3, 1).unwrap();
        buf.data_mut().fill(7);
        buf.reset(2, 2, 3, 0).unwrap();
        assert_eq!((buf.width(), buf.height(), buf.channels()), (2, 2, 3));
        assert!(buf.data().iter().all(|&b| b == 7));

        buf.reset(3, 3, 3, 0).unwrap();
        assert_eq!(buf.data().len(), 27);
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn borrowed_view_never_reallocates_on_same_extent() {
        let mut memory = [9u8; 12];
        {
            let mut buf = PixelBuffer::from_borrowed(&mut memory, 2, 2, 3, 0).unwrap();
            assert!(!buf.is_owned());
            buf.reset(1, 2, 3, 6).unwrap();
            assert!(!buf.is_owned());
            buf.row_mut(1).copy_from_slice(&[1, 2, 3]);
        }
        assert_eq!(&memory[6..9], &[1, 2, 3]);
    }

    #[test]
    fn borrowed_view_switches_to_owned_on_resize() {
        let mut memory = [0u8; 4];
        let mut buf = PixelBuffer::from_borrowed(&mut memory, 4, 1, 1, 0).unwrap();
        buf.reset(8, 1, 1, 0).unwrap();
        assert!(buf.is_owned());
        assert_eq!(buf.data().len(), 8);
    }

    #[test]
    fn borrowed_view_too_small() {
        let mut memory = [0u8; 5];
        let err = PixelBuffer::from_borrowed(&mut memory, 2, 1, 3, 0).unwrap_err();
        assert!(matches!(
            err,
            BmpError::BufferTooSmall {
                needed: 6,
                actual: 5
            }
        ));
    }

    #[test]
    fn clone_of_borrowed_is_owned() {
        let mut memory = [1u8, 2, 3, 4];
        let buf = PixelBuffer::from_borrowed(&mut memory, 2, 2, 1, 0).unwrap();
        let copy = buf.clone();
        assert!(copy.is_owned());
        assert_eq!(copy.data(), &[1, 2, 3, 4]);
    }

    #[test]
    fn take_leaves_empty_owning_buffer() {
        let mut buf = PixelBuffer::new(2, 2, 1).unwrap();
        buf.data_mut().copy_from_slice(&[1, 2, 3, 4]);
        let moved = buf.take();
        assert_eq!(moved.data(), &[1, 2, 3, 4]);
        assert!(buf.is_owned());
        assert_eq!((buf.width(), buf.height(), buf.pitch()), (0, 0, 0));
        assert!(buf.data().is_empty());
    }
}
