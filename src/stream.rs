//! Byte stream collaborators for the decoder and encoder.
//!
//! The codec never touches files directly. It talks to an [`InputStream`] or
//! [`OutputStream`], opening it on entry and closing it on every exit path
//! through [`ReadSession`] / [`WriteSession`].

use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use crate::error::BmpError;

/// Source of BMP bytes.
pub trait InputStream {
    /// Prepare for reading from the start of the stream.
    fn open_for_reading(&mut self) -> Result<(), BmpError>;

    /// Release the underlying resource. Closing twice is a no-op.
    fn close(&mut self);

    /// Fill `buf` completely or fail with [`BmpError::ShortRead`].
    fn read(&mut self, buf: &mut [u8]) -> Result<(), BmpError>;

    /// Move to an absolute byte offset.
    fn seek(&mut self, offset: u64) -> Result<(), BmpError>;
}

/// Sink for BMP bytes.
pub trait OutputStream {
    /// Prepare for writing, discarding anything written before.
    fn open_for_writing(&mut self) -> Result<(), BmpError>;

    /// Release the underlying resource. Closing twice is a no-op.
    fn close(&mut self);

    /// Write all of `buf` or fail with [`BmpError::ShortWrite`].
    fn write(&mut self, buf: &[u8]) -> Result<(), BmpError>;

    /// Push buffered bytes to the underlying resource.
    fn flush(&mut self) -> Result<(), BmpError> {
        Ok(())
    }
}

impl<S: InputStream + ?Sized> InputStream for &mut S {
    fn open_for_reading(&mut self) -> Result<(), BmpError> {
        (**self).open_for_reading()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), BmpError> {
        (**self).read(buf)
    }

    fn seek(&mut self, offset: u64) -> Result<(), BmpError> {
        (**self).seek(offset)
    }
}

impl<S: OutputStream + ?Sized> OutputStream for &mut S {
    fn open_for_writing(&mut self) -> Result<(), BmpError> {
        (**self).open_for_writing()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), BmpError> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<(), BmpError> {
        (**self).flush()
    }
}

// ── Scoped brackets ─────────────────────────────────────────────────

/// An input stream opened for the lifetime of this value.
pub struct ReadSession<'s, S: InputStream + ?Sized> {
    stream: &'s mut S,
}

impl<'s, S: InputStream + ?Sized> ReadSession<'s, S> {
    pub fn open(stream: &'s mut S) -> Result<Self, BmpError> {
        stream.open_for_reading()?;
        Ok(Self { stream })
    }

    /// Read a fixed-size little-endian field block.
    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], BmpError> {
        let mut buf = [0u8; N];
        self.stream.read(&mut buf)?;
        Ok(buf)
    }
}

impl<S: InputStream + ?Sized> Deref for ReadSession<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.stream
    }
}

impl<S: InputStream + ?Sized> DerefMut for ReadSession<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.stream
    }
}

impl<S: InputStream + ?Sized> Drop for ReadSession<'_, S> {
    fn drop(&mut self) {
        self.stream.close();
    }
}

/// An output stream opened for the lifetime of this value.
pub struct WriteSession<'s, S: OutputStream + ?Sized> {
    stream: &'s mut S,
}

impl<'s, S: OutputStream + ?Sized> WriteSession<'s, S> {
    pub fn open(stream: &'s mut S) -> Result<Self, BmpError> {
        stream.open_for_writing()?;
        Ok(Self { stream })
    }
}

impl<S: OutputStream + ?Sized> Deref for WriteSession<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.stream
    }
}

impl<S: OutputStream + ?Sized> DerefMut for WriteSession<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.stream
    }
}

impl<S: OutputStream + ?Sized> Drop for WriteSession<'_, S> {
    fn drop(&mut self) {
        self.stream.close();
    }
}

// ── In-memory streams ───────────────────────────────────────────────

/// Reads from a borrowed byte slice.
#[derive(Clone, Debug)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl InputStream for SliceReader<'_> {
    fn open_for_reading(&mut self) -> Result<(), BmpError> {
        self.pos = 0;
        Ok(())
    }

    fn close(&mut self) {}

    fn read(&mut self, buf: &mut [u8]) -> Result<(), BmpError> {
        let available = self.data.len().saturating_sub(self.pos);
        if buf.len() > available {
            return Err(BmpError::ShortRead {
                requested: buf.len(),
                available,
            });
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }

    /// Seeking past the end is allowed; the next read reports the shortfall.
    fn seek(&mut self, offset: u64) -> Result<(), BmpError> {
        self.pos = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(())
    }
}

/// Collects written bytes in memory.
#[derive(Clone, Debug, Default)]
pub struct VecWriter {
    data: Vec<u8>,
}

impl VecWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl OutputStream for VecWriter {
    fn open_for_writing(&mut self) -> Result<(), BmpError> {
        self.data.clear();
        Ok(())
    }

    fn close(&mut self) {}

    fn write(&mut self, buf: &[u8]) -> Result<(), BmpError> {
        self.data.extend_from_slice(buf);
        Ok(())
    }
}

// ── std::io adapters ────────────────────────────────────────────────

#[cfg(feature = "std")]
pub use self::io::{FileReader, FileWriter, IoReader, IoWriter};

#[cfg(feature = "std")]
mod io {
    use std::fs::File;
    use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
    use std::path::PathBuf;

    use super::{InputStream, OutputStream};
    use crate::error::BmpError;

    fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<(), BmpError> {
        let mut filled = 0;
        while filled < buf.len() {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(BmpError::ShortRead {
                        requested: buf.len(),
                        available: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn write_full<W: Write + ?Sized>(writer: &mut W, buf: &[u8]) -> Result<(), BmpError> {
        let mut written = 0;
        while written < buf.len() {
            match writer.write(&buf[written..]) {
                Ok(0) => {
                    return Err(BmpError::ShortWrite {
                        requested: buf.len(),
                        written,
                    });
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Adapts any `Read + Seek` source. Opening rewinds to the start.
    #[derive(Debug)]
    pub struct IoReader<R> {
        inner: R,
    }

    impl<R: Read + Seek> IoReader<R> {
        pub fn new(inner: R) -> Self {
            Self { inner }
        }

        pub fn into_inner(self) -> R {
            self.inner
        }
    }

    impl<R: Read + Seek> InputStream for IoReader<R> {
        fn open_for_reading(&mut self) -> Result<(), BmpError> {
            self.inner.seek(SeekFrom::Start(0))?;
            Ok(())
        }

        fn close(&mut self) {}

        fn read(&mut self, buf: &mut [u8]) -> Result<(), BmpError> {
            read_full(&mut self.inner, buf)
        }

        fn seek(&mut self, offset: u64) -> Result<(), BmpError> {
            self.inner.seek(SeekFrom::Start(offset))?;
            Ok(())
        }
    }

    /// Adapts any `Write` sink. Opening does not truncate; closing does not flush.
    #[derive(Debug)]
    pub struct IoWriter<W> {
        inner: W,
    }

    impl<W: Write> IoWriter<W> {
        pub fn new(inner: W) -> Self {
            Self { inner }
        }

        pub fn into_inner(self) -> W {
            self.inner
        }
    }

    impl<W: Write> OutputStream for IoWriter<W> {
        fn open_for_writing(&mut self) -> Result<(), BmpError> {
            Ok(())
        }

        fn close(&mut self) {}

        fn write(&mut self, buf: &[u8]) -> Result<(), BmpError> {
            write_full(&mut self.inner, buf)
        }

        fn flush(&mut self) -> Result<(), BmpError> {
            self.inner.flush()?;
            Ok(())
        }
    }

    /// Reads a file by path. The file is opened by `open_for_reading`
    /// (or rewound if already open) and released by `close`.
    #[derive(Debug)]
    pub struct FileReader {
        path: PathBuf,
        file: Option<BufReader<File>>,
    }

    impl FileReader {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                file: None,
            }
        }

        fn file(&mut self) -> Result<&mut BufReader<File>, BmpError> {
            self.file
                .as_mut()
                .ok_or_else(|| std::io::Error::new(ErrorKind::NotConnected, "file not open").into())
        }
    }

    impl InputStream for FileReader {
        fn open_for_reading(&mut self) -> Result<(), BmpError> {
            match self.file.as_mut() {
                Some(file) => {
                    file.seek(SeekFrom::Start(0))?;
                }
                None => {
                    self.file = Some(BufReader::new(File::open(&self.path)?));
                }
            }
            Ok(())
        }

        fn close(&mut self) {
            self.file = None;
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<(), BmpError> {
            read_full(self.file()?, buf)
        }

        fn seek(&mut self, offset: u64) -> Result<(), BmpError> {
            self.file()?.seek(SeekFrom::Start(offset))?;
            Ok(())
        }
    }

    /// Writes a file by path. `open_for_writing` creates or truncates it;
    /// `close` releases it (callers flush first to observe write errors).
    #[derive(Debug)]
    pub struct FileWriter {
        path: PathBuf,
        file: Option<BufWriter<File>>,
    }

    impl FileWriter {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                file: None,
            }
        }

        fn file(&mut self) -> Result<&mut BufWriter<File>, BmpError> {
            self.file
                .as_mut()
                .ok_or_else(|| std::io::Error::new(ErrorKind::NotConnected, "file not open").into())
        }
    }

    impl OutputStream for FileWriter {
        fn open_for_writing(&mut self) -> Result<(), BmpError> {
            self.file = Some(BufWriter::new(File::create(&self.path)?));
            Ok(())
        }

        fn close(&mut self) {
            self.file = None;
        }

        fn write(&mut self, buf: &[u8]) -> Result<(), BmpError> {
            write_full(self.file()?, buf)
        }

        fn flush(&mut self) -> Result<(), BmpError> {
            self.file()?.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        opened: u32,
        closed: u32,
    }

    impl InputStream for Counting {
        fn open_for_reading(&mut self) -> Result<(), BmpError> {
            self.opened += 1;
            Ok(())
        }

        fn close(&mut self) {
            self.closed += 1;
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<(), BmpError> {
            Err(BmpError::ShortRead {
                requested: buf.len(),
                available: 0,
            })
        }

        fn seek(&mut self, _offset: u64) -> Result<(), BmpError> {
            Ok(())
        }
    }

    #[test]
    fn session_closes_on_error_path() {
        let mut stream = Counting {
            opened: 0,
            closed: 0,
        };
        let result = (|| -> Result<[u8; 2], BmpError> {
            let mut session = ReadSession::open(&mut stream)?;
            session.read_array::<2>()
        })();
        assert!(matches!(result, Err(BmpError::ShortRead { .. })));
        assert_eq!(stream.opened, 1);
        assert_eq!(stream.closed, 1);
    }

    #[test]
    fn slice_reader_short_read_reports_available() {
        let mut reader = SliceReader::new(&[1, 2, 3]);
        let mut buf = [0u8; 2];
        reader.read(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        let mut buf = [0u8; 2];
        assert!(matches!(
            reader.read(&mut buf),
            Err(BmpError::ShortRead {
                requested: 2,
                available: 1
            })
        ));
    }

    #[test]
    fn slice_reader_seek_past_end_then_read_fails() {
        let mut reader = SliceReader::new(&[1, 2, 3]);
        reader.seek(10).unwrap();
        let mut buf = [0u8; 1];
        assert!(matches!(
            reader.read(&mut buf),
            Err(BmpError::ShortRead {
                requested: 1,
                available: 0
            })
        ));
        // Reopening rewinds.
        reader.open_for_reading().unwrap();
        reader.read(&mut buf).unwrap();
        assert_eq!(buf, [1]);
    }

    #[test]
    fn vec_writer_open_discards_previous_output() {
        let mut writer = VecWriter::new();
        writer.write(b"old").unwrap();
        writer.open_for_writing().unwrap();
        writer.write(b"BM").unwrap();
        assert_eq!(writer.as_bytes(), b"BM");
    }
}
