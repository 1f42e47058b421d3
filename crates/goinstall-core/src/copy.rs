//! Bounded file copy with a reusable buffer.
//!
//! Regular file contents are streamed in fixed-size chunks so peak memory
//! stays at `buffer_size` regardless of the size an entry declares.

use std::io;
use std::io::Read;
use std::io::Write;

/// Heap buffer reused for every file of one extraction session.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Vec<u8>,
}

impl CopyBuffer {
    /// Allocates a zeroed buffer of `size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    #[must_use]
    pub fn with_capacity(size: usize) -> Self {
        assert!(size > 0, "copy buffer size must be greater than zero");
        Self { buf: vec![0u8; size] }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

/// Copies exactly `size` bytes from `reader` to `writer`.
///
/// `on_chunk` is invoked with the length of every chunk after it has been
/// written.
///
/// # Errors
///
/// Returns an `UnexpectedEof` error if `reader` ends before `size` bytes
/// were read, and propagates read and write failures. `Interrupted` reads
/// are retried.
///
/// # Examples
///
/// ```
/// use goinstall_core::copy::{CopyBuffer, copy_exact};
/// use std::io::Cursor;
///
/// # fn main() -> std::io::Result<()> {
/// let mut buffer = CopyBuffer::with_capacity(4);
/// let mut input = Cursor::new(b"hello world".to_vec());
/// let mut output = Vec::new();
///
/// let copied = copy_exact(&mut input, &mut output, 5, &mut buffer, |_| {})?;
/// assert_eq!(copied, 5);
/// assert_eq!(output, b"hello");
/// # Ok(())
/// # }
/// ```
pub fn copy_exact<R, W, F>(
    reader: &mut R,
    writer: &mut W,
    size: u64,
    buffer: &mut CopyBuffer,
    mut on_chunk: F,
) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: FnMut(u64),
{
    let mut remaining = size;

    while remaining > 0 {
        let want = usize::try_from(remaining).map_or(buffer.buf.len(), |r| r.min(buffer.buf.len()));
        let n = match reader.read(&mut buffer.buf[..want]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("entry data ended {remaining} bytes short of declared size {size}"),
                ));
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer.buf[..n])?;
        remaining -= n as u64;
        on_chunk(n as u64);
    }

    Ok(size)
}
