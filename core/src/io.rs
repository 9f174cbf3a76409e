// Copyright 2017-2020 Peter Williams
// Licensed under the MIT License.

/*!

Basic I/O helpers for block-structured files.

 */

use std::io;
use std::io::{Read, Write};
use std::result;

/// This struct wraps a Write type to track how many bytes have been written
/// to it, so that the stream can be padded out to a fixed block size.
///
/// FITS files are made of 2880-byte blocks: header blocks are padded with
/// ASCII spaces and data blocks with zeros.
#[derive(Debug)]
pub struct BlockWriter<W: Write> {
    inner: W,
    offset: u64,
    block_size: usize,
}

impl<W: Write> BlockWriter<W> {
    /// Create a new BlockWriter that wraps the argument *inner*.
    pub fn new(inner: W, block_size: usize) -> Self {
        BlockWriter {
            inner,
            offset: 0,
            block_size,
        }
    }

    /// Consume this struct, returning the underlying inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Return how many bytes we have written since this struct was created.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Write `fill` bytes until the stream is at a block boundary.
    ///
    /// Returns whether the stream was already aligned. When that is the
    /// case, no write is performed.
    pub fn pad_to_block(&mut self, fill: u8) -> io::Result<bool> {
        let excess = (self.offset % self.block_size as u64) as usize;

        if excess == 0 {
            return Ok(true);
        }

        let buf = vec![fill; self.block_size - excess];
        self.write_all(&buf)?;
        Ok(false)
    }
}

impl<W: Write> Write for BlockWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.inner.write(buf);

        if let Ok(n) = result {
            self.offset += n as u64;
        }

        result
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Extend the `Read` trait to provide a function for reading an exact number
/// of bytes from a stream and distinguishing whether EOF was encountered
/// immediately, versus whether it was encountered in the midst of the read.
pub trait EofReadExactExt: Read {
    /// Like `Read::read_exact`, except returns Ok(false) if EOF was
    /// encountered at the first read attempt. Returns Ok(true) if everything
    /// was OK and EOF has not yet been hit. Returns Err with an IoError with
    /// a "kind" of UnexpectedEof if EOF was encountered somewhere in the
    /// midst of the buffer.
    fn eof_read_exact<E>(&mut self, buf: &mut [u8]) -> result::Result<bool, E>
    where
        E: From<io::Error>;
}

impl<R: Read> EofReadExactExt for R {
    fn eof_read_exact<E>(&mut self, buf: &mut [u8]) -> result::Result<bool, E>
    where
        E: From<io::Error>,
    {
        let mut n_left = buf.len();
        let mut ofs = 0;

        while n_left > 0 {
            let n_read = match self.read(&mut buf[ofs..]) {
                Ok(n) => n,
                Err(e) => {
                    if e.kind() == io::ErrorKind::Interrupted {
                        continue;
                    }

                    return Err(e.into());
                }
            };

            if n_read == 0 {
                return if ofs == 0 {
                    Ok(false) // no more data at an expected stopping point
                } else {
                    Err(
                        io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected end of file")
                            .into(),
                    )
                };
            }

            ofs += n_read;
            n_left -= n_read;
        }

        Ok(true) // more data, we think
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_padding() {
        let mut w = BlockWriter::new(Vec::new(), 8);
        assert!(w.pad_to_block(b' ').unwrap());
        w.write_all(b"abc").unwrap();
        assert!(!w.pad_to_block(b' ').unwrap());
        assert_eq!(w.offset(), 8);
        assert_eq!(w.into_inner(), b"abc     ".to_vec());
    }

    #[test]
    fn eof_detection() {
        let mut buf = [0u8; 4];
        let mut empty: &[u8] = &[];
        assert!(!empty.eof_read_exact::<io::Error>(&mut buf).unwrap());

        let mut short: &[u8] = &[1, 2];
        let err = short.eof_read_exact::<io::Error>(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let mut full: &[u8] = &[1, 2, 3, 4, 5];
        assert!(full.eof_read_exact::<io::Error>(&mut buf).unwrap());
        assert_eq!(buf, [1, 2, 3, 4]);
    }
}
