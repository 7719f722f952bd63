//! Seekable views over an archive's bytes.
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use errors::{ErrorKind, Result, truncation_from_io};
use input_buffer::InputBuffer;


/// The reader an archive owns: a cursor over its `InputBuffer`.
pub struct ContainerReader {
    source: InputBuffer,
    position: u64,
}

impl ContainerReader {
    pub fn new(source: InputBuffer) -> ContainerReader {
        ContainerReader {
            source,
            position: 0,
        }
    }

    pub fn length(&self) -> u64 {
        self.source.len()
    }

    /// The whole archive, if it's memory-resident.  Anything handed out from here is a view into
    /// someone else's memory, not a copy.
    pub fn buffer(&self) -> Option<&[u8]> {
        self.source.bytes()
    }

    /// Fill `buf` from `offset`, or fail with `TruncatedData` if the archive ends first.
    pub fn read_exact_at(&mut self, offset: u64, buf: &mut [u8], whence: &'static str) -> Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.read_exact(buf).map_err(|err| truncation_from_io(err, whence))
    }

    /// A reader over `[offset, offset + size)`, clamped to the end of the archive.
    pub fn range(&mut self, offset: u64, size: u64) -> RangeReader {
        let start = offset.min(self.length());
        let len = size.min(self.length() - start);
        RangeReader {
            inner: self,
            start,
            len,
            pos: 0,
        }
    }

    pub fn into_inner(self) -> InputBuffer {
        self.source
    }
}

impl Read for ContainerReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.source.read_at(self.position, buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for ContainerReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.position = resolve_seek(pos, self.position, self.length())?;
        Ok(self.position)
    }
}

fn resolve_seek(pos: SeekFrom, current: u64, length: u64) -> io::Result<u64> {
    let target = match pos {
        SeekFrom::Start(n) => Some(n),
        SeekFrom::End(delta) => offset_by(length, delta),
        SeekFrom::Current(delta) => offset_by(current, delta),
    };
    target.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seek to a negative position"))
}

fn offset_by(base: u64, delta: i64) -> Option<u64> {
    if delta >= 0 {
        base.checked_add(delta as u64)
    }
    else {
        base.checked_sub(delta.wrapping_neg() as u64)
    }
}


/// A window onto part of the container, with its own zero-based position.
pub struct RangeReader<'a> {
    inner: &'a mut ContainerReader,
    start: u64,
    len: u64,
    pos: u64,
}

impl<'a> RangeReader<'a> {
    pub fn length(&self) -> u64 {
        self.len
    }
}

impl<'a> Read for RangeReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.len {
            return Ok(0);
        }
        let remaining = (self.len - self.pos) as usize;
        let want = buf.len().min(remaining);
        self.inner.seek(SeekFrom::Start(self.start + self.pos))?;
        let n = self.inner.read(&mut buf[..want])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<'a> Seek for RangeReader<'a> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.pos = resolve_seek(pos, self.pos, self.len)?;
        Ok(self.pos)
    }
}


/// Reads one lump's bytes, decompressed if the lump was stored compressed.
pub enum LumpReader<'a> {
    Raw(RangeReader<'a>),
    Decompressed(Cursor<Vec<u8>>),
}

impl<'a> LumpReader<'a> {
    pub fn length(&self) -> u64 {
        match *self {
            LumpReader::Raw(ref range) => range.length(),
            LumpReader::Decompressed(ref cursor) => cursor.get_ref().len() as u64,
        }
    }

    /// Fill all of `buf`, or fail with `TruncatedData`.  Never a partial result.
    pub fn read_exactly(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.read_exact(buf).map_err(|err| truncation_from_io(err, "lump"))?;
        Ok(buf.len())
    }

    /// Everything from the current position to the end of the lump.
    pub fn read_remaining(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl<'a> Read for LumpReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match *self {
            LumpReader::Raw(ref mut range) => range.read(buf),
            LumpReader::Decompressed(ref mut cursor) => cursor.read(buf),
        }
    }
}

impl<'a> Seek for LumpReader<'a> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match *self {
            LumpReader::Raw(ref mut range) => range.seek(pos),
            LumpReader::Decompressed(ref mut cursor) => cursor.seek(pos),
        }
    }
}

/// Read exactly `size` bytes starting at `offset`.
pub fn read_range(reader: &mut ContainerReader, offset: u64, size: usize) -> Result<Vec<u8>> {
    if offset + size as u64 > reader.length() {
        bail!(ErrorKind::TruncatedData("lump"));
    }
    let mut buf = vec![0u8; size];
    reader.read_exact_at(offset, &mut buf, "lump")?;
    Ok(buf)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> ContainerReader {
        ContainerReader::new(InputBuffer::new_from_bytes(bytes.to_vec()))
    }

    #[test]
    fn container_seek_and_read() {
        let mut r = reader(b"abcdefgh");
        assert_eq!(r.length(), 8);
        r.seek(SeekFrom::End(-3)).unwrap();
        let mut buf = [0u8; 3];
        r.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"fgh");
        assert!(r.seek(SeekFrom::Current(-9)).is_err());
    }

    #[test]
    fn range_is_zero_based_and_bounded() {
        let mut r = reader(b"0123456789");
        let mut range = r.range(2, 5);
        assert_eq!(range.length(), 5);
        let mut out = Vec::new();
        range.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"23456");

        range.seek(SeekFrom::Start(3)).unwrap();
        let mut two = [0u8; 2];
        range.read_exact(&mut two).unwrap();
        assert_eq!(&two, b"56");
        assert_eq!(range.read(&mut two).unwrap(), 0);
    }

    #[test]
    fn range_clamps_to_archive() {
        let mut r = reader(b"0123");
        assert_eq!(r.range(2, 100).length(), 2);
        assert_eq!(r.range(100, 1).length(), 0);
    }

    #[test]
    fn short_read_is_truncation() {
        let mut r = reader(b"0123");
        let mut lump = LumpReader::Raw(r.range(1, 3));
        let mut buf = [0u8; 4];
        match lump.read_exactly(&mut buf) {
            Err(::errors::Error(ErrorKind::TruncatedData(_), _)) => {}
            other => panic!("expected truncation, got {:?}", other),
        }

        assert!(read_range(&mut r, 2, 3).is_err());
        assert_eq!(read_range(&mut r, 1, 3).unwrap(), b"123");
    }

    #[test]
    fn decompressed_reader_reports_its_own_length() {
        let mut lump = LumpReader::Decompressed(Cursor::new(b"unpacked".to_vec()));
        assert_eq!(lump.length(), 8);
        lump.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(lump.read_remaining().unwrap(), b"packed");
    }
}
