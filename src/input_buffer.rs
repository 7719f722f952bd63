use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use memmap::{Mmap, MmapOptions};

use errors::Result;

/// The bytes behind an archive.
///
/// Archives can live in a buffer someone handed us, in a memory-mapped file, or be read off disk
/// piecemeal.  The first two are memory-resident, which lets lumps point straight into them
/// instead of being copied; see `bytes()`.
pub enum InputBuffer {
    Memory(Vec<u8>),
    File(Mmap),
    Stream(File, u64),
}

impl InputBuffer {
    /// Wraps a buffer that's already in memory, such as a WAD embedded in another archive.
    pub fn new_from_bytes(bytes: Vec<u8>) -> InputBuffer {
        InputBuffer::Memory(bytes)
    }

    /// Creates an `InputBuffer` by consuming all of `reader`
    ///
    /// This will allocate enough memory for the reader's contents.
    pub fn new_from_reader<R: Read>(mut reader: R) -> Result<InputBuffer> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;

        Ok(InputBuffer::Memory(buf))
    }

    /// Creates an `InputBuffer` by memory-mapping a file
    ///
    /// This will map the specified file into read-only memory.  Empty files can't be mapped, so
    /// they become an empty in-memory buffer instead.
    pub fn new_from_file<P>(path: P) -> Result<InputBuffer>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(InputBuffer::Memory(Vec::new()));
        }
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        Ok(InputBuffer::File(mmap))
    }

    /// Opens a file to be read on demand; nothing is held in memory.
    pub fn new_streaming<P>(path: P) -> Result<InputBuffer>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        let length = file.metadata()?.len();

        Ok(InputBuffer::Stream(file, length))
    }

    /// Gets the stored buffer of bytes, if the whole thing is in memory
    pub fn bytes(&self) -> Option<&[u8]> {
        match *self {
            InputBuffer::Memory(ref v) => Some(&*v),
            InputBuffer::File(ref m) => Some(&*m),
            InputBuffer::Stream(..) => None,
        }
    }

    pub fn len(&self) -> u64 {
        match *self {
            InputBuffer::Memory(ref v) => v.len() as u64,
            InputBuffer::File(ref m) => m.len() as u64,
            InputBuffer::Stream(_, length) => length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads from `offset` into `buf`, returning how much was read; short only at the end.
    pub(crate) fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        use std::io::{Seek, SeekFrom};

        match *self {
            InputBuffer::Stream(ref mut file, _) => {
                file.seek(SeekFrom::Start(offset))?;
                let mut total = 0;
                while total < buf.len() {
                    match file.read(&mut buf[total..]) {
                        Ok(0) => break,
                        Ok(n) => total += n,
                        Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => return Err(e),
                    }
                }
                Ok(total)
            }
            InputBuffer::Memory(ref v) => Ok(read_slice_at(v, offset, buf)),
            InputBuffer::File(ref m) => Ok(read_slice_at(m, offset, buf)),
        }
    }
}


fn read_slice_at(bytes: &[u8], offset: u64, buf: &mut [u8]) -> usize {
    if offset >= bytes.len() as u64 {
        return 0;
    }
    let available = &bytes[offset as usize..];
    let n = available.len().min(buf.len());
    buf[..n].copy_from_slice(&available[..n]);
    n
}
