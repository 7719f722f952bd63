use byteorder::{BigEndian, ByteOrder, LittleEndian};
use nom::{self, IResult};


/// Byte order of an on-disk structure.  WADs don't say which they are, so this is decided by
/// whichever reading makes sense.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Decode a u32 from the first four bytes of `buf`.  Panics if there are fewer than four.
    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endianness::Little => LittleEndian::read_u32(buf),
            Endianness::Big => BigEndian::read_u32(buf),
        }
    }
}


/// Succeeds only at the very end of the input.
pub fn naive_eof(input: &[u8]) -> IResult<&[u8], ()> {
    if input.is_empty() {
        Ok((input, ()))
    }
    else {
        Err(nom::Err::Error(nom::Context::Code(input, nom::ErrorKind::Eof)))
    }
}
