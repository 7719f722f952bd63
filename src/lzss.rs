//! The LZSS variant used by console ports of Doom to squeeze lumps.
//!
//! A flag byte precedes each group of eight items, least significant bit first.  A clear bit is
//! one literal byte.  A set bit is a 16-bit back-reference: the top 12 bits are the distance back
//! (minus one) into what's already been output, the bottom 4 are the length (minus one).  A
//! distance of zero ends the stream.
use std::io::{BufReader, Read};

use byteorder::ReadBytesExt;

use errors::{ErrorKind, Result, truncation_from_io};


/// Most that's reserved up front; `size` comes straight from the directory and can't be trusted.
const MAX_PREALLOCATION: usize = 64 * 1024;

/// Decompress exactly `size` bytes from `input`.
///
/// Running out of input, or hitting the end marker, before `size` bytes have been produced is
/// `TruncatedData`; a back-reference pointing before the start of the output is
/// `BadCompressedData`.  Anything past `size` is ignored.
pub fn decompress<R: Read>(input: R, size: usize) -> Result<Vec<u8>> {
    let mut input = BufReader::new(input);
    let mut out = Vec::with_capacity(size.min(MAX_PREALLOCATION));
    let mut flags = 0u8;
    let mut items_left = 0;

    while out.len() < size {
        if items_left == 0 {
            flags = next_byte(&mut input)?;
            items_left = 8;
        }
        items_left -= 1;

        if flags & 1 != 0 {
            let hi = next_byte(&mut input)? as usize;
            let lo = next_byte(&mut input)? as usize;
            let distance = (hi << 4) | (lo >> 4);
            if distance == 0 {
                break;
            }
            let len = (lo & 0x0f) + 1;
            if distance + 1 > out.len() {
                bail!(ErrorKind::BadCompressedData("LZSS back-reference"));
            }
            let source = out.len() - distance - 1;
            // may overlap what's being written; copy byte by byte
            for i in 0..len {
                if out.len() >= size {
                    break;
                }
                let byte = out[source + i];
                out.push(byte);
            }
        }
        else {
            out.push(next_byte(&mut input)?);
        }
        flags >>= 1;
    }

    if out.len() < size {
        bail!(ErrorKind::TruncatedData("LZSS lump"));
    }
    Ok(out)
}

fn next_byte<R: Read>(input: &mut R) -> Result<u8> {
    input.read_u8().map_err(|err| truncation_from_io(err, "LZSS lump"))
}
