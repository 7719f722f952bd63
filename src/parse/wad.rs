use nom::{be_u32, le_u32};

use super::util::Endianness;
use ::errors::{ErrorKind, Result, nom_to_result};


pub const HEADER_SIZE: usize = 12;
/// filepos, size, and an eight-byte name
pub const DIRECTORY_ENTRY_SIZE: usize = 16;


/// Type of the WAD.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WADType {
    /// full standalone game
    IWAD,
    /// patch wad, a small mod
    PWAD,
}

#[derive(Copy, Clone, Debug)]
pub struct BareWADHeader {
    pub identification: WADType,
    pub numlumps: u32,
    pub infotableofs: u32,
    /// Whichever byte order produced a directory that fits in the file
    pub endianness: Endianness,
}

impl BareWADHeader {
    /// Whether the whole directory lies within a file of the given length.  Done in u64 so a
    /// hostile header can't wrap around.
    pub fn directory_fits(&self, file_length: u64) -> bool {
        let table_end = self.infotableofs as u64 + self.numlumps as u64 * DIRECTORY_ENTRY_SIZE as u64;
        table_end <= file_length
    }

    pub fn directory_len(&self) -> usize {
        self.numlumps as usize * DIRECTORY_ENTRY_SIZE
    }
}

#[derive(Clone, Debug)]
pub struct BareWADDirectoryEntry {
    pub filepos: u32,
    pub size: u32,
    /// Exactly as stored; not necessarily NUL-terminated or even ASCII
    pub name: [u8; 8],
}


named!(iwad_tag<WADType>, value!(WADType::IWAD, tag!(b"IWAD")));
named!(pwad_tag<WADType>, value!(WADType::PWAD, tag!(b"PWAD")));
named!(pub wad_magic<WADType>, alt!(iwad_tag | pwad_tag));

named!(le_wad_header<BareWADHeader>, do_parse!(
    identification: wad_magic >>
    numlumps: le_u32 >>
    infotableofs: le_u32 >>
    (BareWADHeader{ identification, numlumps, infotableofs, endianness: Endianness::Little })
));

named!(be_wad_header<BareWADHeader>, do_parse!(
    identification: wad_magic >>
    numlumps: be_u32 >>
    infotableofs: be_u32 >>
    (BareWADHeader{ identification, numlumps, infotableofs, endianness: Endianness::Big })
));


/// Parse the 12-byte header of a WAD that is `file_length` bytes long.
///
/// Little-endian is assumed until proven otherwise: if the directory doesn't fit in the file, the
/// whole header is read again as big-endian.  Returns `Ok(None)` if neither reading fits, which
/// means the directory offset is garbage.  A header with the wrong magic is `InvalidMagic`.
pub fn parse_wad_header(buf: &[u8], file_length: u64) -> Result<Option<BareWADHeader>> {
    if buf.len() < HEADER_SIZE {
        bail!(ErrorKind::TruncatedData("wad header"));
    }
    if wad_magic(buf).is_err() {
        bail!(ErrorKind::InvalidMagic);
    }

    let header = nom_to_result("wad header", le_wad_header(buf))?;
    if header.directory_fits(file_length) {
        return Ok(Some(header));
    }

    let header = nom_to_result("wad header", be_wad_header(buf))?;
    if header.directory_fits(file_length) {
        return Ok(Some(header));
    }

    Ok(None)
}

/// Split a raw directory table into entries, using the byte order the header settled on.
pub fn parse_wad_directory(buf: &[u8], header: &BareWADHeader) -> Result<Vec<BareWADDirectoryEntry>> {
    let lumpct = header.numlumps as usize;
    if buf.len() < header.directory_len() {
        bail!(ErrorKind::TruncatedData("wad directory"));
    }

    let endianness = header.endianness;
    let entries = buf.chunks(DIRECTORY_ENTRY_SIZE)
        .take(lumpct)
        .map(|raw| {
            let mut name = [0u8; 8];
            name.copy_from_slice(&raw[8..16]);
            BareWADDirectoryEntry {
                filepos: endianness.read_u32(&raw[0..4]),
                size: endianness.read_u32(&raw[4..8]),
                name,
            }
        })
        .collect();
    Ok(entries)
}
