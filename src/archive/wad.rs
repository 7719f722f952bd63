use md5;

use super::{Archive, check_index};
use super::namespace::{WAD_MARKERS, assign_namespace};
use super::skin::relabel_skins;
use diagnostics::MessageLevel;
use errors::{ErrorKind, Result};
use lump::{LumpFlags, LumpName, LumpRecord};
use open::{OpenContext, Rejected};
use parse::util::Endianness;
use parse::wad::{HEADER_SIZE, BareWADDirectoryEntry, WADType, parse_wad_directory, parse_wad_header};
use reader::{ContainerReader, LumpReader};


/// An opened WAD: the reader it came from, plus its directory with namespaces already assigned.
pub struct WADFile {
    filename: String,
    wadtype: WADType,
    endianness: Endianness,
    reader: ContainerReader,
    lumps: Vec<LumpRecord>,
    fingerprint: String,
}

impl WADFile {
    /// Parse the header and directory, then sort lumps into namespaces.
    ///
    /// On failure the reader is handed back inside `Rejected` so another format can have a go;
    /// the half-built archive is simply dropped.
    pub fn open(filename: &str, reader: ContainerReader, ctx: &mut OpenContext) -> ::std::result::Result<WADFile, Rejected> {
        let mut wad = WADFile {
            filename: filename.to_owned(),
            wadtype: WADType::PWAD,
            endianness: Endianness::Little,
            reader,
            lumps: Vec::new(),
            fingerprint: String::new(),
        };
        match wad.load(ctx) {
            Ok(()) => Ok(wad),
            Err(error) => Err(Rejected { reader: wad.reader, error }),
        }
    }

    fn load(&mut self, ctx: &mut OpenContext) -> Result<()> {
        let wad_size = self.reader.length();
        let mut header_buf = [0u8; HEADER_SIZE];
        self.reader.read_exact_at(0, &mut header_buf, "wad header")?;

        let header = match parse_wad_header(&header_buf, wad_size)? {
            Some(header) => header,
            None => {
                ctx.sink.message(MessageLevel::Error, format_args!("{}: Bad directory offset.", self.filename));
                bail!(ErrorKind::BadDirectory(self.filename.clone()));
            }
        };
        self.wadtype = header.identification;
        self.endianness = header.endianness;

        let mut directory = vec![0u8; header.directory_len()];
        self.reader.read_exact_at(header.infotableofs as u64, &mut directory, "wad directory")?;
        let entries = parse_wad_directory(&directory, &header)?;

        self.lumps = entries.iter()
            .map(|entry| self.make_lump(entry, wad_size, ctx))
            .collect();

        // Before any relabeling, so this only depends on what's in the file
        self.fingerprint = self.compute_fingerprint();

        for pair in WAD_MARKERS.iter() {
            assign_namespace(&self.filename, &mut self.lumps, pair, &mut *ctx.sink);
        }
        relabel_skins(&self.filename, &mut self.lumps, ctx.skins, &mut *ctx.sink);
        Ok(())
    }

    fn make_lump(&self, entry: &BareWADDirectoryEntry, wad_size: u64, ctx: &mut OpenContext) -> LumpRecord {
        let mut raw_name = entry.name;
        let mut flags = LumpFlags::SHORT_NAME;
        if ctx.options.jaguar_compression && raw_name[0] & 0x80 != 0 {
            raw_name[0] &= 0x7f;
            flags |= LumpFlags::COMPRESSED;
        }
        let mut lump = LumpRecord::new(LumpName::from_raw(&raw_name), entry.filepos, entry.size, flags);

        // Compressed lumps are smaller on disk than `size`, so only their start can be checked
        let stored_size = if lump.is_compressed() { 0 } else { entry.size as u64 };
        let negative = (entry.filepos as i32) < 0 || (entry.size as i32) < 0;
        if negative || entry.filepos as u64 + stored_size > wad_size {
            // Zero-sized lumps with junk positions are common (markers); quietly fix those
            if entry.size != 0 {
                ctx.sink.message(MessageLevel::Warning, format_args!(
                    "{}: Lump {} contains invalid positioning info and will be ignored",
                    self.filename, lump.name()));
            }
            lump.neutralize(entry.size != 0);
        }
        lump
    }

    /// MD5 over the archive length and every lump's name and size, as hex.
    fn compute_fingerprint(&self) -> String {
        let mut hashed = Vec::with_capacity(8 + self.lumps.len() * 13);
        hashed.extend_from_slice(&self.reader.length().to_le_bytes());
        for lump in &self.lumps {
            hashed.extend_from_slice(lump.name().as_bytes());
            hashed.push(0);
            hashed.extend_from_slice(&lump.size().to_le_bytes());
        }
        format!("{:x}", md5::compute(&hashed))
    }

    pub fn wadtype(&self) -> WADType {
        self.wadtype
    }

    /// Byte order the header and directory turned out to be in
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }
}

impl Archive for WADFile {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn lumps(&self) -> &[LumpRecord] {
        &self.lumps
    }

    fn lump_reader(&mut self, index: usize) -> Result<LumpReader> {
        check_index(index, self.lumps.len())?;
        self.lumps[index].reader(&mut self.reader)
    }

    fn cache_lump(&mut self, index: usize) -> Result<&[u8]> {
        check_index(index, self.lumps.len())?;
        self.lumps[index].fill_cache(&mut self.reader)?;
        self.lumps[index].filled(&self.reader)
    }

    fn cached_lump(&self, index: usize) -> Option<&[u8]> {
        self.lumps.get(index).and_then(|lump| lump.cached(&self.reader))
    }

    fn release_lump(&mut self, index: usize) -> bool {
        match self.lumps.get_mut(index) {
            Some(lump) => lump.release_cache(),
            None => false,
        }
    }

    fn clear_cache(&mut self) {
        for lump in self.lumps.iter_mut() {
            lump.clear_cache();
        }
    }

    fn read_lump(&mut self, index: usize) -> Result<Vec<u8>> {
        check_index(index, self.lumps.len())?;
        self.lumps[index].read_all(&mut self.reader)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use byteorder::{LittleEndian, WriteBytesExt};

    use archive::skin::SkinNamespaces;
    use diagnostics::CollectingSink;
    use input_buffer::InputBuffer;
    use open::OpenOptions;

    fn tiny_wad() -> Vec<u8> {
        let mut wad = b"PWAD".to_vec();
        wad.write_u32::<LittleEndian>(2).unwrap();
        wad.write_u32::<LittleEndian>(15).unwrap();
        wad.extend_from_slice(b"abc");
        for &(filepos, size, name) in [(12u32, 3u32, b"s_skin\0\0"), (15, 0, b"F_END\0\0\0")].iter() {
            wad.write_u32::<LittleEndian>(filepos).unwrap();
            wad.write_u32::<LittleEndian>(size).unwrap();
            wad.extend_from_slice(name);
        }
        wad
    }

    fn open(bytes: Vec<u8>) -> WADFile {
        let options = OpenOptions::default();
        let mut skins = SkinNamespaces::new();
        let mut sink = CollectingSink::new();
        let mut ctx = OpenContext { options: &options, skins: &mut skins, sink: &mut sink };
        let reader = ContainerReader::new(InputBuffer::new_from_bytes(bytes));
        match WADFile::open("tiny.wad", reader, &mut ctx) {
            Ok(wad) => wad,
            Err(rejected) => panic!("rejected: {}", rejected.error),
        }
    }

    #[test]
    fn fingerprint_layout() {
        let bytes = tiny_wad();
        let length = bytes.len() as u64;
        let wad = open(bytes);

        // length, then each uppercased name, a NUL, and its size
        let mut expected = Vec::new();
        expected.write_u64::<LittleEndian>(length).unwrap();
        expected.extend_from_slice(b"S_SKIN\0");
        expected.write_u32::<LittleEndian>(3).unwrap();
        expected.extend_from_slice(b"F_END\0");
        expected.write_u32::<LittleEndian>(0).unwrap();

        assert_eq!(wad.fingerprint(), format!("{:x}", md5::compute(&expected)));
        // relabeling happened afterwards and didn't matter
        assert_eq!(wad.lumps()[0].namespace(), ::lump::Namespace::Skin(0));
    }
}
