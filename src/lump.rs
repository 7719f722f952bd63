//! Individual entries in an archive, and what's cached for them.
use std::fmt;
use std::ops::Range;

use errors::{ErrorKind, Result};
use lzss;
use reader::{self, ContainerReader, LumpReader};


/// An eight-byte lump name, uppercased on the way in.  Shorter names are NUL-padded; anything
/// after the first NUL is ignored for comparison, as Doom does.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct LumpName([u8; 8]);

impl LumpName {
    /// Build a name from raw directory bytes.  Only ASCII letters change case; control characters
    /// and high bytes are kept verbatim.  Input past eight bytes is dropped.
    pub fn from_raw(raw: &[u8]) -> LumpName {
        let mut name = [0u8; 8];
        for (dest, &src) in name.iter_mut().zip(raw.iter()) {
            *dest = src.to_ascii_uppercase();
        }
        LumpName(name)
    }

    pub fn new(name: &str) -> LumpName {
        LumpName::from_raw(name.as_bytes())
    }

    /// The significant part of the name: everything before the first NUL.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(8);
        &self.0[..len]
    }

    pub fn raw(&self) -> &[u8; 8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    pub fn clear(&mut self) {
        self.0 = [0; 8];
    }

    /// Case-insensitive comparison against a plain string.
    pub fn matches(&self, name: &str) -> bool {
        self.as_bytes().eq_ignore_ascii_case(name.as_bytes())
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        let bytes = self.as_bytes();
        bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    }
}

impl fmt::Display for LumpName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for LumpName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LumpName({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}


bitflags! {
    pub struct LumpFlags: u32 {
        /// 4096 bytes and found before a stray F_END; might be a flat, might not
        const MAYBE_FLAT = 0x01;
        /// Name is limited to eight characters (every WAD lump)
        const SHORT_NAME = 0x02;
        /// Stored LZSS-compressed; `size` is the decompressed size
        const COMPRESSED = 0x04;
    }
}


/// Coarse semantic grouping of lumps, decided by marker lumps (or skins) when an archive is
/// opened.  Consumers use it to scope lookups: a sprite named TROOA1 and a flat named TROOA1 are
/// different things.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    Global,
    Sprites,
    Flats,
    Colormaps,
    /// compiled ACS libraries, between A_START and A_END
    AcsLibrary,
    NewTextures,
    /// Strife voice lumps
    Voices,
    HiRes,
    Voxels,
    /// Everything in a wad containing an S_SKIN lump.  Each skin wad gets its own.
    Skin(u32),
}

impl Namespace {
    pub fn is_global(self) -> bool {
        self == Namespace::Global
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Namespace::Global
    }
}


/// What's cached for a lump.
#[derive(Debug)]
pub enum LumpCache {
    Empty,
    /// Our own copy, with a count of outstanding users.  Freed when the count hits zero.
    Owned { data: Vec<u8>, refs: u32 },
    /// A range of the container's own in-memory buffer.  Nothing to free.
    Borrowed(Range<usize>),
}

/// Who owns a lump's cached bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CacheOwnership {
    Owned,
    Borrowed,
}


/// One directory entry.  Always owned by the archive it came from; the bytes are only reachable
/// through that archive's reader.
#[derive(Debug)]
pub struct LumpRecord {
    name: LumpName,
    position: u32,
    size: u32,
    namespace: Namespace,
    flags: LumpFlags,
    cache: LumpCache,
}

impl LumpRecord {
    pub fn new(name: LumpName, position: u32, size: u32, flags: LumpFlags) -> LumpRecord {
        LumpRecord {
            name,
            position,
            size,
            namespace: Namespace::Global,
            flags,
            cache: LumpCache::Empty,
        }
    }

    pub fn name(&self) -> &LumpName {
        &self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Offset of the lump's data within the container
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn flags(&self) -> LumpFlags {
        self.flags
    }

    pub fn is_compressed(&self) -> bool {
        self.flags.contains(LumpFlags::COMPRESSED)
    }

    pub fn cache(&self) -> &LumpCache {
        &self.cache
    }

    pub(crate) fn rename(&mut self, name: LumpName) {
        self.name = name;
    }

    pub(crate) fn set_namespace(&mut self, namespace: Namespace) {
        self.namespace = namespace;
    }

    pub(crate) fn add_flags(&mut self, flags: LumpFlags) {
        self.flags.insert(flags);
    }

    /// Wipe out a lump whose directory entry can't be trusted.  It stays in the directory so the
    /// indices of everything after it don't shift.
    pub(crate) fn neutralize(&mut self, clear_name: bool) {
        if clear_name {
            self.name.clear();
        }
        self.position = 0;
        self.size = 0;
        self.cache = LumpCache::Empty;
    }

    /// A reader positioned at the start of this lump's (decompressed) bytes.
    pub fn reader<'r>(&self, container: &'r mut ContainerReader) -> Result<LumpReader<'r>> {
        if self.is_compressed() {
            let data = self.decompress(container)?;
            return Ok(LumpReader::Decompressed(::std::io::Cursor::new(data)));
        }
        Ok(LumpReader::Raw(container.range(self.position as u64, self.size as u64)))
    }

    /// Read the whole lump into a fresh buffer, bypassing the cache.
    pub fn read_all(&self, container: &mut ContainerReader) -> Result<Vec<u8>> {
        if self.is_compressed() {
            return self.decompress(container);
        }
        reader::read_range(container, self.position as u64, self.size as usize)
    }

    fn decompress(&self, container: &mut ContainerReader) -> Result<Vec<u8>> {
        let remaining = container.length().saturating_sub(self.position as u64);
        let packed = container.range(self.position as u64, remaining);
        lzss::decompress(packed, self.size as usize)
    }

    /// Make sure the cache is populated and take a reference to it.
    ///
    /// Uncompressed lumps in a memory-resident container just borrow the container's memory, and
    /// borrowed caches aren't counted.  Otherwise the bytes are read (or decompressed) once, and
    /// every further call only bumps the count.
    pub fn fill_cache(&mut self, container: &mut ContainerReader) -> Result<CacheOwnership> {
        match self.cache {
            LumpCache::Owned { ref mut refs, .. } => {
                *refs += 1;
                return Ok(CacheOwnership::Owned);
            }
            LumpCache::Borrowed(_) => return Ok(CacheOwnership::Borrowed),
            LumpCache::Empty => {}
        }

        if !self.is_compressed() && container.buffer().is_some() {
            let start = self.position as usize;
            self.cache = LumpCache::Borrowed(start..start + self.size as usize);
            return Ok(CacheOwnership::Borrowed);
        }

        let data = self.read_all(container)?;
        self.cache = LumpCache::Owned { data, refs: 1 };
        Ok(CacheOwnership::Owned)
    }

    /// The cached bytes, if any.  `container` must be the one this lump came from.
    pub fn cached<'a>(&'a self, container: &'a ContainerReader) -> Option<&'a [u8]> {
        match self.cache {
            LumpCache::Empty => None,
            LumpCache::Owned { ref data, .. } => Some(&data[..]),
            LumpCache::Borrowed(ref range) => container.buffer().and_then(|buf| buf.get(range.clone())),
        }
    }

    /// Give back one reference taken by `fill_cache`.  Returns true if the cache was freed.
    pub fn release_cache(&mut self) -> bool {
        let freed = match self.cache {
            LumpCache::Owned { ref mut refs, .. } => {
                *refs = refs.saturating_sub(1);
                *refs == 0
            }
            _ => false,
        };
        if freed {
            self.cache = LumpCache::Empty;
        }
        freed
    }

    /// Drop the cache regardless of outstanding references.
    pub fn clear_cache(&mut self) {
        self.cache = LumpCache::Empty;
    }

    /// Like `cached`, but for use right after `fill_cache`, when missing data means the container
    /// changed under us.
    pub(crate) fn filled<'a>(&'a self, container: &'a ContainerReader) -> Result<&'a [u8]> {
        match self.cached(container) {
            Some(data) => Ok(data),
            None => bail!(ErrorKind::TruncatedData("lump cache")),
        }
    }
}
