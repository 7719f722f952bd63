pub mod namespace;
pub mod skin;
pub mod wad;

use std::iter::Enumerate;
use std::slice;

use errors::{ErrorKind, Result};
use lump::{LumpRecord, Namespace};
use reader::LumpReader;


/// An opened archive: a fixed, ordered table of lumps plus the means to read them.
///
/// Lumps are addressed by index, which is their position in the archive's directory and never
/// changes.  Names are not unique; when several lumps share a name, Doom's rule is that the last
/// one wins, which is what `find_last_lump` does.
pub trait Archive {
    fn filename(&self) -> &str;

    /// Content-derived identity: the same bytes give the same fingerprint under any filename.
    fn fingerprint(&self) -> &str;

    fn lumps(&self) -> &[LumpRecord];

    /// A reader over one lump's bytes, decompressing if necessary.
    fn lump_reader(&mut self, index: usize) -> Result<LumpReader>;

    /// Load a lump into its cache (if it isn't already) and take a reference to it.  Pair with
    /// `release_lump`.
    fn cache_lump(&mut self, index: usize) -> Result<&[u8]>;

    /// The lump's cached bytes, if `cache_lump` has been called for it.
    fn cached_lump(&self, index: usize) -> Option<&[u8]>;

    /// Give back a reference from `cache_lump`.  Returns true if the cache was freed.
    fn release_lump(&mut self, index: usize) -> bool;

    /// Free every cached lump, outstanding references or not.
    fn clear_cache(&mut self);

    /// Read a whole lump into a new buffer without touching the cache.
    fn read_lump(&mut self, index: usize) -> Result<Vec<u8>>;

    fn lump_count(&self) -> usize {
        self.lumps().len()
    }

    fn lump(&self, index: usize) -> Option<&LumpRecord> {
        self.lumps().get(index)
    }

    /// Index of the first lump with this name, in any namespace.
    fn find_lump(&self, name: &str) -> Option<usize> {
        self.lumps().iter().position(|lump| lump.name().matches(name))
    }

    /// Index of the last lump with this name, in any namespace.
    fn find_last_lump(&self, name: &str) -> Option<usize> {
        self.lumps().iter().rposition(|lump| lump.name().matches(name))
    }

    /// Index of the last lump with this name in the given namespace.
    fn find_lump_in(&self, name: &str, namespace: Namespace) -> Option<usize> {
        self.lumps().iter().rposition(|lump| lump.namespace() == namespace && lump.name().matches(name))
    }

    fn lumps_in(&self, namespace: Namespace) -> LumpsInNamespace {
        LumpsInNamespace {
            entry_iter: self.lumps().iter().enumerate(),
            namespace,
        }
    }

    /// Iterate over the lumps strictly between each `begin_marker` and the following
    /// `end_marker`, going purely by name.
    fn lumps_between<'a>(&'a self, begin_marker: &'a str, end_marker: &'a str) -> LumpsBetween<'a> {
        LumpsBetween {
            entry_iter: self.lumps().iter().enumerate(),
            begin_marker,
            end_marker,
            between_markers: false,
        }
    }
}

pub(crate) fn check_index(index: usize, count: usize) -> Result<()> {
    if index >= count {
        bail!(ErrorKind::LumpIndexOutOfRange(index, count));
    }
    Ok(())
}


pub struct LumpsInNamespace<'a> {
    entry_iter: Enumerate<slice::Iter<'a, LumpRecord>>,
    namespace: Namespace,
}

impl<'a> Iterator for LumpsInNamespace<'a> {
    type Item = (usize, &'a LumpRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let namespace = self.namespace;
        self.entry_iter.by_ref().find(|&(_, lump)| lump.namespace() == namespace)
    }
}

pub struct LumpsBetween<'a> {
    entry_iter: Enumerate<slice::Iter<'a, LumpRecord>>,
    begin_marker: &'a str,
    end_marker: &'a str,
    between_markers: bool,
}

impl<'a> Iterator for LumpsBetween<'a> {
    type Item = (usize, &'a LumpRecord);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (i, lump) = self.entry_iter.next()?;

            if self.between_markers && lump.name().matches(self.end_marker) {
                self.between_markers = false;
            }
            else if ! self.between_markers && lump.name().matches(self.begin_marker) {
                self.between_markers = true;
            }
            else if self.between_markers {
                return Some((i, lump));
            }
        }
    }
}
