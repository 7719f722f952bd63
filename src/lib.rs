//! Lump-level access to Doom WADs.
//!
//! Open an archive through an `Opener`, which sniffs the format, parses the directory (in
//! whichever byte order it turns out to be), sorts lumps into namespaces by their marker lumps,
//! and deals with skins.  After that, lumps can be looked up by index, name, or namespace, and
//! read either as a stream or through a lazily-filled cache.
//!
//! Damaged archives are opened anyway wherever possible.  Problems are reported to a
//! `MessageSink` rather than printed.
#[macro_use]
extern crate bitflags;
extern crate byteorder;
#[macro_use]
extern crate error_chain;
#[macro_use(log)]
extern crate log;
extern crate md5;
extern crate memmap;
#[macro_use]
extern crate nom;

#[cfg(test)]
extern crate tempfile;

pub mod archive;
pub mod diagnostics;
pub mod errors;
pub mod input_buffer;
pub mod lump;
pub mod lzss;
pub mod open;
pub mod parse;
pub mod reader;

pub use archive::Archive;
pub use archive::namespace::{MarkerPair, WAD_MARKERS};
pub use archive::skin::SkinNamespaces;
pub use archive::wad::WADFile;
pub use diagnostics::{CollectingSink, LogSink, MessageLevel, MessageSink, NullSink};
pub use errors::{Error, ErrorKind, Result};
pub use input_buffer::InputBuffer;
pub use lump::{CacheOwnership, LumpFlags, LumpName, LumpRecord, Namespace};
pub use open::{LoadMode, OpenOptions, Opener};
pub use parse::wad::WADType;
pub use reader::{ContainerReader, LumpReader};

use std::path::Path;


/// Open a single archive with default options, sending diagnostics to the `log` crate.
pub fn open_archive<P: AsRef<Path>>(path: P) -> Result<Box<dyn Archive>> {
    Opener::new(LogSink).open_path(path)
}
