//! Figuring out what kind of archive something is, and opening it.
use std::path::Path;

use archive::Archive;
use archive::skin::SkinNamespaces;
use archive::wad::WADFile;
use diagnostics::MessageSink;
use errors::{Error, ErrorKind, Result};
use input_buffer::InputBuffer;
use reader::ContainerReader;


/// How an archive on disk gets into memory, if at all.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadMode {
    /// Memory-map the file.  Lumps can be served without copying.
    Map,
    /// Read the whole file into memory up front.
    Read,
    /// Keep the file open and read lumps from it as they're asked for.
    Stream,
}

#[derive(Clone, Debug)]
pub struct OpenOptions {
    pub load_mode: LoadMode,
    /// Treat lumps whose name has the high bit of its first byte set as LZSS-compressed, as in
    /// console ports.  Ordinary PWADs can have junk there, so this is off unless asked for.
    pub jaguar_compression: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            load_mode: LoadMode::Map,
            jaguar_compression: false,
        }
    }
}

impl OpenOptions {
    pub fn load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }

    pub fn jaguar_compression(mut self, enabled: bool) -> Self {
        self.jaguar_compression = enabled;
        self
    }
}


/// Everything a format parser gets to use while opening one archive.
pub struct OpenContext<'a> {
    pub options: &'a OpenOptions,
    pub skins: &'a mut SkinNamespaces,
    pub sink: &'a mut dyn MessageSink,
}

/// A parser declined the input.  The reader comes back so the next format can try it.
pub struct Rejected {
    pub reader: ContainerReader,
    pub error: Error,
}

impl From<Rejected> for Error {
    fn from(rejected: Rejected) -> Error {
        rejected.error
    }
}

type OpenFn = fn(&str, ContainerReader, &mut OpenContext) -> ::std::result::Result<Box<dyn Archive>, Rejected>;

struct ArchiveFormat {
    /// Exact, case-sensitive four-byte signatures
    magics: &'static [&'static [u8; 4]],
    /// Anything shorter can't possibly be one of these
    min_length: u64,
    open: OpenFn,
}

fn open_wad(filename: &str, reader: ContainerReader, ctx: &mut OpenContext) -> ::std::result::Result<Box<dyn Archive>, Rejected> {
    let wad: Box<dyn Archive> = Box::new(WADFile::open(filename, reader, ctx)?);
    Ok(wad)
}

static FORMATS: &[ArchiveFormat] = &[
    ArchiveFormat {
        magics: &[b"IWAD", b"PWAD"],
        min_length: 12,
        open: open_wad,
    },
];


/// Opens archives.
///
/// Holds what has to persist from one archive to the next (the skin namespace counter) along with
/// options and the sink diagnostics go to.  Open everything that will be used together through the
/// same `Opener`.
pub struct Opener<S: MessageSink> {
    options: OpenOptions,
    skins: SkinNamespaces,
    sink: S,
}

impl<S: MessageSink> Opener<S> {
    pub fn new(sink: S) -> Opener<S> {
        Opener::with_options(OpenOptions::default(), sink)
    }

    pub fn with_options(options: OpenOptions, sink: S) -> Opener<S> {
        Opener {
            options,
            skins: SkinNamespaces::new(),
            sink,
        }
    }

    pub fn options(&self) -> &OpenOptions {
        &self.options
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Open a file on disk, loaded according to the options' `load_mode`.
    pub fn open_path<P: AsRef<Path>>(&mut self, path: P) -> Result<Box<dyn Archive>> {
        let path = path.as_ref();
        let source = match self.options.load_mode {
            LoadMode::Map => InputBuffer::new_from_file(path)?,
            LoadMode::Read => InputBuffer::new_from_reader(::std::fs::File::open(path)?)?,
            LoadMode::Stream => InputBuffer::new_streaming(path)?,
        };
        self.open_buffer(&path.to_string_lossy(), source)
    }

    /// Open an archive that's already in memory, e.g. one nested inside another.
    pub fn open_bytes(&mut self, filename: &str, bytes: Vec<u8>) -> Result<Box<dyn Archive>> {
        self.open_buffer(filename, InputBuffer::new_from_bytes(bytes))
    }

    /// Sniff the first four bytes and hand off to whichever format claims them.
    pub fn open_buffer(&mut self, filename: &str, source: InputBuffer) -> Result<Box<dyn Archive>> {
        let mut reader = ContainerReader::new(source);
        let length = reader.length();
        if length < 4 {
            bail!(ErrorKind::UnrecognizedFormat(filename.to_owned()));
        }
        let mut signature = [0u8; 4];
        reader.read_exact_at(0, &mut signature, "archive signature")?;

        let mut ctx = OpenContext {
            options: &self.options,
            skins: &mut self.skins,
            sink: &mut self.sink,
        };
        let mut last_error = None;
        for format in FORMATS.iter() {
            if length < format.min_length || !format.magics.iter().any(|magic| **magic == signature) {
                continue;
            }
            match (format.open)(filename, reader, &mut ctx) {
                Ok(archive) => return Ok(archive),
                Err(rejected) => {
                    reader = rejected.reader;
                    last_error = Some(rejected.error);
                }
            }
        }

        match last_error {
            Some(error) => Err(error),
            None => bail!(ErrorKind::UnrecognizedFormat(filename.to_owned())),
        }
    }
}
