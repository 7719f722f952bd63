use std::io;

use nom;

error_chain! {
    foreign_links {
        Io(io::Error);
    }

    errors {
        ParseError(whence: &'static str) {
            description("nonspecific parse error")
            display("nonspecific parse error while parsing {}", whence)
        }
        TruncatedData(whence: &'static str) {
            description("unexpected end of input")
            display("unexpected end of input while reading {}", whence)
        }
        InvalidMagic {
            description("invalid magic")
            display("invalid magic")
        }
        BadDirectory(filename: String) {
            description("directory lies outside the file")
            display("{}: bad directory offset", filename)
        }
        UnrecognizedFormat(filename: String) {
            description("unrecognized archive format")
            display("{}: not a recognized archive format", filename)
        }
        LumpIndexOutOfRange(index: usize, count: usize) {
            description("lump index out of range")
            display("lump index {} out of range; archive has {} lumps", index, count)
        }
        BadCompressedData(whence: &'static str) {
            description("corrupt compressed data")
            display("corrupt compressed data in {}", whence)
        }
    }
}

/// Collapse a nom result into ours, forgetting whatever input was left over.
pub fn nom_to_result<I, O>(whence: &'static str, result: nom::IResult<I, O>) -> Result<O> {
    match result {
        Ok((_leftovers, value)) => Ok(value),
        Err(nom::Err::Incomplete(_)) => bail!(ErrorKind::TruncatedData(whence)),
        Err(_) => bail!(ErrorKind::ParseError(whence)),
    }
}

/// Reading past the end of a range is always truncation, never a generic I/O failure.
pub fn truncation_from_io(err: io::Error, whence: &'static str) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        ErrorKind::TruncatedData(whence).into()
    }
    else {
        err.into()
    }
}
