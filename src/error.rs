use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown CA system: {0}")]
    UnknownCaSystem(String),

    #[error("payload of {0} bytes does not fit a camd35 frame")]
    PayloadTooLarge(usize),

    #[error("cannot write capture file {}: {source}", path.display())]
    Capture {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("transport failure: {0}")]
    Transport(#[source] io::Error),

    #[error("response too short: {0} bytes")]
    ResponseTooShort(usize),

    #[error("not a valid CW response (status 0x{0:02x})")]
    InvalidStatus(u8),

    #[error("CW length mismatch (0x{0:02x} < 0x10)")]
    InvalidCwLength(u8),

    #[error("malformed section: {0}")]
    MalformedSection(&'static str),
}

impl Error {
    /// Resource errors end the run; everything else only fails one signalling unit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Capture { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
