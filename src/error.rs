//! Error taxonomy for the editor (spec §7).

use std::io;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Raw mode was requested on a file descriptor that is not a TTY.
    #[error("input fd is not a terminal")]
    NotATerminal,

    /// CTRL-C was pressed during editing.
    #[error("interrupted")]
    Interrupted,

    /// CTRL-D was pressed on an empty buffer, or a read returned 0 bytes.
    #[error("end of file")]
    EndOfFile,

    /// A read or write on the TTY failed mid-edit.
    #[error("terminal i/o error: {0}")]
    Io(#[from] io::Error),

    /// A history load or save operation failed.
    #[error("history i/o error: {0}")]
    HistoryIo(io::Error),

    /// An invalid argument was supplied (e.g. `max_len < 1`).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl From<nix::Error> for Error {
    fn from(e: nix::Error) -> Self {
        Error::Io(io::Error::from(e))
    }
}
