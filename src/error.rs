use thiserror::Error;

/// Errors surfaced by the DCE/RPC client core.
///
/// Three kinds, matching the three ways a call can fail: a hard resource
/// bound was hit, the peer (or our own decode) violated the wire protocol,
/// or the transport underneath us reported a non-success status.
#[derive(Error, Debug)]
pub enum Error {
    #[error("deferred pointer queue exceeded its {0}-entry bound")]
    DeferredQueueFull(usize),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("transport failure: status {0:#x}")]
    Transport(i32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    BinRw(#[from] binrw::Error),
}

impl Error {
    /// Translates this error to a negative POSIX-style errno, for callers
    /// embedding this client in code that branches on that convention
    /// rather than matching on [`Error`] directly.
    pub fn to_errno(&self) -> i32 {
        match self {
            Error::DeferredQueueFull(_) => -libc_enomem(),
            Error::Protocol(_) => -libc_einval(),
            Error::Transport(status) => -*status,
            Error::Io(_) => -libc_einval(),
            Error::BinRw(_) => -libc_einval(),
        }
    }
}

// Avoids pulling in the `libc` crate for two constants; these values are
// fixed by POSIX on every platform this crate targets.
const fn libc_enomem() -> i32 {
    12
}
const fn libc_einval() -> i32 {
    22
}

pub type Result<T> = std::result::Result<T, Error>;
