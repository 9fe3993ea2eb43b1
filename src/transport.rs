//! The pipe transport collaborator (SPEC_FULL.md §6): everything below
//! "bytes in, bytes out" over an already-established SMB2 named pipe is
//! out of scope (SPEC_FULL.md Non-goals) and lives behind this trait.
//!
//! Mirrors the `async`/`sync` duality pattern a transport-facing trait
//! uses elsewhere in this crate's lineage: `#[maybe_async]` compiles the
//! same trait body to either an `async fn` (default, `tokio`-backed) or a
//! blocking `fn`, selected by the `async`/`sync` Cargo features.

use crate::error::Result;
use maybe_async::maybe_async;

/// An opaque file-id handed back by [`PipeTransport::open`] and stored on
/// [`crate::client::Context`] (SPEC_FULL.md §3/§4.H item 1). The transport
/// implementation owns the meaning of the value; this crate only carries it
/// between `open` and whatever later operations would need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u64);

/// Opens a named pipe and transceives requests against it.
///
/// `transceive` models the SMB2 FSCTL_PIPE_TRANSCEIVE semantics this
/// client relies on: it writes `request` and returns whatever the pipe
/// had ready to read in response, which may be one or more concatenated
/// RESPONSE fragments (see [`crate::reassembly::unfragment`]).
#[maybe_async(AFIT)]
#[allow(async_fn_in_trait)]
pub trait PipeTransport {
    /// Opens `path` on the already-connected SMB2 session, returning the
    /// file-id through which calls are transceived.
    async fn open(&self, path: &str) -> Result<FileId>;

    /// Sends `request` and returns the raw bytes of the reply, including
    /// every PDU header present (the caller decodes and reassembles).
    async fn transceive(&self, request: &[u8]) -> Result<Vec<u8>>;
}
