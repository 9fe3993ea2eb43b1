#[cfg(not(any(
    feature = "async",
    feature = "single_threaded",
    feature = "multi_threaded"
)))]
compile_error!(
    "You must enable exactly one of the following features: async, single_threaded, multi_threaded"
);
#[cfg(any(
    all(feature = "async", feature = "single_threaded"),
    all(feature = "async", feature = "multi_threaded"),
    all(feature = "single_threaded", feature = "multi_threaded")
))]
compile_error!(
    "You must enable exactly one of the following features: async, single_threaded, multi_threaded"
);

pub mod client;
pub mod error;
pub mod ndr;
pub mod pdu;
pub mod reassembly;
pub mod syntax;
pub mod transport;
pub mod wire;

pub use client::{Client, ClientConfig, Context};
pub use error::Error;
pub use transport::{FileId, PipeTransport};

pub type Result<T> = std::result::Result<T, crate::Error>;
