//! Purpose: Public Rust API for fetching JSON from the GitHub repos API.
//! Exports: Configuration, transport seam, request executor, and errors.
//! Role: The only public path for binaries and tests; internals stay private.
//! Invariants: Library code never prints or exits; callers own the process.

mod config;
mod executor;
mod transport;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use config::{
    API_ROOT_ENV, ApiConfig, DEFAULT_API_ROOT, DEFAULT_ORG, FALLBACK_TOKEN_ENV, ORG_ENV,
    TOKEN_ENV, parse_duration,
};
pub use executor::{CONNECTIVITY_MESSAGE, RequestDescriptor, RequestExecutor};
pub use transport::{Body, HttpResponse, Transport, UreqTransport};
