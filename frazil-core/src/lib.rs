//! # Frazil Core
//!
//! Shared plumbing for the frazil decompression library:
//!
//! - [`error`]: the common error type
//! - [`source`]: buffered byte source over any [`std::io::Read`]
//! - [`xxhash`]: incremental XXH64 for frame checksums
//!
//! Codec crates build on these pieces; this crate knows nothing about any
//! particular wire format.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod source;
pub mod xxhash;

// Re-exports for convenience
pub use error::{FrazilError, Result};
pub use source::ByteSource;
pub use xxhash::{xxhash64, Xxh64};
