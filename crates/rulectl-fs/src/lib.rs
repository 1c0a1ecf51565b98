//! Filesystem primitives for rulectl
//!
//! Provides normalized path handling, crash-safe record I/O, canonical
//! checksums and the advisory locks that serialize concurrent invocations
//! sharing one state directory.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use checksum::{compute_content_checksum, compute_json_checksum};
pub use config::{ConfigStore, Format};
pub use error::{Error, Result};
pub use lock::{FileLock, LockMode};
pub use path::NormalizedPath;
