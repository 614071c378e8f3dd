//! Shared infrastructure utilities for gridsig.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename), used for
//!   the flag file

pub mod atomic_write;

pub use atomic_write::{AtomicWriteOptions, FileSyncPolicy, PersistMode, atomic_write_with_options};
