//! # Eve IO
//!
//! I/O and persistence layer for eve simulations.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - JSON helpers with validation
//! - The SQLite frame log that records one system frame per tick
//! - rkyv frame archives for offline inspection

/// Error types and result aliases for I/O operations
pub mod error;
/// rkyv archives of recorded frames
pub mod persistence;
/// Validated JSON serialization helpers
pub mod serialization;
/// SQLite frame log driven by a background thread
pub mod storage;

pub use error::{IoError, Result};
pub use persistence::{load_rkyv, save_rkyv, FrameArchive};
pub use serialization::{from_json, read_json_file, to_json, to_json_pretty, write_json_file};
pub use storage::{StorageManager, StoredFrame};
