#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Sizing parameters shared by tables and maps.
pub mod config;

/// Bidirectional cursors over a `HashMap`.
///
/// Cursors mirror the begin/end position model: a cursor sits on an occupied
/// slot or on the end sentinel, and can be moved in either direction.
pub mod cursor;

/// Error types returned by fallible operations.
pub mod error;

/// A HashMap implementation using Robin Hood hashing.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a key-value map interface with configurable hashers.
pub mod hash_map;

pub mod hash_table;

pub use config::TableConfig;
pub use cursor::Cursor;
pub use cursor::CursorMut;
pub use error::ConfigError;
pub use error::KeyNotFound;
pub use hash_map::HashMap;
pub use hash_table::HashTable;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when a map is created without one.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when a map is created without one.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder default hasher for builds with neither `foldhash` nor
        /// `std`. It cannot be constructed, so maps must be created with
        /// [`HashMap::with_hasher`].
        pub enum DefaultHashBuilder {}
    }
}
