#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod control;

mod error;

/// The swiss table itself.
///
/// This module provides [`SwissTable`], which maps byte-string keys to `i64`
/// values using group-probed open addressing.
pub mod hash_table;

pub mod hasher;

pub mod probe;

pub use error::Error;
pub use hash_table::Iter;
pub use hash_table::SwissTable;
#[cfg(feature = "foldhash")]
pub use hasher::FoldKeyHasher;
pub use hasher::DefaultKeyHasher;
pub use hasher::KeyHasher;
pub use hasher::SipKeyHasher;
pub use probe::LinearProbe;
pub use probe::ProbePolicy;
pub use probe::TriangularProbe;
