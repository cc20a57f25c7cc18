//! # ringflake
//!
//! Cached Snowflake-style ID generation.
//!
//! A [`LockSnowflakeAllocator`] packs `(timestamp, datacenter, worker,
//! sequence)` into 64-bit [`RingflakeId`]s. A single padding thread feeds those
//! IDs into a fixed-capacity [`RingBuffer`], and any number of threads take
//! them back out without touching the allocator's lock.
//!
//! ```text
//!  allocator --put--> [ ring buffer slots ] --take--> callers
//!      ^                                        |
//!      +------- padding signal (low watermark) -+
//! ```
//!
//! ## Example
//!
//! ```
//! use ringflake::{CachedConfig, CachedGenerator, LockSnowflakeAllocator, RingflakeId, SystemClock};
//!
//! let allocator = LockSnowflakeAllocator::<RingflakeId, _>::new(1, 1, SystemClock::default())?;
//! let generator = CachedGenerator::new(allocator, CachedConfig::default())?;
//!
//! let a = generator.next_id()?;
//! let b = generator.next_id()?;
//! assert_ne!(a, b);
//! assert_eq!(a.datacenter_id(), 1);
//! # Ok::<(), ringflake::Error>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cached;
mod error;
mod generator;
mod id;
mod padding;
mod ring;
mod time;

pub use crate::cached::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::padding::*;
pub use crate::ring::*;
pub use crate::time::*;
