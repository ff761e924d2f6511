//! K-Sortable Unique IDentifiers.
//!
//! A [`Ksuid`] is a 160-bit value: a 32-bit big-endian count of seconds since
//! [`KSUID_EPOCH`] followed by 128 bits of random payload. Its canonical text
//! form is a fixed-width, 27-character base62 string whose lexicographic order
//! matches the byte order of the binary form, so IDs sort by creation time in
//! either representation.
//!
//! ```text
//!  Byte:   0            4                                20
//!          +------------+---------------------------------+
//!  Field:  | ts (u32 BE)|          payload (16 B)         |
//!          +------------+---------------------------------+
//! ```
//!
//! ```
//! # #[cfg(feature = "std")]
//! # {
//! use ksuid::Ksuid;
//!
//! let id = Ksuid::new().unwrap();
//! let text = id.encode();
//! assert_eq!(text.len(), 27);
//! assert_eq!(Ksuid::decode(&text).unwrap(), id);
//! # }
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod base62;
pub mod column;
mod error;
pub mod generator;
pub mod id;
pub mod rand;
#[cfg(feature = "serde")]
pub mod serde;
pub mod sort;
pub mod time;

pub use crate::base62::*;
pub use crate::column::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::rand::*;
pub use crate::time::*;
