//! A sorted key-value list stored in a single file.
//!
//! Entries live in a doubly linked chain of fixed-capacity blocks (an
//! unrolled linked list) addressed by byte offsets. See [`list`] for the
//! on-disk layout.

#[macro_use]
extern crate log;

pub use codec::{FixedCodec, FixedStr};
pub use key::{CompositeKey, ListKey, PrimaryKey};
pub use list::{FileDoubleUnrolledList, FileUnrolledList, Iter, UnrolledList};
pub use options::ListOptions;

mod byteutils;
mod cache;
pub mod codec;
pub mod error;
mod ioutils;
pub mod key;
pub mod list;
pub mod options;
pub mod record;

pub type Result<T> = std::result::Result<T, error::KVListError>;
