#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod node;
mod tree;
mod verify;

mod error;
pub use error::InvariantError;

mod iter;
pub use iter::{IntoIter, Iter, IterMut, Keys, Range, Values, ValuesMut};

mod map;
pub use map::RbMap;

mod float;
pub use float::FloatMap;

pub use ordered_float::OrderedFloat;
