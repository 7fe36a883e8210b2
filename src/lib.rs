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

mod utils;

mod ordered_map;
pub use ordered_map::OrderedMap;

mod float_map;
pub use float_map::FloatMap;

pub use ordered_float::OrderedFloat;

#[cfg(test)]
mod proptests;
