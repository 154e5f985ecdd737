//! Wire path codec
//!
//! HTML form submissions are flat: every input carries a single string
//! name. Nested data is addressed by encoding its location into that name:
//!
//! - field names are joined with `.` (`address.city`)
//! - list indices follow their field as `[n]` with no separator (`pets[0]`)
//! - both compose to arbitrary depth (`departments[0].teams[2].name`)
//!
//! This naming is the compatibility surface with browser clients, so
//! `decode(encode(path)) == path` must hold for every valid path.

mod codec;

pub use codec::{decode, encode, FieldPath, PathError, Segment};
