#![doc = include_str!("../README.md")]

mod compare;
mod constants;
mod cursor;
mod error;
mod header;
mod padding;
mod strip;
mod walker;

pub use self::compare::*;
pub use self::constants::EPOCH;
pub use self::constants::EPOCH_MTIME;
pub use self::constants::HEADER_LEN;
pub use self::constants::NEWC_MAGIC;
pub use self::constants::TRAILER;
pub use self::cursor::*;
pub use self::error::Error;
pub use self::error::Result;
pub use self::header::*;
pub use self::padding::*;
pub use self::strip::*;
pub use self::walker::*;
