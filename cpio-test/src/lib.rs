//! Test helpers: in-memory newc archives written without the library's codec.

mod archive;
mod random;

pub use self::archive::*;
pub use self::random::*;
