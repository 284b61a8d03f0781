//! mapnbt decodes NBT data from *Minecraft: Java Edition* into an owned tree
//! of [`Value`]s. This is the format the game uses for chunk data inside
//! region files, as well as level.dat and player files.
//!
//! * To decode a buffer that may be compressed, see [`decode`].
//! * To decode from any [`Read`][`std::io::Read`], see [`Decoder`].
//! * To produce NBT bytes from a [`Compound`], see [`to_bytes`].
//!
//! # Quick example
//!
//! ```no_run
//! use mapnbt::{decode, Value};
//!
//! # fn main() -> mapnbt::error::Result<()> {
//! let data = std::fs::read("level.dat")?;
//!
//! // level.dat is gzip compressed, decode sniffs that for us.
//! let root = decode(&data)?;
//! let data = root.get("Data").and_then(Value::as_compound);
//!
//! if let Some(Value::String(name)) = data.and_then(|d| d.get("LevelName")) {
//!     println!("level: {}", name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Framing
//!
//! NBT found in the wild is either raw, gzip compressed (most `.dat` files),
//! or zlib compressed (chunks inside region files). [`decode`] looks at the
//! first bytes of the buffer to pick, see [`Framing`].

pub mod de;
pub mod error;
pub mod ser;

mod value;

pub use de::{decode, decode_named, Decoder, Framing};
pub use ser::{to_bytes, write_root};
pub use value::*;

#[cfg(test)]
mod test;

use std::convert::TryFrom;

/// An NBT tag. This does not carry the value or the name of the data.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Represents the end of a Compound object.
    End = 0,
    /// Equivalent to i8.
    Byte = 1,
    /// Equivalent to i16.
    Short = 2,
    /// Equivalent to i32.
    Int = 3,
    /// Equivalent to i64
    Long = 4,
    /// Equivalent to f32.
    Float = 5,
    /// Equivalent to f64.
    Double = 6,
    /// Represents as array of Byte (i8).
    ByteArray = 7,
    /// Represents a Unicode string.
    String = 8,
    /// Represents a list of other objects, all of the same tag.
    List = 9,
    /// Represents a struct-like structure.
    Compound = 10,
    /// Represents as array of Int (i32).
    IntArray = 11,
    /// Represents as array of Long (i64).
    LongArray = 12,
}

// Crates exist to generate this code for us, but would add to our compile
// times, so we instead write it out manually. The tags will very rarely
// change.
impl TryFrom<u8> for Tag {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        use Tag::*;
        Ok(match value {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            13..=u8::MAX => return Err(()),
        })
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        tag as u8
    }
}
