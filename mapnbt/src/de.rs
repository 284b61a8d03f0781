//! Decoding of NBT into a [`Value`] tree.
//!
//! Most callers want [`decode`], which works out how the buffer is framed
//! (raw, gzip or zlib) and returns the root compound. [`Decoder`] works on
//! any [`Read`] that produces raw NBT and does no decompression itself.
//!
//! ```
//! use mapnbt::{decode, Value};
//!
//! // A root compound named "" holding a single byte "a" of value 1.
//! let raw = [10, 0, 0, 1, 0, 1, b'a', 1, 0];
//! let root = decode(&raw).unwrap();
//! assert_eq!(root.get("a"), Some(&Value::Byte(1)));
//! ```

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::{GzDecoder, ZlibDecoder};

use crate::error::{Error, Result};
use crate::{Compound, Tag, Value};

/// Compounds and lists nested deeper than this are rejected. Vanilla data
/// never gets close; the limit is there so hostile input cannot overflow the
/// stack.
pub const MAX_DEPTH: usize = 512;

/// Initial capacity for arrays and lists is capped at this many elements, so
/// a bogus length prefix cannot make us allocate far more than the input
/// contains.
const ARRAY_CHUNK: usize = 16 * 1024;

/// How a buffer of NBT is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Starts with the gzip magic `1F 8B`.
    Gzip,
    /// Starts with `78`, the zlib header for deflate with a 32K window.
    Zlib,
    /// Anything else is assumed to be uncompressed NBT.
    Raw,
}

impl Framing {
    pub fn detect(data: &[u8]) -> Framing {
        match data {
            [0x1f, 0x8b, ..] => Framing::Gzip,
            [0x78, ..] => Framing::Zlib,
            _ => Framing::Raw,
        }
    }
}

/// Decode a buffer of NBT, decompressing it first if it is gzip or zlib
/// framed. The root must be a compound.
pub fn decode(data: &[u8]) -> Result<Compound> {
    decode_named(data).map(|(_, root)| root)
}

/// Like [`decode`] but also returns the name of the root compound, which is
/// usually the empty string.
pub fn decode_named(data: &[u8]) -> Result<(String, Compound)> {
    match Framing::detect(data) {
        Framing::Gzip => Decoder::new(GzDecoder::new(data)).read_root(),
        Framing::Zlib => Decoder::new(ZlibDecoder::new(data)).read_root(),
        Framing::Raw => Decoder::new(data).read_root(),
    }
}

/// Decoder can take any reader of raw NBT and produce a [`Value`] tree. Does
/// not do decompression.
pub struct Decoder<R: Read> {
    reader: R,
    depth: usize,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, depth: 0 }
    }

    /// Consumes this decoder, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read a complete NBT document: a named compound tag and everything in
    /// it.
    pub fn read_root(&mut self) -> Result<(String, Compound)> {
        let tag = self.reader.read_u8()?;
        if tag != u8::from(Tag::Compound) {
            return Err(Error::expected_compound_root(tag));
        }

        let name = self.read_size_prefixed_string()?;
        let root = self.read_compound()?;
        Ok((name, root))
    }

    fn read_tag(&mut self) -> Result<Tag> {
        let tag = self.reader.read_u8()?;
        Tag::try_from(tag).map_err(|_| Error::unknown_tag(tag))
    }

    fn read_size_prefixed_string(&mut self) -> Result<String> {
        let len = self.reader.read_u16::<BigEndian>()? as usize;

        let mut buf = vec![0; len];
        self.reader.read_exact(&mut buf[..])?;

        Ok(cesu8::from_java_cesu8(&buf[..])
            .map_err(|_| Error::nonunicode(&buf[..]))?
            .into_owned())
    }

    fn read_len(&mut self) -> Result<usize> {
        let len = self.reader.read_i32::<BigEndian>()?;
        usize::try_from(len).map_err(|_| Error::negative_length(len))
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::depth_limit(MAX_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn read_compound(&mut self) -> Result<Compound> {
        self.enter()?;
        let mut map = Compound::new();

        loop {
            let tag = self.read_tag()?;
            if tag == Tag::End {
                break;
            }

            let name = self.read_size_prefixed_string()?;
            let value = self.read_payload(tag)?;

            // Duplicate keys are invalid NBT, the game itself keeps the last.
            map.insert(name, value);
        }

        self.leave();
        Ok(map)
    }

    fn read_list(&mut self) -> Result<Value> {
        let element_tag = self.read_tag()?;
        let len = self.reader.read_i32::<BigEndian>()?;

        if len <= 0 {
            // Minecraft writes empty lists with a zero or negative length,
            // often with an End element tag.
            return Ok(Value::List(element_tag, vec![]));
        }

        if element_tag == Tag::End {
            return Err(Error::invalid_list(len));
        }

        self.enter()?;
        let mut items = Vec::with_capacity((len as usize).min(ARRAY_CHUNK));
        for _ in 0..len {
            items.push(self.read_payload(element_tag)?);
        }
        self.leave();

        Ok(Value::List(element_tag, items))
    }

    fn read_array<T>(
        &mut self,
        mut read_one: impl FnMut(&mut R) -> std::io::Result<T>,
    ) -> Result<Vec<T>> {
        let len = self.read_len()?;
        let mut buf = Vec::with_capacity(len.min(ARRAY_CHUNK));
        for _ in 0..len {
            buf.push(read_one(&mut self.reader)?);
        }
        Ok(buf)
    }

    fn read_payload(&mut self, tag: Tag) -> Result<Value> {
        match tag {
            Tag::Byte => Ok(Value::Byte(self.reader.read_i8()?)),
            Tag::Short => Ok(Value::Short(self.reader.read_i16::<BigEndian>()?)),
            Tag::Int => Ok(Value::Int(self.reader.read_i32::<BigEndian>()?)),
            Tag::Long => Ok(Value::Long(self.reader.read_i64::<BigEndian>()?)),
            Tag::Float => Ok(Value::Float(self.reader.read_f32::<BigEndian>()?)),
            Tag::Double => Ok(Value::Double(self.reader.read_f64::<BigEndian>()?)),
            Tag::String => Ok(Value::String(self.read_size_prefixed_string()?)),
            Tag::ByteArray => {
                let len = self.read_len()?;
                let mut buf = Vec::with_capacity(len.min(ARRAY_CHUNK));
                (&mut self.reader).take(len as u64).read_to_end(&mut buf)?;
                if buf.len() != len {
                    return Err(Error::truncated());
                }
                Ok(Value::ByteArray(buf.into_iter().map(|b| b as i8).collect()))
            }
            Tag::IntArray => Ok(Value::IntArray(
                self.read_array(|r| r.read_i32::<BigEndian>())?,
            )),
            Tag::LongArray => Ok(Value::LongArray(
                self.read_array(|r| r.read_i64::<BigEndian>())?,
            )),
            Tag::List => self.read_list(),
            Tag::Compound => Ok(Value::Compound(self.read_compound()?)),
            // Compounds stop at End and lists of End are rejected before
            // their payloads are read, so nothing asks for this.
            Tag::End => Err(Error::bespoke("invalid nbt: end tag used as a value")),
        }
    }
}
