//! Encoding of a [`Compound`] back into raw NBT bytes.
//!
//! The output is uncompressed. Wrap the writer in a `flate2` encoder if the
//! destination expects gzip or zlib.

use std::convert::TryInto;
use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::{Compound, Tag, Value};

/// Encode `root` as an NBT document with an empty root name.
pub fn to_bytes(root: &Compound) -> Result<Vec<u8>> {
    let mut buf = vec![];
    write_root(&mut buf, "", root)?;
    Ok(buf)
}

/// Write `root` as an NBT document named `name` to `writer`.
pub fn write_root<W: Write>(mut writer: W, name: &str, root: &Compound) -> Result<()> {
    writer.write_tag(Tag::Compound)?;
    writer.write_size_prefixed_str(name)?;
    writer.write_compound(root)
}

trait WriteNbt: Write {
    fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.write_u8(tag as u8)?;
        Ok(())
    }

    fn write_size_prefixed_str(&mut self, key: &str) -> Result<()> {
        let key = cesu8::to_java_cesu8(key);
        let len: u16 = key
            .len()
            .try_into()
            .map_err(|_| Error::bespoke("string too long for nbt"))?;
        self.write_u16::<BigEndian>(len)?;
        self.write_all(&key)?;
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<()> {
        let len: i32 = len
            .try_into()
            .map_err(|_| Error::bespoke("len too large"))?;
        self.write_i32::<BigEndian>(len)?;
        Ok(())
    }

    fn write_compound(&mut self, compound: &Compound) -> Result<()> {
        for (name, value) in compound {
            self.write_tag(value.tag())?;
            self.write_size_prefixed_str(name)?;
            self.write_payload(value)?;
        }
        self.write_tag(Tag::End)
    }

    fn write_payload(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Byte(v) => self.write_i8(*v)?,
            Value::Short(v) => self.write_i16::<BigEndian>(*v)?,
            Value::Int(v) => self.write_i32::<BigEndian>(*v)?,
            Value::Long(v) => self.write_i64::<BigEndian>(*v)?,
            Value::Float(v) => self.write_f32::<BigEndian>(*v)?,
            Value::Double(v) => self.write_f64::<BigEndian>(*v)?,
            Value::String(v) => self.write_size_prefixed_str(v)?,
            Value::ByteArray(v) => {
                self.write_len(v.len())?;
                for b in v {
                    self.write_i8(*b)?;
                }
            }
            Value::IntArray(v) => {
                self.write_len(v.len())?;
                for i in v {
                    self.write_i32::<BigEndian>(*i)?;
                }
            }
            Value::LongArray(v) => {
                self.write_len(v.len())?;
                for l in v {
                    self.write_i64::<BigEndian>(*l)?;
                }
            }
            Value::List(element_tag, items) => {
                if let Some(odd) = items.iter().find(|v| v.tag() != *element_tag) {
                    return Err(Error::heterogeneous_list(*element_tag, odd.tag()));
                }
                self.write_tag(*element_tag)?;
                self.write_len(items.len())?;
                for item in items {
                    self.write_payload(item)?;
                }
            }
            Value::Compound(c) => self.write_compound(c)?,
        }
        Ok(())
    }
}

impl<T> WriteNbt for T where T: Write {}
