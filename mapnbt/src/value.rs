use crate::Tag;

/// The map type backing a [`Value::Compound`]. With the `preserve-order`
/// feature this keeps keys in the order they were read, otherwise ordering is
/// unspecified. Equality ignores order either way.
#[cfg(not(feature = "preserve-order"))]
pub type Compound = std::collections::HashMap<String, Value>;

/// The map type backing a [`Value::Compound`]. With the `preserve-order`
/// feature this keeps keys in the order they were read, otherwise ordering is
/// unspecified. Equality ignores order either way.
#[cfg(feature = "preserve-order")]
pub type Compound = indexmap::IndexMap<String, Value>;

/// Value is a complete NBT value. It owns its data. Compounds and Lists are
/// recursively decoded. The name of the root compound is not part of the
/// value, see [`decode_named`][`crate::decode_named`] if you need it.
///
/// Lists remember their element tag so that an empty list keeps the type it
/// was written with.
///
/// ```
/// # use mapnbt::{Tag, Value};
/// let heights = Value::List(Tag::Int, vec![Value::Int(64), Value::Int(70)]);
/// assert_eq!(heights.tag(), Tag::List);
/// assert_eq!(heights.as_list().map(|l| l.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Tag, Vec<Value>),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Value {
    /// The tag this value is written with.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Byte(_) => Tag::Byte,
            Value::Short(_) => Tag::Short,
            Value::Int(_) => Tag::Int,
            Value::Long(_) => Tag::Long,
            Value::Float(_) => Tag::Float,
            Value::Double(_) => Tag::Double,
            Value::ByteArray(_) => Tag::ByteArray,
            Value::String(_) => Tag::String,
            Value::List(..) => Tag::List,
            Value::Compound(_) => Tag::Compound,
            Value::IntArray(_) => Tag::IntArray,
            Value::LongArray(_) => Tag::LongArray,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Byte(v) => Some(v as i64),
            Value::Short(v) => Some(v as i64),
            Value::Int(v) => Some(v as i64),
            Value::Long(v) => Some(v),
            Value::Float(v) => Some(v as i64),
            Value::Double(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Value::Compound(v) => Some(v),
            _ => None,
        }
    }

    /// The elements of a list, regardless of their tag.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(_, v) => Some(v),
            _ => None,
        }
    }

    pub fn as_long_array(&self) -> Option<&[i64]> {
        match self {
            Value::LongArray(v) => Some(v),
            _ => None,
        }
    }
}

// ------------- From<T> impls -------------

macro_rules! from {
    ($type:ty, $variant:ident $(, $($part:tt)+)?) => {
        impl From<$type> for Value {
            fn from(val: $type) -> Self {
                Self::$variant(val$($($part)+)?)
            }
        }
    };
}
from!(i8, Byte);
from!(u8, Byte, as i8);
from!(i16, Short);
from!(i32, Int);
from!(i64, Long);
from!(u64, Long, as i64);
from!(f32, Float);
from!(f64, Double);
from!(String, String);
from!(&str, String, .to_owned());
from!(Compound, Compound);
from!(Vec<i32>, IntArray);
from!(Vec<i64>, LongArray);

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Self::Byte(i8::from(val))
    }
}
