//! Contains the Error and Result type used by the decoder and encoder.

/// An error produced while decoding or encoding NBT.
#[derive(Debug, Clone)]
pub struct Error {
    msg: String,
    kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The outermost tag was not a compound. Every NBT document found in
    /// Minecraft's files has a compound at the root.
    ExpectedCompoundRoot,

    /// A tag id outside of the known 0..=12 range.
    UnknownTagType(u8),

    /// The input ran out part way through a tag or value.
    TruncatedStream,

    /// A length prefix for an array or list was negative.
    NegativeLength(i32),

    /// Expected unicode data but was not valid. Contained bytes are the
    /// invalid data.
    Nonunicode(Vec<u8>),

    /// Compounds and lists were nested deeper than the decoder allows.
    DepthLimit,

    /// A list declared `End` as its element tag but claimed to have elements.
    InvalidList,

    /// A list being encoded contained values of different tags.
    HeterogeneousList,

    /// Any other IO error, typically from a decompressor.
    Io,

    /// Any other errors. Users should not match on this variant and should
    /// instead use a wildcard `_`.
    Other,
}

/// Convenience type for Result.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get the kind of error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self.kind, ErrorKind::TruncatedStream)
    }

    pub(crate) fn bespoke(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind: ErrorKind::Other,
        }
    }

    pub(crate) fn expected_compound_root(found: u8) -> Self {
        Self {
            msg: format!("invalid nbt: expected compound at root, found tag {}", found),
            kind: ErrorKind::ExpectedCompoundRoot,
        }
    }

    pub(crate) fn unknown_tag(tag: u8) -> Self {
        Self {
            msg: format!("invalid nbt tag value: {}", tag),
            kind: ErrorKind::UnknownTagType(tag),
        }
    }

    pub(crate) fn truncated() -> Self {
        Self {
            msg: "eof: unexpectedly ran out of input".to_owned(),
            kind: ErrorKind::TruncatedStream,
        }
    }

    pub(crate) fn negative_length(len: i32) -> Self {
        Self {
            msg: format!("invalid nbt: negative length {}", len),
            kind: ErrorKind::NegativeLength(len),
        }
    }

    pub(crate) fn nonunicode(data: &[u8]) -> Self {
        Self {
            msg: format!(
                "invalid nbt string: nonunicode: {}",
                String::from_utf8_lossy(data)
            ),
            kind: ErrorKind::Nonunicode(data.to_vec()),
        }
    }

    pub(crate) fn depth_limit(limit: usize) -> Self {
        Self {
            msg: format!("invalid nbt: nested deeper than {}", limit),
            kind: ErrorKind::DepthLimit,
        }
    }

    pub(crate) fn invalid_list(len: i32) -> Self {
        Self {
            msg: format!("invalid nbt: list of end tags with length {}", len),
            kind: ErrorKind::InvalidList,
        }
    }

    pub(crate) fn heterogeneous_list(expected: crate::Tag, found: crate::Tag) -> Self {
        Self {
            msg: format!(
                "list elements must share a tag: expected {:?}, found {:?}",
                expected, found
            ),
            kind: ErrorKind::HeterogeneousList,
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::truncated(),
            _ => Self {
                msg: format!("io error: {}", e),
                kind: ErrorKind::Io,
            },
        }
    }
}
