//! Top-down surface maps of Minecraft's region format, Anvil.
//!
//! A [`RegionFile`] is read into memory once. A [`SurfaceExtractor`] then
//! decodes every populated chunk across a worker pool and finds the highest
//! non-air block of each column, producing a [`SurfaceGrid`]. With the
//! `render` feature (on by default) a [`ShadeRenderer`] turns that grid into
//! an image, colouring blocks with a [`ColorResolver`] and darkening cells
//! that sit on a sharp change in height.
//!
//! ```no_run
//! use mapanvil::{render_region, ColorResolver, ExtractOptions};
//!
//! # fn main() -> mapanvil::Result<()> {
//! let resolver = ColorResolver::new();
//! let map = render_region("world/region/r.0.0.mca", &ExtractOptions::default(), &resolver)?;
//! println!("{}x{}", map.width(), map.height());
//! # Ok(())
//! # }
//! ```

mod block;
mod chunk;
mod colour;
mod region;
mod section;
mod surface;

#[cfg(feature = "render")]
mod raster;

pub use block::*;
pub use chunk::*;
pub use colour::*;
pub use region::*;
pub use section::*;
pub use surface::*;

#[cfg(feature = "render")]
pub use raster::*;

#[cfg(test)]
mod test;

/// Lowest block Y in a modern overworld.
pub const MIN_Y: i32 = -64;

/// Highest block Y in a modern overworld.
pub const MAX_Y: i32 = 319;

pub type Rgba = [u8; 4];

#[derive(Debug)]
pub enum Error {
    /// Reading the region file failed. Fatal for the whole render.
    Io(std::io::Error),

    /// The file is too short to hold the 8 KiB location header.
    TruncatedRegion(usize),

    /// Chunk coordinates outside of a region, both must be 0..32.
    InvalidOffset(usize, usize),

    /// A chunk's sectors or declared length run past the end of the file.
    ChunkOutOfBounds { x: usize, z: usize },

    /// Chunk was stored with gzip, which region files do not use in practice.
    UnsupportedCompression,

    /// Compression byte was neither gzip nor zlib.
    UnknownCompression(u8),

    /// The chunk payload was not valid NBT.
    Nbt(mapnbt::error::Error),

    /// The NBT was valid but not shaped like a chunk.
    Format(String),

    InvalidRegionSize(usize),
    InvalidSampleInterval(usize),

    /// The worker pool could not be built.
    WorkerPool(String),
}

impl Error {
    /// Whether this error only spoils a single chunk. The surface extractor
    /// leaves such chunks as sentinel cells and carries on.
    pub fn is_chunk_local(&self) -> bool {
        matches!(
            self,
            Error::ChunkOutOfBounds { .. }
                | Error::UnsupportedCompression
                | Error::UnknownCompression(_)
                | Error::Nbt(_)
                | Error::Format(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<mapnbt::error::Error> for Error {
    fn from(err: mapnbt::error::Error) -> Error {
        Error::Nbt(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => f.write_fmt(format_args!("io error: {}", e)),
            Error::TruncatedRegion(len) => f.write_fmt(format_args!(
                "region file is {} bytes, shorter than its header",
                len
            )),
            Error::InvalidOffset(x, z) => {
                f.write_fmt(format_args!("invalid offset: x = {}, z = {}", x, z))
            }
            Error::ChunkOutOfBounds { x, z } => f.write_fmt(format_args!(
                "chunk ({}, {}) points past the end of the region file",
                x, z
            )),
            Error::UnsupportedCompression => {
                f.write_str("gzip compressed chunks are not supported")
            }
            Error::UnknownCompression(scheme) => f.write_fmt(format_args!(
                "compression scheme {} was not recognised for chunk",
                scheme
            )),
            Error::Nbt(e) => f.write_fmt(format_args!("chunk nbt: {}", e)),
            Error::Format(msg) => f.write_fmt(format_args!("malformed chunk: {}", msg)),
            Error::InvalidRegionSize(size) => f.write_fmt(format_args!(
                "region size must be 1 to 32 chunks, got {}",
                size
            )),
            Error::InvalidSampleInterval(interval) => f.write_fmt(format_args!(
                "sample interval must be 1 to 16, got {}",
                interval
            )),
            Error::WorkerPool(msg) => f.write_fmt(format_args!("worker pool: {}", msg)),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Nbt(e) => Some(e),
            _ => None,
        }
    }
}
