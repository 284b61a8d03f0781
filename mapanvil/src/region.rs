use std::convert::TryFrom;
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use mapnbt::{Compound, Decoder};
use num_enum::TryFromPrimitive;

use crate::{ChunkDocument, Error, Result};

/// the size in bytes of a 'sector' in a region file. Sectors are Minecraft's size unit
/// for chunks. For example, a chunk might be `3 * SECTOR_SIZE` bytes. The
/// actual compressed bytes of a chunk may be smaller and the exact value is
/// tracked in the chunk header.
pub const SECTOR_SIZE: usize = 4096;

/// the size of the region file header.
pub const REGION_HEADER_SIZE: usize = 2 * SECTOR_SIZE;

/// size of header for each chunk in the region file. This header proceeds the
/// compressed chunk data.
pub const CHUNK_HEADER_SIZE: usize = 5;

/// Width of a region in chunks.
pub const REGION_CHUNKS: usize = 32;

/// A Minecraft region held entirely in memory.
///
/// The location table is parsed up front. Chunk payloads are only inflated
/// and decoded when asked for, so a `RegionFile` can be shared between
/// threads that each decode different chunks.
pub struct RegionFile {
    data: Vec<u8>,
    locations: Vec<ChunkLocation>,
}

impl RegionFile {
    /// Read the whole file at `path` into memory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Take ownership of the raw bytes of a region file. Fails if the buffer
    /// is too short to contain the location header.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.len() < REGION_HEADER_SIZE {
            return Err(Error::TruncatedRegion(data.len()));
        }

        let mut locations = Vec::with_capacity(REGION_CHUNKS * REGION_CHUNKS);
        let mut header = &data[..REGION_CHUNKS * REGION_CHUNKS * 4];

        while let Ok(entry) = header.read_u32::<BigEndian>() {
            locations.push(ChunkLocation {
                offset: (entry >> 8) as u64,
                sectors: (entry & 0xFF) as u64,
            });
        }

        Ok(Self { data, locations })
    }

    /// Return the inner buffer used.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// The header entry for chunk `x`, `z`. Coordinates wrap at 32, so world
    /// chunk coordinates can be passed directly.
    pub fn location(&self, x: usize, z: usize) -> ChunkLocation {
        self.locations[header_index(x, z)]
    }

    /// True when the chunk's header entry has both an offset and a sector
    /// count. Half-written entries are treated as missing.
    pub fn chunk_exists(&self, x: usize, z: usize) -> bool {
        self.location(x, z).is_present()
    }

    /// Coordinates of every chunk present in the top-left `size`×`size`
    /// corner of the region, row by row.
    pub fn populated_chunks(&self, size: usize) -> Vec<(usize, usize)> {
        let size = size.min(REGION_CHUNKS);
        let mut found = vec![];

        for z in 0..size {
            for x in 0..size {
                if self.chunk_exists(x, z) {
                    found.push((x, z));
                }
            }
        }

        found
    }

    /// Inflate and decode the NBT of the chunk at `x`, `z`, both 0..32.
    /// Returns `Ok(None)` if the chunk's header entry is all zero.
    pub fn chunk_data(&self, x: usize, z: usize) -> Result<Option<Compound>> {
        if x >= REGION_CHUNKS || z >= REGION_CHUNKS {
            return Err(Error::InvalidOffset(x, z));
        }

        let loc = self.location(x, z);
        if loc.is_empty() {
            return Ok(None);
        }

        let out_of_bounds = || Error::ChunkOutOfBounds { x, z };

        let start = loc.offset as usize * SECTOR_SIZE;
        let header = self
            .data
            .get(start..start + CHUNK_HEADER_SIZE)
            .ok_or_else(out_of_bounds)?;
        let meta = ChunkMeta::new(header)?;

        let begin = start + CHUNK_HEADER_SIZE;
        let payload = self
            .data
            .get(begin..begin + meta.compressed_len)
            .ok_or_else(out_of_bounds)?;

        match meta.compression_scheme {
            CompressionScheme::Zlib => {
                let (_, root) = Decoder::new(ZlibDecoder::new(payload)).read_root()?;
                Ok(Some(root))
            }
            CompressionScheme::Gzip => Err(Error::UnsupportedCompression),
        }
    }

    /// Like [`chunk_data`][`RegionFile::chunk_data`] but interprets the
    /// result as a chunk.
    pub fn chunk(&self, x: usize, z: usize) -> Result<Option<ChunkDocument>> {
        self.chunk_data(x, z)?
            .map(|root| ChunkDocument::from_compound(&root))
            .transpose()
    }
}

/// Compression schemes a chunk payload may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum CompressionScheme {
    Gzip = 1,
    Zlib = 2,
}

fn header_index(x: usize, z: usize) -> usize {
    (x % REGION_CHUNKS) + (z % REGION_CHUNKS) * REGION_CHUNKS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLocation {
    /// The offset, in units of 4kiB sectors, into the region file this chunk is
    /// located at. Offset 0 is the start of the file.
    pub offset: u64,

    /// The number of 4 kiB sectors that this chunk occupies in the region file.
    pub sectors: u64,
}

impl ChunkLocation {
    /// Both offset and sector count are zero, the chunk was never written.
    pub fn is_empty(&self) -> bool {
        self.offset == 0 && self.sectors == 0
    }

    pub fn is_present(&self) -> bool {
        self.offset != 0 && self.sectors != 0
    }
}

/// Encodes how the NBT-Data is compressed
#[derive(Debug)]
struct ChunkMeta {
    compressed_len: usize,
    compression_scheme: CompressionScheme,
}

impl ChunkMeta {
    fn new(mut data: &[u8]) -> Result<Self> {
        let len = data.read_i32::<BigEndian>()?;
        let scheme = data.read_u8()?;

        if len < 1 {
            return Err(Error::Format(format!("chunk length {} is too small", len)));
        }

        let scheme =
            CompressionScheme::try_from(scheme).map_err(|_| Error::UnknownCompression(scheme))?;

        Ok(Self {
            compressed_len: len as usize - 1, // this len include the compression byte.
            compression_scheme: scheme,
        })
    }
}
