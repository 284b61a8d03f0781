//! Palette compressed block storage for a 16×16×16 section of a chunk.
//!
//! Each block of a section is an index into the section's palette. The
//! indices are packed into 64 bit words, `64 / bits` to a word, least
//! significant bits first. Since 1.16 an index never spans two words; the
//! leftover high bits of each word are padding. Older worlds packed indices
//! back to back across words and are not handled here.

use std::fmt;

use bit_field::BitField;
use mapnbt::{Compound, Value};

use crate::{Block, Error, Result};

pub const SECTION_BLOCKS: usize = 16 * 16 * 16;

/// The minimum bits per block index used by the game.
const MIN_BITS_PER_BLOCK: usize = 4;

/// Something odd found while looking up a single block. These do not stop a
/// surface scan, the column simply carries on downward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// The packed data pointed past the end of the palette.
    PaletteIndexOutOfRange { index: usize, len: usize },
    /// The section had no palette entries at all.
    EmptyPalette,
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::PaletteIndexOutOfRange { index, len } => write!(
                f,
                "palette index {} out of range for palette of {}",
                index, len
            ),
            DecodeWarning::EmptyPalette => f.write_str("section has an empty palette"),
        }
    }
}

impl std::error::Error for DecodeWarning {}

/// Bits used for each palette index in a section with `palette_len` entries.
/// A section of a single block stores no data at all.
pub fn bits_per_block(palette_len: usize) -> usize {
    if palette_len <= 1 {
        return 0;
    }

    let needed = (usize::BITS - (palette_len - 1).leading_zeros()) as usize;
    needed.max(MIN_BITS_PER_BLOCK)
}

/// Index into a section's 4096 blocks.
pub fn block_index(x: usize, y: usize, z: usize) -> usize {
    y * 256 + z * 16 + x
}

/// Extract the palette index stored at `index`. Missing words read as zero.
pub fn unpack_index(states: &[u64], bits: usize, index: usize) -> usize {
    if bits == 0 {
        return 0;
    }

    let per_long = 64 / bits;
    let word = match states.get(index / per_long) {
        Some(word) => *word,
        None => return 0,
    };

    let offset = (index % per_long) * bits;
    word.get_bits(offset..offset + bits) as usize
}

#[derive(Debug, Clone)]
pub struct Section {
    y: i32,
    palette: Vec<Block>,
    states: Vec<u64>,
    bits: usize,
}

impl Section {
    pub fn new(y: i32, palette: Vec<Block>, states: Vec<u64>) -> Self {
        let bits = bits_per_block(palette.len());
        Self {
            y,
            palette,
            states,
            bits,
        }
    }

    /// Read a section in the 1.18+ layout, where the palette and data live
    /// in a `block_states` compound. Returns `None` for sections without
    /// block data, such as the light-only sections at the edges of the world.
    pub(crate) fn from_modern(section: &Compound) -> Result<Option<Self>> {
        let states = match section.get("block_states").and_then(Value::as_compound) {
            Some(states) => states,
            None => return Ok(None),
        };

        Self::build(section, states.get("palette"), states.get("data"))
    }

    /// Read a section from 1.16 and 1.17 chunks, with `Palette` and
    /// `BlockStates` directly in the section.
    pub(crate) fn from_legacy(section: &Compound) -> Result<Option<Self>> {
        if !section.contains_key("Palette") {
            return Ok(None);
        }

        Self::build(section, section.get("Palette"), section.get("BlockStates"))
    }

    fn build(
        section: &Compound,
        palette: Option<&Value>,
        data: Option<&Value>,
    ) -> Result<Option<Self>> {
        let y = section
            .get("Y")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Format("section has no Y".to_owned()))?;

        let palette = match palette {
            Some(p) => p
                .as_list()
                .ok_or_else(|| Error::Format("section palette is not a list".to_owned()))?
                .iter()
                .map(Block::from_palette_entry)
                .collect::<Result<Vec<_>>>()?,
            None => return Ok(None),
        };

        let states = match data {
            Some(Value::LongArray(longs)) => longs.iter().map(|l| *l as u64).collect(),
            Some(_) => return Err(Error::Format("block data is not a long array".to_owned())),
            None => vec![],
        };

        Ok(Some(Section::new(y as i32, palette, states)))
    }

    /// Section index on the Y axis, world Y divided by 16.
    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn palette(&self) -> &[Block] {
        &self.palette
    }

    pub fn bits_per_block(&self) -> usize {
        self.bits
    }

    /// Palette index of the block at local `x`, `y`, `z`, each 0..16.
    pub fn palette_index(&self, x: usize, y: usize, z: usize) -> usize {
        unpack_index(&self.states, self.bits, block_index(x, y, z))
    }

    /// The block at local `x`, `y`, `z`, each 0..16.
    pub fn block(&self, x: usize, y: usize, z: usize) -> std::result::Result<&Block, DecodeWarning> {
        if self.palette.is_empty() {
            return Err(DecodeWarning::EmptyPalette);
        }

        let index = self.palette_index(x, y, z);
        self.palette
            .get(index)
            .ok_or(DecodeWarning::PaletteIndexOutOfRange {
                index,
                len: self.palette.len(),
            })
    }
}
