use mapnbt::{Compound, Value};

use crate::{Block, DecodeWarning, Error, Result, Section};

/// The parts of a chunk needed to find its surface.
///
/// Two layouts are understood. From 1.18 sections sit at the root under
/// `sections` with their palette in `block_states`. In 1.16 and 1.17
/// everything is wrapped in a `Level` compound and sections carry `Palette`
/// and `BlockStates` directly. Both use the same packing of block data.
#[derive(Debug, Clone)]
pub struct ChunkDocument {
    x_pos: i32,
    z_pos: i32,
    sections: Vec<Section>,
}

impl ChunkDocument {
    pub fn new(x_pos: i32, z_pos: i32, sections: Vec<Section>) -> Self {
        Self {
            x_pos,
            z_pos,
            sections,
        }
    }

    pub fn from_compound(root: &Compound) -> Result<Self> {
        if let Some(sections) = root.get("sections") {
            let sections = read_sections(sections, Section::from_modern)?;
            let (x_pos, z_pos) = position(root)?;
            return Ok(Self::new(x_pos, z_pos, sections));
        }

        let level = root
            .get("Level")
            .and_then(Value::as_compound)
            .ok_or_else(|| Error::Format("chunk has neither sections nor Level".to_owned()))?;

        let sections = match level.get("Sections") {
            Some(sections) => read_sections(sections, Section::from_legacy)?,
            None => vec![],
        };
        let (x_pos, z_pos) = position(level)?;

        Ok(Self::new(x_pos, z_pos, sections))
    }

    /// Chunk x coordinate in the world.
    pub fn x_pos(&self) -> i32 {
        self.x_pos
    }

    /// Chunk z coordinate in the world.
    pub fn z_pos(&self) -> i32 {
        self.z_pos
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The section containing world height `y`, if the chunk stores one.
    pub fn section_for_y(&self, y: i32) -> Option<&Section> {
        let sec_y = y >> 4;
        self.sections.iter().find(|s| s.y() == sec_y)
    }

    /// Block at local `x`, `z` (0..16) and world height `y`. `Ok(None)`
    /// means no section covers that height.
    pub fn block(
        &self,
        x: usize,
        y: i32,
        z: usize,
    ) -> std::result::Result<Option<&Block>, DecodeWarning> {
        match self.section_for_y(y) {
            Some(section) => section.block(x, (y & 0xF) as usize, z).map(Some),
            None => Ok(None),
        }
    }
}

fn read_sections(
    sections: &Value,
    read: fn(&Compound) -> Result<Option<Section>>,
) -> Result<Vec<Section>> {
    let sections = sections
        .as_list()
        .ok_or_else(|| Error::Format("sections is not a list".to_owned()))?;

    let mut out = Vec::with_capacity(sections.len());
    for section in sections {
        let section = section
            .as_compound()
            .ok_or_else(|| Error::Format("section is not a compound".to_owned()))?;

        if let Some(section) = read(section)? {
            out.push(section);
        }
    }

    Ok(out)
}

fn position(c: &Compound) -> Result<(i32, i32)> {
    let get = |key: &str| {
        c.get(key)
            .and_then(Value::as_i64)
            .map(|v| v as i32)
            .ok_or_else(|| Error::Format(format!("chunk has no {}", key)))
    };

    Ok((get("xPos")?, get("zPos")?))
}
