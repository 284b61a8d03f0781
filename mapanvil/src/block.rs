use std::collections::BTreeMap;
use std::fmt;

use mapnbt::Value;

use crate::{Error, Result};

/// Ids the surface scan looks straight through.
pub const AIR_IDS: [&str; 4] = ["air", "cave_air", "void_air", "none"];

/// One entry of a section palette.
///
/// The `minecraft:` namespace is dropped from the id since nearly every block
/// has it. Other namespaces, from mods, are kept so they cannot collide with
/// vanilla ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    id: String,
    properties: BTreeMap<String, String>,
}

impl Block {
    pub fn new(name: &str) -> Self {
        Self {
            id: strip_namespace(name).to_owned(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Build a block from a palette compound, `{Name: "...", Properties: {...}}`.
    pub fn from_palette_entry(entry: &Value) -> Result<Self> {
        let entry = entry
            .as_compound()
            .ok_or_else(|| Error::Format("palette entry is not a compound".to_owned()))?;

        let name = entry
            .get("Name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Format("palette entry has no Name".to_owned()))?;

        let mut block = Block::new(name);

        // Properties are always strings in vanilla, anything else is skipped.
        if let Some(props) = entry.get("Properties").and_then(Value::as_compound) {
            for (k, v) in props {
                if let Some(v) = v.as_str() {
                    block.properties.insert(k.clone(), v.to_owned());
                }
            }
        }

        Ok(block)
    }

    /// The id without the `minecraft:` namespace, eg `grass_block`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// True for the blocks a top-down scan should see through.
    pub fn is_air(&self) -> bool {
        is_air_id(&self.id)
    }
}

/// A string of the format "id|prop1=val1,prop2=val2". Properties are ordered
/// lexicographically so equal blocks always print the same.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)?;
        if self.properties.is_empty() {
            return Ok(());
        }

        let mut sep = "|";
        for (k, v) in &self.properties {
            write!(f, "{}{}={}", sep, k, v)?;
            sep = ",";
        }
        Ok(())
    }
}

pub fn strip_namespace(id: &str) -> &str {
    id.strip_prefix("minecraft:").unwrap_or(id)
}

pub fn is_air_id(id: &str) -> bool {
    AIR_IDS.contains(&strip_namespace(id))
}
