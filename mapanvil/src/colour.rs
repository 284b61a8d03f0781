use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::{PoisonError, RwLock};

use fnv::FnvHasher;
use log::debug;
use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{strip_namespace, Rgba};

/// Colour of air and its variants. Nothing is drawn for them.
pub const TRANSPARENT: Rgba = [255, 255, 255, 0];

/// Colour of columns in chunks the region does not contain.
pub const NONE_COLOUR: Rgba = [24, 24, 32, 255];

/// Palette can be used to take a block id to produce a colour that it should
/// render to.
pub trait Palette {
    fn pick(&self, block_id: &str) -> Rgba;
}

/// Block colours supplied from outside, typically averaged from the game's
/// textures. Keys may or may not carry a namespace.
#[derive(Debug, Clone, Default)]
pub struct TextureColors {
    colors: HashMap<String, Rgba>,
}

impl TextureColors {
    pub fn new(colors: HashMap<String, Rgba>) -> Self {
        Self { colors }
    }

    /// Load a JSON object mapping block ids to `[r, g, b, a]`.
    #[cfg(feature = "render")]
    pub fn from_json_reader(reader: impl std::io::Read) -> Result<Self, TextureError> {
        let colors: HashMap<String, Rgba> =
            serde_json::from_reader(reader).map_err(TextureError::new)?;
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Look `id` up with its namespace first, then without. Ids lacking a
    /// namespace are tried as `minecraft:` ids first.
    pub fn get(&self, id: &str) -> Option<Rgba> {
        let bare = strip_namespace(id);
        let full = if id.contains(':') {
            None
        } else {
            self.colors.get(&format!("minecraft:{}", id))
        };

        full.or_else(|| self.colors.get(id))
            .or_else(|| self.colors.get(bare))
            .copied()
    }
}

impl FromIterator<(String, Rgba)> for TextureColors {
    fn from_iter<T: IntoIterator<Item = (String, Rgba)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug)]
pub struct TextureError(String);

impl TextureError {
    #[cfg(feature = "render")]
    fn new(err: impl std::error::Error) -> TextureError {
        Self(err.to_string())
    }
}

impl std::fmt::Display for TextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TextureError {}

/// Turns block ids into colours.
///
/// Lookup goes through the texture table if there is one, then a built in
/// table of common blocks, then rules mapping shapes like stairs and slabs
/// onto their material, then any built in id contained in the id. Anything
/// still unknown gets a colour derived from a hash of its id, so it is
/// stable between runs.
///
/// Results are cached. The resolver is `Sync`, one instance can serve every
/// render thread.
#[derive(Debug, Default)]
pub struct ColorResolver {
    textures: Option<TextureColors>,
    cache: RwLock<HashMap<String, Rgba>>,
}

impl ColorResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_textures(textures: TextureColors) -> Self {
        Self {
            textures: Some(textures),
            cache: Default::default(),
        }
    }

    /// Swap the texture table. Cached colours are dropped since they may have
    /// come from the old table.
    pub fn replace_textures(&mut self, textures: Option<TextureColors>) {
        self.textures = textures;
        self.clear_cache();
    }

    pub fn textures(&self) -> Option<&TextureColors> {
        self.textures.as_ref()
    }

    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn resolve(&self, id: &str) -> Rgba {
        if let Some(c) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
        {
            return *c;
        }

        let colour = self.compute(id);

        // Two threads may race to fill the same id. They compute the same
        // colour, so either write is fine.
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_owned(), colour);

        colour
    }

    fn compute(&self, id: &str) -> Rgba {
        let bare = strip_namespace(id);

        match bare {
            "air" | "cave_air" | "void_air" => return TRANSPARENT,
            "none" => return NONE_COLOUR,
            _ => {}
        }

        if let Some(c) = self.textures.as_ref().and_then(|t| t.get(id)) {
            return c;
        }

        if let Some(c) = BLOCK_COLOURS.get(bare) {
            return *c;
        }

        if let Some(c) = shape_colour(bare) {
            return c;
        }

        if let Some((_, c)) = BY_LENGTH.iter().find(|(key, _)| bare.contains(key)) {
            return *c;
        }

        debug!("no colour for {}, using a generated one", id);
        fallback_colour(id)
    }
}

impl Palette for ColorResolver {
    fn pick(&self, block_id: &str) -> Rgba {
        self.resolve(block_id)
    }
}

/// Suffixes of block shapes that take the colour of the material they are
/// made from, eg `spruce_stairs` from `spruce_planks`.
const SHAPES: &[&str] = &[
    "_stairs",
    "_slab",
    "_fence_gate",
    "_fence",
    "_trapdoor",
    "_door",
    "_pressure_plate",
    "_button",
    "_carpet",
    "_wall",
];

fn shape_colour(id: &str) -> Option<Rgba> {
    let base = SHAPES.iter().find_map(|s| id.strip_suffix(s))?;

    [
        base.to_owned(),
        format!("{}_planks", base),
        format!("{}s", base),
        format!("{}_wool", base),
        format!("{}_block", base),
    ]
    .iter()
    .find_map(|candidate| BLOCK_COLOURS.get(candidate.as_str()).copied())
}

/// Colour for an id nothing else knows about. Channels stay in 55..255 so
/// generated colours are never close to black.
pub fn fallback_colour(id: &str) -> Rgba {
    let mut hasher = FnvHasher::default();
    hasher.write(id.as_bytes());
    let mut rng = ChaCha8Rng::seed_from_u64(hasher.finish());

    [
        rng.gen_range(55..255),
        rng.gen_range(55..255),
        rng.gen_range(55..255),
        255,
    ]
}

static BLOCK_COLOURS: Lazy<HashMap<&'static str, Rgba>> =
    Lazy::new(|| BUILTIN.iter().copied().collect());

/// Built in ids, longest first, for matching ids that contain one of them.
/// Ties are broken alphabetically so the match never depends on hashing.
static BY_LENGTH: Lazy<Vec<(&'static str, Rgba)>> = Lazy::new(|| {
    let mut keys: Vec<_> = BUILTIN.to_vec();
    keys.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then(a.cmp(b)));
    keys
});

#[rustfmt::skip]
const BUILTIN: &[(&str, Rgba)] = &[
    // stone
    ("stone", [127, 127, 127, 255]),
    ("cobblestone", [110, 110, 110, 255]),
    ("mossy_cobblestone", [101, 118, 92, 255]),
    ("granite", [154, 123, 100, 255]),
    ("diorite", [207, 207, 207, 255]),
    ("andesite", [138, 138, 138, 255]),
    ("deepslate", [80, 80, 82, 255]),
    ("tuff", [108, 109, 102, 255]),
    ("calcite", [223, 224, 220, 255]),
    ("stone_bricks", [122, 122, 122, 255]),
    ("bricks", [150, 97, 83, 255]),
    ("nether_bricks", [44, 21, 26, 255]),
    ("sandstone", [219, 207, 142, 255]),
    ("red_sandstone", [189, 106, 55, 255]),
    ("quartz_block", [235, 229, 222, 255]),
    ("purpur_block", [169, 125, 169, 255]),
    ("bedrock", [10, 10, 10, 255]),
    ("obsidian", [21, 18, 30, 255]),
    ("terracotta", [152, 94, 67, 255]),

    // ores
    ("coal_ore", [46, 46, 46, 255]),
    ("iron_ore", [197, 145, 106, 255]),
    ("gold_ore", [252, 222, 112, 255]),
    ("diamond_ore", [93, 236, 245, 255]),
    ("emerald_ore", [23, 221, 98, 255]),
    ("lapis_ore", [22, 64, 201, 255]),
    ("redstone_ore", [255, 0, 0, 255]),
    ("iron_block", [191, 191, 191, 255]),
    ("gold_block", [246, 208, 61, 255]),
    ("redstone_block", [255, 0, 0, 255]),

    // soil
    ("dirt", [139, 111, 63, 255]),
    ("coarse_dirt", [119, 85, 59, 255]),
    ("grass_block", [85, 174, 58, 255]),
    ("podzol", [106, 67, 27, 255]),
    ("mycelium", [126, 108, 140, 255]),
    ("mud", [60, 57, 60, 255]),
    ("clay", [160, 166, 179, 255]),
    ("farmland", [110, 75, 45, 255]),
    ("dirt_path", [148, 121, 65, 255]),
    ("sand", [219, 207, 142, 255]),
    ("red_sand", [189, 106, 55, 255]),
    ("gravel", [150, 141, 125, 255]),

    // wood
    ("oak_log", [188, 152, 98, 255]),
    ("spruce_log", [109, 84, 59, 255]),
    ("birch_log", [215, 203, 143, 255]),
    ("jungle_log", [151, 114, 80, 255]),
    ("acacia_log", [169, 88, 33, 255]),
    ("dark_oak_log", [76, 51, 25, 255]),
    ("mangrove_log", [102, 48, 42, 255]),
    ("oak_planks", [162, 130, 78, 255]),
    ("spruce_planks", [114, 84, 48, 255]),
    ("birch_planks", [196, 177, 123, 255]),
    ("jungle_planks", [160, 115, 80, 255]),
    ("acacia_planks", [168, 90, 50, 255]),
    ("dark_oak_planks", [66, 43, 20, 255]),
    ("mangrove_planks", [117, 54, 48, 255]),
    ("cherry_planks", [226, 178, 172, 255]),
    ("bamboo_planks", [193, 173, 80, 255]),
    ("crimson_planks", [101, 48, 70, 255]),
    ("warped_planks", [43, 104, 99, 255]),

    // leaves
    ("oak_leaves", [42, 132, 39, 255]),
    ("spruce_leaves", [23, 89, 44, 255]),
    ("birch_leaves", [115, 197, 72, 255]),
    ("jungle_leaves", [34, 130, 31, 255]),
    ("acacia_leaves", [95, 175, 53, 255]),
    ("dark_oak_leaves", [32, 92, 22, 255]),
    ("mangrove_leaves", [69, 128, 38, 255]),
    ("pale_oak_leaves", [85, 140, 75, 255]),
    ("azalea_leaves", [90, 115, 44, 255]),

    // fluids, ice and snow
    ("water", [60, 68, 170, 255]),
    ("lava", [234, 92, 15, 255]),
    ("ice", [160, 233, 255, 255]),
    ("packed_ice", [141, 180, 250, 255]),
    ("snow", [255, 255, 255, 255]),
    ("snow_block", [243, 244, 251, 255]),

    // plants
    ("grass", [88, 169, 47, 255]),
    ("short_grass", [88, 169, 47, 255]),
    ("tall_grass", [94, 174, 49, 255]),
    ("fern", [82, 139, 62, 255]),
    ("large_fern", [82, 139, 62, 255]),
    ("dandelion", [255, 236, 79, 255]),
    ("poppy", [237, 48, 44, 255]),
    ("kelp", [87, 130, 42, 255]),
    ("seagrass", [51, 122, 23, 255]),
    ("lily_pad", [32, 128, 48, 255]),
    ("cactus", [85, 127, 43, 255]),
    ("sugar_cane", [148, 192, 101, 255]),
    ("moss_block", [89, 109, 45, 255]),

    // nether and end
    ("netherrack", [114, 58, 57, 255]),
    ("soul_sand", [85, 67, 54, 255]),
    ("glowstone", [254, 217, 63, 255]),
    ("end_stone", [219, 222, 158, 255]),

    // wool
    ("white_wool", [249, 255, 254, 255]),
    ("orange_wool", [249, 128, 29, 255]),
    ("magenta_wool", [199, 78, 189, 255]),
    ("light_blue_wool", [58, 179, 218, 255]),
    ("yellow_wool", [254, 216, 61, 255]),
    ("lime_wool", [128, 199, 31, 255]),
    ("pink_wool", [243, 139, 170, 255]),
    ("gray_wool", [71, 79, 82, 255]),
    ("light_gray_wool", [157, 157, 151, 255]),
    ("cyan_wool", [22, 156, 156, 255]),
    ("purple_wool", [137, 50, 184, 255]),
    ("blue_wool", [60, 68, 170, 255]),
    ("brown_wool", [131, 84, 50, 255]),
    ("green_wool", [94, 124, 22, 255]),
    ("red_wool", [176, 46, 38, 255]),
    ("black_wool", [29, 29, 33, 255]),

    // containers and workstations
    ("chest", [162, 130, 78, 255]),
    ("ender_chest", [21, 18, 30, 255]),
    ("shulker_box", [139, 90, 181, 255]),
    ("barrel", [114, 84, 48, 255]),
    ("furnace", [127, 127, 127, 255]),
    ("blast_furnace", [107, 107, 107, 255]),
    ("smoker", [97, 97, 97, 255]),
    ("crafting_table", [162, 130, 78, 255]),

    // redstone
    ("redstone_wire", [255, 0, 0, 255]),
    ("redstone_torch", [255, 0, 0, 255]),
    ("repeater", [127, 127, 127, 255]),
    ("comparator", [127, 127, 127, 255]),
    ("lever", [127, 127, 127, 255]),
    ("flower_pot", [139, 111, 63, 255]),
];
