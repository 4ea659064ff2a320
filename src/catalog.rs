//! Reference material catalog
//!
//! Hosts normally resolve material names against their own registry. This
//! catalog matches names the way server admins type them and backs the
//! console binary when no game server is attached.

use crate::host::ResourceCatalog;
use crate::registry::ResourceId;
use indexmap::IndexSet;

/// Materials known to the console catalog out of the box
pub const VANILLA_MATERIALS: &[&str] = &[
    "STONE",
    "COBBLESTONE",
    "SAND",
    "RED_SAND",
    "GRAVEL",
    "CLAY_BALL",
    "OAK_LOG",
    "OAK_PLANKS",
    "STICK",
    "CHARCOAL",
    "COAL",
    "COAL_BLOCK",
    "COAL_ORE",
    "IRON_ORE",
    "RAW_IRON",
    "IRON_INGOT",
    "IRON_BLOCK",
    "GOLD_ORE",
    "RAW_GOLD",
    "GOLD_INGOT",
    "GOLD_BLOCK",
    "COPPER_ORE",
    "RAW_COPPER",
    "COPPER_INGOT",
    "DIAMOND_ORE",
    "DIAMOND",
    "DIAMOND_BLOCK",
    "EMERALD",
    "LAPIS_LAZULI",
    "REDSTONE",
    "ANCIENT_DEBRIS",
    "NETHERITE_SCRAP",
    "NETHERITE_INGOT",
    "GLASS",
    "CACTUS",
    "KELP",
    "DRIED_KELP_BLOCK",
    "BLAZE_ROD",
    "LAVA_BUCKET",
    "BEEF",
    "PORKCHOP",
    "CHICKEN",
    "POTATO",
    "TNT",
    "TNT_MINECART",
    "END_CRYSTAL",
    "BEACON",
    "ENCHANTING_TABLE",
    "ANVIL",
    "DIAMOND_SWORD",
    "DIAMOND_PICKAXE",
    "NETHERITE_SWORD",
    "GOLDEN_APPLE",
    "BOW",
    "ARROW",
    "FLINT_AND_STEEL",
    "FIRE_CHARGE",
    "SHULKER_BOX",
    "RESPAWN_ANCHOR",
    "HOPPER",
];

/// Name-matching catalog over a fixed material list
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    materials: IndexSet<String>,
}

impl MaterialCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let materials = names
            .into_iter()
            .map(|name| canonicalize(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        Self { materials }
    }

    /// Catalog of the common vanilla materials
    #[must_use]
    pub fn vanilla() -> Self {
        Self::new(VANILLA_MATERIALS)
    }

    /// Add extra material names, e.g. modded items from the config file
    #[must_use]
    pub fn with_extra<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.materials.extend(
            names
                .into_iter()
                .map(|name| canonicalize(name.as_ref()))
                .filter(|name| !name.is_empty()),
        );
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl ResourceCatalog for MaterialCatalog {
    fn resolve(&self, name: &str) -> Option<ResourceId> {
        let canonical = canonicalize(name);
        self.materials
            .get(&canonical)
            .map(|known| ResourceId::new(known.clone()))
    }

    fn display_name(&self, id: &ResourceId) -> String {
        id.as_str()
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let lower = word.to_ascii_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `minecraft:iron ore`, `Iron-Ore` and `IRON_ORE` all become `IRON_ORE`
fn canonicalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let unprefixed = match trimmed.get(..10) {
        Some(prefix) if prefix.eq_ignore_ascii_case("minecraft:") => &trimmed[10..],
        _ => trimmed,
    };
    unprefixed
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join("_")
}
