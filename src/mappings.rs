//! Static bidirectional lookups between the two identifier namespaces.
//!
//! Tables are built once at startup from JSON resources embedded in the
//! binary, are immutable afterwards, and are shared by every session
//! through the proxy context. A lookup never fails: unknown inputs fall
//! back to a documented placeholder so that a mismatched server and
//! client pair degrades visually instead of dropping the connection.

use ahash::AHashMap;
use anyhow::Context;
use serde::Deserialize;

/// All translation tables, loaded once per process.
pub struct Mappings {
    pub blocks: BlockTable,
    pub items: ItemTable,
    pub entities: EntityKindTable,
    pub biomes: BiomeTable,
    pub sounds: SoundTable,
    pub particles: ParticleTable,
}

impl Mappings {
    /// Builds every table from the embedded resources.
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            blocks: BlockTable::load().context("block table")?,
            items: ItemTable::load().context("item table")?,
            entities: EntityKindTable::load().context("entity table")?,
            biomes: BiomeTable::load().context("biome table")?,
            sounds: SoundTable::load().context("sound table")?,
            particles: ParticleTable::load().context("particle table")?,
        })
    }
}

// ---------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BlockEntry {
    java_name: String,
    java_state: i32,
    bedrock_name: String,
    #[allow(dead_code)]
    bedrock_state: serde_json::Value,
    bedrock_runtime_id: i32,
}

#[derive(Debug, Deserialize)]
struct BlockFile {
    fallback: BlockEntry,
    blocks: Vec<BlockEntry>,
}

/// Java block states (global palette ids) to Bedrock block runtime ids
/// and back. The fallback pair is the Bedrock "info update" placeholder
/// and the Java jigsaw block.
pub struct BlockTable {
    to_bedrock: AHashMap<i32, i32>,
    to_java: AHashMap<i32, i32>,
    names: AHashMap<i32, (String, String)>,
    fallback_bedrock: i32,
    fallback_java: i32,
}

impl BlockTable {
    fn load() -> anyhow::Result<Self> {
        let file: BlockFile = serde_json::from_str(include_str!("mappings/data/blocks.json"))?;

        let mut to_bedrock = AHashMap::new();
        let mut to_java = AHashMap::new();
        let mut names = AHashMap::new();
        for entry in file.blocks.iter().chain(std::iter::once(&file.fallback)) {
            to_bedrock.insert(entry.java_state, entry.bedrock_runtime_id);
            to_java.insert(entry.bedrock_runtime_id, entry.java_state);
            names.insert(
                entry.java_state,
                (entry.java_name.clone(), entry.bedrock_name.clone()),
            );
        }

        Ok(Self {
            to_bedrock,
            to_java,
            names,
            fallback_bedrock: file.fallback.bedrock_runtime_id,
            fallback_java: file.fallback.java_state,
        })
    }

    /// The Bedrock runtime id for a Java block state. Unknown states
    /// map to the "info update" placeholder.
    pub fn to_bedrock(&self, java_state: i32) -> i32 {
        self.to_bedrock
            .get(&java_state)
            .copied()
            .unwrap_or(self.fallback_bedrock)
    }

    /// The Java block state for a Bedrock runtime id. Unknown ids map
    /// to the Java-side sentinel.
    pub fn to_java(&self, bedrock_runtime_id: i32) -> i32 {
        self.to_java
            .get(&bedrock_runtime_id)
            .copied()
            .unwrap_or(self.fallback_java)
    }

    /// The Bedrock "info update" placeholder runtime id.
    pub fn fallback_bedrock(&self) -> i32 {
        self.fallback_bedrock
    }

    /// The Java-side sentinel state.
    pub fn fallback_java(&self) -> i32 {
        self.fallback_java
    }

    /// Namespaced names of a known Java state, for diagnostics.
    pub fn names(&self, java_state: i32) -> Option<(&str, &str)> {
        self.names
            .get(&java_state)
            .map(|(java, bedrock)| (java.as_str(), bedrock.as_str()))
    }

    pub fn known_java_states(&self) -> impl Iterator<Item = i32> + '_ {
        self.to_bedrock.keys().copied()
    }
}

// ---------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ItemEntry {
    #[allow(dead_code)]
    java_name: String,
    java_id: i32,
    bedrock_id: i32,
    bedrock_damage: i32,
}

#[derive(Debug, Deserialize)]
struct ItemFile {
    items: Vec<ItemEntry>,
}

/// A Bedrock item id plus its metadata/damage value. Several Java items
/// share one Bedrock id and differ only in damage (wool colors, dyes).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BedrockItem {
    pub id: i32,
    pub damage: i32,
}

/// Java item registry ids to Bedrock id/damage pairs and back.
/// Unknown items map to air.
pub struct ItemTable {
    to_bedrock: AHashMap<i32, BedrockItem>,
    to_java: AHashMap<BedrockItem, i32>,
}

impl ItemTable {
    fn load() -> anyhow::Result<Self> {
        let file: ItemFile = serde_json::from_str(include_str!("mappings/data/items.json"))?;

        let mut to_bedrock = AHashMap::new();
        let mut to_java = AHashMap::new();
        for entry in &file.items {
            let bedrock = BedrockItem {
                id: entry.bedrock_id,
                damage: entry.bedrock_damage,
            };
            to_bedrock.insert(entry.java_id, bedrock);
            to_java.insert(bedrock, entry.java_id);
        }

        Ok(Self {
            to_bedrock,
            to_java,
        })
    }

    /// Air, the empty fallback.
    pub const FALLBACK: BedrockItem = BedrockItem { id: 0, damage: 0 };

    pub fn to_bedrock(&self, java_id: i32) -> BedrockItem {
        self.to_bedrock
            .get(&java_id)
            .copied()
            .unwrap_or(Self::FALLBACK)
    }

    pub fn to_java(&self, bedrock: BedrockItem) -> i32 {
        self.to_java.get(&bedrock).copied().unwrap_or(0)
    }

    pub fn known_java_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.to_bedrock.keys().copied()
    }
}

// ---------------------------------------------------------------------
// Entity kinds
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EntityEntry {
    java_id: i32,
    #[allow(dead_code)]
    java_name: String,
    bedrock_identifier: String,
}

#[derive(Debug, Deserialize)]
struct EntityFile {
    fallback: EntityEntry,
    entities: Vec<EntityEntry>,
}

/// Java entity kind ids to Bedrock namespaced identifiers and back.
/// Unknown kinds render as an armor stand, which is inert.
pub struct EntityKindTable {
    to_bedrock: AHashMap<i32, String>,
    to_java: AHashMap<String, i32>,
    fallback: String,
}

impl EntityKindTable {
    fn load() -> anyhow::Result<Self> {
        let file: EntityFile = serde_json::from_str(include_str!("mappings/data/entities.json"))?;

        let mut to_bedrock = AHashMap::new();
        let mut to_java = AHashMap::new();
        for entry in &file.entities {
            to_bedrock.insert(entry.java_id, entry.bedrock_identifier.clone());
            to_java.insert(entry.bedrock_identifier.clone(), entry.java_id);
        }

        Ok(Self {
            to_bedrock,
            to_java,
            fallback: file.fallback.bedrock_identifier,
        })
    }

    pub fn to_bedrock(&self, java_kind: i32) -> &str {
        self.to_bedrock
            .get(&java_kind)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    pub fn to_java(&self, bedrock_identifier: &str) -> Option<i32> {
        self.to_java.get(bedrock_identifier).copied()
    }
}

// ---------------------------------------------------------------------
// Biomes
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BiomeEntry {
    #[serde(default)]
    #[allow(dead_code)]
    java_name: Option<String>,
    java_id: i32,
    bedrock_id: u8,
}

#[derive(Debug, Deserialize)]
struct BiomeFile {
    fallback: BiomeEntry,
    biomes: Vec<BiomeEntry>,
}

/// Java biome ids to Bedrock biome bytes and back. Unknown biomes map
/// to plains.
pub struct BiomeTable {
    to_bedrock: AHashMap<i32, u8>,
    to_java: AHashMap<u8, i32>,
    fallback_bedrock: u8,
    fallback_java: i32,
}

impl BiomeTable {
    fn load() -> anyhow::Result<Self> {
        let file: BiomeFile = serde_json::from_str(include_str!("mappings/data/biomes.json"))?;

        let mut to_bedrock = AHashMap::new();
        let mut to_java = AHashMap::new();
        for entry in &file.biomes {
            to_bedrock.insert(entry.java_id, entry.bedrock_id);
            to_java.insert(entry.bedrock_id, entry.java_id);
        }

        Ok(Self {
            to_bedrock,
            to_java,
            fallback_bedrock: file.fallback.bedrock_id,
            fallback_java: file.fallback.java_id,
        })
    }

    pub fn to_bedrock(&self, java_id: i32) -> u8 {
        self.to_bedrock
            .get(&java_id)
            .copied()
            .unwrap_or(self.fallback_bedrock)
    }

    pub fn to_java(&self, bedrock_id: u8) -> i32 {
        self.to_java
            .get(&bedrock_id)
            .copied()
            .unwrap_or(self.fallback_java)
    }
}

// ---------------------------------------------------------------------
// Sounds
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SoundEntry {
    java_name: String,
    bedrock_id: u32,
}

#[derive(Debug, Deserialize)]
struct SoundFile {
    sounds: Vec<SoundEntry>,
}

/// Java sound resource names to Bedrock level-sound-event ids.
/// Unknown sounds are simply not played.
pub struct SoundTable {
    to_bedrock: AHashMap<String, u32>,
    to_java: AHashMap<u32, String>,
}

impl SoundTable {
    fn load() -> anyhow::Result<Self> {
        let file: SoundFile = serde_json::from_str(include_str!("mappings/data/sounds.json"))?;

        let mut to_bedrock = AHashMap::new();
        let mut to_java = AHashMap::new();
        for entry in &file.sounds {
            to_bedrock.insert(entry.java_name.clone(), entry.bedrock_id);
            to_java.insert(entry.bedrock_id, entry.java_name.clone());
        }

        Ok(Self {
            to_bedrock,
            to_java,
        })
    }

    pub fn to_bedrock(&self, java_name: &str) -> Option<u32> {
        let stripped = java_name.strip_prefix("minecraft:").unwrap_or(java_name);
        self.to_bedrock.get(stripped).copied()
    }

    pub fn to_java(&self, bedrock_id: u32) -> Option<&str> {
        self.to_java.get(&bedrock_id).map(String::as_str)
    }
}

// ---------------------------------------------------------------------
// Particles
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ParticleEntry {
    #[allow(dead_code)]
    java_name: String,
    java_id: i32,
    bedrock_id: i32,
}

#[derive(Debug, Deserialize)]
struct ParticleFile {
    particles: Vec<ParticleEntry>,
}

/// Java particle ids to Bedrock level-event particle ids. Unknown
/// particles are simply not shown.
pub struct ParticleTable {
    to_bedrock: AHashMap<i32, i32>,
    to_java: AHashMap<i32, i32>,
}

impl ParticleTable {
    fn load() -> anyhow::Result<Self> {
        let file: ParticleFile =
            serde_json::from_str(include_str!("mappings/data/particles.json"))?;

        let mut to_bedrock = AHashMap::new();
        let mut to_java = AHashMap::new();
        for entry in &file.particles {
            to_bedrock.insert(entry.java_id, entry.bedrock_id);
            to_java.insert(entry.bedrock_id, entry.java_id);
        }

        Ok(Self {
            to_bedrock,
            to_java,
        })
    }

    pub fn to_bedrock(&self, java_id: i32) -> Option<i32> {
        self.to_bedrock.get(&java_id).copied()
    }

    pub fn to_java(&self, bedrock_id: i32) -> Option<i32> {
        self.to_java.get(&bedrock_id).copied()
    }
}

// ---------------------------------------------------------------------
// Dimensions and gamemodes
// ---------------------------------------------------------------------

/// Java dimension ids are signed (-1 nether, 0 overworld, 1 end);
/// Bedrock enumerates them (0 overworld, 1 nether, 2 end). Unknown
/// dimensions fall back to the overworld.
pub fn dimension_to_bedrock(java: i32) -> i32 {
    match java {
        -1 => 1,
        0 => 0,
        1 => 2,
        _ => 0,
    }
}

pub fn dimension_to_java(bedrock: i32) -> i32 {
    match bedrock {
        1 => -1,
        0 => 0,
        2 => 1,
        _ => 0,
    }
}

/// Gamemode ids line up numerically; Bedrock's 3 is its spectator-like
/// creative viewer mode. Unknown modes fall back to survival.
pub fn gamemode_to_bedrock(java: i32) -> i32 {
    match java {
        0..=3 => java,
        _ => 0,
    }
}

pub fn gamemode_to_java(bedrock: i32) -> i32 {
    match bedrock {
        0..=3 => bedrock,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mappings() -> Mappings {
        Mappings::load().expect("embedded tables must parse")
    }

    #[test]
    fn block_round_trip_law_holds_for_every_known_state() {
        let mappings = mappings();
        for state in mappings.blocks.known_java_states().collect::<Vec<_>>() {
            let bedrock = mappings.blocks.to_bedrock(state);
            assert_eq!(
                mappings.blocks.to_java(bedrock),
                state,
                "state {state} does not round trip"
            );
        }
    }

    #[test]
    fn unknown_block_maps_to_sentinel_on_both_sides() {
        let mappings = mappings();
        assert_eq!(
            mappings.blocks.to_bedrock(999_999),
            mappings.blocks.fallback_bedrock()
        );
        assert_eq!(
            mappings.blocks.to_java(999_999),
            mappings.blocks.fallback_java()
        );
        // The sentinel pair itself round trips.
        let sentinel = mappings.blocks.fallback_java();
        let bedrock = mappings.blocks.to_bedrock(sentinel);
        assert_eq!(bedrock, mappings.blocks.fallback_bedrock());
        assert_eq!(mappings.blocks.to_java(bedrock), sentinel);
    }

    #[test]
    fn item_damage_values_disambiguate() {
        let mappings = mappings();
        let charcoal = mappings.items.to_bedrock(575);
        assert_eq!(charcoal, BedrockItem { id: 263, damage: 1 });
        let coal = mappings.items.to_bedrock(574);
        assert_eq!(coal, BedrockItem { id: 263, damage: 0 });
        assert_eq!(mappings.items.to_java(charcoal), 575);
        assert_eq!(mappings.items.to_java(coal), 574);
    }

    #[test]
    fn unknown_item_is_air() {
        let mappings = mappings();
        assert_eq!(mappings.items.to_bedrock(123_456), ItemTable::FALLBACK);
        assert_eq!(
            mappings.items.to_java(BedrockItem {
                id: 9999,
                damage: 0
            }),
            0
        );
    }

    #[test]
    fn item_round_trip_law_holds_for_every_known_id() {
        let mappings = mappings();
        for java_id in mappings.items.known_java_ids().collect::<Vec<_>>() {
            let bedrock = mappings.items.to_bedrock(java_id);
            assert_eq!(mappings.items.to_java(bedrock), java_id);
        }
    }

    #[test]
    fn unknown_entity_kind_uses_documented_default() {
        let mappings = mappings();
        assert_eq!(mappings.entities.to_bedrock(98), "minecraft:zombie");
        assert_eq!(mappings.entities.to_bedrock(12345), "minecraft:armor_stand");
        assert_eq!(mappings.entities.to_java("minecraft:zombie"), Some(98));
    }

    #[test]
    fn dimension_mapping_is_inverse() {
        for java in [-1, 0, 1] {
            assert_eq!(dimension_to_java(dimension_to_bedrock(java)), java);
        }
        assert_eq!(dimension_to_bedrock(7), 0);
    }

    #[test]
    fn gamemode_mapping_is_inverse() {
        for mode in 0..=3 {
            assert_eq!(gamemode_to_java(gamemode_to_bedrock(mode)), mode);
        }
        assert_eq!(gamemode_to_bedrock(42), 0);
    }

    #[test]
    fn biome_fallback_is_plains() {
        let mappings = mappings();
        assert_eq!(mappings.biomes.to_bedrock(1), 1);
        assert_eq!(mappings.biomes.to_bedrock(200), 1);
        assert_eq!(mappings.biomes.to_java(200), 1);
    }

    #[test]
    fn sound_lookup_strips_namespace() {
        let mappings = mappings();
        assert_eq!(
            mappings.sounds.to_bedrock("minecraft:entity.player.levelup"),
            Some(75)
        );
        assert_eq!(mappings.sounds.to_bedrock("entity.player.levelup"), Some(75));
        assert_eq!(mappings.sounds.to_bedrock("no.such.sound"), None);
        assert_eq!(mappings.sounds.to_java(75), Some("entity.player.levelup"));
    }

    #[test]
    fn particle_lookup_is_bidirectional() {
        let mappings = mappings();
        assert_eq!(mappings.particles.to_bedrock(4), Some(1));
        assert_eq!(mappings.particles.to_java(1), Some(4));
        assert_eq!(mappings.particles.to_bedrock(9999), None);
    }
}
