//! # Chunk System
//!
//! World data is organized into fixed-size chunks.
//!
//! ## Chunk Format
//!
//! Chunks are 16x16x256 blocks (width x length x height), `y = 0` at the
//! bottom. Each block is a `(id, meta)` pair of `u16`s.
//!
//! ## Lifecycle
//!
//! - [`BlockVolume`]: raw blocks, owned by one generate-phase call
//! - [`BiomeArea`]: per-column biomes for the same footprint
//! - [`Chunk`]: both of the above plus height map, sky light, spawn markers
//!   and pending gravity updates, handed to the decoration phase and the sink

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::biome::{BiomeType, Species};
use crate::physics;

/// Chunk width/length in blocks.
pub const CHUNK_SIZE: usize = 16;

/// Chunk height in blocks.
pub const CHUNK_HEIGHT: usize = 256;

/// Columns per chunk.
pub const COLUMNS_PER_CHUNK: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Total blocks per chunk.
pub const BLOCKS_PER_CHUNK: usize = COLUMNS_PER_CHUNK * CHUNK_HEIGHT;

/// Maximum sky light level.
pub const MAX_LIGHT: u8 = 15;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_SIZE as i32),
            z: block_z.div_euclid(CHUNK_SIZE as i32),
        }
    }

    /// Returns the world X coordinate of the chunk's origin (corner).
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i32 {
        self.x * CHUNK_SIZE as i32
    }

    /// Returns the world Z coordinate of the chunk's origin.
    #[inline]
    #[must_use]
    pub const fn world_z(self) -> i32 {
        self.z * CHUNK_SIZE as i32
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// A single block state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Block {
    /// Block type ID.
    pub id: u16,
    /// Block metadata (variant, layer count, etc.).
    #[serde(default)]
    pub meta: u16,
}

impl Block {
    /// Air block (empty).
    pub const AIR: Self = Self::new(0);
    /// Stone block.
    pub const STONE: Self = Self::new(1);
    /// Grass block.
    pub const GRASS: Self = Self::new(2);
    /// Dirt block.
    pub const DIRT: Self = Self::new(3);
    /// Cobblestone block.
    pub const COBBLESTONE: Self = Self::new(4);
    /// Wooden planks.
    pub const PLANKS: Self = Self::new(5);
    /// Bedrock block.
    pub const BEDROCK: Self = Self::new(7);
    /// Water block.
    pub const WATER: Self = Self::new(9);
    /// Lava block.
    pub const LAVA: Self = Self::new(11);
    /// Sand block.
    pub const SAND: Self = Self::new(12);
    /// Gravel block.
    pub const GRAVEL: Self = Self::new(13);
    /// Log block; meta selects the wood kind.
    pub const LOG: Self = Self::new(17);
    /// Leaves block; meta selects the wood kind.
    pub const LEAVES: Self = Self::new(18);
    /// Sandstone block.
    pub const SANDSTONE: Self = Self::new(24);
    /// Tall grass plant.
    pub const TALL_GRASS: Self = Self::with_meta(31, 1);
    /// Dead bush plant.
    pub const DEAD_BUSH: Self = Self::new(32);
    /// Mossy cobblestone block.
    pub const MOSSY_COBBLESTONE: Self = Self::new(48);
    /// Monster spawner block.
    pub const MOB_SPAWNER: Self = Self::new(52);
    /// Single snow layer.
    pub const SNOW_LAYER: Self = Self::new(78);
    /// Ice block.
    pub const ICE: Self = Self::new(79);
    /// Hardened clay, used by mesas.
    pub const HARDENED_CLAY: Self = Self::new(172);

    /// Creates a new block with given ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self { id, meta: 0 }
    }

    /// Creates a block with ID and metadata.
    #[inline]
    #[must_use]
    pub const fn with_meta(id: u16, meta: u16) -> Self {
        Self { id, meta }
    }

    /// Returns true if this is an air block.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.id == 0
    }

    /// Returns true for water and lava.
    #[inline]
    #[must_use]
    pub const fn is_liquid(self) -> bool {
        self.id == Self::WATER.id || self.id == Self::LAVA.id
    }

    /// Returns true for plants and snow layers, which don't block movement.
    #[inline]
    #[must_use]
    pub const fn is_replaceable(self) -> bool {
        matches!(self.id, 31 | 32 | 78)
    }

    /// Returns true for blocks that occupy their whole cell.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !self.is_air() && !self.is_liquid() && !self.is_replaceable()
    }

    /// Returns true for blocks affected by gravity.
    #[inline]
    #[must_use]
    pub const fn is_falling(self) -> bool {
        self.id == Self::SAND.id || self.id == Self::GRAVEL.id
    }

    /// Same block type, any metadata.
    #[inline]
    #[must_use]
    pub const fn same_type(self, other: Self) -> bool {
        self.id == other.id
    }

    /// How much sky light this block absorbs.
    #[inline]
    #[must_use]
    pub const fn light_opacity(self) -> u8 {
        if self.is_air() || self.is_replaceable() {
            0
        } else if self.id == Self::LEAVES.id || self.id == Self::ICE.id {
            1
        } else if self.id == Self::WATER.id {
            3
        } else {
            MAX_LIGHT
        }
    }
}

#[inline]
const fn block_index(x: usize, y: usize, z: usize) -> usize {
    (y * CHUNK_SIZE + z) * CHUNK_SIZE + x
}

#[inline]
const fn in_bounds(x: usize, y: usize, z: usize) -> bool {
    x < CHUNK_SIZE && y < CHUNK_HEIGHT && z < CHUNK_SIZE
}

/// Raw 16x16x256 block storage.
///
/// Reads outside the volume return air, writes outside it are ignored.
#[derive(Clone, PartialEq, Eq)]
pub struct BlockVolume {
    /// Indexed as `[y][z][x]`.
    blocks: Box<[Block]>,
}

impl BlockVolume {
    /// Creates a volume full of air.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::AIR; BLOCKS_PER_CHUNK].into_boxed_slice(),
        }
    }

    /// Gets a block at local coordinates.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Block {
        if in_bounds(x, y, z) {
            self.blocks[block_index(x, y, z)]
        } else {
            Block::AIR
        }
    }

    /// Sets a block at local coordinates.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: Block) {
        if in_bounds(x, y, z) {
            self.blocks[block_index(x, y, z)] = block;
        }
    }

    /// All blocks in `[y][z][x]` order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Block] {
        &self.blocks
    }

    /// Raw bytes for storage.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks[..])
    }

    /// Rebuilds a volume from [`as_bytes`](Self::as_bytes) output.
    ///
    /// Returns `None` when the length is wrong.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::data_size() {
            return None;
        }
        // The input may not be aligned for `Block`.
        let blocks: Vec<Block> = bytes
            .chunks_exact(std::mem::size_of::<Block>())
            .map(bytemuck::pod_read_unaligned)
            .collect();
        Some(Self {
            blocks: blocks.into_boxed_slice(),
        })
    }

    /// Raw block data size in bytes (uncompressed).
    #[must_use]
    pub const fn data_size() -> usize {
        BLOCKS_PER_CHUNK * std::mem::size_of::<Block>()
    }

    /// Counts blocks of the given type.
    #[must_use]
    pub fn count(&self, block: Block) -> usize {
        self.blocks.iter().filter(|b| b.same_type(block)).count()
    }
}

impl Default for BlockVolume {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BlockVolume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockVolume")
            .field("non_air", &(BLOCKS_PER_CHUNK - self.count(Block::AIR)))
            .finish()
    }
}

/// Per-column biomes over one chunk footprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiomeArea {
    coord: ChunkCoord,
    /// Indexed as `[z][x]`.
    biomes: [BiomeType; COLUMNS_PER_CHUNK],
}

impl BiomeArea {
    /// Creates an area filled with `fill`.
    #[must_use]
    pub const fn new(coord: ChunkCoord, fill: BiomeType) -> Self {
        Self {
            coord,
            biomes: [fill; COLUMNS_PER_CHUNK],
        }
    }

    /// The chunk this area covers.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Biome at a local column. Out-of-range columns are clamped.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, z: usize) -> BiomeType {
        let x = x.min(CHUNK_SIZE - 1);
        let z = z.min(CHUNK_SIZE - 1);
        self.biomes[z * CHUNK_SIZE + x]
    }

    /// Sets the biome at a local column.
    #[inline]
    pub fn set(&mut self, x: usize, z: usize, biome: BiomeType) {
        if x < CHUNK_SIZE && z < CHUNK_SIZE {
            self.biomes[z * CHUNK_SIZE + x] = biome;
        }
    }

    /// Distinct biomes in first-seen order, scanning x-major.
    #[must_use]
    pub fn unique(&self) -> Vec<BiomeType> {
        let mut unique = Vec::new();
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let biome = self.get(x, z);
                if !unique.contains(&biome) {
                    unique.push(biome);
                }
            }
        }
        unique
    }

    /// Raw biome array in `[z][x]` order.
    #[inline]
    #[must_use]
    pub const fn as_array(&self) -> &[BiomeType; COLUMNS_PER_CHUNK] {
        &self.biomes
    }
}

/// A creature spawn recorded for the host's entity system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySpawn {
    /// What to spawn.
    pub species: Species,
    /// World X (block center).
    pub x: f64,
    /// Y of the block the creature stands in.
    pub y: f64,
    /// World Z (block center).
    pub z: f64,
}

/// A block waiting for a gravity update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScheduledUpdate {
    /// Local X.
    pub x: u8,
    /// Y level.
    pub y: u8,
    /// Local Z.
    pub z: u8,
}

/// An assembled chunk.
#[derive(Clone)]
pub struct Chunk {
    /// Chunk position in the world.
    pub coord: ChunkCoord,
    blocks: BlockVolume,
    biomes: [BiomeType; COLUMNS_PER_CHUNK],
    /// Lowest y above which the column is open to the sky, `[z][x]`.
    height_map: [u16; COLUMNS_PER_CHUNK],
    /// Per block, same layout as the volume.
    sky_light: Box<[u8]>,
    entity_spawns: Vec<EntitySpawn>,
    scheduled_updates: Vec<ScheduledUpdate>,
    /// Whether the decoration phase has run.
    pub populated: bool,
}

impl Chunk {
    /// Assembles a chunk from a finished volume and its biome area.
    #[must_use]
    pub fn from_parts(coord: ChunkCoord, blocks: BlockVolume, biomes: &BiomeArea) -> Self {
        Self {
            coord,
            blocks,
            biomes: *biomes.as_array(),
            height_map: [0; COLUMNS_PER_CHUNK],
            sky_light: vec![0; BLOCKS_PER_CHUNK].into_boxed_slice(),
            entity_spawns: Vec::new(),
            scheduled_updates: Vec::new(),
            populated: false,
        }
    }

    /// Creates an empty chunk of a single biome.
    #[must_use]
    pub fn empty(coord: ChunkCoord, biome: BiomeType) -> Self {
        Self::from_parts(coord, BlockVolume::new(), &BiomeArea::new(coord, biome))
    }

    /// Gets a block at local coordinates.
    #[inline]
    #[must_use]
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks.get(x, y, z)
    }

    /// Sets a block at local coordinates.
    ///
    /// Falling blocks placed over air schedule a gravity update unless
    /// gravity is currently suppressed.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: Block) {
        if !in_bounds(x, y, z) {
            return;
        }
        self.blocks.set(x, y, z, block);

        let column = z * CHUNK_SIZE + x;
        let top = usize::from(self.height_map[column]);
        if block.light_opacity() > 0 {
            if y >= top {
                self.height_map[column] = y as u16 + 1;
            }
        } else if y + 1 == top {
            // The top opaque block was cleared; drop to the next one down.
            let below = (0..y)
                .rev()
                .find(|&below| self.blocks.get(x, below, z).light_opacity() > 0)
                .map_or(0, |below| below + 1);
            self.height_map[column] = below as u16;
        }

        if block.is_falling()
            && y > 0
            && !self.blocks.get(x, y - 1, z).is_solid()
            && !physics::gravity_suppressed()
        {
            self.scheduled_updates.push(ScheduledUpdate {
                x: x as u8,
                y: y as u8,
                z: z as u8,
            });
        }
    }

    /// Borrow of the block volume.
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &BlockVolume {
        &self.blocks
    }

    /// Biome at a local column.
    #[inline]
    #[must_use]
    pub fn biome(&self, x: usize, z: usize) -> BiomeType {
        let x = x.min(CHUNK_SIZE - 1);
        let z = z.min(CHUNK_SIZE - 1);
        self.biomes[z * CHUNK_SIZE + x]
    }

    /// Biome ids in `[z][x]` order.
    #[must_use]
    pub fn biome_ids(&self) -> [u8; COLUMNS_PER_CHUNK] {
        let mut ids = [0; COLUMNS_PER_CHUNK];
        for (id, biome) in ids.iter_mut().zip(self.biomes.iter()) {
            *id = biome.id();
        }
        ids
    }

    /// Number of biome entries (always 256).
    #[inline]
    #[must_use]
    pub const fn biome_count(&self) -> usize {
        self.biomes.len()
    }

    /// Y of the topmost solid or liquid block in a column.
    #[must_use]
    pub fn top_solid_or_liquid(&self, x: usize, z: usize) -> Option<usize> {
        (0..CHUNK_HEIGHT).rev().find(|&y| {
            let block = self.blocks.get(x, y, z);
            (block.is_solid() || block.is_liquid()) && !block.same_type(Block::LEAVES)
        })
    }

    /// Lowest y open to the sky.
    #[inline]
    #[must_use]
    pub fn height(&self, x: usize, z: usize) -> usize {
        if x < CHUNK_SIZE && z < CHUNK_SIZE {
            usize::from(self.height_map[z * CHUNK_SIZE + x])
        } else {
            0
        }
    }

    /// Sky light at a block.
    #[inline]
    #[must_use]
    pub fn sky_light(&self, x: usize, y: usize, z: usize) -> u8 {
        if in_bounds(x, y, z) {
            self.sky_light[block_index(x, y, z)]
        } else {
            MAX_LIGHT
        }
    }

    /// Recomputes the height map and straight-down sky light.
    pub fn generate_skylight_map(&mut self) {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let mut light = MAX_LIGHT;
                let mut height = 0;
                for y in (0..CHUNK_HEIGHT).rev() {
                    let block = self.blocks.get(x, y, z);
                    let opacity = block.light_opacity();
                    if opacity > 0 && height == 0 {
                        height = y + 1;
                    }
                    light = light.saturating_sub(opacity);
                    self.sky_light[block_index(x, y, z)] = light;
                }
                self.height_map[z * CHUNK_SIZE + x] = height as u16;
            }
        }
    }

    /// Records a creature spawn.
    pub fn add_entity_spawn(&mut self, spawn: EntitySpawn) {
        self.entity_spawns.push(spawn);
    }

    /// Creature spawns recorded so far.
    #[must_use]
    pub fn entity_spawns(&self) -> &[EntitySpawn] {
        &self.entity_spawns
    }

    /// Gravity updates waiting for the host's physics tick.
    #[must_use]
    pub fn scheduled_updates(&self) -> &[ScheduledUpdate] {
        &self.scheduled_updates
    }

    /// Hands pending gravity updates to the caller.
    pub fn take_scheduled_updates(&mut self) -> Vec<ScheduledUpdate> {
        std::mem::take(&mut self.scheduled_updates)
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("coord", &self.coord)
            .field("populated", &self.populated)
            .field("entity_spawns", &self.entity_spawns.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::GravitySuppression;

    #[test]
    fn test_chunk_coord_from_block_pos() {
        assert_eq!(ChunkCoord::from_block_pos(0, 0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block_pos(15, 15), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block_pos(16, 0), ChunkCoord::new(1, 0));
        assert_eq!(ChunkCoord::from_block_pos(-1, -1), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block_pos(-16, -17), ChunkCoord::new(-1, -2));
    }

    #[test]
    fn test_block_categories() {
        assert!(Block::STONE.is_solid());
        assert!(!Block::WATER.is_solid());
        assert!(Block::WATER.is_liquid());
        assert!(Block::LAVA.is_liquid());
        assert!(!Block::TALL_GRASS.is_solid());
        assert!(Block::SAND.is_falling());
        assert!(!Block::AIR.is_solid());
    }

    #[test]
    fn test_volume_bounds() {
        let mut volume = BlockVolume::new();
        volume.set(3, 100, 7, Block::STONE);
        assert_eq!(volume.get(3, 100, 7), Block::STONE);
        volume.set(16, 0, 0, Block::STONE);
        volume.set(0, 256, 0, Block::STONE);
        assert_eq!(volume.get(16, 0, 0), Block::AIR);
        assert_eq!(volume.count(Block::STONE), 1);
    }

    #[test]
    fn test_volume_bytes_round_trip() {
        let mut volume = BlockVolume::new();
        volume.set(1, 2, 3, Block::with_meta(17, 2));
        let restored = BlockVolume::from_bytes(volume.as_bytes()).expect("valid length");
        assert!(restored == volume);
        assert!(BlockVolume::from_bytes(&[0u8; 10]).is_none());
    }

    #[test]
    fn test_unique_biomes_first_seen_order() {
        let coord = ChunkCoord::new(0, 0);
        let mut area = BiomeArea::new(coord, BiomeType::Plains);
        area.set(0, 5, BiomeType::Desert);
        area.set(3, 0, BiomeType::Forest);
        area.set(3, 9, BiomeType::Desert);
        assert_eq!(
            area.unique(),
            vec![BiomeType::Plains, BiomeType::Desert, BiomeType::Forest]
        );
    }

    #[test]
    fn test_skylight_and_height_map() {
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0), BiomeType::Plains);
        for y in 0..64 {
            chunk.set_block(4, y, 4, Block::STONE);
        }
        chunk.generate_skylight_map();
        assert_eq!(chunk.height(4, 4), 64);
        assert_eq!(chunk.height(0, 0), 0);
        assert_eq!(chunk.sky_light(4, 64, 4), MAX_LIGHT);
        assert_eq!(chunk.sky_light(4, 63, 4), 0);
        assert_eq!(chunk.top_solid_or_liquid(4, 4), Some(63));
        assert_eq!(chunk.top_solid_or_liquid(0, 0), None);
    }

    #[test]
    fn test_clearing_top_block_lowers_height() {
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0), BiomeType::Plains);
        for y in 0..64 {
            chunk.set_block(4, y, 4, Block::STONE);
        }
        chunk.set_block(4, 70, 4, Block::STONE);
        assert_eq!(chunk.height(4, 4), 71);

        chunk.set_block(4, 70, 4, Block::AIR);
        assert_eq!(chunk.height(4, 4), 64);

        // Clearing below the top leaves the height alone.
        chunk.set_block(4, 10, 4, Block::AIR);
        assert_eq!(chunk.height(4, 4), 64);

        chunk.set_block(4, 63, 4, Block::TALL_GRASS);
        assert_eq!(chunk.height(4, 4), 63);

        for y in 0..63 {
            chunk.set_block(4, y, 4, Block::AIR);
        }
        assert_eq!(chunk.height(4, 4), 0);

        let mut rebuilt = chunk.clone();
        rebuilt.generate_skylight_map();
        assert_eq!(rebuilt.height(4, 4), chunk.height(4, 4));
    }

    #[test]
    fn test_falling_blocks_schedule_updates() {
        let mut chunk = Chunk::empty(ChunkCoord::new(0, 0), BiomeType::Desert);
        chunk.set_block(2, 80, 2, Block::SAND);
        assert_eq!(chunk.scheduled_updates().len(), 1);

        {
            let _guard = GravitySuppression::new();
            chunk.set_block(3, 80, 3, Block::GRAVEL);
        }
        assert_eq!(chunk.scheduled_updates().len(), 1);

        // Supported sand does not fall.
        chunk.set_block(5, 10, 5, Block::STONE);
        chunk.set_block(5, 11, 5, Block::SAND);
        assert_eq!(chunk.take_scheduled_updates().len(), 1);
        assert!(chunk.scheduled_updates().is_empty());
    }

    #[test]
    fn test_biome_ids_length() {
        let chunk = Chunk::empty(ChunkCoord::new(0, 0), BiomeType::Ocean);
        let ids = chunk.biome_ids();
        assert_eq!(ids.len(), 256);
        assert!(ids.iter().all(|&id| id == BiomeType::Ocean.id()));
    }
}
