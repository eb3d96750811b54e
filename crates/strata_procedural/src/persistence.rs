//! # Chunk Sinks
//!
//! Where finished chunks go. The pipeline itself never stores anything; the
//! host hands assembled chunks to a [`ChunkSink`].
//!
//! ## File format
//!
//! [`Lz4FileSink`] writes one `chunk_<x>_<z>.bin` file per chunk: an LZ4 block
//! (size-prepended) holding one `populated` byte, the raw block volume, then
//! the 256 biome ids in `[z][x]` order. Light and height data are recomputed
//! on load.

use std::fs;
use std::path::{Path, PathBuf};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};

use crate::biome::BiomeType;
use crate::chunk::{BiomeArea, BlockVolume, Chunk, ChunkCoord, COLUMNS_PER_CHUNK, CHUNK_SIZE};
use crate::error::{GenResult, GenerationError};

/// Consumer of assembled chunks.
pub trait ChunkSink {
    /// Stores `chunk`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Io`] when the chunk could not be written.
    fn store(&mut self, chunk: &Chunk) -> GenResult<()>;
}

/// Writes LZ4-compressed chunk files into a directory.
#[derive(Clone, Debug)]
pub struct Lz4FileSink {
    dir: PathBuf,
    written: usize,
    bytes: usize,
}

impl Lz4FileSink {
    /// Creates a sink writing into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Io`] when the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> GenResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: 0,
            bytes: 0,
        })
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Chunks written so far.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Compressed bytes written so far.
    #[must_use]
    pub const fn bytes_written(&self) -> usize {
        self.bytes
    }

    /// File of a chunk.
    #[must_use]
    pub fn path_for(&self, coord: ChunkCoord) -> PathBuf {
        self.dir.join(format!("chunk_{}_{}.bin", coord.x, coord.z))
    }

    /// Reads a chunk back.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Io`] when the file is missing or corrupt.
    pub fn load(&self, coord: ChunkCoord) -> GenResult<Chunk> {
        let compressed = fs::read(self.path_for(coord))?;
        let data = decompress_size_prepended(&compressed)
            .map_err(|e| GenerationError::Io(format!("chunk {coord}: {e}")))?;

        let volume_size = BlockVolume::data_size();
        if data.len() != 1 + volume_size + COLUMNS_PER_CHUNK {
            return Err(GenerationError::Io(format!(
                "chunk {coord}: size mismatch (expected {}, got {})",
                1 + volume_size + COLUMNS_PER_CHUNK,
                data.len()
            )));
        }

        let volume = BlockVolume::from_bytes(&data[1..=volume_size])
            .ok_or_else(|| GenerationError::Io(format!("chunk {coord}: bad block data")))?;
        let mut biomes = BiomeArea::new(coord, BiomeType::Ocean);
        for (i, &id) in data[1 + volume_size..].iter().enumerate() {
            let biome = BiomeType::from_id(id)
                .ok_or_else(|| GenerationError::Io(format!("chunk {coord}: unknown biome id {id}")))?;
            biomes.set(i % CHUNK_SIZE, i / CHUNK_SIZE, biome);
        }

        let mut chunk = Chunk::from_parts(coord, volume, &biomes);
        chunk.generate_skylight_map();
        chunk.populated = data[0] != 0;
        Ok(chunk)
    }
}

impl ChunkSink for Lz4FileSink {
    fn store(&mut self, chunk: &Chunk) -> GenResult<()> {
        let block_bytes = chunk.blocks().as_bytes();
        let mut payload = Vec::with_capacity(1 + block_bytes.len() + COLUMNS_PER_CHUNK);
        payload.push(u8::from(chunk.populated));
        payload.extend_from_slice(block_bytes);
        payload.extend_from_slice(&chunk.biome_ids());

        let compressed = compress_prepend_size(&payload);
        fs::write(self.path_for(chunk.coord), &compressed)?;
        self.written += 1;
        self.bytes += compressed.len();
        tracing::debug!(coord = %chunk.coord, bytes = compressed.len(), "chunk stored");
        Ok(())
    }
}

/// Keeps chunks in memory; handy for tests and tools.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    /// Stored chunks in arrival order.
    pub chunks: Vec<Chunk>,
}

impl ChunkSink for MemorySink {
    fn store(&mut self, chunk: &Chunk) -> GenResult<()> {
        self.chunks.push(chunk.clone());
        Ok(())
    }
}
