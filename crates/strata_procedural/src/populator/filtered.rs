//! Condition-gated delegation.

use std::fmt;
use std::sync::Arc;

use super::{DecorationContext, Populator, PopulatorKind};
use crate::biome::BiomeType;
use crate::chunk::{Chunk, CHUNK_SIZE};
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::seeding::ChunkRng;
use crate::settings::SharedPopulator;

type ChunkPredicate = Arc<dyn Fn(&Chunk) -> bool + Send + Sync>;

/// Runs an inner populator only when its conditions hold.
///
/// Conditions are checked in order: every required flag must already be set
/// in this pass, no excluded flag may be set, then the chunk predicate must
/// accept the chunk. A skipped populator consumes no randomness.
#[derive(Clone)]
pub struct FilteredPopulator {
    inner: SharedPopulator,
    predicate: Option<ChunkPredicate>,
    required_flags: Vec<String>,
    excluded_flags: Vec<String>,
}

impl FilteredPopulator {
    /// Wraps `inner` with no conditions.
    #[must_use]
    pub fn new(inner: SharedPopulator) -> Self {
        Self {
            inner,
            predicate: None,
            required_flags: Vec::new(),
            excluded_flags: Vec::new(),
        }
    }

    /// Only runs when `predicate` accepts the chunk.
    #[must_use]
    pub fn with_predicate(mut self, predicate: impl Fn(&Chunk) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Skips chunks whose primary biome is one of `biomes`.
    #[must_use]
    pub fn excluding_biomes(self, biomes: &[BiomeType]) -> Self {
        let biomes = biomes.to_vec();
        self.with_predicate(move |chunk| {
            !biomes.contains(&chunk.biome(CHUNK_SIZE / 2, CHUNK_SIZE / 2))
        })
    }

    /// Only runs when `flag` was set earlier in this pass.
    #[must_use]
    pub fn require_flag(mut self, flag: impl Into<String>) -> Self {
        self.required_flags.push(flag.into());
        self
    }

    /// Skips the chunk when `flag` was set earlier in this pass.
    #[must_use]
    pub fn exclude_flag(mut self, flag: impl Into<String>) -> Self {
        self.excluded_flags.push(flag.into());
        self
    }

    /// The wrapped populator.
    #[must_use]
    pub fn inner(&self) -> &SharedPopulator {
        &self.inner
    }

    fn admits(&self, chunk: &Chunk, ctx: &DecorationContext) -> bool {
        self.required_flags.iter().all(|flag| ctx.has_flag(flag))
            && !self.excluded_flags.iter().any(|flag| ctx.has_flag(flag))
            && self.predicate.as_ref().map_or(true, |accept| accept(chunk))
    }
}

impl fmt::Debug for FilteredPopulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredPopulator")
            .field("inner", &self.inner.name())
            .field("has_predicate", &self.predicate.is_some())
            .field("required_flags", &self.required_flags)
            .field("excluded_flags", &self.excluded_flags)
            .finish()
    }
}

impl Populator for FilteredPopulator {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::Filtered
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn chance(&self) -> Option<u32> {
        self.inner.chance()
    }

    fn populate(
        &self,
        world: &WorldConfig,
        chunk: &mut Chunk,
        rng: &mut ChunkRng,
        ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        if !self.admits(chunk, ctx) {
            tracing::trace!(populator = self.name(), coord = %chunk.coord, "filtered out");
            return Ok(());
        }
        self.inner.populate(world, chunk, rng, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Block;
    use crate::populator::flags;
    use crate::populator::test_support::{flat_chunk, rng};
    use crate::populator::SnowPopulator;

    fn filtered_snow() -> FilteredPopulator {
        FilteredPopulator::new(Arc::new(SnowPopulator::new()))
    }

    fn snow_count(populator: &FilteredPopulator, biome: BiomeType, ctx: &mut DecorationContext) -> usize {
        let mut chunk = flat_chunk(biome, 70, Block::GRASS);
        populator
            .populate(&WorldConfig::default(), &mut chunk, &mut rng(0), ctx)
            .expect("snow never fails");
        chunk.blocks().count(Block::SNOW_LAYER)
    }

    #[test]
    fn test_unconditional_delegates() {
        let mut ctx = DecorationContext::new();
        assert!(snow_count(&filtered_snow(), BiomeType::IcePlains, &mut ctx) > 0);
    }

    #[test]
    fn test_biome_exclusion() {
        let populator = filtered_snow().excluding_biomes(&[BiomeType::IcePlains]);
        let mut ctx = DecorationContext::new();
        assert_eq!(snow_count(&populator, BiomeType::IcePlains, &mut ctx), 0);
        assert!(snow_count(&populator, BiomeType::ColdTaiga, &mut ctx) > 0);
    }

    #[test]
    fn test_required_flag() {
        let populator = filtered_snow().require_flag(flags::DUNGEON);
        let mut ctx = DecorationContext::new();
        assert_eq!(snow_count(&populator, BiomeType::IcePlains, &mut ctx), 0);
        ctx.set_flag(flags::DUNGEON);
        assert!(snow_count(&populator, BiomeType::IcePlains, &mut ctx) > 0);
    }

    #[test]
    fn test_excluded_flag() {
        let populator = filtered_snow().exclude_flag(flags::VILLAGE);
        let mut ctx = DecorationContext::new();
        assert!(snow_count(&populator, BiomeType::IcePlains, &mut ctx) > 0);
        ctx.set_flag(flags::VILLAGE);
        assert_eq!(snow_count(&populator, BiomeType::IcePlains, &mut ctx), 0);
    }

    #[test]
    fn test_reports_inner_name() {
        let populator = filtered_snow();
        assert_eq!(populator.name(), "snow");
        assert_eq!(populator.kind(), PopulatorKind::Filtered);
        assert_eq!(populator.inner().kind(), PopulatorKind::Snow);
    }
}
