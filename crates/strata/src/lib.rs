//! # STRATA
//!
//! Runs the world generation pipeline over regions of chunks.
//!
//! ```text
//! ┌────────────┐  coords   ┌──────────────┐  chunks   ┌────────────┐
//! │   Region   │──────────>│   Workers    │──────────>│ ChunkSink  │
//! │   driver   │           │ (generate +  │           │ (LZ4 files │
//! │            │           │  populate)   │           │  / memory) │
//! └────────────┘           └──────────────┘           └────────────┘
//! ```
//!
//! ## Modules
//!
//! - `logging`: Subscriber setup for binaries
//! - `region`: Parallel generation of a square of chunks

pub mod logging;
pub mod region;

pub use strata_procedural as procedural;

pub use region::{generate_region, RegionPlan, RegionStats};
