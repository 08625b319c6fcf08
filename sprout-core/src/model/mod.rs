//! Chain model construction and sentence generation.
//!
//! This module provides the statistical half of the pipeline:
//! - A k-order word-level transition model (`ChainModel`)
//! - Generation constraints (`GenerationInput`)
//! - Sentence sampling with rejection and retry (`generate`)
//! - Internal state management (`State`)

/// Weighted k-order transition model built from a corpus.
///
/// Supports sequential and parallel construction, merging,
/// and weighted next-token sampling.
pub mod chain_model;

/// Sentence sampling from a built model.
///
/// Exposes the generation walk with configurable length, attempt
/// and originality constraints.
pub mod generator;

/// Generation constraint structure.
///
/// Stores sampling parameters such as length ceiling, retry limits
/// and the verbatim-overlap rejection ratio.
pub mod generation_input;

/// Internal representation of a single chain state (k-token window).
///
/// Tracks outgoing transitions and supports weighted random sampling.
/// This module is not exposed publicly.
mod state;
