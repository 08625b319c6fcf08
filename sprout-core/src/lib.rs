//! Markov-chain post generation library.
//!
//! This crate provides the text pipeline behind a bot playground:
//! - Ingestion of heterogeneous raw sources into a normalized corpus
//! - Construction of a k-order word-level transition model
//! - Probabilistic sentence sampling with rejection and retry policy
//! - A small orchestration service tying the three together
//!
//! Persistence, sessions and HTTP routing are the surrounding
//! application's business; this crate consumes source descriptions
//! and returns generated text (or a definite reason why not).

/// Source normalization: `SourceSpec`, `Corpus` and the `ingest` operation.
pub mod ingest;

/// Chain model construction and sentence generation.
///
/// Exposes the model and generator interfaces while keeping the
/// internal state representation private.
pub mod model;

/// High-level orchestration: ingest, build-or-reuse, generate.
pub mod service;

/// I/O utilities (file loading).
///
/// Not exposed
pub(crate) mod io;
