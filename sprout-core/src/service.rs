use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use thiserror::Error;

use crate::ingest::{Corpus, IngestError, SourceSpec, ingest};
use crate::model::chain_model::{BuildError, ChainModel};
use crate::model::generation_input::GenerationInput;
use crate::model::generator;

/// Default chain order used by the service.
pub const DEFAULT_ORDER: usize = 2;

/// A hard failure while preparing generation.
///
/// Distinct from the "no sentence produced" outcome, which is an
/// `Ok(None)` return: that one is expected and benign, these abort the
/// creation or posting flow visibly.
#[derive(Debug, Error)]
pub enum GenerateError {
	#[error(transparent)]
	Ingest(#[from] IngestError),
	#[error(transparent)]
	Build(#[from] BuildError),
}

/// Cache of built models keyed by corpus identity.
///
/// A model is pure data derived deterministically from its corpus, so
/// reusing one across sampling calls is always safe. Reads share the
/// immutable model through an `Arc`; the lock spans the build so
/// concurrent first requests for the same corpus build at most once.
#[derive(Debug, Default)]
pub struct ModelCache {
	models: Mutex<HashMap<u64, Arc<ChainModel>>>,
}

impl ModelCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached model for this corpus, building it on first use.
	pub fn get_or_build(
		&self,
		corpus: &Corpus,
		order: usize,
	) -> Result<Arc<ChainModel>, BuildError> {
		// A poisoned lock only means another thread panicked mid-insert;
		// the map itself is still valid.
		let mut models = self
			.models
			.lock()
			.unwrap_or_else(PoisonError::into_inner);

		let key = corpus_key(corpus);
		if let Some(model) = models.get(&key) {
			tracing::debug!(key, "chain model cache hit");
			return Ok(Arc::clone(model));
		}

		let model = Arc::new(ChainModel::build(corpus, order)?);
		models.insert(key, Arc::clone(&model));
		tracing::debug!(key, states = model.state_count(), "chain model cached");
		Ok(model)
	}
}

/// Orchestrates ingest → build-or-reuse → generate.
///
/// The single entry point the surrounding application calls when a bot
/// posts. Stateless across calls unless a cache is enabled; safe to
/// invoke concurrently from independent request handlers.
#[derive(Debug, Default)]
pub struct GenerationService {
	input: GenerationInput,
	cache: Option<ModelCache>,
}

impl GenerationService {
	/// A service that rebuilds the model on every call.
	pub fn new() -> Self {
		Self::default()
	}

	/// A service that reuses built models across calls for the same
	/// source content.
	pub fn with_cache() -> Self {
		Self {
			input: GenerationInput::default(),
			cache: Some(ModelCache::new()),
		}
	}

	/// Replaces the default generation constraints.
	pub fn with_input(mut self, input: GenerationInput) -> Self {
		self.input = input;
		self
	}

	/// Validates and normalizes a source at bot-creation time.
	///
	/// The returned corpus is what the surrounding application stores
	/// as the bot's source record.
	pub fn ingest(&self, spec: &SourceSpec) -> Result<Corpus, IngestError> {
		ingest(spec)
	}

	/// Generates the text for one post.
	///
	/// `Ok(Some(text))` carries an accepted sentence; `Ok(None)` means
	/// no sentence was accepted this time, which the caller renders as
	/// a soft placeholder rather than an error page.
	///
	/// # Errors
	/// Ingestion and build failures propagate as [`GenerateError`] so
	/// the posting flow aborts visibly.
	pub fn generate_post_text(&self, spec: &SourceSpec) -> Result<Option<String>, GenerateError> {
		self.generate_post_text_with(spec, &mut rand::rng())
	}

	/// Same as [`GenerationService::generate_post_text`] with an explicit
	/// random source, for reproducible output under a fixed seed.
	pub fn generate_post_text_with<R: Rng + ?Sized>(
		&self,
		spec: &SourceSpec,
		rng: &mut R,
	) -> Result<Option<String>, GenerateError> {
		let corpus = ingest(spec)?;
		let model = self.model_for(&corpus)?;

		match generator::generate(&model, &self.input, rng) {
			Some(sentence) => Ok(Some(sentence.text)),
			None => {
				tracing::debug!(
					attempts = self.input.max_attempts,
					"no sentence accepted"
				);
				Ok(None)
			}
		}
	}

	fn model_for(&self, corpus: &Corpus) -> Result<Arc<ChainModel>, BuildError> {
		match &self.cache {
			Some(cache) => cache.get_or_build(corpus, DEFAULT_ORDER),
			None => Ok(Arc::new(ChainModel::build(corpus, DEFAULT_ORDER)?)),
		}
	}
}

fn corpus_key(corpus: &Corpus) -> u64 {
	let mut hasher = DefaultHasher::new();
	corpus.as_str().hash(&mut hasher);
	hasher.finish()
}
