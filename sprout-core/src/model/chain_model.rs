use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc;
use std::thread;

use rand::Rng;
use thiserror::Error;

use super::state::{NextToken, State};
use crate::ingest::Corpus;

/// Characters treated as sentence terminators when splitting a corpus.
const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// A failure while turning a corpus into a chain model.
#[derive(Debug, Error)]
pub enum BuildError {
	/// The requested order cannot form a state window.
	#[error("chain order must be at least 1")]
	InvalidOrder,
	/// No sentence in the corpus is long enough to form a transition.
	#[error("corpus has no sentence with enough tokens to form a state")]
	InsufficientData,
	/// Two models of different order cannot be merged.
	#[error("cannot merge chain models of different order ({left} vs {right})")]
	OrderMismatch { left: usize, right: usize },
}

/// Weighted k-order transition model built from one corpus.
///
/// Maps each observed k-token window to the weighted set of tokens that
/// followed it, tracks which windows opened a sentence (start states),
/// and keeps the normalized sentence text for the verbatim-overlap check.
///
/// # Responsibilities
/// - Build transition and start-state weights from sentences
/// - Sample start states and successors with weighted random choice
/// - Merge with partial models built in parallel
///
/// # Invariants
/// - `order >= 1`
/// - Every stored state has total outgoing weight > 0
/// - Every window reachable from a start state is itself stored,
///   so a generation walk always finds its next state
///
/// Immutable after construction; safe to share behind an `Arc` across
/// concurrent generation calls.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainModel {
	/// Number of preceding tokens used as generation state.
	order: usize,
	/// Mapping from a k-token window to its observed successors.
	states: HashMap<Vec<String>, State>,
	/// Sentence-initial windows, weighted by occurrence.
	/// Ordered so start sampling is reproducible under a fixed seed.
	starts: BTreeMap<Vec<String>, usize>,
	/// Kept sentences re-joined with single spaces, one per line.
	/// Used by the generator's overlap check.
	rejoined: String,
}

impl ChainModel {
	/// Builds a model of the given order from a corpus.
	///
	/// # Behavior
	/// - Splits the corpus into sentences on `.`, `!` and `?`.
	/// - Tokenizes each sentence by whitespace; punctuation other than
	///   the terminator stays attached to its word.
	/// - Skips sentences with fewer than `order + 1` tokens.
	///
	/// Construction has no randomness: the same corpus and order always
	/// produce the same transition weights.
	///
	/// # Errors
	/// - [`BuildError::InvalidOrder`] if `order` is zero.
	/// - [`BuildError::InsufficientData`] if no sentence was kept.
	pub fn build(corpus: &Corpus, order: usize) -> Result<Self, BuildError> {
		let sentences = Self::kept_sentences(corpus, order)?;

		let mut model = Self::from_sentences(order, &sentences);
		model.rejoined = rejoin(&sentences);

		tracing::debug!(
			order,
			sentences = sentences.len(),
			states = model.states.len(),
			"chain model built"
		);
		Ok(model)
	}

	/// Builds a model by splitting the sentence list across worker threads
	/// and merging the partial models.
	///
	/// Weight-identical to [`ChainModel::build`] on the same corpus:
	/// occurrence counts sum the same regardless of chunking.
	pub fn build_parallel(corpus: &Corpus, order: usize) -> Result<Self, BuildError> {
		let sentences = Self::kept_sentences(corpus, order)?;

		let chunk_size = sentences.len().div_ceil(num_cpus::get());
		let (tx, rx) = mpsc::channel();
		for chunk in sentences.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<Vec<String>> = chunk.to_vec();

			thread::spawn(move || {
				// Receiver outlives the workers; a send can only fail
				// if the whole build was abandoned.
				let _ = tx.send(Self::from_sentences(order, &chunk));
			});
		}
		drop(tx);

		let mut model = Self::empty(order);
		for partial in rx.iter() {
			model.merge(&partial)?;
		}
		model.rejoined = rejoin(&sentences);

		tracing::debug!(
			order,
			sentences = sentences.len(),
			states = model.states.len(),
			"chain model built in parallel"
		);
		Ok(model)
	}

	/// Merges another model of the same order into this one.
	///
	/// Start and transition weights for matching windows are summed;
	/// sentence text is appended for the overlap check.
	///
	/// # Errors
	/// Returns [`BuildError::OrderMismatch`] if the orders differ.
	pub fn merge(&mut self, other: &Self) -> Result<(), BuildError> {
		if self.order != other.order {
			return Err(BuildError::OrderMismatch {
				left: self.order,
				right: other.order,
			});
		}

		for (window, state) in &other.states {
			if let Some(existing) = self.states.get_mut(window) {
				existing.merge(state);
			} else {
				self.states.insert(window.clone(), state.clone());
			}
		}
		for (window, weight) in &other.starts {
			*self.starts.entry(window.clone()).or_insert(0) += *weight;
		}

		if !other.rejoined.is_empty() {
			if !self.rejoined.is_empty() {
				self.rejoined.push('\n');
			}
			self.rejoined.push_str(&other.rejoined);
		}

		Ok(())
	}

	/// Returns the model order (k).
	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of distinct state windows in the model.
	pub fn state_count(&self) -> usize {
		self.states.len()
	}

	/// Occurrence weight of a sentence-initial window.
	pub fn start_weight(&self, window: &[&str]) -> usize {
		self.starts.get(&key(window)).copied().unwrap_or(0)
	}

	/// Occurrence weight of a transition; `None` addresses the end sentinel.
	pub fn transition_weight(&self, window: &[&str], next: Option<&str>) -> usize {
		let next = match next {
			Some(word) => NextToken::Word(word.to_owned()),
			None => NextToken::End,
		};
		self.states
			.get(&key(window))
			.map(|state| state.weight_of(&next))
			.unwrap_or(0)
	}

	/// Samples a start state weighted by its recorded occurrences.
	pub(crate) fn sample_start<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&[String]> {
		let total: usize = self.starts.values().sum();
		if total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..total);
		for (window, weight) in &self.starts {
			if r < *weight {
				return Some(window);
			}
			r -= weight;
		}
		None
	}

	/// Samples the successor of a window, weighted by occurrence count.
	///
	/// Returns `None` for windows the model has never seen.
	pub(crate) fn sample_next<R: Rng + ?Sized>(
		&self,
		window: &[String],
		rng: &mut R,
	) -> Option<&NextToken> {
		self.states.get(window)?.sample(rng)
	}

	/// Whether a space-joined token run occurs verbatim in the training
	/// sentences.
	pub(crate) fn contains_run(&self, run: &str) -> bool {
		self.rejoined.contains(run)
	}

	fn empty(order: usize) -> Self {
		Self {
			order,
			states: HashMap::new(),
			starts: BTreeMap::new(),
			rejoined: String::new(),
		}
	}

	/// Splits, tokenizes and filters the corpus down to usable sentences.
	fn kept_sentences(corpus: &Corpus, order: usize) -> Result<Vec<Vec<String>>, BuildError> {
		if order == 0 {
			return Err(BuildError::InvalidOrder);
		}

		let sentences: Vec<Vec<String>> = split_sentences(corpus.as_str())
			.into_iter()
			.filter(|tokens| tokens.len() > order)
			.collect();
		if sentences.is_empty() {
			return Err(BuildError::InsufficientData);
		}
		Ok(sentences)
	}

	/// Accumulates weights from already-filtered sentences.
	/// Does not fill `rejoined`; callers set it once at the end.
	fn from_sentences(order: usize, sentences: &[Vec<String>]) -> Self {
		let mut model = Self::empty(order);
		for tokens in sentences {
			model.add_sentence(tokens);
		}
		model
	}

	fn add_sentence(&mut self, tokens: &[String]) {
		*self.starts.entry(tokens[..self.order].to_vec()).or_insert(0) += 1;

		for i in 0..=tokens.len() - self.order {
			let window = tokens[i..i + self.order].to_vec();
			let next = match tokens.get(i + self.order) {
				Some(token) => NextToken::Word(token.clone()),
				None => NextToken::End,
			};
			self.states.entry(window).or_default().add_transition(next);
		}
	}
}

/// Splits raw text into tokenized sentences.
///
/// Terminal punctuation marks the boundary and is dropped; empty
/// sentences disappear. Tokens are whitespace-separated words with any
/// embedded punctuation left attached.
pub(crate) fn split_sentences(text: &str) -> Vec<Vec<String>> {
	text.split(SENTENCE_TERMINATORS)
		.map(|sentence| {
			sentence
				.split_whitespace()
				.map(str::to_owned)
				.collect::<Vec<String>>()
		})
		.filter(|tokens| !tokens.is_empty())
		.collect()
}

fn rejoin(sentences: &[Vec<String>]) -> String {
	sentences
		.iter()
		.map(|tokens| tokens.join(" "))
		.collect::<Vec<String>>()
		.join("\n")
}

fn key(window: &[&str]) -> Vec<String> {
	window.iter().map(|token| (*token).to_owned()).collect()
}
