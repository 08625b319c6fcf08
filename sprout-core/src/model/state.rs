use std::collections::BTreeMap;

use rand::Rng;

/// Outcome of one transition out of a state.
///
/// `End` is the sentinel terminating a generation walk; it competes
/// for weight with ordinary words so that sentence length follows the
/// training data.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum NextToken {
	Word(String),
	End,
}

/// A node in the chain: one k-token window and its observed successors.
///
/// Outgoing edges are weighted by their number of observations.
///
/// ## Responsibilities
/// - Accumulate transition occurrences during construction
/// - Sample the next token using weighted random choice
/// - Merge with the same window's state from another partial model
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - A state stored in a model always has total weight > 0
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct State {
	/// Outgoing transitions indexed by the next token.
	/// The value is how many times this transition was observed.
	/// A BTreeMap keeps iteration order stable so sampling is
	/// reproducible under a fixed seed.
	transitions: BTreeMap<NextToken, usize>,
}

impl State {
	/// Records an occurrence of a transition toward `next`.
	pub(crate) fn add_transition(&mut self, next: NextToken) {
		*self.transitions.entry(next).or_insert(0) += 1;
	}

	/// Total number of observed outgoing transitions.
	pub(crate) fn total_weight(&self) -> usize {
		self.transitions.values().sum()
	}

	/// Occurrence count for one specific successor.
	pub(crate) fn weight_of(&self, next: &NextToken) -> usize {
		self.transitions.get(next).copied().unwrap_or(0)
	}

	/// Samples the next token using weighted random choice.
	///
	/// The probability of selecting a token is proportional to its
	/// occurrence count. Returns `None` if the state has no transitions.
	pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&NextToken> {
		let total = self.total_weight();
		if total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..total);
		for (next, occurrence) in &self.transitions {
			if r < *occurrence {
				return Some(next);
			}
			r -= occurrence;
		}

		// Unreachable: r starts below the summed weights.
		None
	}

	/// Merges another state for the same window into this one.
	///
	/// Occurrence counts are summed; intended for combining partial
	/// models built in parallel.
	pub(crate) fn merge(&mut self, other: &Self) {
		for (next, occurrence) in &other.transitions {
			*self.transitions.entry(next.clone()).or_insert(0) += *occurrence;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn word(s: &str) -> NextToken {
		NextToken::Word(s.to_owned())
	}

	#[test]
	fn transitions_accumulate_counts() {
		let mut state = State::default();
		state.add_transition(word("sat"));
		state.add_transition(word("sat"));
		state.add_transition(NextToken::End);

		assert_eq!(state.weight_of(&word("sat")), 2);
		assert_eq!(state.weight_of(&NextToken::End), 1);
		assert_eq!(state.total_weight(), 3);
	}

	#[test]
	fn sampling_an_empty_state_yields_none() {
		let state = State::default();
		let mut rng = StdRng::seed_from_u64(1);
		assert_eq!(state.sample(&mut rng), None);
	}

	#[test]
	fn sampling_a_single_transition_is_certain() {
		let mut state = State::default();
		state.add_transition(word("sat"));

		let mut rng = StdRng::seed_from_u64(1);
		for _ in 0..10 {
			assert_eq!(state.sample(&mut rng), Some(&word("sat")));
		}
	}

	#[test]
	fn sampling_is_reproducible_under_a_fixed_seed() {
		let mut state = State::default();
		state.add_transition(word("sat"));
		state.add_transition(word("ran"));
		state.add_transition(NextToken::End);

		let mut first = StdRng::seed_from_u64(42);
		let mut second = StdRng::seed_from_u64(42);
		for _ in 0..32 {
			assert_eq!(state.sample(&mut first), state.sample(&mut second));
		}
	}

	#[test]
	fn merge_sums_occurrences() {
		let mut left = State::default();
		left.add_transition(word("sat"));

		let mut right = State::default();
		right.add_transition(word("sat"));
		right.add_transition(NextToken::End);

		left.merge(&right);
		assert_eq!(left.weight_of(&word("sat")), 2);
		assert_eq!(left.weight_of(&NextToken::End), 1);
	}
}
