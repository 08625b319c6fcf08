use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chain_model::ChainModel;
use super::generation_input::GenerationInput;
use super::state::NextToken;

/// A sentence accepted by the generation policy.
///
/// Ephemeral: the caller decides whether to store it as a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSentence {
	/// The tokens joined with single spaces.
	pub text: String,
	/// Number of tokens in the sentence.
	pub token_count: usize,
	/// Whether the sentence passed every rejection check.
	pub accepted: bool,
}

/// Samples a new sentence from a built model.
///
/// # Behavior
/// Per attempt, up to `input.max_attempts`:
/// 1. Sample a start state weighted by its recorded occurrences.
/// 2. Walk the chain, sampling each successor by occurrence count,
///    until the end sentinel (success) or `input.max_length` tokens
///    without one (the attempt fails).
/// 3. Discard candidates failing the verbatim-overlap check.
///
/// The first accepted candidate wins. Exhausting all attempts yields
/// `None`: the expected "no good sentence this time" outcome, distinct
/// from any hard failure.
///
/// All randomness flows through `rng`, so a seeded generator replays
/// identical output for the same model and constraints.
pub fn generate<R: Rng + ?Sized>(
	model: &ChainModel,
	input: &GenerationInput,
	rng: &mut R,
) -> Option<GeneratedSentence> {
	for attempt in 0..input.max_attempts {
		let Some(tokens) = walk(model, input.max_length, rng) else {
			tracing::debug!(attempt, "walk exceeded max length");
			continue;
		};

		if !passes_overlap(model, &tokens, input.max_overlap_ratio()) {
			tracing::debug!(attempt, "candidate rejected by overlap check");
			continue;
		}

		return Some(GeneratedSentence {
			text: tokens.join(" "),
			token_count: tokens.len(),
			accepted: true,
		});
	}

	None
}

/// One bounded sampling walk through the chain.
///
/// Returns the generated tokens, or `None` if the walk failed to reach
/// the end sentinel within `max_length` tokens.
fn walk<R: Rng + ?Sized>(
	model: &ChainModel,
	max_length: usize,
	rng: &mut R,
) -> Option<Vec<String>> {
	let start = model.sample_start(rng)?;
	let mut tokens: Vec<String> = start.to_vec();
	let mut window: Vec<String> = start.to_vec();
	if tokens.len() > max_length {
		return None;
	}

	loop {
		match model.sample_next(&window, rng) {
			Some(NextToken::Word(word)) => {
				tokens.push(word.clone());
				if tokens.len() > max_length {
					return None;
				}
				// Advance the window: drop the oldest token, append the new one.
				window.remove(0);
				window.push(word.clone());
			}
			Some(NextToken::End) => return Some(tokens),
			// Every window reachable from a start state is stored in the
			// model, so this only triggers on a malformed merge.
			None => return None,
		}
	}
}

/// Checks a candidate against the verbatim-overlap constraint.
///
/// A ratio <= 0.0 disables the check. Otherwise any contiguous run of
/// more than `ratio * token_count` tokens found verbatim in the training
/// sentences rejects the candidate.
fn passes_overlap(model: &ChainModel, tokens: &[String], ratio: f32) -> bool {
	if ratio <= 0.0 {
		return true;
	}

	let allowed = (ratio * tokens.len() as f32).floor() as usize;
	let run_len = allowed + 1;
	if run_len > tokens.len() {
		return true;
	}

	tokens
		.windows(run_len)
		.all(|run| !model.contains_run(&run.join(" ")))
}
