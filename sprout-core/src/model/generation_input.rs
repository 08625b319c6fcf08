use thiserror::Error;

/// Default cap on tokens per generation attempt.
///
/// A very high ceiling; it exists to bound runaway walks, not to shape
/// normal output.
pub const DEFAULT_MAX_LENGTH: usize = 1500;

/// Default number of generation attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// The overlap ratio lies outside `0.0..=1.0`.
#[derive(Debug, Error, PartialEq)]
#[error("overlap ratio must be between 0.0 and 1.0, got {0}")]
pub struct OverlapRatioError(pub f32);

/// Constraints for one generation request.
///
/// # Responsibilities
/// - Bound each sampling walk (`max_length`)
/// - Bound the retry loop (`max_attempts`)
/// - Hold the verbatim-overlap rejection threshold
///
/// # Invariants
/// - `max_overlap_ratio` is within `[0.0, 1.0]`; values <= 0.0 disable
///   the overlap check entirely
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationInput {
	/// Maximum tokens per attempt; exceeding it fails the attempt.
	pub max_length: usize,

	/// Number of attempts before returning the "no sentence" outcome.
	pub max_attempts: usize,

	/// Reject a candidate if a contiguous token run longer than this
	/// fraction of the sentence appears verbatim in the corpus.
	max_overlap_ratio: f32,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self {
			max_length: DEFAULT_MAX_LENGTH,
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			max_overlap_ratio: 0.0,
		}
	}
}

impl GenerationInput {
	/// Returns the current overlap rejection threshold.
	pub fn max_overlap_ratio(&self) -> f32 {
		self.max_overlap_ratio
	}

	/// Sets the overlap rejection threshold (0.0..=1.0).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_max_overlap_ratio(&mut self, ratio: f32) -> Result<(), OverlapRatioError> {
		if !(0.0..=1.0).contains(&ratio) {
			return Err(OverlapRatioError(ratio));
		}
		self.max_overlap_ratio = ratio;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_disable_the_overlap_check() {
		let input = GenerationInput::default();
		assert_eq!(input.max_length, DEFAULT_MAX_LENGTH);
		assert_eq!(input.max_attempts, DEFAULT_MAX_ATTEMPTS);
		assert_eq!(input.max_overlap_ratio(), 0.0);
	}

	#[test]
	fn out_of_range_ratios_are_rejected() {
		let mut input = GenerationInput::default();
		assert_eq!(input.set_max_overlap_ratio(1.5), Err(OverlapRatioError(1.5)));
		assert_eq!(
			input.set_max_overlap_ratio(-0.1),
			Err(OverlapRatioError(-0.1))
		);
		assert!(input.set_max_overlap_ratio(0.5).is_ok());
		assert_eq!(input.max_overlap_ratio(), 0.5);
	}
}
