use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::io;

/// Separator inserted between fragments coming from different files.
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Describes how to obtain a corpus.
///
/// Each variant must resolve to at least one non-empty text fragment,
/// otherwise ingestion fails. The enum is the wire form the surrounding
/// application hands over at bot-creation time, tagged by `kind` so new
/// source kinds stay additive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SourceSpec {
	/// Uploaded text files, read in the given order.
	TextFile { paths: Vec<PathBuf> },
	/// Text pasted inline by the creator.
	Inline { text: String },
}

/// Normalized training text for one bot.
///
/// Non-empty by construction; produced only by [`ingest`] and never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Corpus(String);

impl Corpus {
	/// Returns the normalized text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

/// A local input problem at ingestion time.
///
/// These are creation-time failures: the caller re-prompts the user
/// for corrected input, nothing is retried automatically.
#[derive(Debug, Error)]
pub enum IngestError {
	/// A referenced file could not be opened or decoded as text.
	#[error("could not read source file {path}")]
	Unreadable {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	/// The source resolved to nothing after trimming.
	#[error("source resolved to empty text")]
	Empty,
	/// The source kind is not handled by this ingestor.
	#[error("unsupported source kind")]
	UnsupportedSource,
}

/// Normalizes one source description into a single corpus string.
///
/// # Behavior
/// - `TextFile`: reads each path in order and concatenates the fragments
///   with a blank-line separator between files.
/// - `Inline`: trims the supplied text.
///
/// Reads the referenced files but never deletes or moves them; upload
/// cleanup stays with the surrounding application.
///
/// # Errors
/// - [`IngestError::Unreadable`] if any file cannot be opened or decoded.
/// - [`IngestError::Empty`] if the result is empty or whitespace-only.
/// - [`IngestError::UnsupportedSource`] for source kinds this ingestor
///   does not know about.
pub fn ingest(spec: &SourceSpec) -> Result<Corpus, IngestError> {
	let raw = match spec {
		SourceSpec::TextFile { paths } => {
			let mut fragments = Vec::with_capacity(paths.len());
			for path in paths {
				let text = io::read_text(path).map_err(|source| IngestError::Unreadable {
					path: path.clone(),
					source,
				})?;
				fragments.push(text);
			}
			fragments.join(PARAGRAPH_SEPARATOR)
		}
		SourceSpec::Inline { text } => text.clone(),
		// Future kinds added behind #[non_exhaustive] land here until
		// the ingestor learns about them.
		#[allow(unreachable_patterns)]
		_ => return Err(IngestError::UnsupportedSource),
	};

	let trimmed = raw.trim();
	if trimmed.is_empty() {
		return Err(IngestError::Empty);
	}

	tracing::debug!(bytes = trimmed.len(), "source ingested");
	Ok(Corpus(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn inline_text_is_trimmed() {
		let spec = SourceSpec::Inline {
			text: "  the cat sat. \n".to_owned(),
		};
		let corpus = ingest(&spec).unwrap();
		assert_eq!(corpus.as_str(), "the cat sat.");
	}

	#[test]
	fn empty_inline_text_fails() {
		let spec = SourceSpec::Inline {
			text: "   \n\t ".to_owned(),
		};
		assert!(matches!(ingest(&spec), Err(IngestError::Empty)));
	}

	#[test]
	fn files_are_joined_with_a_paragraph_separator() {
		let mut first = tempfile::NamedTempFile::new().unwrap();
		write!(first, "the cat sat.").unwrap();
		let mut second = tempfile::NamedTempFile::new().unwrap();
		write!(second, "the dog ran.").unwrap();

		let spec = SourceSpec::TextFile {
			paths: vec![first.path().to_owned(), second.path().to_owned()],
		};
		let corpus = ingest(&spec).unwrap();
		assert_eq!(corpus.as_str(), "the cat sat.\n\nthe dog ran.");
	}

	#[test]
	fn missing_file_is_unreadable() {
		let spec = SourceSpec::TextFile {
			paths: vec![PathBuf::from("missing.txt")],
		};
		match ingest(&spec) {
			Err(IngestError::Unreadable { path, .. }) => {
				assert_eq!(path, PathBuf::from("missing.txt"));
			}
			other => panic!("expected Unreadable, got {other:?}"),
		}
	}

	#[test]
	fn no_files_at_all_is_empty() {
		let spec = SourceSpec::TextFile { paths: Vec::new() };
		assert!(matches!(ingest(&spec), Err(IngestError::Empty)));
	}

	#[test]
	fn source_spec_uses_the_tagged_wire_form() {
		let spec: SourceSpec =
			serde_json::from_str(r#"{"kind": "inline", "text": "hello"}"#).unwrap();
		assert_eq!(
			spec,
			SourceSpec::Inline {
				text: "hello".to_owned()
			}
		);

		let spec: SourceSpec =
			serde_json::from_str(r#"{"kind": "text_file", "paths": ["uploads/a.txt"]}"#)
				.unwrap();
		assert_eq!(
			spec,
			SourceSpec::TextFile {
				paths: vec![PathBuf::from("uploads/a.txt")]
			}
		);
	}
}
