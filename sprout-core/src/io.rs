use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::io;

/// Reads a text file into a single string.
///
/// - Reads the entire file into memory
/// - Normalizes `\r\n` line endings to `\n`
pub(crate) fn read_text<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.replace("\r\n", "\n"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn reads_and_normalizes_line_endings() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "one\r\ntwo\nthree").unwrap();

		let text = read_text(file.path()).unwrap();
		assert_eq!(text, "one\ntwo\nthree");
	}

	#[test]
	fn missing_file_is_an_error() {
		assert!(read_text("does/not/exist.txt").is_err());
	}
}
