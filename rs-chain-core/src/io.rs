use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Iterator over the lines of a reader, decoded as lossy UTF-8.
///
/// - Splits on `\n` / `\r\n`, terminators are not included
/// - Invalid UTF-8 sequences become `U+FFFD` instead of failing the read
/// - A final line without terminator is still returned
pub struct LossyLines<R> {
	reader: R,
	buf: Vec<u8>,
}

impl<R: BufRead> Iterator for LossyLines<R> {
	type Item = io::Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		self.buf.clear();
		match self.reader.read_until(b'\n', &mut self.buf) {
			Ok(0) => None,
			Ok(_) => {
				if self.buf.last() == Some(&b'\n') {
					self.buf.pop();
					if self.buf.last() == Some(&b'\r') {
						self.buf.pop();
					}
				}
				Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
			}
			Err(err) => Some(Err(err)),
		}
	}
}

/// Wraps `reader` into a [`LossyLines`] iterator.
pub fn lines_lossy<R: BufRead>(reader: R) -> LossyLines<R> {
	LossyLines { reader, buf: Vec::new() }
}

/// Reassembles lines from byte chunks that split them at arbitrary points.
///
/// Follows the [`LossyLines`] rules. Bytes after the last `\n` are held
/// back until a later chunk completes them or [`LineBuffer::finish`] is
/// called, so an interrupted stream never yields a cut line.
#[derive(Debug, Default)]
pub struct LineBuffer {
	pending: Vec<u8>,
}

impl LineBuffer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `chunk` and returns every line it completes, in order.
	pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
		self.pending.extend_from_slice(chunk);
		let Some(end) = self.pending.iter().rposition(|&byte| byte == b'\n') else {
			return Vec::new();
		};

		let rest = self.pending.split_off(end + 1);
		let complete = std::mem::replace(&mut self.pending, rest);
		complete[..end]
			.split(|&byte| byte == b'\n')
			.map(|line| String::from_utf8_lossy(line.strip_suffix(b"\r").unwrap_or(line)).into_owned())
			.collect()
	}

	/// Returns the final line if the stream did not end with a terminator.
	pub fn finish(self) -> Option<String> {
		(!self.pending.is_empty()).then(|| String::from_utf8_lossy(&self.pending).into_owned())
	}
}

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let reader = BufReader::new(File::open(filename)?);
	lines_lossy(reader).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn strips_both_line_terminators() {
		let lines: Vec<String> = lines_lossy(&b"one two\r\nthree\n\nfour"[..])
			.collect::<io::Result<_>>()
			.unwrap();
		assert_eq!(lines, vec!["one two", "three", "", "four"]);
	}

	#[test]
	fn invalid_utf8_is_replaced() {
		let lines: Vec<String> = lines_lossy(&b"caf\xe9 ok\n"[..])
			.collect::<io::Result<_>>()
			.unwrap();
		assert_eq!(lines, vec!["caf\u{FFFD} ok"]);
	}

	#[test]
	fn line_buffer_joins_split_lines() {
		let mut buffer = LineBuffer::new();
		assert!(buffer.push(b"the ca").is_empty());
		assert_eq!(buffer.push(b"t sat\r\nthe dog\n\nra"), vec!["the cat sat", "the dog", ""]);
		assert_eq!(buffer.push(b"n away\n"), vec!["ran away"]);
		assert_eq!(buffer.finish(), None);
	}

	#[test]
	fn line_buffer_matches_lossy_lines() {
		let text = b"one two\r\nthree\n\ncaf\xe9\nfour";
		let expected: Vec<String> = lines_lossy(&text[..]).collect::<io::Result<_>>().unwrap();

		let mut buffer = LineBuffer::new();
		let mut lines = Vec::new();
		for chunk in text.chunks(3) {
			lines.extend(buffer.push(chunk));
		}
		lines.extend(buffer.finish());
		assert_eq!(lines, expected);
	}

	#[test]
	fn read_file_returns_every_line() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "the cat sat\n\nthe dog ran\n").unwrap();

		let lines = read_file(file.path()).unwrap();
		assert_eq!(lines, vec!["the cat sat", "", "the dog ran"]);
	}

	#[test]
	fn read_file_reports_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let err = read_file(dir.path().join("missing.txt")).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::NotFound);
	}
}
