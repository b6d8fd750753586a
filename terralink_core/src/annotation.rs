//! The two comment dialects the tool recognises:
//!
//! ```text
//! # terralink: path=<local-path>
//! # terralink-state: source="<original-source>" [version="<original-version>"]
//! ```
//!
//! Both are single-line directives. The dev annotation is authored by a
//! developer and never mutated; the state annotation is written by
//! `load` and consumed by `unload`. Parsing is total: a line that does
//! not match a dialect is simply not an annotation.

/// Marker introducing the dev annotation, after the comment sigil.
const DEV_MARKER: &str = "terralink:";

/// Exact prefix of the state annotation line.
const STATE_PREFIX: &str = "# terralink-state:";

/// A recognised annotation directive found in a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
	Dev(DevAnnotation),
	State(StateAnnotation),
}

impl Annotation {
	/// Classify a comment line. Returns `None` for anything that is not
	/// one of the two dialects.
	pub fn parse(comment: &str) -> Option<Self> {
		if let Some(state) = StateAnnotation::parse(comment) {
			return Some(Annotation::State(state));
		}
		DevAnnotation::parse(comment).map(Annotation::Dev)
	}
}

/// Developer-authored directive naming the local path to substitute for
/// a module's remote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevAnnotation {
	pub local_path: String,
}

impl DevAnnotation {
	/// Parse a comment line of the form `# terralink: key=value ...`.
	///
	/// Pair order is irrelevant and whitespace around the marker and
	/// inside pairs is insignificant. Returns `None` when the line is
	/// not of this dialect or lacks a `path` key.
	pub fn parse(comment: &str) -> Option<Self> {
		let line = comment.trim();
		let rest = line.strip_prefix('#')?.trim_start();
		let pairs = rest.strip_prefix(DEV_MARKER)?;

		scan_pairs(pairs)
			.into_iter()
			.find(|(key, _)| key == "path")
			.map(|(_, value)| Self { local_path: value })
	}
}

/// Tool-generated directive recording a module's original source and
/// optional version while the module points at a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateAnnotation {
	pub source: String,
	pub version: Option<String>,
}

impl StateAnnotation {
	/// Parse a comment line of the form
	/// `# terralink-state: source="..." version="..."`.
	///
	/// Values must be double quoted. Unknown keys are ignored, and an
	/// unquoted value for a key simply fails to extract that key rather
	/// than rejecting the line. A line whose `source` is missing or
	/// empty is not a state annotation.
	pub fn parse(comment: &str) -> Option<Self> {
		let data = comment.trim().strip_prefix(STATE_PREFIX)?;

		let mut source = None;
		let mut version = None;
		for (key, value) in scan_quoted_pairs(data) {
			match key.as_str() {
				"source" => source = Some(value),
				"version" => version = Some(value),
				_ => {}
			}
		}

		let source = source.filter(|value| !value.is_empty())?;
		Some(Self {
			source,
			version: version.filter(|value| !value.is_empty()),
		})
	}

	/// Render the annotation as a comment line. The exact inverse of
	/// [`StateAnnotation::parse`]: `parse(render())` reproduces the
	/// annotation for every non-empty source.
	pub fn render(&self) -> String {
		match &self.version {
			Some(version) => {
				format!(r#"{STATE_PREFIX} source="{}" version="{}""#, self.source, version)
			}
			None => format!(r#"{STATE_PREFIX} source="{}""#, self.source),
		}
	}
}

fn is_word_byte(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Scan `key=value` pairs: word characters for the key, optional spaces
/// around `=`, a value running to the next whitespace. Anything that
/// does not fit the shape is skipped, not an error.
fn scan_pairs(input: &str) -> Vec<(String, String)> {
	let bytes = input.as_bytes();
	let mut pairs = Vec::new();
	let mut i = 0;

	while i < bytes.len() {
		if !is_word_byte(bytes[i]) {
			i += 1;
			continue;
		}

		let key_start = i;
		while i < bytes.len() && is_word_byte(bytes[i]) {
			i += 1;
		}
		let key = &input[key_start..i];

		let mut j = i;
		while j < bytes.len() && bytes[j].is_ascii_whitespace() {
			j += 1;
		}
		if j >= bytes.len() || bytes[j] != b'=' {
			continue;
		}
		j += 1;
		while j < bytes.len() && bytes[j].is_ascii_whitespace() {
			j += 1;
		}

		let value_start = j;
		while j < bytes.len() && !bytes[j].is_ascii_whitespace() {
			j += 1;
		}
		if j == value_start {
			continue;
		}

		pairs.push((key.to_string(), input[value_start..j].to_string()));
		i = j;
	}

	pairs
}

/// Scan `key="value"` pairs: word characters for the key, optional
/// spaces around `=`, a double quoted value. A key whose value is not
/// quoted is skipped.
fn scan_quoted_pairs(input: &str) -> Vec<(String, String)> {
	let bytes = input.as_bytes();
	let mut pairs = Vec::new();
	let mut i = 0;

	while i < bytes.len() {
		if !is_word_byte(bytes[i]) {
			i += 1;
			continue;
		}

		let key_start = i;
		while i < bytes.len() && is_word_byte(bytes[i]) {
			i += 1;
		}
		let key = &input[key_start..i];

		let mut j = i;
		while j < bytes.len() && bytes[j].is_ascii_whitespace() {
			j += 1;
		}
		if j >= bytes.len() || bytes[j] != b'=' {
			continue;
		}
		j += 1;
		while j < bytes.len() && bytes[j].is_ascii_whitespace() {
			j += 1;
		}
		if j >= bytes.len() || bytes[j] != b'"' {
			continue;
		}
		j += 1;

		let value_start = j;
		while j < bytes.len() && bytes[j] != b'"' {
			j += 1;
		}
		if j >= bytes.len() {
			continue;
		}

		pairs.push((key.to_string(), input[value_start..j].to_string()));
		i = j + 1;
	}

	pairs
}
