use std::fs;
use std::path::Path;

use crate::TerralinkError;
use crate::TerralinkResult;

/// Directory names ignored wherever they appear as a path segment.
const DEFAULT_PATTERNS: &[&str] = &[".terraform"];

/// Name of the optional pattern file.
pub const IGNORE_FILE_NAME: &str = ".terralinkignore";

/// Suffixes of files the scan ever considers.
const CANDIDATE_SUFFIXES: &[&str] = &[".tf", ".hcl"];

/// Decides which paths a scan may visit.
///
/// The default policy ignores the `.terraform` dependency cache
/// wherever it appears. A `.terralinkignore` file adds one pattern per
/// line (blank lines and `#` comments are skipped); a pattern matches
/// when it equals a path's basename, appears as a path segment, or is
/// a suffix of the path. Only `*.tf` and `*.hcl` files are candidates.
#[derive(Debug, Clone)]
pub struct PathFilter {
	patterns: Vec<String>,
}

impl Default for PathFilter {
	fn default() -> Self {
		Self {
			patterns: DEFAULT_PATTERNS.iter().map(ToString::to_string).collect(),
		}
	}
}

impl PathFilter {
	/// Build a filter from the default patterns plus any patterns found
	/// in `<ignore_dir>/.terralinkignore`. A missing pattern file is
	/// not an error.
	pub fn from_ignore_dir(ignore_dir: impl AsRef<Path>) -> TerralinkResult<Self> {
		let mut filter = Self::default();

		let ignore_file = ignore_dir.as_ref().join(IGNORE_FILE_NAME);
		if ignore_file.is_file() {
			let content =
				fs::read_to_string(&ignore_file).map_err(|error| TerralinkError::IgnoreFile {
					path: ignore_file.display().to_string(),
					reason: error.to_string(),
				})?;

			for line in content.lines() {
				let pattern = line.trim();
				if !pattern.is_empty() && !pattern.starts_with('#') {
					filter.patterns.push(pattern.to_string());
				}
			}
		}

		Ok(filter)
	}

	/// True when a directory must not be descended into.
	pub fn ignores_dir(&self, path: &Path) -> bool {
		self.matches_pattern(path)
	}

	/// True when a file is not a scan candidate: an ignore pattern
	/// matches it, or it lacks a recognised suffix.
	pub fn ignores_file(&self, path: &Path) -> bool {
		!has_candidate_suffix(path) || self.matches_pattern(path)
	}

	fn matches_pattern(&self, path: &Path) -> bool {
		let clean = path.to_string_lossy().replace('\\', "/");
		let base = clean.rsplit('/').next().unwrap_or(&clean);

		self.patterns.iter().any(|pattern| {
			base == pattern
				|| clean.contains(&format!("/{pattern}/"))
				|| clean.ends_with(&format!("/{pattern}"))
		})
	}
}

fn has_candidate_suffix(path: &Path) -> bool {
	let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
		return false;
	};
	CANDIDATE_SUFFIXES
		.iter()
		.any(|suffix| name.ends_with(suffix))
}
