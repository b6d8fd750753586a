use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::TerralinkResult;
use crate::document::Document;
use crate::filter::PathFilter;
use crate::module::Module;

/// A file the scan could not fully process, attributed to its path.
/// The file is skipped, never written, and the scan continues.
#[derive(Debug, Serialize)]
pub struct ScanFailure {
	pub path: PathBuf,
	pub message: String,
}

/// Aggregated outcome of one scan operation.
///
/// `entries` maps file paths to the per-file payload: the loaded module
/// names for [`Scanner::check`], the change count for
/// [`Scanner::dev_load`] and [`Scanner::dev_unload`]. Files with an
/// empty payload are omitted.
#[derive(Debug, Serialize)]
pub struct ScanReport<T> {
	pub entries: BTreeMap<PathBuf, T>,
	pub failures: Vec<ScanFailure>,
}

impl<T> Default for ScanReport<T> {
	fn default() -> Self {
		Self {
			entries: BTreeMap::new(),
			failures: Vec::new(),
		}
	}
}

impl<T> ScanReport<T> {
	pub fn is_clean(&self) -> bool {
		self.entries.is_empty() && self.failures.is_empty()
	}

	pub fn has_failures(&self) -> bool {
		!self.failures.is_empty()
	}
}

/// Walks a directory tree and applies the module state machine to every
/// module in every qualifying document, one file at a time.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
	filter: PathFilter,
}

impl Scanner {
	pub fn new(filter: PathFilter) -> Self {
		Self { filter }
	}

	/// Report the modules currently in development mode, keyed by file
	/// path. Never mutates anything.
	pub fn check(&self, root: impl AsRef<Path>) -> TerralinkResult<ScanReport<Vec<String>>> {
		let mut report = ScanReport::default();

		for path in self.candidate_files(root.as_ref())? {
			match check_file(&path) {
				Ok(loaded) => {
					if !loaded.is_empty() {
						report.entries.insert(path, loaded);
					}
				}
				Err(error) => {
					report.failures.push(ScanFailure {
						path,
						message: error.to_string(),
					});
				}
			}
		}

		Ok(report)
	}

	/// Apply [`Module::load`] to every module of every qualifying file.
	/// A file is persisted only when at least one of its modules
	/// changed.
	pub fn dev_load(&self, root: impl AsRef<Path>) -> TerralinkResult<ScanReport<usize>> {
		self.apply(root.as_ref(), Module::load)
	}

	/// Apply [`Module::unload`] to every module of every qualifying
	/// file.
	pub fn dev_unload(&self, root: impl AsRef<Path>) -> TerralinkResult<ScanReport<usize>> {
		self.apply(root.as_ref(), Module::unload)
	}

	fn apply(
		&self,
		root: &Path,
		op: fn(&mut Module) -> TerralinkResult<bool>,
	) -> TerralinkResult<ScanReport<usize>> {
		let mut report = ScanReport::default();

		for path in self.candidate_files(root)? {
			match apply_file(&path, op) {
				Ok(0) => {}
				Ok(changes) => {
					report.entries.insert(path, changes);
				}
				Err(error) => {
					report.failures.push(ScanFailure {
						path,
						message: error.to_string(),
					});
				}
			}
		}

		Ok(report)
	}

	/// Collect every non-filtered candidate file under `root`, sorted
	/// for deterministic ordering.
	fn candidate_files(&self, root: &Path) -> TerralinkResult<Vec<PathBuf>> {
		let mut files = Vec::new();

		if root.is_file() {
			if !self.filter.ignores_file(root) {
				files.push(root.to_path_buf());
			}
			return Ok(files);
		}

		self.walk_dir(root, &mut files)?;
		files.sort();
		Ok(files)
	}

	fn walk_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) -> TerralinkResult<()> {
		for entry in fs::read_dir(dir)? {
			let entry = entry?;
			let path = entry.path();
			// file_type() does not follow symlinks, so a symlinked
			// directory cannot cycle the walk.
			if entry.file_type()?.is_dir() {
				if !self.filter.ignores_dir(&path) {
					self.walk_dir(&path, files)?;
				}
			} else if !self.filter.ignores_file(&path) {
				files.push(path);
			}
		}

		Ok(())
	}
}

fn check_file(path: &Path) -> TerralinkResult<Vec<String>> {
	let document = Document::open(path)?;
	let loaded = document
		.modules()
		.filter(|module| module.is_loaded())
		.map(|module| module.name().to_string())
		.collect();
	Ok(loaded)
}

/// Run one state-machine operation over every module of one file.
///
/// A module error aborts the remaining modules of this file and the
/// file is left byte-for-byte as found; a partially rewritten token
/// stream is never persisted.
fn apply_file(path: &Path, op: fn(&mut Module) -> TerralinkResult<bool>) -> TerralinkResult<usize> {
	let mut document = Document::open(path)?;

	let mut changes = 0;
	for module in document.modules_mut() {
		if op(module)? {
			changes += 1;
		}
	}

	if changes > 0 {
		document.persist()?;
		tracing::debug!(path = %path.display(), changes, "persisted document");
	}

	Ok(changes)
}
