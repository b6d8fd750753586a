use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::TerralinkError;
use crate::TerralinkResult;
use crate::lexer::tokenize;
use crate::module::Module;
use crate::tokens::Token;
use crate::tokens::TokenKind;

/// One top-level run of content in a parsed file: either tokens the
/// tool never rewrites, or a managed module block.
#[derive(Debug)]
enum Segment {
	Verbatim(Vec<Token>),
	Module(Module),
}

/// A single parsed Terraform-style file.
///
/// The document owns the file's full token stream, split into verbatim
/// segments and module blocks. Serializing the segments in order
/// reproduces the file, so content outside module bodies is untouched
/// by construction.
#[derive(Debug)]
pub struct Document {
	path: PathBuf,
	segments: Vec<Segment>,
}

impl Document {
	/// Read and parse the file at `path`.
	pub fn open(path: impl Into<PathBuf>) -> TerralinkResult<Self> {
		let path = path.into();
		let content = fs::read_to_string(&path)?;
		Self::parse(path, &content)
	}

	/// Parse file content into a document. Malformed input is rejected
	/// for the whole file; a document is never partially accepted.
	pub fn parse(path: impl Into<PathBuf>, content: &str) -> TerralinkResult<Self> {
		let tokens = tokenize(content)?;
		let segments = split_segments(tokens)?;
		Ok(Self {
			path: path.into(),
			segments,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The module blocks declared in this document, in file order.
	pub fn modules(&self) -> impl Iterator<Item = &Module> {
		self.segments.iter().filter_map(|segment| match segment {
			Segment::Module(module) => Some(module),
			Segment::Verbatim(_) => None,
		})
	}

	pub fn modules_mut(&mut self) -> impl Iterator<Item = &mut Module> {
		self.segments.iter_mut().filter_map(|segment| match segment {
			Segment::Module(module) => Some(module),
			Segment::Verbatim(_) => None,
		})
	}

	/// Serialize the document back to source text.
	pub fn to_source(&self) -> String {
		let mut out = String::new();
		for segment in &self.segments {
			match segment {
				Segment::Verbatim(tokens) => {
					for token in tokens {
						out.push_str(&token.text);
					}
				}
				Segment::Module(module) => module.write_source(&mut out),
			}
		}
		out
	}

	/// Write the serialized document back to its file. Callers only
	/// invoke this after at least one module mutation, so files with no
	/// relevant changes are never rewritten.
	pub fn persist(&self) -> TerralinkResult<()> {
		fs::write(&self.path, self.to_source())?;
		Ok(())
	}
}

/// Split a token stream into verbatim runs and module blocks.
///
/// A module block is a top-level declaration with keyword `module` and
/// exactly one quoted label. Anything else, including other block
/// kinds and `module` blocks with a different label count, stays
/// verbatim.
fn split_segments(tokens: Vec<Token>) -> TerralinkResult<Vec<Segment>> {
	let mut segments = Vec::new();
	let mut verbatim: Vec<Token> = Vec::new();
	let mut depth: i32 = 0;
	let mut i = 0;

	while i < tokens.len() {
		if depth == 0
			&& tokens[i].is_ident("module")
			&& let Some((name, obrace)) = match_module_header(&tokens, i)
		{
			if !verbatim.is_empty() {
				segments.push(Segment::Verbatim(std::mem::take(&mut verbatim)));
			}

			let header = tokens[i..=obrace].to_vec();
			let mut body = Vec::new();
			let mut inner: i32 = 0;
			let mut j = obrace + 1;
			loop {
				let Some(token) = tokens.get(j) else {
					return Err(TerralinkError::UnclosedBlock(name));
				};
				match token.kind {
					TokenKind::OBrace => inner += 1,
					TokenKind::CBrace if inner == 0 => break,
					TokenKind::CBrace => inner -= 1,
					_ => {}
				}
				body.push(token.clone());
				j += 1;
			}

			segments.push(Segment::Module(Module::new(
				name,
				header,
				body,
				tokens[j].clone(),
			)));
			i = j + 1;
			continue;
		}

		match tokens[i].kind {
			TokenKind::OBrace => depth += 1,
			TokenKind::CBrace => depth -= 1,
			_ => {}
		}
		verbatim.push(tokens[i].clone());
		i += 1;
	}

	if !verbatim.is_empty() {
		segments.push(Segment::Verbatim(verbatim));
	}

	Ok(segments)
}

/// Match `module` `"label"` `{` starting at the `module` identifier,
/// allowing horizontal whitespace between the parts. Returns the label
/// value and the index of the opening brace.
fn match_module_header(tokens: &[Token], module_ident: usize) -> Option<(String, usize)> {
	let mut i = module_ident + 1;
	while tokens.get(i).is_some_and(|t| t.kind == TokenKind::Whitespace) {
		i += 1;
	}
	let label = tokens.get(i).filter(|t| t.kind == TokenKind::StringLit)?;
	let name = label.string_value()?;

	i += 1;
	while tokens.get(i).is_some_and(|t| t.kind == TokenKind::Whitespace) {
		i += 1;
	}
	if tokens.get(i).is_some_and(|t| t.kind == TokenKind::OBrace) {
		Some((name, i))
	} else {
		None
	}
}
