use crate::TerralinkError;
use crate::TerralinkResult;
use crate::annotation::DevAnnotation;
use crate::annotation::StateAnnotation;
use crate::tokens::Token;
use crate::tokens::TokenKind;
use crate::tokens::quoted;

/// A single `module` block within a parsed document.
///
/// The module owns the token stream between its braces and exposes the
/// per-module state machine: a module is in production mode (no state
/// annotation) or development mode (exactly one state annotation), and
/// [`Module::load`] / [`Module::unload`] move between the two by
/// splicing the body token stream. Every token the splice does not
/// explicitly replace is copied through unchanged, so comments, blank
/// lines, and unrelated attributes survive byte-for-byte.
#[derive(Debug)]
pub struct Module {
	name: String,
	header: Vec<Token>,
	body: Vec<Token>,
	closing: Token,
}

/// Brace/paren nesting depth relative to the module body. Identifiers
/// named `source` or `version` inside nested expressions are not the
/// module's own attributes and must never be touched.
#[derive(Debug, Default)]
struct Depth {
	brace: i32,
	paren: i32,
}

impl Depth {
	fn update(&mut self, kind: TokenKind) {
		match kind {
			TokenKind::OBrace => self.brace += 1,
			TokenKind::CBrace => self.brace -= 1,
			TokenKind::OParen => self.paren += 1,
			TokenKind::CParen => self.paren -= 1,
			_ => {}
		}
	}

	fn is_top_level(&self) -> bool {
		self.brace == 0 && self.paren == 0
	}
}

impl Module {
	pub(crate) fn new(name: String, header: Vec<Token>, body: Vec<Token>, closing: Token) -> Self {
		Self {
			name,
			header,
			body,
			closing,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// True when a state annotation is present in the body, i.e. the
	/// module currently points at a local path. Pure query.
	pub fn is_loaded(&self) -> bool {
		self.find_state_annotation().is_some()
	}

	/// Switch the module to development mode.
	///
	/// Replaces the `source` attribute with the dev annotation's local
	/// path, removes the `version` attribute, and records the original
	/// values in a state annotation inserted directly below the dev
	/// annotation. Returns `false` without touching anything when the
	/// module is already loaded or carries no dev annotation.
	pub fn load(&mut self) -> TerralinkResult<bool> {
		if self.is_loaded() {
			return Ok(false);
		}

		let Some(dev) = self.find_dev_annotation() else {
			return Ok(false);
		};

		let source = self
			.attribute_value("source")
			.ok_or_else(|| TerralinkError::MissingSource(self.name.clone()))?;
		let version = self.attribute_value("version");
		let state = StateAnnotation { source, version };

		let mut output: Vec<Token> = Vec::with_capacity(self.body.len() + 6);
		let mut depth = Depth::default();
		let mut source_replaced = false;
		let mut state_inserted = false;
		let mut i = 0;

		while i < self.body.len() {
			let token = &self.body[i];
			depth.update(token.kind);

			if depth.is_top_level() && !source_replaced && token.is_ident("source") {
				output.extend(attribute_tokens("source", &dev.local_path));
				source_replaced = true;
				i = self.end_of_line(i, "source")? + 1;
				continue;
			}

			if depth.is_top_level() && token.is_ident("version") {
				pop_dangling_indent(&mut output);
				i = self.end_of_line(i, "version")? + 1;
				continue;
			}

			let starts_dev_line = !state_inserted
				&& token.is_comment()
				&& DevAnnotation::parse(&token.text).is_some();

			if starts_dev_line {
				// Reuse the dev annotation's indentation for the line
				// inserted below it.
				let indent = (i > 0)
					.then(|| &self.body[i - 1])
					.filter(|previous| previous.kind == TokenKind::Whitespace)
					.cloned();

				output.push(token.clone());
				i += 1;
				if let Some(newline) = self.body.get(i).filter(|t| t.kind == TokenKind::Newline) {
					output.push(newline.clone());
					i += 1;
				} else {
					output.push(Token::newline());
				}
				if let Some(indent) = indent {
					output.push(indent);
				}
				output.push(Token::new(TokenKind::LineComment, state.render()));
				output.push(Token::newline());
				state_inserted = true;
				continue;
			}

			output.push(token.clone());
			i += 1;
		}

		self.body = output;
		tracing::info!(module = %self.name, path = %dev.local_path, "loading module");
		Ok(true)
	}

	/// Switch the module back to production mode.
	///
	/// Removes the state annotation line, restores the original `source`
	/// value, and re-creates the `version` attribute directly below
	/// `source` when the annotation recorded one. Returns `false`
	/// without touching anything when no state annotation is present.
	pub fn unload(&mut self) -> TerralinkResult<bool> {
		let Some(state) = self.find_state_annotation() else {
			return Ok(false);
		};

		let mut output: Vec<Token> = Vec::with_capacity(self.body.len());
		let mut depth = Depth::default();
		let mut source_replaced = false;
		let mut i = 0;

		while i < self.body.len() {
			let token = &self.body[i];
			depth.update(token.kind);

			if token.is_comment() && StateAnnotation::parse(&token.text).is_some() {
				// Drop the annotation, its line terminator, and the
				// indentation left dangling on the emptied line.
				pop_dangling_indent(&mut output);
				i += 1;
				if self
					.body
					.get(i)
					.is_some_and(|next| next.kind == TokenKind::Newline)
				{
					i += 1;
				}
				continue;
			}

			if depth.is_top_level() && !source_replaced && token.is_ident("source") {
				let indent = output
					.last()
					.filter(|last| last.kind == TokenKind::Whitespace)
					.cloned();

				output.extend(attribute_tokens("source", &state.source));
				if let Some(version) = &state.version {
					if let Some(indent) = indent {
						output.push(indent);
					}
					output.extend(attribute_tokens("version", version));
				}
				source_replaced = true;
				i = self.end_of_line(i, "source")? + 1;
				continue;
			}

			output.push(token.clone());
			i += 1;
		}

		self.body = output;
		tracing::info!(module = %self.name, source = %state.source, "unloading module");
		Ok(true)
	}

	pub(crate) fn write_source(&self, out: &mut String) {
		for token in &self.header {
			out.push_str(&token.text);
		}
		for token in &self.body {
			out.push_str(&token.text);
		}
		out.push_str(&self.closing.text);
	}

	fn find_dev_annotation(&self) -> Option<DevAnnotation> {
		self.body
			.iter()
			.filter(|token| token.is_comment())
			.find_map(|token| DevAnnotation::parse(&token.text))
	}

	fn find_state_annotation(&self) -> Option<StateAnnotation> {
		self.body
			.iter()
			.filter(|token| token.is_comment())
			.find_map(|token| StateAnnotation::parse(&token.text))
	}

	/// The string value of a top-level attribute of the module body.
	/// `None` when the attribute is absent, its value is not a string
	/// literal, or the literal is empty.
	fn attribute_value(&self, name: &str) -> Option<String> {
		let mut depth = Depth::default();

		for (i, token) in self.body.iter().enumerate() {
			depth.update(token.kind);
			if !depth.is_top_level() || !token.is_ident(name) {
				continue;
			}

			let mut rest = self.body[i + 1..].iter();
			let after_ws = rest.find(|t| t.kind != TokenKind::Whitespace);
			if !after_ws.is_some_and(|t| t.kind == TokenKind::Equal) {
				continue;
			}

			return rest
				.take_while(|t| t.kind != TokenKind::Newline)
				.find_map(Token::string_value)
				.filter(|value| !value.is_empty());
		}

		None
	}

	/// Index of the line terminator ending the attribute line that
	/// starts at `from`. A body without one is malformed input from the
	/// document layer and fails loudly rather than truncating the body.
	fn end_of_line(&self, from: usize, attribute: &str) -> TerralinkResult<usize> {
		self.body[from..]
			.iter()
			.position(|token| token.kind == TokenKind::Newline)
			.map(|offset| from + offset)
			.ok_or_else(|| TerralinkError::MissingLineTerminator {
				module: self.name.clone(),
				attribute: attribute.to_string(),
			})
	}
}

/// Pop a trailing whitespace token that was the indentation of a line
/// about to be removed, so the emptied line does not leave stray
/// spaces behind. Only pure line indentation qualifies: the token
/// before it must be a line terminator (or the start of the body).
fn pop_dangling_indent(output: &mut Vec<Token>) {
	let dangling = output
		.last()
		.is_some_and(|last| last.kind == TokenKind::Whitespace)
		&& output
			.iter()
			.rev()
			.nth(1)
			.is_none_or(|before| before.kind == TokenKind::Newline);
	if dangling {
		output.pop();
	}
}

/// Tokens for a complete `name = "value"` attribute line, terminator
/// included.
fn attribute_tokens(name: &str, value: &str) -> Vec<Token> {
	vec![
		Token::new(TokenKind::Ident, name),
		Token::new(TokenKind::Whitespace, " "),
		Token::new(TokenKind::Equal, "="),
		Token::new(TokenKind::Whitespace, " "),
		Token::new(TokenKind::StringLit, quoted(value)),
		Token::newline(),
	]
}
