use logos::Logos;

use crate::TerralinkError;
use crate::TerralinkResult;
use crate::tokens::Token;
use crate::tokens::TokenKind;

/// Raw tokens produced by logos for flat tokenization of file content.
///
/// The grammar recognises just enough HCL structure for the splicing
/// algorithm: identifiers, string literals, comments, line terminators,
/// and the nesting delimiters. Everything else falls through to the
/// error branch and is preserved as opaque text.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("{")]
	OBrace,
	#[token("}")]
	CBrace,
	#[token("(")]
	OParen,
	#[token(")")]
	CParen,
	#[token("[")]
	OBracket,
	#[token("]")]
	CBracket,
	#[token("=")]
	Equal,
	#[token("\n")]
	Newline,
	#[regex(r"[ \t\r]+")]
	Whitespace,
	#[regex(r"#[^\n]*", allow_greedy = true)]
	HashComment,
	#[regex(r"//[^\n]*", allow_greedy = true)]
	SlashComment,
	#[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
	BlockComment,
	// The unterminated variants match strictly shorter prefixes, so the
	// terminated rules always win when a terminator exists.
	#[regex(r"/\*([^*]|\*+[^*/])*\**")]
	UnterminatedBlockComment,
	#[regex(r#""([^"\\\n]|\\[^\n])*""#)]
	StringLit,
	#[regex(r#""([^"\\\n]|\\[^\n])*"#)]
	UnterminatedString,
	#[regex(r"[0-9]+(\.[0-9]+)?")]
	Number,
	#[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
	Ident,
}

impl RawToken {
	fn kind(&self) -> TokenKind {
		match self {
			RawToken::OBrace => TokenKind::OBrace,
			RawToken::CBrace => TokenKind::CBrace,
			RawToken::OParen => TokenKind::OParen,
			RawToken::CParen => TokenKind::CParen,
			RawToken::OBracket => TokenKind::OBracket,
			RawToken::CBracket => TokenKind::CBracket,
			RawToken::Equal => TokenKind::Equal,
			RawToken::Newline => TokenKind::Newline,
			RawToken::Whitespace => TokenKind::Whitespace,
			RawToken::HashComment | RawToken::SlashComment => TokenKind::LineComment,
			RawToken::BlockComment => TokenKind::BlockComment,
			RawToken::StringLit => TokenKind::StringLit,
			RawToken::Number => TokenKind::Number,
			RawToken::Ident => TokenKind::Ident,
			RawToken::UnterminatedBlockComment | RawToken::UnterminatedString => TokenKind::Other,
		}
	}
}

/// Tokenize file content into a lossless token stream.
///
/// Every byte of the input belongs to exactly one token, so
/// concatenating the token texts reproduces the input unchanged.
/// Structurally malformed input (an unterminated string literal or
/// block comment) is rejected for the whole file.
pub(crate) fn tokenize(source: &str) -> TerralinkResult<Vec<Token>> {
	let mut tokens: Vec<Token> = Vec::new();
	let mut lexer = RawToken::lexer(source);

	while let Some(result) = lexer.next() {
		let slice = lexer.slice();
		match result {
			Ok(RawToken::UnterminatedString) => {
				return Err(TerralinkError::Parse(
					"unterminated string literal".to_string(),
				));
			}
			Ok(RawToken::UnterminatedBlockComment) => {
				return Err(TerralinkError::Parse(
					"unterminated block comment".to_string(),
				));
			}
			Ok(raw) => {
				tokens.push(Token::new(raw.kind(), slice));
			}
			Err(()) => {
				// Unrecognised bytes pass through verbatim. Merge
				// adjacent runs into a single opaque token.
				if let Some(last) = tokens.last_mut()
					&& last.kind == TokenKind::Other
				{
					last.text.push_str(slice);
				} else {
					tokens.push(Token::new(TokenKind::Other, slice));
				}
			}
		}
	}

	Ok(tokens)
}
