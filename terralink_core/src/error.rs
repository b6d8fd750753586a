use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TerralinkError {
	#[error(transparent)]
	#[diagnostic(code(terralink::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse file: {0}")]
	#[diagnostic(code(terralink::parse))]
	Parse(String),

	#[error("module block `{0}` is missing its closing brace")]
	#[diagnostic(
		code(terralink::unclosed_block),
		help("add a closing `}}` for this module block")
	)]
	UnclosedBlock(String),

	#[error("module `{0}` has no source attribute")]
	#[diagnostic(
		code(terralink::missing_source),
		help("add a `source` attribute to the module block, or remove its terralink annotation")
	)]
	MissingSource(String),

	#[error("no line terminator after the `{attribute}` attribute in module `{module}`")]
	#[diagnostic(code(terralink::missing_line_terminator))]
	MissingLineTerminator { module: String, attribute: String },

	#[error("failed to load ignore patterns from `{path}`: {reason}")]
	#[diagnostic(code(terralink::ignore_file))]
	IgnoreFile { path: String, reason: String },
}

pub type TerralinkResult<T> = Result<T, TerralinkError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
