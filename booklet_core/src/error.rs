use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum BookletError {
	#[error(transparent)]
	#[diagnostic(code(booklet::io_error))]
	Io(#[from] std::io::Error),

	#[error("path not found: `{0}`")]
	#[diagnostic(
		code(booklet::not_found),
		help("check that the competition repository path is correct and readable")
	)]
	NotFound(String),

	#[error("schema violation at `{path}`: expected {expected}, found {actual}")]
	#[diagnostic(code(booklet::schema_violation))]
	SchemaViolation {
		path: String,
		expected: String,
		actual: String,
	},

	#[error("missing variables: {}", .0.join(", "))]
	#[diagnostic(
		code(booklet::missing_variables),
		help("every listed name must be present in the metadata context")
	)]
	MissingVariables(Vec<String>),

	#[error("conversion failed: {0}")]
	#[diagnostic(code(booklet::conversion_failure))]
	ConversionFailure(String),

	#[error("counter exhausted: no identity available past {0}")]
	#[diagnostic(code(booklet::counter_exhausted))]
	CounterExhausted(i64),

	#[error("cannot split {len} item(s) into groups of {size}")]
	#[diagnostic(
		code(booklet::uneven_split),
		help("pad the sequence to a multiple of the group size before splitting")
	)]
	UnevenSplit { len: usize, size: usize },

	#[error("failed to parse metadata file `{path}`: {reason}")]
	#[diagnostic(code(booklet::metadata_parse))]
	MetadataParse { path: String, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(booklet::config_parse),
		help("check that booklet.toml is valid TOML with [ignore] and/or [templates] sections")
	)]
	ConfigParse(String),

	#[error("template not found: `{0}`")]
	#[diagnostic(code(booklet::template_not_found))]
	TemplateNotFound(String),

	#[error("template rendering failed: {0}")]
	#[diagnostic(code(booklet::template_render))]
	TemplateRender(String),

	#[error("unknown language code: `{0}`")]
	#[diagnostic(
		code(booklet::unknown_language),
		help("the language code must be present in the locale table")
	)]
	UnknownLanguage(String),
}

pub type BookletResult<T> = Result<T, BookletError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
