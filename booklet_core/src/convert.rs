//! Markdown → LaTeX/HTML conversion through an external `pandoc` process,
//! wrapped in the line-level rewrites the templates rely on: custom tag
//! filtering, locale quote styles and aligned-math shorthand.

use std::io::Write;
use std::process::Command;
use std::process::Stdio;

use regex::Regex;

use crate::BookletError;
use crate::BookletResult;
use crate::locale::Locale;

/// Target output format of a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
	Latex,
	Html,
}

impl Format {
	pub fn pandoc_target(self) -> &'static str {
		match self {
			Format::Latex => "latex",
			Format::Html => "html",
		}
	}
}

/// One conversion pipeline: preprocess, run pandoc, postprocess.
///
/// The pipeline is all-or-nothing — any pandoc failure is surfaced as an
/// opaque `ConversionFailure` and no partial output is produced.
#[derive(Debug)]
pub struct Convertor {
	format: Format,
	locale: Locale,
	replacements: Vec<(Regex, String)>,
	quotes: Vec<(Regex, String)>,
	post: Vec<(Regex, String)>,
}

impl Convertor {
	pub fn new(format: Format, locale: &Locale) -> BookletResult<Self> {
		let (open, close) = locale.quotes.clone();

		let quotes = compile(vec![
			(r#""(_)"#.to_string(), format!("{close}${{1}}")),
			(r#""(\b)"#.to_string(), format!("{open}${{1}}")),
			(r#"(\b)""#.to_string(), format!("${{1}}{close}")),
			(r#"(\S)""#.to_string(), format!("${{1}}{close}")),
			(r#""(\S)"#.to_string(), format!("{open}${{1}}")),
		])?;

		let replacements = match format {
			Format::Latex => {
				compile(vec![
					(
						r"^@E\s*(.*)$".to_string(),
						r"\errorMessage{${1}}".to_string(),
					),
					(r"^@L\s*(.*)$".to_string(), "${1}".to_string()),
					(
						r"^@TODO\s*(.*)$".to_string(),
						r"\todoMessage{${1}}".to_string(),
					),
				])?
			}
			Format::Html => {
				compile(vec![
					(r"^@E\s*(.*)$".to_string(), "Error: ${1}".to_string()),
					(r"^@H\s*(.*)$".to_string(), "${1}".to_string()),
					(
						r"^!\[(?P<caption>.*)\]\((?P<filename>.*)\.(?P<extension>jpg|png|svg)\)\{(?P<extras>.*)\}$"
							.to_string(),
						"![${caption}](images/${filename}.${extension}){${extras}}".to_string(),
					),
					(
						r"^!\[(?P<caption>.*)\]\((?P<filename>.*)\.(?P<extension>gp)\)\{(?P<extras>.*)\}$"
							.to_string(),
						"![${caption}](images/${filename}.png){${extras}}".to_string(),
					),
				])?
			}
		};

		let figure = locale.figure.clone().unwrap_or_else(|| "Figure".to_string());
		let post = match format {
			Format::Latex => {
				compile(vec![
					("``".to_string(), "“".to_string()),
					("''".to_string(), "”".to_string()),
					(
						r"\\includegraphics\[(.*)\]\{(.*)\.(svg|gp)\}".to_string(),
						r"\insertPicture[${1}]{${2}.pdf}".to_string(),
					),
					(
						r"\\includegraphics\[(.*)\]\{(.*)\.(png|jpg|pdf)\}".to_string(),
						r"\insertPicture[${1}]{${2}.${3}}".to_string(),
					),
				])?
			}
			Format::Html => {
				compile(vec![
					(
						r#"<img src="(.*)" (.*)id="(.*)" style="height:([0-9.]*)mm" (.*)>"#.to_string(),
						r#"<img src="${1}" ${2}id="${3}" style="max-width: 100%; max-height: calc(1.7 * ${4}mm); margin: auto; display: block;" ${5}>"#
							.to_string(),
					),
					(
						r"<figcaption>Figure (\d*): (.*)</figcaption>".to_string(),
						format!(
							r#"<figcaption style="text-align: center;">{figure} ${{1}}: <span style="font-style: italic;">${{2}}</span></figcaption>"#
						),
					),
				])?
			}
		};

		Ok(Self {
			format,
			locale: locale.clone(),
			replacements,
			quotes,
			post,
		})
	}

	/// Run the whole pipeline on one document.
	pub fn convert(&self, input: &str) -> BookletResult<String> {
		let preprocessed = self.preprocess(input);
		let converted = self.run_pandoc(&preprocessed)?;
		Ok(self.postprocess(&converted))
	}

	/// Line-level rewrites applied before pandoc: tag filtering, custom tag
	/// replacement, locale quotes, aligned-math shorthand.
	pub fn preprocess(&self, input: &str) -> String {
		let mut out = String::new();
		for line in input.lines() {
			if !self.keep_line(line) {
				continue;
			}
			let line = apply(&self.replacements, line);
			let line = apply(&self.quotes, &line);
			match rewrite_math(&line) {
				Some(rewritten) => out.push_str(&rewritten),
				None => out.push_str(&line),
			}
			out.push('\n');
		}
		out
	}

	/// Format-specific cleanup applied to pandoc's output.
	pub fn postprocess(&self, input: &str) -> String {
		let mut out = String::new();
		for line in input.lines() {
			if self.format == Format::Latex && is_empty_caption(line) {
				continue;
			}
			out.push_str(&apply(&self.post, line));
			out.push('\n');
		}
		out
	}

	/// Filter by custom tags: drop `%` comment lines, keep `@H` lines only
	/// for HTML and `@L` lines only for LaTeX.
	fn keep_line(&self, line: &str) -> bool {
		if line.starts_with('%') {
			return false;
		}
		if line.starts_with("@H") && self.format != Format::Html {
			return false;
		}
		if line.starts_with("@L") && self.format != Format::Latex {
			return false;
		}
		true
	}

	fn run_pandoc(&self, input: &str) -> BookletResult<String> {
		let mut child = Command::new("pandoc")
			.arg("--mathjax")
			.args(["--from", "markdown+smart"])
			.args(["--to", self.format.pandoc_target()])
			.args(["--metadata", &format!("lang={}", self.locale.tag)])
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.spawn()
			.map_err(|e| {
				BookletError::ConversionFailure(format!("failed to launch pandoc: {e}"))
			})?;

		if let Some(mut stdin) = child.stdin.take() {
			stdin
				.write_all(input.as_bytes())
				.map_err(|e| BookletError::ConversionFailure(e.to_string()))?;
		}

		let output = child
			.wait_with_output()
			.map_err(|e| BookletError::ConversionFailure(e.to_string()))?;

		if !output.status.success() {
			return Err(BookletError::ConversionFailure(
				String::from_utf8_lossy(&output.stderr).trim().to_string(),
			));
		}

		String::from_utf8(output.stdout)
			.map_err(|e| BookletError::ConversionFailure(e.to_string()))
	}
}

fn compile(pairs: Vec<(String, String)>) -> BookletResult<Vec<(Regex, String)>> {
	pairs
		.into_iter()
		.map(|(pattern, replacement)| {
			Regex::new(&pattern)
				.map(|re| (re, replacement))
				.map_err(|e| BookletError::ConversionFailure(format!("bad rewrite pattern: {e}")))
		})
		.collect()
}

fn apply(rewrites: &[(Regex, String)], line: &str) -> String {
	let mut current = line.to_string();
	for (re, replacement) in rewrites {
		current = re.replace_all(&current, replacement.as_str()).into_owned();
	}
	current
}

/// Shorthand for aligned display math: a line of `$${` opens an aligned
/// block, a line of `}$$` closes it.
fn rewrite_math(line: &str) -> Option<String> {
	let indent_len = line.len() - line.trim_start().len();
	let (indent, rest) = line.split_at(indent_len);
	match rest.trim_end() {
		"$${" => Some(format!("{indent}$$\n{indent}\\begin{{aligned}}")),
		"}$$" => Some(format!("{indent}\\end{{aligned}}\n{indent}$$")),
		_ => None,
	}
}

/// Pandoc emits empty captions for unlabelled figures; drop them.
fn is_empty_caption(line: &str) -> bool {
	let Some(rest) = line.strip_prefix("\\caption{}") else {
		return false;
	};
	rest.is_empty() || (rest.starts_with("\\label{") && rest.ends_with('}'))
}
