//! Template filters and functions registered on the rendering environment.

use minijinja::Error;
use minijinja::ErrorKind;
use minijinja::State;
use minijinja::value::Value as TemplateValue;

const ROMAN_PAIRS: [(i64, &str); 13] = [
	(1000, "M"),
	(900, "CM"),
	(500, "D"),
	(400, "CD"),
	(100, "C"),
	(90, "XC"),
	(50, "L"),
	(40, "XL"),
	(10, "X"),
	(9, "IX"),
	(5, "V"),
	(4, "IV"),
	(1, "I"),
];

/// Express a positive integer (1..=3999) as a Roman numeral.
pub fn roman(value: i64) -> Result<String, Error> {
	if !(1..=3999).contains(&value) {
		return Err(Error::new(
			ErrorKind::InvalidOperation,
			format!("cannot express {value} as a Roman numeral"),
		));
	}

	let mut remainder = value;
	let mut out = String::new();
	for (threshold, glyph) in ROMAN_PAIRS {
		while remainder >= threshold {
			out.push_str(glyph);
			remainder -= threshold;
		}
	}
	Ok(out)
}

/// Join a list for prose: `[x, y, z]` becomes `x, y a z`. A plain string
/// passes through unchanged; the conjunction defaults to `a`. With `wrap`,
/// the named filter is applied to each item before joining, e.g.
/// `format_list(none, "textbf")` yields `\textbf{x} a \textbf{y}`.
pub fn format_list(
	state: &State,
	value: TemplateValue,
	conjunction: Option<String>,
	wrap: Option<String>,
) -> Result<String, Error> {
	if let Some(s) = value.as_str() {
		return Ok(s.to_string());
	}

	let conjunction = conjunction.unwrap_or_else(|| "a".to_string());
	let mut items = Vec::new();
	for item in value.try_iter()? {
		let item = match &wrap {
			Some(filter) => state.apply_filter(filter, &[item])?,
			None => item,
		};
		items.push(
			item.as_str()
				.map_or_else(|| item.to_string(), str::to_string),
		);
	}

	Ok(match items.as_slice() {
		[] => String::new(),
		[only] => only.clone(),
		[head @ .., last] => format!("{} {conjunction} {last}", head.join(", ")),
	})
}

/// Pick the grammatical form for a count: one for 1, few for 2–4, many
/// otherwise.
pub fn plural(count: i64, one: String, few: String, many: String) -> String {
	match count.abs() {
		1 => one,
		2..=4 => few,
		_ => many,
	}
}

/// Wrap a value in LaTeX bold.
pub fn textbf(value: String) -> String {
	format!("\\textbf{{{value}}}")
}

/// Typeset an ISO date for LaTeX: component separators become en-dashes.
pub fn isotex(date: String) -> String {
	date.replace('-', "--")
}

/// GTIN-style check digit over a string of digits: weights 3, 1, 3, …
/// from the rightmost digit.
pub fn check_digit(value: String) -> Result<i64, Error> {
	if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
		return Err(Error::new(
			ErrorKind::InvalidOperation,
			format!("check digit requires a non-empty string of digits, got `{value}`"),
		));
	}

	let sum: i64 = value
		.bytes()
		.rev()
		.enumerate()
		.map(|(i, b)| {
			let digit = i64::from(b - b'0');
			if i % 2 == 0 { digit * 3 } else { digit }
		})
		.sum();

	Ok((10 - sum % 10) % 10)
}
