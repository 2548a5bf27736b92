use regex::Regex;
use serde_json::Value;

use crate::BookletError;
use crate::BookletResult;

/// Declarative shape contract for a metadata value.
///
/// A context node's final `data` is validated against its schema exactly
/// once, after every population and derivation step has completed. Failures
/// carry the full dotted field path and a description of the expected shape.
#[derive(Debug, Clone)]
pub enum Schema {
	/// Any value, including null.
	Any,
	Bool,
	/// An integer (floats are rejected).
	Int,
	/// An integer further constrained by a named predicate.
	IntWhere {
		describe: &'static str,
		check: fn(i64) -> bool,
	},
	Str,
	NonEmptyStr,
	/// A string fully matching the given pattern.
	StrMatching(&'static str),
	/// A string drawn from an explicit set of allowed values.
	StrOneOf(Vec<String>),
	/// A string holding a `YYYY-MM-DD` calendar date.
	IsoDate,
	/// A string or a number.
	Scalar,
	List(Box<Schema>),
	Map(MapSchema),
}

/// Shape of a mapping: named fields plus a policy for unlisted keys.
#[derive(Debug, Clone)]
pub struct MapSchema {
	pub fields: Vec<Field>,
	pub extra: Extra,
}

/// Policy for keys not named in [`MapSchema::fields`].
#[derive(Debug, Clone)]
pub enum Extra {
	/// Unlisted keys are a schema violation.
	Deny,
	/// Unlisted keys are accepted unchecked.
	Allow,
	/// Every unlisted key's value must match the given schema.
	Match(Box<Schema>),
}

#[derive(Debug, Clone)]
pub struct Field {
	pub key: &'static str,
	pub required: bool,
	pub schema: Schema,
}

impl Field {
	pub fn required(key: &'static str, schema: Schema) -> Self {
		Self {
			key,
			required: true,
			schema,
		}
	}

	pub fn optional(key: &'static str, schema: Schema) -> Self {
		Self {
			key,
			required: false,
			schema,
		}
	}
}

impl Schema {
	/// Convenience constructor for a closed mapping of named fields.
	pub fn map(fields: Vec<Field>) -> Self {
		Schema::Map(MapSchema {
			fields,
			extra: Extra::Deny,
		})
	}

	/// A mapping with arbitrary keys whose values all match `value_schema`.
	pub fn map_of(value_schema: Schema) -> Self {
		Schema::Map(MapSchema {
			fields: Vec::new(),
			extra: Extra::Match(Box::new(value_schema)),
		})
	}

	/// A mapping with no constraints on its entries.
	pub fn any_map() -> Self {
		Schema::Map(MapSchema {
			fields: Vec::new(),
			extra: Extra::Allow,
		})
	}

	/// Human-readable description of the expected shape, used in errors.
	pub fn describe(&self) -> String {
		match self {
			Schema::Any => "any value".to_string(),
			Schema::Bool => "boolean".to_string(),
			Schema::Int => "integer".to_string(),
			Schema::IntWhere { describe, .. } => (*describe).to_string(),
			Schema::Str => "string".to_string(),
			Schema::NonEmptyStr => "non-empty string".to_string(),
			Schema::StrMatching(pattern) => format!("string matching `{pattern}`"),
			Schema::StrOneOf(allowed) => format!("one of [{}]", allowed.join(", ")),
			Schema::IsoDate => "date in YYYY-MM-DD format".to_string(),
			Schema::Scalar => "string or number".to_string(),
			Schema::List(inner) => format!("list of {}", inner.describe()),
			Schema::Map(_) => "mapping".to_string(),
		}
	}

	/// Validate `value` against this schema. `path` is the dotted prefix of
	/// the value's location, empty at the root.
	pub fn validate(&self, value: &Value, path: &str) -> BookletResult<()> {
		match self {
			Schema::Any => Ok(()),
			Schema::Bool => {
				if value.is_boolean() {
					Ok(())
				} else {
					Err(self.violation(value, path))
				}
			}
			Schema::Int => {
				if value.as_i64().is_some() {
					Ok(())
				} else {
					Err(self.violation(value, path))
				}
			}
			Schema::IntWhere { check, .. } => {
				match value.as_i64() {
					Some(n) if check(n) => Ok(()),
					_ => Err(self.violation(value, path)),
				}
			}
			Schema::Str => {
				if value.is_string() {
					Ok(())
				} else {
					Err(self.violation(value, path))
				}
			}
			Schema::NonEmptyStr => {
				match value.as_str() {
					Some(s) if !s.is_empty() => Ok(()),
					_ => Err(self.violation(value, path)),
				}
			}
			Schema::StrMatching(pattern) => {
				let re = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
					BookletError::SchemaViolation {
						path: path.to_string(),
						expected: self.describe(),
						actual: format!("unusable pattern: {e}"),
					}
				})?;
				match value.as_str() {
					Some(s) if re.is_match(s) => Ok(()),
					_ => Err(self.violation(value, path)),
				}
			}
			Schema::StrOneOf(allowed) => {
				match value.as_str() {
					Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
					_ => Err(self.violation(value, path)),
				}
			}
			Schema::IsoDate => {
				match value.as_str() {
					Some(s) if is_iso_date(s) => Ok(()),
					_ => Err(self.violation(value, path)),
				}
			}
			Schema::Scalar => {
				if value.is_string() || value.is_number() {
					Ok(())
				} else {
					Err(self.violation(value, path))
				}
			}
			Schema::List(inner) => {
				let Some(items) = value.as_array() else {
					return Err(self.violation(value, path));
				};
				for (i, item) in items.iter().enumerate() {
					inner.validate(item, &format!("{path}[{i}]"))?;
				}
				Ok(())
			}
			Schema::Map(map_schema) => validate_map(map_schema, value, path),
		}
	}

	fn violation(&self, value: &Value, path: &str) -> BookletError {
		BookletError::SchemaViolation {
			path: path.to_string(),
			expected: self.describe(),
			actual: describe_value(value),
		}
	}
}

fn validate_map(schema: &MapSchema, value: &Value, path: &str) -> BookletResult<()> {
	let Some(map) = value.as_object() else {
		return Err(BookletError::SchemaViolation {
			path: path.to_string(),
			expected: "mapping".to_string(),
			actual: describe_value(value),
		});
	};

	for field in &schema.fields {
		let field_path = join_path(path, field.key);
		match map.get(field.key) {
			Some(field_value) => field.schema.validate(field_value, &field_path)?,
			None if field.required => {
				return Err(BookletError::SchemaViolation {
					path: field_path,
					expected: field.schema.describe(),
					actual: "missing".to_string(),
				});
			}
			None => {}
		}
	}

	for (key, entry) in map {
		if schema.fields.iter().any(|f| f.key == key) {
			continue;
		}
		match &schema.extra {
			Extra::Allow => {}
			Extra::Match(value_schema) => {
				value_schema.validate(entry, &join_path(path, key))?;
			}
			Extra::Deny => {
				return Err(BookletError::SchemaViolation {
					path: join_path(path, key),
					expected: "no such key".to_string(),
					actual: describe_value(entry),
				});
			}
		}
	}

	Ok(())
}

/// Join a dotted path with a key, omitting the leading dot at the root.
pub fn join_path(path: &str, key: &str) -> String {
	if path.is_empty() {
		key.to_string()
	} else {
		format!("{path}.{key}")
	}
}

fn is_iso_date(s: &str) -> bool {
	let bytes = s.as_bytes();
	if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
		return false;
	}
	let digits = |range: std::ops::Range<usize>| {
		s.get(range)
			.is_some_and(|part| part.bytes().all(|b| b.is_ascii_digit()))
	};
	if !digits(0..4) || !digits(5..7) || !digits(8..10) {
		return false;
	}
	let month: u32 = s[5..7].parse().unwrap_or(0);
	let day: u32 = s[8..10].parse().unwrap_or(0);
	(1..=12).contains(&month) && (1..=31).contains(&day)
}

fn describe_value(value: &Value) -> String {
	match value {
		Value::Null => "null".to_string(),
		Value::Bool(b) => format!("boolean `{b}`"),
		Value::Number(n) => format!("number `{n}`"),
		Value::String(s) => {
			if s.is_empty() {
				"empty string".to_string()
			} else {
				format!("string `{s}`")
			}
		}
		Value::Array(items) => format!("list of {} item(s)", items.len()),
		Value::Object(map) => format!("mapping with {} key(s)", map.len()),
	}
}
