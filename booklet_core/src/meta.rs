use std::path::Path;

use serde_json::Map;
use serde_json::Value;

use crate::BookletError;
use crate::BookletResult;

/// Name of the per-directory metadata file.
pub const META_FILENAME: &str = "meta.yaml";

/// Read the metadata file of one directory into a JSON mapping.
///
/// An absent file is an empty mapping — whether that is an error belongs to
/// the consuming node's schema, not this layer. A malformed or non-mapping
/// file is a hard failure; partially parsed data is never returned.
pub fn load_meta(dir: &Path) -> BookletResult<Map<String, Value>> {
	let path = dir.join(META_FILENAME);
	if !path.exists() {
		return Ok(Map::new());
	}

	let content = std::fs::read_to_string(&path)?;
	let value: Value = serde_yaml_ng::from_str(&content).map_err(|e| {
		BookletError::MetadataParse {
			path: path.display().to_string(),
			reason: e.to_string(),
		}
	})?;

	match value {
		Value::Object(map) => Ok(map),
		Value::Null => Ok(Map::new()),
		other => {
			Err(BookletError::MetadataParse {
				path: path.display().to_string(),
				reason: format!(
					"top level must be a mapping, found {}",
					match other {
						Value::Array(_) => "a list",
						Value::String(_) => "a string",
						Value::Number(_) => "a number",
						Value::Bool(_) => "a boolean",
						_ => "an unexpected value",
					}
				),
			})
		}
	}
}
