use std::path::Path;

use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use crate::BookletResult;
use crate::meta::load_meta;
use crate::schema::Schema;

/// A composable metadata unit for one entity in the hierarchy.
///
/// A node is populated through a chainable, fail-fast sequence — load raw
/// metadata, merge computed fields, assign identity — and validated against
/// its schema exactly once, after all population steps. Each concrete node
/// type supplies its schema explicitly at construction. After
/// [`validate`](ContextNode::validate) the node is read-only: consumers see
/// its `data` by value, and a node needing a sibling's data rebuilds that
/// sibling rather than holding a reference to it.
#[derive(Debug, Clone)]
pub struct ContextNode {
	id: String,
	data: Map<String, Value>,
	schema: Schema,
}

impl ContextNode {
	pub fn new(schema: Schema) -> Self {
		Self {
			id: String::new(),
			data: Map::new(),
			schema,
		}
	}

	/// Load the metadata file of `dir` and deep-merge it into `data`.
	pub fn load_meta(mut self, dir: &Path) -> BookletResult<Self> {
		debug!(dir = %dir.display(), "loading node metadata");
		let meta = load_meta(dir)?;
		merge_map(&mut self.data, meta);
		Ok(self)
	}

	/// Deep-merge computed fields into `data`. Nested mappings merge by
	/// key; everything else, lists included, is replaced wholesale.
	pub fn add(mut self, fields: Map<String, Value>) -> Self {
		merge_map(&mut self.data, fields);
		self
	}

	/// Assign this node's identity within its parent's collection.
	pub fn add_id(mut self, id: &str) -> Self {
		self.id = id.to_string();
		self.data.insert("id".to_string(), Value::from(id));
		self
	}

	/// Assign a counter-derived ordinal.
	pub fn add_number(mut self, number: i64) -> Self {
		self.data.insert("number".to_string(), Value::from(number));
		self
	}

	/// Embed a finished child's data under `key`.
	///
	/// This is composition by value: the child's mapping is moved in whole,
	/// so nothing can mutate it through the parent afterwards. The child
	/// must already be validated by its own builder.
	pub fn adopt(mut self, key: &str, child: ContextNode) -> Self {
		self.data
			.insert(key.to_string(), Value::Object(child.into_data()));
		self
	}

	/// Validate `data` against the node's schema. Call once, after all
	/// population and derivation steps.
	pub fn validate(self) -> BookletResult<Self> {
		self.schema
			.validate(&Value::Object(self.data.clone()), "")?;
		Ok(self)
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn data(&self) -> &Map<String, Value> {
		&self.data
	}

	pub fn into_data(self) -> Map<String, Value> {
		self.data
	}

	/// Read a value by dotted path, e.g. `tearoff.per_page`.
	pub fn lookup(&self, dotted: &str) -> Option<&Value> {
		let mut segments = dotted.split('.');
		let mut current = self.data.get(segments.next()?)?;
		for segment in segments {
			current = current.as_object()?.get(segment)?;
		}
		Some(current)
	}
}

/// Deep-merge `src` into `dest`: mappings merge recursively, any other
/// value in `src` replaces the one in `dest`.
pub fn merge_map(dest: &mut Map<String, Value>, src: Map<String, Value>) {
	for (key, value) in src {
		match (dest.get_mut(&key), value) {
			(Some(Value::Object(existing)), Value::Object(incoming)) => {
				merge_map(existing, incoming);
			}
			(_, value) => {
				dest.insert(key, value);
			}
		}
	}
}
