use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use minijinja::Environment;
use minijinja::UndefinedBehavior;
use minijinja::syntax::SyntaxConfig;
use minijinja::value::Enumerator;
use minijinja::value::Object;
use minijinja::value::ObjectRepr;
use minijinja::value::Value as TemplateValue;
use serde_json::Map;
use serde_json::Value;
use tracing::info;

use crate::BookletError;
use crate::BookletResult;
use crate::filters;
use crate::schema::join_path;

/// Build the LaTeX-friendly template environment rooted at
/// `template_root`.
///
/// The delimiters avoid clashing with TeX braces: `(* … *)` for variables,
/// `(@ … @)` for blocks, `(# … #)` for comments, `%%` for line statements.
pub fn environment(template_root: &Path) -> BookletResult<Environment<'static>> {
	let mut env = base_environment()?;
	env.set_loader(minijinja::path_loader(template_root));
	Ok(env)
}

fn base_environment() -> BookletResult<Environment<'static>> {
	let mut env = Environment::new();
	env.set_undefined_behavior(UndefinedBehavior::Chainable);
	// Rendered LaTeX sources keep their final newline.
	env.set_keep_trailing_newline(true);

	let syntax = SyntaxConfig::builder()
		.block_delimiters("(@", "@)")
		.variable_delimiters("(*", "*)")
		.comment_delimiters("(#", "#)")
		.line_statement_prefix("%%")
		.line_comment_prefix("%#")
		.build()
		.map_err(|e| BookletError::TemplateRender(e.to_string()))?;
	env.set_syntax(syntax);

	env.add_filter("roman", filters::roman);
	env.add_filter("format_list", filters::format_list);
	env.add_filter("isotex", filters::isotex);
	env.add_filter("plural", filters::plural);
	env.add_filter("textbf", filters::textbf);
	env.add_function("checkdigit", filters::check_digit);
	env.add_function("plural", filters::plural);
	env.add_function("textbf", filters::textbf);

	Ok(env)
}

/// Context object that records every unknown lookup instead of failing.
///
/// Unknown names resolve to an inert undefined so rendering continues and
/// later references are discovered in the same pass; the reporter inspects
/// the shared side channel afterwards. Nested mappings and sequences are
/// wrapped on the way down so a miss below the root — including an
/// attribute miss on a loop element — is recorded with its full path.
#[derive(Debug)]
struct TrackingContext {
	prefix: String,
	data: Map<String, Value>,
	missing: Arc<Mutex<BTreeSet<String>>>,
}

impl Object for TrackingContext {
	fn get_value(self: &Arc<Self>, key: &TemplateValue) -> Option<TemplateValue> {
		let name = key.as_str()?;
		match self.data.get(name) {
			Some(value) => Some(track_value(join_path(&self.prefix, name), value, &self.missing)),
			None => {
				if let Ok(mut missing) = self.missing.lock() {
					missing.insert(join_path(&self.prefix, name));
				}
				None
			}
		}
	}

	fn enumerate(self: &Arc<Self>) -> Enumerator {
		Enumerator::Values(
			self.data
				.keys()
				.map(|key| TemplateValue::from(key.as_str()))
				.collect(),
		)
	}
}

/// Sequence counterpart of [`TrackingContext`]: elements keep an indexed
/// prefix (`teams[0]`) so loop-body misses are attributable.
#[derive(Debug)]
struct TrackingList {
	prefix: String,
	items: Vec<Value>,
	missing: Arc<Mutex<BTreeSet<String>>>,
}

impl Object for TrackingList {
	fn repr(self: &Arc<Self>) -> ObjectRepr {
		ObjectRepr::Seq
	}

	fn get_value(self: &Arc<Self>, key: &TemplateValue) -> Option<TemplateValue> {
		let index = key.as_usize()?;
		let item = self.items.get(index)?;
		Some(track_value(
			format!("{}[{index}]", self.prefix),
			item,
			&self.missing,
		))
	}

	fn enumerate(self: &Arc<Self>) -> Enumerator {
		Enumerator::Seq(self.items.len())
	}
}

type MissingSet = Arc<Mutex<BTreeSet<String>>>;

fn track_value(prefix: String, value: &Value, missing: &MissingSet) -> TemplateValue {
	match value {
		Value::Object(map) => {
			TemplateValue::from_object(TrackingContext {
				prefix,
				data: map.clone(),
				missing: Arc::clone(missing),
			})
		}
		Value::Array(items) => {
			TemplateValue::from_object(TrackingList {
				prefix,
				items: items.clone(),
				missing: Arc::clone(missing),
			})
		}
		other => TemplateValue::from_serialize(other),
	}
}

fn tracking_root(data: &Map<String, Value>) -> (TemplateValue, MissingSet) {
	let missing: MissingSet = Arc::new(Mutex::new(BTreeSet::new()));
	let root = TemplateValue::from_object(TrackingContext {
		prefix: String::new(),
		data: data.clone(),
		missing: Arc::clone(&missing),
	});
	(root, missing)
}

fn report(output: String, missing: &MissingSet) -> BookletResult<String> {
	let missing: Vec<String> = missing
		.lock()
		.map(|set| set.iter().cloned().collect())
		.unwrap_or_default();

	if missing.is_empty() {
		Ok(output)
	} else {
		Err(BookletError::MissingVariables(missing))
	}
}

/// Render a named template against a fully populated context, strictly.
///
/// Every reference to a name absent from the context is recorded, and the
/// complete set is reported as one `MissingVariables` error after the pass
/// finishes — never a first-missing-name error that forces fix-and-rerun
/// cycles.
pub fn render_template(
	env: &Environment<'_>,
	name: &str,
	data: &Map<String, Value>,
) -> BookletResult<String> {
	let template = env.get_template(name).map_err(|e| {
		match e.kind() {
			minijinja::ErrorKind::TemplateNotFound => {
				BookletError::TemplateNotFound(name.to_string())
			}
			_ => BookletError::TemplateRender(e.to_string()),
		}
	})?;

	let (root, missing) = tracking_root(data);
	let output = template
		.render(root)
		.map_err(|e| BookletError::TemplateRender(e.to_string()))?;
	report(output, &missing)
}

/// Render inline template source with the same strict-reporting contract
/// as [`render_template`].
pub fn render_str(source: &str, data: &Map<String, Value>) -> BookletResult<String> {
	let env = base_environment()?;
	let (root, missing) = tracking_root(data);
	let output = env
		.render_str(source, root)
		.map_err(|e| BookletError::TemplateRender(e.to_string()))?;
	report(output, &missing)
}

/// Render a named template into `output_dir`, optionally under a new file
/// name. Returns the path written.
pub fn render_to_file(
	env: &Environment<'_>,
	name: &str,
	data: &Map<String, Value>,
	output_dir: &Path,
	new_name: Option<&str>,
) -> BookletResult<PathBuf> {
	let output = render_template(env, name, data)?;
	let path = output_dir.join(new_name.unwrap_or(name));
	info!(template = name, output = %path.display(), "rendering template");
	std::fs::write(&path, output)?;
	Ok(path)
}
