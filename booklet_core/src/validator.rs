use regex::Regex;

use crate::BookletError;
use crate::BookletResult;
use crate::schema::join_path;
use crate::tree::FileSystemNode;

/// How a schema entry selects directory children by name.
#[derive(Debug, Clone)]
pub enum ChildMatcher {
	/// Exactly this name.
	Exact(&'static str),
	/// Every child whose full name matches this pattern.
	Pattern(&'static str),
}

impl ChildMatcher {
	fn matches(&self, name: &str) -> BookletResult<bool> {
		match self {
			ChildMatcher::Exact(expected) => Ok(name == *expected),
			ChildMatcher::Pattern(pattern) => {
				let re = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
					BookletError::SchemaViolation {
						path: name.to_string(),
						expected: format!("name matching `{pattern}`"),
						actual: format!("unusable pattern: {e}"),
					}
				})?;
				Ok(re.is_match(name))
			}
		}
	}

	fn describe(&self) -> String {
		match self {
			ChildMatcher::Exact(name) => format!("`{name}`"),
			ChildMatcher::Pattern(pattern) => format!("name matching `{pattern}`"),
		}
	}
}

/// Expected shape of a single tree node.
#[derive(Debug, Clone)]
pub enum NodeShape {
	File,
	Link,
	Dir(TreeSchema),
}

impl NodeShape {
	fn describe(&self) -> &'static str {
		match self {
			NodeShape::File => "file",
			NodeShape::Link => "symlink",
			NodeShape::Dir(_) => "directory",
		}
	}
}

/// Declarative expectation over one directory's children.
#[derive(Debug, Clone, Default)]
pub struct TreeSchema {
	pub required: Vec<(ChildMatcher, NodeShape)>,
	pub optional: Vec<(ChildMatcher, NodeShape)>,
	/// Whether children matched by no entry are accepted unchecked.
	pub allow_extra: bool,
}

impl TreeSchema {
	fn validate(&self, tree: &FileSystemNode, path: &str) -> BookletResult<()> {
		let FileSystemNode::Directory(_) = tree else {
			return Err(BookletError::SchemaViolation {
				path: path.to_string(),
				expected: "directory".to_string(),
				actual: describe_node(tree).to_string(),
			});
		};

		// Required matchers must select at least one child.
		for (matcher, _) in &self.required {
			let mut any = false;
			for (name, _) in tree.children() {
				if matcher.matches(name)? {
					any = true;
					break;
				}
			}
			if !any {
				return Err(BookletError::SchemaViolation {
					path: join_path(path, &matcher.describe()),
					expected: "entry to exist".to_string(),
					actual: "missing".to_string(),
				});
			}
		}

		for (name, child) in tree.children() {
			let child_path = join_path(path, name);
			let mut matched = false;

			for (matcher, shape) in self.required.iter().chain(&self.optional) {
				if matcher.matches(name)? {
					matched = true;
					validate_shape(shape, child, &child_path)?;
					break;
				}
			}

			if !matched && !self.allow_extra {
				return Err(BookletError::SchemaViolation {
					path: child_path,
					expected: "no such entry".to_string(),
					actual: describe_node(child).to_string(),
				});
			}
		}

		Ok(())
	}
}

fn validate_shape(shape: &NodeShape, node: &FileSystemNode, path: &str) -> BookletResult<()> {
	match (shape, node) {
		(NodeShape::File, FileSystemNode::File) | (NodeShape::Link, FileSystemNode::Link) => Ok(()),
		(NodeShape::Dir(schema), FileSystemNode::Directory(_)) => schema.validate(node, path),
		_ => {
			Err(BookletError::SchemaViolation {
				path: path.to_string(),
				expected: shape.describe().to_string(),
				actual: describe_node(node).to_string(),
			})
		}
	}
}

fn describe_node(node: &FileSystemNode) -> &'static str {
	match node {
		FileSystemNode::Directory(_) => "directory",
		FileSystemNode::File => "file",
		FileSystemNode::Link => "symlink",
	}
}

/// A two-phase structural validator over a scanned tree.
///
/// Phase one checks the declarative [`TreeSchema`]; phase two runs
/// [`extra_checks`](StructureValidator::extra_checks), a hook for conditions
/// a pure shape schema cannot express. The hook only runs when phase one
/// passed, and its failures carry the same severity. Validation is
/// all-or-nothing: there is no partial acceptance.
pub trait StructureValidator {
	fn schema(&self) -> &TreeSchema;

	/// Checks that are impossible or cumbersome to express in the schema.
	fn extra_checks(&self, _tree: &FileSystemNode) -> BookletResult<()> {
		Ok(())
	}

	fn validate(&self, tree: &FileSystemNode) -> BookletResult<()> {
		self.schema().validate(tree, "")?;
		self.extra_checks(tree)
	}
}

/// Validator for one competition directory: a `meta.yaml` at the root plus
/// two-digit volume directories, each holding its own metadata, language
/// subtrees and venue subtrees.
#[derive(Debug)]
pub struct CompetitionValidator {
	schema: TreeSchema,
}

impl CompetitionValidator {
	pub fn new() -> Self {
		let meta = (ChildMatcher::Exact("meta.yaml"), NodeShape::File);

		let language = TreeSchema {
			required: vec![meta.clone()],
			optional: Vec::new(),
			allow_extra: true,
		};
		let venue = TreeSchema {
			required: vec![meta.clone()],
			optional: Vec::new(),
			allow_extra: true,
		};
		let volume = TreeSchema {
			required: vec![
				meta.clone(),
				(
					ChildMatcher::Exact("languages"),
					NodeShape::Dir(TreeSchema {
						required: Vec::new(),
						optional: vec![(ChildMatcher::Pattern("[a-z]{2}"), NodeShape::Dir(language))],
						allow_extra: false,
					}),
				),
				(
					ChildMatcher::Exact("venues"),
					NodeShape::Dir(TreeSchema {
						required: Vec::new(),
						optional: vec![(ChildMatcher::Pattern("[A-Z]{5}"), NodeShape::Dir(venue))],
						allow_extra: false,
					}),
				),
			],
			optional: Vec::new(),
			allow_extra: true,
		};

		Self {
			schema: TreeSchema {
				required: vec![meta],
				optional: vec![(ChildMatcher::Pattern("[0-9]{2}"), NodeShape::Dir(volume))],
				allow_extra: false,
			},
		}
	}
}

impl Default for CompetitionValidator {
	fn default() -> Self {
		Self::new()
	}
}

impl StructureValidator for CompetitionValidator {
	fn schema(&self) -> &TreeSchema {
		&self.schema
	}

	/// Volume numbers must be consecutive starting at `01`; a gap means a
	/// volume directory was lost or misnamed.
	fn extra_checks(&self, tree: &FileSystemNode) -> BookletResult<()> {
		let mut numbers: Vec<u32> = tree
			.dir_names()
			.iter()
			.filter_map(|name| {
				(name.len() == 2 && name.bytes().all(|b| b.is_ascii_digit()))
					.then(|| name.parse().ok())
					.flatten()
			})
			.collect();
		numbers.sort_unstable();

		for (i, number) in numbers.iter().enumerate() {
			let expected = i as u32 + 1;
			if *number != expected {
				return Err(BookletError::SchemaViolation {
					path: format!("{number:02}"),
					expected: format!("volume number {expected} (volumes must be consecutive)"),
					actual: format!("volume number {number}"),
				});
			}
		}

		Ok(())
	}
}
