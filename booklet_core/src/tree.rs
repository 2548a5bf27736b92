use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::BookletError;
use crate::BookletResult;

/// Entry names skipped during scanning, matched exactly and case-sensitively.
pub const DEFAULT_IGNORED: &[&str] = &[".git"];

/// An abstract snapshot of one filesystem entry.
///
/// Directories map child name to child node. Symlinks are terminal: they are
/// recorded as [`FileSystemNode::Link`] and never followed, so a link to a
/// directory does not contribute a subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSystemNode {
	Directory(BTreeMap<String, FileSystemNode>),
	File,
	Link,
}

impl FileSystemNode {
	pub fn is_dir(&self) -> bool {
		matches!(self, FileSystemNode::Directory(_))
	}

	/// Child node by name, when this node is a directory.
	pub fn get(&self, name: &str) -> Option<&FileSystemNode> {
		match self {
			FileSystemNode::Directory(children) => children.get(name),
			_ => None,
		}
	}

	/// Children of a directory node; empty for files and links.
	pub fn children(&self) -> impl Iterator<Item = (&String, &FileSystemNode)> {
		let map = match self {
			FileSystemNode::Directory(children) => Some(children),
			_ => None,
		};
		map.into_iter().flat_map(BTreeMap::iter)
	}

	/// Names of child directories, in stable order.
	pub fn dir_names(&self) -> Vec<&str> {
		self.children()
			.filter(|(_, node)| node.is_dir())
			.map(|(name, _)| name.as_str())
			.collect()
	}
}

/// Scan a directory tree into a [`FileSystemNode`].
///
/// Entries whose name appears in `ignored`, and hidden entries (leading
/// dot), are omitted entirely together with their subtrees. Fails with
/// `NotFound` when the root does not exist; no partial tree is produced.
pub fn scan_tree(root: &Path, ignored: &[&str]) -> BookletResult<FileSystemNode> {
	if !root.exists() {
		return Err(BookletError::NotFound(root.display().to_string()));
	}

	debug!(root = %root.display(), "scanning directory tree");
	scan_entry(root, ignored)
}

fn scan_entry(path: &Path, ignored: &[&str]) -> BookletResult<FileSystemNode> {
	// The symlink check must come first: a link to a directory would
	// otherwise be recursed into.
	if path.is_symlink() {
		return Ok(FileSystemNode::Link);
	}

	if !path.is_dir() {
		return Ok(FileSystemNode::File);
	}

	let mut children = BTreeMap::new();
	for entry in std::fs::read_dir(path)? {
		let entry = entry?;
		let name = entry.file_name().to_string_lossy().into_owned();

		if name.starts_with('.') || ignored.contains(&name.as_str()) {
			continue;
		}

		children.insert(name, scan_entry(&entry.path(), ignored)?);
	}

	Ok(FileSystemNode::Directory(children))
}
