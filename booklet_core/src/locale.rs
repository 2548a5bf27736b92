use std::collections::BTreeMap;

use crate::BookletError;
use crate::BookletResult;

/// Locale-dependent rendering settings for one language.
#[derive(Debug, Clone)]
pub struct Locale {
	/// Two-letter language code, e.g. `sk`.
	pub code: String,
	/// Language name as understood by polyglossia, e.g. `slovak`.
	pub polyglossia: String,
	/// BCP-47 tag passed to the document converter, e.g. `sk-SK`.
	pub tag: String,
	/// Opening and closing quotation marks.
	pub quotes: (String, String),
	/// Whether the language is written right to left.
	pub rtl: bool,
	/// Caption word used for figures, when the language provides one.
	pub figure: Option<String>,
}

/// An immutable table of known locales keyed by language code.
///
/// The table is an explicit value passed to every component that needs
/// locale-dependent lookups; there is no process-wide registry.
#[derive(Debug, Clone)]
pub struct Locales {
	table: BTreeMap<String, Locale>,
}

impl Locales {
	/// The locale table shipped with the engine.
	pub fn builtin() -> Self {
		let entries = [
			("sk", "slovak", "sk-SK", ("„", "“"), Some("Obrázok")),
			("cs", "czech", "cs-CZ", ("„", "“"), Some("Obrázek")),
			("en", "english", "en-US", ("“", "”"), Some("Picture")),
			("ru", "russian", "ru-RU", ("«", "»"), None),
			("pl", "polish", "pl-PL", ("„", "“"), None),
			("hu", "hungarian", "hu-HU", ("„", "“"), None),
			("fr", "french", "fr-FR", ("«\u{202f}", "\u{202f}»"), None),
			("es", "spanish", "es-ES", ("«", "»"), None),
			("qq", "test", "sk-SK", ("(", ")"), None),
		];

		let mut table = BTreeMap::new();
		for (code, polyglossia, tag, (open, close), figure) in entries {
			table.insert(
				code.to_string(),
				Locale {
					code: code.to_string(),
					polyglossia: polyglossia.to_string(),
					tag: tag.to_string(),
					quotes: (open.to_string(), close.to_string()),
					rtl: false,
					figure: figure.map(str::to_string),
				},
			);
		}

		Self { table }
	}

	pub fn get(&self, code: &str) -> Option<&Locale> {
		self.table.get(code)
	}

	/// Like [`get`](Self::get) but fails with `UnknownLanguage`.
	pub fn require(&self, code: &str) -> BookletResult<&Locale> {
		self.get(code)
			.ok_or_else(|| BookletError::UnknownLanguage(code.to_string()))
	}

	pub fn contains(&self, code: &str) -> bool {
		self.table.contains_key(code)
	}

	/// All known language codes, in stable order.
	pub fn codes(&self) -> Vec<String> {
		self.table.keys().cloned().collect()
	}

	/// All polyglossia language names, in stable order.
	pub fn polyglossia_names(&self) -> Vec<String> {
		self.table.values().map(|l| l.polyglossia.clone()).collect()
	}
}
