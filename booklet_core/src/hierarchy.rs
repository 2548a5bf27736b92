//! Concrete context node types for the competition hierarchy
//! (competition → volume → venue / language) and the builders that compose
//! them into full render contexts.
//!
//! Cross-level reads never share a node: a venue needing the competition's
//! tearoff capacity or the volume's problem list rebuilds those nodes fresh
//! from disk, so a half-populated or stale sibling is never observed.

use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tracing::debug;

use crate::BookletResult;
use crate::context::ContextNode;
use crate::lists::Counter;
use crate::lists::add_numbers;
use crate::lists::numerate;
use crate::lists::pad_to_multiple;
use crate::lists::split_div;
use crate::lists::split_mod;
use crate::locale::Locales;
use crate::schema::Field;
use crate::schema::Schema;

pub fn competition_dir(root: &Path, competition: &str) -> PathBuf {
	root.join(competition)
}

pub fn volume_dir(root: &Path, competition: &str, volume: u32) -> PathBuf {
	competition_dir(root, competition).join(format!("{volume:02}"))
}

pub fn venue_dir(root: &Path, competition: &str, volume: u32, venue: &str) -> PathBuf {
	volume_dir(root, competition, volume)
		.join("venues")
		.join(venue)
}

pub fn language_dir(root: &Path, competition: &str, volume: u32, language: &str) -> PathBuf {
	volume_dir(root, competition, volume)
		.join("languages")
		.join(language)
}

fn competition_schema() -> Schema {
	Schema::map(vec![
		Field::required("id", Schema::NonEmptyStr),
		Field::required(
			"founded",
			Schema::IntWhere {
				describe: "integer >= 1950",
				check: |x| x >= 1950,
			},
		),
		Field::required(
			"tearoff",
			Schema::map(vec![
				Field::required(
					"per_page",
					Schema::IntWhere {
						describe: "positive integer",
						check: |x| x > 0,
					},
				),
				Field::required("height", Schema::Int),
				Field::required("team_space", Schema::Int),
				Field::required("barcode_space", Schema::Int),
				Field::required("bottomsep", Schema::Int),
				Field::required("inner", Schema::Int),
			]),
		),
		Field::required(
			"organisation",
			Schema::map(vec![
				Field::required("name", Schema::NonEmptyStr),
				Field::required("address", Schema::NonEmptyStr),
			]),
		),
		Field::required(
			"constants",
			Schema::map_of(Schema::Map(crate::schema::MapSchema {
				fields: vec![
					Field::required("symbol", Schema::Str),
					Field::required("value", Schema::Scalar),
					Field::required("unit", Schema::Str),
					Field::optional("siextra", Schema::Str),
				],
				extra: crate::schema::Extra::Deny,
			})),
		),
		Field::required("url", Schema::NonEmptyStr),
		Field::required("hacks", Schema::any_map()),
	])
}

fn problem_schema() -> Schema {
	Schema::Map(crate::schema::MapSchema {
		fields: vec![
			Field::required("name", Schema::NonEmptyStr),
			Field::required("id", Schema::Int),
		],
		extra: crate::schema::Extra::Allow,
	})
}

fn team_schema() -> Schema {
	Schema::Map(crate::schema::MapSchema {
		fields: vec![
			Field::required("id", Schema::Int),
			Field::required("code", Schema::NonEmptyStr),
			Field::required("name", Schema::Str),
			Field::required("language", Schema::NonEmptyStr),
			Field::required("index", Schema::Int),
		],
		extra: crate::schema::Extra::Allow,
	})
}

fn minutes_of_day() -> Schema {
	Schema::IntWhere {
		describe: "minutes since midnight (0..1440)",
		check: |x| (0..1440).contains(&x),
	}
}

fn volume_schema() -> Schema {
	Schema::map(vec![
		Field::required("id", Schema::NonEmptyStr),
		Field::required(
			"number",
			Schema::IntWhere {
				describe: "positive integer",
				check: |x| x > 0,
			},
		),
		Field::required("date", Schema::IsoDate),
		Field::required("orgs", Schema::List(Box::new(Schema::Str))),
		Field::required("problems", Schema::List(Box::new(problem_schema()))),
		Field::required("constants", Schema::any_map()),
		Field::required("table", Schema::Int),
		Field::required("start", minutes_of_day()),
		Field::required(
			"year",
			Schema::IntWhere {
				describe: "integer >= 1950",
				check: |x| x >= 1950,
			},
		),
	])
}

fn venue_schema(locales: &Locales) -> Schema {
	Schema::map(vec![
		Field::required("id", Schema::NonEmptyStr),
		Field::required("code", Schema::StrMatching("[A-Z]{5}")),
		Field::required("name", Schema::NonEmptyStr),
		Field::required("language", Schema::StrOneOf(locales.codes())),
		Field::required("teams", Schema::List(Box::new(team_schema()))),
		Field::required(
			"teams_grouped",
			Schema::List(Box::new(Schema::List(Box::new(team_schema())))),
		),
		Field::required(
			"problems_modulo",
			Schema::List(Box::new(Schema::List(Box::new(problem_schema())))),
		),
		Field::optional("orgs", Schema::List(Box::new(Schema::NonEmptyStr))),
		Field::required(
			"evaluators",
			Schema::IntWhere {
				describe: "positive integer",
				check: |x| x > 0,
			},
		),
		Field::required("start", minutes_of_day()),
	])
}

fn language_schema(locales: &Locales) -> Schema {
	Schema::map(vec![
		Field::required("id", Schema::StrOneOf(locales.codes())),
		Field::required(
			"booklet",
			Schema::map(vec![Field::required(
				"contents",
				Schema::map(vec![
					Field::required("intro", Schema::Bool),
					Field::required("problems", Schema::Bool),
					Field::required("solutions", Schema::Bool),
					Field::required("answers", Schema::Bool),
				]),
			)]),
		),
		Field::required("polyglossia", Schema::StrOneOf(locales.polyglossia_names())),
		Field::required("rtl", Schema::Bool),
	])
}

/// Build and validate the competition-level context node.
pub fn competition_context(root: &Path, competition: &str) -> BookletResult<ContextNode> {
	ContextNode::new(competition_schema())
		.load_meta(&competition_dir(root, competition))?
		.add_id(competition)
		.validate()
}

/// Build and validate a volume context node.
///
/// Derives `year` from the competition's founding year and numbers the
/// problem list with ids starting at 1.
pub fn volume_context(root: &Path, competition: &str, volume: u32) -> BookletResult<ContextNode> {
	let comp = competition_context(root, competition)?;
	let founded = comp
		.lookup("founded")
		.and_then(Value::as_i64)
		.unwrap_or_default();

	let node = ContextNode::new(volume_schema())
		.load_meta(&volume_dir(root, competition, volume))?
		.add_id(&format!("{volume:02}"))
		.add_number(i64::from(volume));

	let problems = node
		.lookup("problems")
		.and_then(Value::as_array)
		.cloned()
		.unwrap_or_default();
	let problems = add_numbers(problems, &mut Counter::new(1))?;

	let mut derived = Map::new();
	derived.insert(
		"year".to_string(),
		Value::from(i64::from(volume) + founded - 1),
	);
	derived.insert("problems".to_string(), Value::Array(problems));

	node.add(derived).validate()
}

/// Build and validate a venue context node.
///
/// Rebuilds the competition and volume nodes fresh, pads the team list with
/// sentinel filler to a multiple of the tearoff page capacity, and derives
/// `teams`, `teams_grouped` and `problems_modulo`.
pub fn venue_context(
	root: &Path,
	locales: &Locales,
	competition: &str,
	volume: u32,
	venue: &str,
) -> BookletResult<ContextNode> {
	let comp = competition_context(root, competition)?;
	let vol = volume_context(root, competition, volume)?;

	let per_page = comp
		.lookup("tearoff.per_page")
		.and_then(Value::as_u64)
		.unwrap_or_default() as usize;

	let node = ContextNode::new(venue_schema(locales))
		.load_meta(&venue_dir(root, competition, volume, venue))?
		.add_id(venue);

	let language = node
		.lookup("language")
		.and_then(Value::as_str)
		.unwrap_or_default()
		.to_string();
	let code = node
		.lookup("code")
		.and_then(Value::as_str)
		.unwrap_or_default()
		.to_string();

	let mut teams = node
		.lookup("teams")
		.and_then(Value::as_array)
		.cloned()
		.unwrap_or_default();
	debug!(venue, teams = teams.len(), per_page, "padding team list");
	pad_to_multiple(&mut teams, per_page, |sentinel| {
		filler_team(sentinel, &language, venue, &code)
	});

	let teams = numerate(teams, 0);
	let teams_grouped = split_div(teams.clone(), per_page)?;

	let problem_refs: Vec<Value> = vol
		.lookup("problems")
		.and_then(Value::as_array)
		.map(|problems| {
			problems
				.iter()
				.map(|p| json!({ "name": p.get("name").cloned().unwrap_or(Value::Null) }))
				.collect()
		})
		.unwrap_or_default();
	let numbered = add_numbers(problem_refs, &mut Counter::new(1))?;
	let evaluators = node
		.lookup("evaluators")
		.and_then(Value::as_u64)
		.unwrap_or_default() as usize;
	let problems_modulo = split_mod(numbered, evaluators, 1);

	let mut derived = Map::new();
	derived.insert("teams".to_string(), Value::Array(teams));
	derived.insert("teams_grouped".to_string(), nested(teams_grouped));
	derived.insert("problems_modulo".to_string(), nested(problems_modulo));

	node.add(derived).validate()
}

/// Build and validate a language context node, resolving `polyglossia` and
/// `rtl` from the explicit locale table.
pub fn language_context(
	root: &Path,
	locales: &Locales,
	competition: &str,
	volume: u32,
	language: &str,
) -> BookletResult<ContextNode> {
	let locale = locales.require(language)?;

	let mut fields = Map::new();
	fields.insert(
		"polyglossia".to_string(),
		Value::from(locale.polyglossia.clone()),
	);
	fields.insert("rtl".to_string(), Value::from(locale.rtl));

	ContextNode::new(language_schema(locales))
		.load_meta(&language_dir(root, competition, volume, language))?
		.add_id(language)
		.add(fields)
		.validate()
}

/// The full render context for venue-level documents: the competition,
/// volume and venue nodes embedded under their names.
pub fn venue_render_context(
	root: &Path,
	locales: &Locales,
	competition: &str,
	volume: u32,
	venue: &str,
) -> BookletResult<ContextNode> {
	let comp = competition_context(root, competition)?;
	let vol = volume_context(root, competition, volume)?;
	let ven = venue_context(root, locales, competition, volume, venue)?;

	ContextNode::new(render_schema(&["competition", "volume", "venue"]))
		.adopt("competition", comp)
		.adopt("volume", vol)
		.adopt("venue", ven)
		.validate()
}

/// The full render context for language-level documents (booklets, answer
/// sheets): competition, volume and language nodes under their names.
pub fn language_render_context(
	root: &Path,
	locales: &Locales,
	competition: &str,
	volume: u32,
	language: &str,
) -> BookletResult<ContextNode> {
	let comp = competition_context(root, competition)?;
	let vol = volume_context(root, competition, volume)?;
	let lang = language_context(root, locales, competition, volume, language)?;

	ContextNode::new(render_schema(&["competition", "volume", "language"]))
		.adopt("competition", comp)
		.adopt("volume", vol)
		.adopt("language", lang)
		.validate()
}

fn render_schema(keys: &[&'static str]) -> Schema {
	Schema::map(
		keys.iter()
			.map(|key| Field::required(key, Schema::any_map()))
			.collect(),
	)
}

fn nested(groups: Vec<Vec<Value>>) -> Value {
	Value::Array(groups.into_iter().map(Value::Array).collect())
}

/// A synthetic filler team occupying one tearoff slot. Identity fields are
/// drawn from the descending sentinel range so they can never collide with
/// a registered team.
fn filler_team(sentinel: i64, language: &str, venue_id: &str, venue_code: &str) -> Value {
	json!({
		"id": sentinel,
		"code": format!("EXTRA{sentinel}"),
		"name": "",
		"display_name": format!("Extra set {sentinel}"),
		"contact_email": "none@none.none",
		"contact_name": "Unnamed",
		"contact_phone": "",
		"contestants": "unknown",
		"in_school_symbol": "",
		"language": language,
		"number": 0,
		"school": "",
		"school_address": "",
		"school_id": 0,
		"school_name": "",
		"status": "R",
		"venue": venue_id,
		"venue_code": venue_code,
		"venue_id": venue_id,
		"filler": true,
	})
}
