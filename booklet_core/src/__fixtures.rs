//! On-disk and in-memory fixtures shared by the test module.

use std::path::Path;

use serde_json::Value;
use serde_json::json;

/// Write a value as YAML, creating parent directories as needed.
pub fn write_yaml(path: &Path, value: &Value) {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create_dir_all: {e}"));
	}
	let yaml = serde_yaml_ng::to_string(value).unwrap_or_else(|e| panic!("to yaml: {e}"));
	std::fs::write(path, yaml).unwrap_or_else(|e| panic!("write: {e}"));
}

pub fn competition_meta() -> Value {
	json!({
		"founded": 2007,
		"tearoff": {
			"per_page": 3,
			"height": 154,
			"team_space": 8,
			"barcode_space": 24,
			"bottomsep": 3,
			"inner": 2,
		},
		"organisation": {
			"name": "Society of Physics Enthusiasts",
			"address": "1 Infinite Corridor, Bratislava",
		},
		"constants": {
			"gravity": {
				"symbol": "g",
				"value": "9.81",
				"unit": r"\metre\per\second\squared",
			},
		},
		"url": "https://example.com/competition",
		"hacks": {},
	})
}

pub fn volume_meta(problem_count: usize) -> Value {
	let problems: Vec<Value> = (1..=problem_count)
		.map(|i| json!({ "name": format!("problem-{i:02}") }))
		.collect();

	json!({
		"date": "2023-11-10",
		"orgs": ["Alice", "Bob"],
		"problems": problems,
		"constants": {},
		"table": 4,
		"start": 600,
	})
}

pub fn venue_meta(team_count: usize, evaluators: i64) -> Value {
	let teams: Vec<Value> = (1..=team_count)
		.map(|i| {
			json!({
				"id": i,
				"code": format!("TEAM{i:02}"),
				"name": format!("Team {i}"),
				"language": "en",
				"number": i,
			})
		})
		.collect();

	json!({
		"code": "ALPHA",
		"name": "Alpha venue",
		"language": "en",
		"teams": teams,
		"evaluators": evaluators,
		"start": 600,
	})
}

pub fn language_meta() -> Value {
	json!({
		"booklet": {
			"contents": {
				"intro": true,
				"problems": true,
				"solutions": true,
				"answers": true,
			},
		},
	})
}

/// Lay out a complete competition fixture under `root`: competition `phys`,
/// volume `01` with the requested number of problems, language `en` and
/// venue `ALPHA` with the requested number of teams.
pub fn write_competition_fixture(
	root: &Path,
	problem_count: usize,
	team_count: usize,
	evaluators: i64,
) {
	let competition = root.join("phys");
	write_yaml(&competition.join("meta.yaml"), &competition_meta());

	let volume = competition.join("01");
	write_yaml(&volume.join("meta.yaml"), &volume_meta(problem_count));
	write_yaml(
		&volume.join("languages").join("en").join("meta.yaml"),
		&language_meta(),
	);
	write_yaml(
		&volume.join("venues").join("ALPHA").join("meta.yaml"),
		&venue_meta(team_count, evaluators),
	);
}
