use std::io::Read;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use booklet_cli::BookletCli;
use booklet_cli::Commands;
use booklet_core::BuildConfig;
use booklet_core::CompetitionValidator;
use booklet_core::Convertor;
use booklet_core::Format;
use booklet_core::Locales;
use booklet_core::StructureValidator;
use booklet_core::competition_context;
use booklet_core::competition_dir;
use booklet_core::environment;
use booklet_core::language_context;
use booklet_core::language_render_context;
use booklet_core::render_to_file;
use booklet_core::scan_tree;
use booklet_core::venue_context;
use booklet_core::venue_render_context;
use booklet_core::volume_context;
use clap::Parser;
use owo_colors::OwoColorize;

fn main() {
	let args = BookletCli::parse();
	init_tracing(args.verbose);

	let result = match &args.command {
		Some(Commands::Validate { competition }) => run_validate(&args, competition),
		Some(Commands::Context {
			competition,
			volume,
			venue,
			language,
		}) => {
			run_context(
				&args,
				competition,
				*volume,
				venue.as_deref(),
				language.as_deref(),
			)
		}
		Some(Commands::Build {
			competition,
			volume,
			venue,
			language,
			template_root,
			templates,
			output,
		}) => {
			run_build(
				&args,
				competition,
				*volume,
				venue.as_deref(),
				language.as_deref(),
				template_root,
				templates,
				output,
			)
		}
		Some(Commands::Convert {
			format,
			language,
			input,
			output,
		}) => run_convert(format, language, input.as_deref(), output.as_deref()),
		None => {
			eprintln!("No subcommand specified. Run `booklet --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		eprintln!("{} {e}", "error:".red().bold());
		process::exit(1);
	}
}

fn init_tracing(verbose: bool) {
	let default = if verbose { "debug" } else { "warn" };
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn resolve_root(args: &BookletCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Validate the tree structure first, then every node's composed metadata.
/// Structural failures stop before any metadata is read.
fn run_validate(
	args: &BookletCli,
	competition: &str,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = BuildConfig::load(&root)?.unwrap_or_default();
	let names = config.ignored_names();
	let ignored: Vec<&str> = names.iter().map(String::as_str).collect();

	let tree = scan_tree(&competition_dir(&root, competition), &ignored)?;
	CompetitionValidator::new().validate(&tree)?;

	let locales = Locales::builtin();
	competition_context(&root, competition)?;

	let mut volumes = 0;
	for name in tree.dir_names() {
		let Ok(volume) = name.parse::<u32>() else {
			continue;
		};
		volumes += 1;
		let node = volume_context(&root, competition, volume)?;
		if args.verbose {
			println!("volume {name}: {} problem(s)", problem_count(&node));
		}

		if let Some(venues) = tree.get(name).and_then(|v| v.get("venues")) {
			for venue in venues.dir_names() {
				venue_context(&root, &locales, competition, volume, venue)?;
			}
		}
		if let Some(languages) = tree.get(name).and_then(|v| v.get("languages")) {
			for language in languages.dir_names() {
				language_context(&root, &locales, competition, volume, language)?;
			}
		}
	}

	println!("Competition `{competition}` is valid ({volumes} volume(s)).");
	Ok(())
}

fn problem_count(node: &booklet_core::ContextNode) -> usize {
	node.lookup("problems")
		.and_then(serde_json::Value::as_array)
		.map_or(0, Vec::len)
}

fn run_context(
	args: &BookletCli,
	competition: &str,
	volume: Option<u32>,
	venue: Option<&str>,
	language: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let locales = Locales::builtin();

	let node = match (volume, venue, language) {
		(None, None, None) => competition_context(&root, competition)?,
		(Some(volume), None, None) => volume_context(&root, competition, volume)?,
		(Some(volume), Some(venue), None) => {
			venue_context(&root, &locales, competition, volume, venue)?
		}
		(Some(volume), None, Some(language)) => {
			language_context(&root, &locales, competition, volume, language)?
		}
		_ => {
			return Err("--venue and --language require --volume".into());
		}
	};

	println!("{}", serde_json::to_string_pretty(node.data())?);
	Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_build(
	args: &BookletCli,
	competition: &str,
	volume: u32,
	venue: Option<&str>,
	language: Option<&str>,
	template_root: &std::path::Path,
	templates: &[String],
	output: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let locales = Locales::builtin();

	let context = match (venue, language) {
		(Some(venue), None) => {
			venue_render_context(&root, &locales, competition, volume, venue)?
		}
		(None, Some(language)) => {
			language_render_context(&root, &locales, competition, volume, language)?
		}
		_ => {
			return Err("exactly one of --venue or --language is required".into());
		}
	};

	std::fs::create_dir_all(output)?;
	let env = environment(template_root)?;

	for name in templates {
		let path = render_to_file(&env, name, context.data(), output, None)?;
		if args.verbose {
			println!("rendered {name} -> {}", path.display());
		}
	}

	println!("Rendered {} template(s) to {}.", templates.len(), output.display());
	Ok(())
}

fn run_convert(
	format: &str,
	language: &str,
	input: Option<&std::path::Path>,
	output: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
	let format = match format {
		"latex" => Format::Latex,
		"html" => Format::Html,
		other => return Err(format!("unknown format `{other}` (expected latex or html)").into()),
	};

	let locales = Locales::builtin();
	let locale = locales.require(language)?;
	let convertor = Convertor::new(format, locale)?;

	let source = match input {
		Some(path) => std::fs::read_to_string(path)?,
		None => {
			let mut buffer = String::new();
			std::io::stdin().read_to_string(&mut buffer)?;
			buffer
		}
	};

	let converted = convertor.convert(&source)?;

	match output {
		Some(path) => std::fs::write(path, converted)?,
		None => std::io::stdout().write_all(converted.as_bytes())?,
	}

	Ok(())
}
