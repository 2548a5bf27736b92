use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct BookletCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the competition repository root.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Validate the structure and metadata of a competition tree.
	Validate {
		/// Competition directory name, e.g. `phys`.
		competition: String,
	},
	/// Print the composed context of a node as JSON.
	Context {
		/// Competition directory name.
		competition: String,

		/// Volume number; omit for the competition-level context.
		#[arg(long)]
		volume: Option<u32>,

		/// Venue code within the volume.
		#[arg(long, conflicts_with = "language")]
		venue: Option<String>,

		/// Language code within the volume.
		#[arg(long)]
		language: Option<String>,
	},
	/// Render templates against a composed venue or language context.
	Build {
		/// Competition directory name.
		competition: String,

		/// Volume number.
		volume: u32,

		/// Venue code to build venue-level documents for.
		#[arg(long, conflicts_with = "language")]
		venue: Option<String>,

		/// Language code to build language-level documents for.
		#[arg(long)]
		language: Option<String>,

		/// Directory holding the templates.
		#[arg(long)]
		template_root: PathBuf,

		/// Template file names to render, relative to the template root.
		#[arg(long = "template", required = true)]
		templates: Vec<String>,

		/// Directory the rendered files are written to.
		#[arg(long)]
		output: PathBuf,
	},
	/// Convert a Markdown document to LaTeX or HTML through pandoc.
	Convert {
		/// Target format: `latex` or `html`.
		format: String,

		/// Language code selecting quote style and caption words.
		language: String,

		/// Input file; stdin when omitted.
		#[arg(long)]
		input: Option<PathBuf>,

		/// Output file; stdout when omitted.
		#[arg(long)]
		output: Option<PathBuf>,
	},
}
