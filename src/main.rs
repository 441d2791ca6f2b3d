#![allow(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "savcodec", about = "Savegame container to editable-text converter")]
struct Cli {
	/// Log progress; repeat for per-record detail.
	#[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Extract a savegame into a directory of editable text files.
	Extract {
		path: PathBuf,
		/// Reuse the output directory if it already exists.
		#[arg(long = "forcedir")]
		force_dir: bool,
	},
	/// Pack an extracted directory back into a savegame.
	Pack {
		dir: PathBuf,
	},
	/// Print a summary of a savegame.
	Info {
		path: PathBuf,
		/// Emit the summary as JSON.
		#[arg(long)]
		json: bool,
	},
}

fn main() {
	let cli = Cli::parse();
	init_logging(cli.verbose);
	if let Err(err) = run(cli) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_logging(verbose: u8) {
	let level = match verbose {
		0 => tracing::Level::WARN,
		1 => tracing::Level::INFO,
		_ => tracing::Level::DEBUG,
	};
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
		)
		.with_writer(std::io::stderr)
		.init();
}

fn run(cli: Cli) -> savcodec::sav::Result<()> {
	match cli.command {
		Commands::Extract { path, force_dir } => cmd::extract::run(path, force_dir),
		Commands::Pack { dir } => cmd::pack::run(dir),
		Commands::Info { path, json } => cmd::info::run(path, json),
	}
}
