mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::VarArgs;
use output::{OutputFormat, print_error};

/// tarplate - render a directory of templates into a reproducible tar archive
#[derive(Parser)]
#[command(name = "tarplate")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Render a directory into an archive and print its identity
  Render {
    /// Directory to archive
    source_dir: PathBuf,

    #[command(flatten)]
    vars: VarArgs,

    /// Write the archive to this path
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write the raw archive to stdout (identity goes to stderr)
    #[arg(long)]
    stdout: bool,

    /// Render files on all cores
    #[arg(long)]
    parallel: bool,

    /// Summary format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },

  /// Print the identity of the archive a directory would render to
  Id {
    /// Directory to archive
    source_dir: PathBuf,

    #[command(flatten)]
    vars: VarArgs,
  },

  /// Render a single template file to stdout
  Eval {
    /// Template file
    file: PathBuf,

    #[command(flatten)]
    vars: VarArgs,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Render {
      source_dir,
      vars,
      output,
      stdout,
      parallel,
      format,
    } => cmd::cmd_render(&source_dir, &vars, output.as_deref(), stdout, parallel, format),
    Commands::Id { source_dir, vars } => cmd::cmd_id(&source_dir, &vars),
    Commands::Eval { file, vars } => cmd::cmd_eval(&file, &vars),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
