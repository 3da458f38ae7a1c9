mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quarry_lib::task::Profile;

use crate::cmd::Session;
use crate::output::{OutputFormat, print_error};

/// quarry - incremental builds for trees of cargo projects
#[derive(Parser)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output and forward --verbose to the toolchain
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Project directory or its Cargo.toml (default: current directory)
  #[arg(long, global = true, value_name = "PATH")]
  manifest_path: Option<PathBuf>,

  /// Target the subproject with this namespace instead of the root
  #[arg(short, long, global = true, value_name = "NAMESPACE")]
  project: Option<String>,

  /// Run tasks even when their outputs are up to date
  #[arg(short, long, global = true)]
  force: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the project, rebuilding only when sources changed
  Build {
    /// Build profile
    #[arg(default_value = "debug")]
    profile: Profile,
  },

  /// Build the project with the release profile
  BuildRelease,

  /// Run the project's tests
  Test,

  /// Remove build outputs of the project and its direct subprojects
  Clean {
    /// Clean the whole dependency tree in a single toolchain call
    #[arg(long)]
    with_dependencies: bool,
  },

  /// Bundle release binaries into target/package/
  Package,

  /// Generate documentation
  Doc,

  /// List every task with its staleness
  Tasks {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// List file targets and the tasks producing them instead
    #[arg(long)]
    files: bool,
  },

  /// Run a task by name, or the task producing a file
  Run {
    /// Namespaced task name (e.g. `app:build:debug`) or artifact path
    target: String,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .with_target(false)
    .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
  let session = Session::open(cli.manifest_path.as_deref(), cli.project.as_deref(), cli.verbose, cli.force)?;

  match cli.command {
    Commands::Build { profile } => cmd::cmd_build(&session, profile),
    Commands::BuildRelease => cmd::cmd_build(&session, Profile::Release),
    Commands::Test => cmd::cmd_test(&session),
    Commands::Clean { with_dependencies } => cmd::cmd_clean(&session, with_dependencies),
    Commands::Package => cmd::cmd_package(&session),
    Commands::Doc => cmd::cmd_doc(&session),
    Commands::Tasks { format, files } => cmd::cmd_tasks(&session, format, files),
    Commands::Run { target } => cmd::cmd_run(&session, &target),
  }
}
