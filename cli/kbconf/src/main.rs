//! kbconf CLI: compile keyboard manifests into firmware build parameters.

mod commands;
mod project;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use kbconf_drivers::DriverRegistry;

use project::Project;

#[derive(Parser)]
#[command(name = "kbconf", version, about = "Keyboard firmware configuration compiler")]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a keyboard manifest into build flags
    Build {
        /// Keyboard name (default: build.default_keyboard in kbconf.toml)
        #[arg(long, short)]
        keyboard: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Output format (flags, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Compile a keyboard manifest and print the compile report
    Check {
        /// Keyboard name (default: build.default_keyboard in kbconf.toml)
        #[arg(long, short)]
        keyboard: Option<String>,
    },
    /// List keyboards in the project
    Keyboards,
    /// Inspect built-in hardware drivers
    Drivers {
        #[command(subcommand)]
        action: DriversAction,
    },
    /// Generate platformio.ini for a keyboard
    Setup {
        /// Keyboard name (default: build.default_keyboard in kbconf.toml)
        #[arg(long, short)]
        keyboard: Option<String>,
        /// Output file (default: platformio.ini in the project root)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DriversAction {
    /// List available drivers
    List,
    /// Show details of a driver
    Describe {
        /// Driver identifier
        id: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let registry = DriverRegistry::builtin();

    match cli.command {
        Commands::Build {
            keyboard,
            output,
            format,
        } => {
            let project = Project::discover(&cwd)?;
            let keyboard = project.resolve_keyboard(keyboard.as_deref())?;
            commands::build::run(
                &project,
                &registry,
                &keyboard,
                output.as_deref(),
                format.as_deref(),
            )
        }

        Commands::Check { keyboard } => {
            let project = Project::discover(&cwd)?;
            let keyboard = project.resolve_keyboard(keyboard.as_deref())?;
            commands::build::check(&project, &registry, &keyboard)
        }

        Commands::Keyboards => {
            let project = Project::discover(&cwd)?;
            commands::keyboards::list(&project)
        }

        Commands::Drivers { action } => match action {
            DriversAction::List => commands::drivers::list(&registry),
            DriversAction::Describe { id } => commands::drivers::describe(&registry, &id),
        },

        Commands::Setup { keyboard, output } => {
            let project = Project::discover(&cwd)?;
            let keyboard = project.resolve_keyboard(keyboard.as_deref())?;
            commands::setup::run(&project, &registry, &keyboard, output.as_deref())
        }
    }
}
