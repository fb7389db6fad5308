#[macro_use]
extern crate log;

use std::path::PathBuf;

use clap::Parser;
use log::Level;
use utils::provisioner::{
    Settings, DEFAULT_INSTALLER_BASE_URL, DEFAULT_PACKAGE, DEFAULT_REPO_URL, DEFAULT_TARGET_PATH,
};

mod commands;
mod utils;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// where the course repository is checked out
    #[arg(long, default_value = DEFAULT_TARGET_PATH)]
    path: PathBuf,

    /// upstream of the course repository
    #[arg(long, default_value = DEFAULT_REPO_URL)]
    repo_url: String,

    /// package that has to be importable from `--path` afterwards
    #[arg(long, default_value = DEFAULT_PACKAGE)]
    package: String,

    /// server hosting the Drake colab installers
    #[arg(long, default_value = DEFAULT_INSTALLER_BASE_URL)]
    installer_base_url: String,

    /// working directory: the Drake installer is downloaded to and run from here,
    /// and the interpreter's search path is read from here
    #[arg(long, default_value = ".")]
    download_dir: PathBuf,

    #[arg(long, default_value = "python3")]
    python: String,

    #[arg(long, default_value = "pip3")]
    pip: String,

    /// package search directory, repeatable; defaults to the interpreter's sys.path
    #[arg(long)]
    search_path: Vec<PathBuf>,

    /// only warn when the prerequisite script or pip install fails
    #[arg(long, action)]
    ignore_install_errors: bool,

    /// log debug output including everything the external tools print
    #[arg(short, long, action)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            target_path: self.path.clone(),
            repo_url: self.repo_url.clone(),
            package: self.package.clone(),
            installer_base_url: self.installer_base_url.clone(),
            python: self.python.clone(),
            pip: self.pip.clone(),
            download_dir: self.download_dir.clone(),
            ignore_install_errors: self.ignore_install_errors,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Download and run the Drake colab installer
    SetupDrake(commands::setup_drake::SetupDrakeArgs),

    /// Provision Drake together with the manipulation course code
    ///
    /// Installs Drake, clones the course repository (unless already present),
    /// checks out the given commit, runs the bundled prerequisite script,
    /// installs requirements.txt with pip and finally checks that the course
    /// package resolves from inside `--path`.
    SetupManipulation(commands::setup_manipulation::SetupManipulationArgs),

    /// Check that the course package resolves from inside `--path`
    Verify(commands::verify::VerifyArgs),
}

fn main() -> anyhow::Result<()> {
    // parse command line arguments
    let args = Args::parse();

    // init logging
    let level = if args.verbose {
        Level::Debug
    } else {
        Level::Info
    };
    simple_logger::init_with_level(level)?;

    let settings = args.settings();
    match args.command {
        Commands::SetupDrake(cmd) => commands::setup_drake::run(cmd, settings)?,
        Commands::SetupManipulation(cmd) => {
            commands::setup_manipulation::run(cmd, settings, args.search_path)?
        }
        Commands::Verify(cmd) => commands::verify::run(cmd, settings, args.search_path)?,
    };

    Ok(())
}
