use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hookenv")]
#[command(version)]
#[command(about = "Provision and run isolated tool environments for hooks")]
pub struct Args {
    /// Log debug output to stderr and the log file
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Backend to use (default: settings, then coursier)
    #[arg(long, global = true, value_name = "NAME")]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Install an environment under a prefix",
        after_help = "Example:\n    hookenv install ./repo --dep org.scalameta:scalafmt-cli_2.13:3.7.0"
    )]
    Install(InstallArgs),
    #[command(
        about = "Run a hook entry inside an installed environment",
        after_help = "Example:\n    hookenv run ./repo scalafmt --arg=--test -- A.scala B.scala"
    )]
    Run(RunArgs),
    #[command(about = "Check whether an installed environment is usable")]
    Health(HealthArgs),
    #[command(about = "Show whether the backend's launcher is installed")]
    Detect,
    #[command(about = "Show or update host settings")]
    Config(ConfigArgs),
}

#[derive(ClapArgs)]
pub struct InstallArgs {
    /// Project-local root the environment is created under
    #[arg(value_name = "PREFIX")]
    pub prefix: PathBuf,

    /// Toolchain version token (default: the backend's default)
    #[arg(long, value_name = "VERSION")]
    pub language_version: Option<String>,

    /// Additional dependency specifier, repeatable
    #[arg(long = "dep", value_name = "COORDINATE")]
    pub additional_dependencies: Vec<String>,
}

#[derive(ClapArgs)]
pub struct RunArgs {
    #[arg(value_name = "PREFIX")]
    pub prefix: PathBuf,

    /// Hook entry, split shell-style
    #[arg(value_name = "ENTRY")]
    pub entry: String,

    #[arg(long, value_name = "VERSION")]
    pub language_version: Option<String>,

    /// Extra hook argument placed before file arguments, repeatable
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Files passed to the hook in batches
    #[arg(value_name = "FILE", last = true)]
    pub files: Vec<String>,
}

#[derive(ClapArgs)]
pub struct HealthArgs {
    #[arg(value_name = "PREFIX")]
    pub prefix: PathBuf,

    #[arg(long, value_name = "VERSION")]
    pub language_version: Option<String>,
}

#[derive(ClapArgs)]
pub struct ConfigArgs {
    #[arg(long, value_name = "BOOL")]
    pub debug_logging: Option<bool>,

    #[arg(long, value_name = "NAME")]
    pub default_backend: Option<String>,
}
