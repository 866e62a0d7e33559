mod backend_kind;
mod cli;
mod commands;
mod error;
mod lock;
mod logging;
mod settings;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Args;
use crate::settings::HostSettings;

fn main() -> ExitCode {
    let args = Args::parse();
    let settings = HostSettings::load();
    logging::init_logging(
        args.verbose || settings.debug_logging,
        settings.max_log_size_bytes,
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("hookenv: failed to start async runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    match runtime.block_on(commands::execute(args, settings, &mut stdout)) {
        Ok(code) => code,
        Err(error) => {
            log::debug!("Command failed: {error:?}");
            eprintln!("hookenv: {error}");
            ExitCode::FAILURE
        }
    }
}
