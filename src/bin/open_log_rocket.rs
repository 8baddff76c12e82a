//! open-log-rocket - open a log file in the Log Rocket application.

use clap::Parser;
use log_rocket_packager::launcher::{self, LaunchArgs, SystemOpener};
use std::process;

fn main() {
    env_logger::init();

    let args = LaunchArgs::parse();
    if let Err(e) = launcher::launch(args.log_file.as_deref(), &SystemOpener::from_env()) {
        eprintln!("{e}");
        process::exit(e.exit_code());
    }
}
