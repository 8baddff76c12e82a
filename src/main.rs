//! log-rocket-packager - build the Log Rocket .app bundle and disk image.

use log_rocket_packager::cli;
use log_rocket_packager::cli::OutputManager;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(false);
            output.error(&format!("Packaging failed: {e}"));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.error_detail("");
                output.error_detail("Recovery suggestions:");
                for suggestion in suggestions {
                    output.error_detail(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}
