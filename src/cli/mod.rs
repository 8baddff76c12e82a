//! Command line interface for log-rocket-packager.

mod args;
mod output;

pub use args::{Args, IconBackendArg};
pub use output::OutputManager;

use crate::bundler::{Bundler, IconBackend, PackageReport, Result, Toolchain};

/// Main CLI entry point.
///
/// Returns the process exit code. Packaging errors are returned as `Err` so
/// the binary can print them with their recovery suggestions.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let output = OutputManager::new(args.quiet);

    if let Err(message) = args.validate() {
        output.error(&message);
        return Ok(1);
    }

    let report = package(&args, &output).await?;
    print_report(&output, &report);
    Ok(0)
}

/// Resolves configuration from `args` and runs the full pipeline.
pub async fn package(args: &Args, output: &OutputManager) -> Result<PackageReport> {
    let config = args.resolve_config()?;
    let backend = IconBackend::from(args.icon_backend);

    if backend == IconBackend::System && !cfg!(target_os = "macos") {
        output.warn("sips, iconutil and hdiutil are only shipped with macOS");
    }

    output.section(&format!("Packaging {}", config.app_name()));
    output.progress(&format!(
        "{} {} ({})",
        config.identifier(),
        config.version(),
        config.icon_source().display()
    ));

    let mut bundler = Bundler::new(config, Toolchain::for_backend(backend))
        .out_dir(&args.out_dir)
        .applications_link(!args.no_applications_link);
    if let Some(executable) = &args.executable {
        bundler = bundler.executable(executable);
    }

    bundler.bundle().await
}

fn print_report(output: &OutputManager, report: &PackageReport) {
    output.success(&format!("Created {}", report.app_bundle.display()));
    output.indent(&format!("SHA256: {}", report.app_bundle_checksum));
    output.success(&format!(
        "Created {} ({} bytes)",
        report.disk_image.display(),
        report.disk_image_size
    ));
    output.indent(&format!("SHA256: {}", report.disk_image_checksum));
}
