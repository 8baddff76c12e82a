//! Command line argument parsing and validation.
//!
//! Layering: built-in defaults, then `--config`, then the remaining flags.

use crate::bundler::{ConfigBuilder, IconBackend, PackageConfig, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Package a compiled executable as a macOS .app bundle and DMG
#[derive(Parser, Debug)]
#[command(
    name = "log-rocket-packager",
    version,
    about = "Package a compiled executable as a macOS .app bundle and DMG",
    long_about = "Build <AppName>.app and a compressed disk image from a release executable \
and a single source icon.

Usage:
  log-rocket-packager
  log-rocket-packager --icon assets/logo.png --app-version 0.2.0
  log-rocket-packager --config packaging.toml --icon-backend native"
)]
pub struct Args {
    /// Compiled executable to package [default: target/release/<executable_name>]
    #[arg(long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Source image for the application icon
    #[arg(long, value_name = "PATH")]
    pub icon: Option<PathBuf>,

    /// TOML file overriding the built-in package settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bundle version written to Info.plist
    #[arg(long = "app-version", value_name = "VER")]
    pub app_version: Option<String>,

    /// Output directory (app in macos/, image in dmg/)
    #[arg(long, value_name = "DIR", default_value = crate::bundler::DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// Which implementation renders and compiles the icon
    #[arg(long, value_enum, env = "LOG_ROCKET_ICON_BACKEND", default_value_t = IconBackendArg::System)]
    pub icon_backend: IconBackendArg,

    /// Leave the Applications shortcut out of the disk image
    #[arg(long)]
    pub no_applications_link: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// `--icon-backend` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IconBackendArg {
    /// sips and iconutil
    System,
    /// Built-in image scaling and ICNS encoding
    Native,
}

impl From<IconBackendArg> for IconBackend {
    fn from(arg: IconBackendArg) -> Self {
        match arg {
            IconBackendArg::System => IconBackend::System,
            IconBackendArg::Native => IconBackend::Native,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(version) = &self.app_version
            && version.trim().is_empty()
        {
            return Err("--app-version must not be empty".to_string());
        }
        if self.out_dir.as_os_str().is_empty() {
            return Err("--out-dir must not be empty".to_string());
        }
        Ok(())
    }

    /// Resolves the package configuration from defaults, `--config` and flags.
    pub fn resolve_config(&self) -> Result<PackageConfig> {
        let mut builder = ConfigBuilder::new();
        if let Some(path) = &self.config {
            builder = builder.load_file(path)?;
        }
        if let Some(icon) = &self.icon {
            builder = builder.icon_source(icon);
        }
        if let Some(version) = &self.app_version {
            builder = builder.version(version);
        }
        builder.build()
    }
}
