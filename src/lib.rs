//! # Log Rocket Packager
//!
//! Turns the compiled Log Rocket executable and one source image into a macOS
//! application bundle and a compressed disk image.
//!
//! ## Features
//!
//! - **Icon generation**: every standard rendition from 16x16 to 1024x1024,
//!   each verified for exact pixel size, compiled into `AppIcon.icns`
//! - **Bundle descriptor**: a deterministic `Info.plist` with document-type
//!   associations for `.log` files
//! - **Clean rebuilds**: the `.app` and `.dmg` are recreated from empty on every run
//! - **Pluggable tools**: `sips`/`iconutil`/`hdiutil`, or in-process icon encoding
//! - **Launch helper**: `open-log-rocket <file>` opens a log file in the installed app
//!
//! ## Usage
//!
//! ```bash
//! cargo build --release
//! log-rocket-packager                          # defaults, system tools
//! log-rocket-packager --icon-backend native    # no sips/iconutil needed
//! open-log-rocket /var/log/system.log
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bundler;
pub mod cli;
pub mod launcher;

pub use bundler::{Bundler, Error, PackageConfig, PackageReport, PipelineState, Result};
pub use cli::Args;
pub use launcher::{LaunchError, launch};
