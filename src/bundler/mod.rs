//! macOS application packaging.
//!
//! Turns a compiled executable and a single source image into
//! `<AppName>.app` and a compressed `.dmg` for distribution.
//!
//! # Configuration
//!
//! Defaults describe the Log Rocket viewer. Any of them can be overridden by an
//! optional TOML file, and the CLI overrides the file:
//!
//! ```toml
//! app_name = "Log Rocket"
//! identifier = "com.logrocket.viewer"
//! version = "0.2.0"
//! icon = "icons/logo.png"
//!
//! [[document_types]]
//! name = "Log File"
//! role = "Viewer"
//! extensions = ["log"]
//! content_types = ["public.log", "public.plain-text"]
//! ```
//!
//! # Stages
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Icons | [`macos::icon`] | `AppIcon.icns` |
//! | Manifest | [`macos::info_plist`] | `Info.plist` text |
//! | Assembly | [`macos::app`] | `<AppName>.app` |
//! | Disk image | [`macos::dmg`] | `<disk_image_name>` |
//!
//! [`Bundler`] runs them in order. External tools are reached only through the
//! capability traits in [`tools`].

#![warn(missing_docs)]

mod builder;
mod error;
pub mod macos;
pub mod resources;
mod settings;
pub mod tools;
mod utils;

pub use builder::{
    Bundler, DEFAULT_OUT_DIR, PackageReport, PipelineState, calculate_directory_sha256,
    calculate_sha256,
};
pub use error::{Context, Error, ErrorExt, Result};
pub use macos::{
    app::PackageLayout,
    dmg::{DiskImageFormat, DiskImageSpec},
};
pub use resources::icons::{IconRendition, IconSet, REQUIRED_RENDITIONS};
pub use settings::{
    ConfigBuilder, ConfigFile, DEFAULT_APP_NAME, DocumentRole, DocumentType, ICON_CONTAINER_EXTENSION,
    ICON_CONTAINER_NAME, PackageConfig,
};
pub use tools::{
    DiskImager, HdiutilImager, IconBackend, IconCompiler, IconutilCompiler, ImageResizer,
    NativeIconCompiler, NativeResizer, SipsResizer, Toolchain,
};
