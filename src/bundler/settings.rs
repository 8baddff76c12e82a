//! Packaging configuration.
//!
//! [`PackageConfig`] is resolved once per run and threaded, immutable, through
//! every stage. Values are layered, later layers winning:
//!
//! 1. Built-in Log Rocket defaults ([`ConfigBuilder::new`])
//! 2. An optional TOML file ([`ConfigBuilder::load_file`])
//! 3. Explicit overrides from the command line
//!
//! # Configuration file
//!
//! ```toml
//! app_name = "Log Rocket"
//! executable_name = "log_rocket"
//! identifier = "com.logrocket.viewer"
//! version = "0.1.0"
//! icon = "src/icons/logo.png"
//! minimum_system_version = "10.15"
//! disk_image_name = "LogRocket.dmg"
//!
//! [[document_types]]
//! name = "Log File"
//! role = "Viewer"
//! extensions = ["log"]
//! content_types = ["public.log"]
//! ```
//!
//! A relative `icon` path in the file is resolved against the file's directory.

use crate::bundler::error::{Error, ErrorExt, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Display name of the packaged application.
pub const DEFAULT_APP_NAME: &str = "Log Rocket";

/// Base name of the compiled icon container inside `Contents/Resources`.
pub const ICON_CONTAINER_NAME: &str = "AppIcon";

/// File extension of the compiled icon container.
pub const ICON_CONTAINER_EXTENSION: &str = "icns";

const DEFAULT_EXECUTABLE_NAME: &str = "log_rocket";
const DEFAULT_IDENTIFIER: &str = "com.logrocket.viewer";
const DEFAULT_VERSION: &str = "0.1.0";
const DEFAULT_ICON_SOURCE: &str = "src/icons/logo.png";
const DEFAULT_MINIMUM_SYSTEM_VERSION: &str = "10.15";
const DEFAULT_DISK_IMAGE_NAME: &str = "LogRocket.dmg";

/// How the application handles a document type (`CFBundleTypeRole`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum DocumentRole {
    /// The application can read and display the document.
    #[default]
    Viewer,
    /// The application can read, modify and save the document.
    Editor,
}

impl DocumentRole {
    /// Value written to `CFBundleTypeRole`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentRole::Viewer => "Viewer",
            DocumentRole::Editor => "Editor",
        }
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document type the application registers for.
///
/// Sets are ordered so the rendered descriptor is stable across runs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentType {
    /// Human-readable type name (`CFBundleTypeName`).
    pub name: String,

    /// Handler rank for the type.
    #[serde(default)]
    pub role: DocumentRole,

    /// File extensions without the leading dot (`CFBundleTypeExtensions`).
    pub extensions: BTreeSet<String>,

    /// Uniform type identifiers (`LSItemContentTypes`).
    #[serde(default)]
    pub content_types: BTreeSet<String>,
}

impl DocumentType {
    /// The association Log Rocket ships with: plain `.log` files, viewer only.
    pub fn log_files() -> Self {
        Self {
            name: "Log File".into(),
            role: DocumentRole::Viewer,
            extensions: ["log".to_string()].into(),
            content_types: ["public.log".to_string(), "public.plain-text".to_string()].into(),
        }
    }
}

/// Fully resolved, validated packaging parameters.
///
/// Built through [`ConfigBuilder`]; there are no setters, so the bundle
/// identifier and every other value stay fixed for the rest of the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageConfig {
    app_name: String,
    executable_name: String,
    identifier: String,
    version: String,
    icon_source: PathBuf,
    minimum_system_version: String,
    document_types: Vec<DocumentType>,
    disk_image_name: String,
}

impl PackageConfig {
    /// Display name; also the `.app` directory name and the DMG volume name.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// File name of the executable inside `Contents/MacOS`.
    pub fn executable_name(&self) -> &str {
        &self.executable_name
    }

    /// Reverse-domain bundle identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Marketing version (`CFBundleShortVersionString`).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Source image every icon rendition is derived from.
    pub fn icon_source(&self) -> &Path {
        &self.icon_source
    }

    /// `LSMinimumSystemVersion`.
    pub fn minimum_system_version(&self) -> &str {
        &self.minimum_system_version
    }

    /// Document-type associations in declaration order.
    pub fn document_types(&self) -> &[DocumentType] {
        &self.document_types
    }

    /// Fixed file name of the distributable disk image.
    pub fn disk_image_name(&self) -> &str {
        &self.disk_image_name
    }

    /// `<AppName>.app`
    pub fn bundle_dir_name(&self) -> String {
        format!("{}.app", self.app_name)
    }

    /// `AppIcon.icns`
    pub fn icon_file_name(&self) -> String {
        format!("{ICON_CONTAINER_NAME}.{ICON_CONTAINER_EXTENSION}")
    }
}

/// On-disk form of the configuration file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Overrides [`PackageConfig::app_name`].
    pub app_name: Option<String>,
    /// Overrides [`PackageConfig::executable_name`].
    pub executable_name: Option<String>,
    /// Overrides [`PackageConfig::identifier`].
    pub identifier: Option<String>,
    /// Overrides [`PackageConfig::version`].
    pub version: Option<String>,
    /// Overrides [`PackageConfig::icon_source`].
    pub icon: Option<PathBuf>,
    /// Overrides [`PackageConfig::minimum_system_version`].
    pub minimum_system_version: Option<String>,
    /// Replaces the default document types when present.
    pub document_types: Option<Vec<DocumentType>>,
    /// Overrides [`PackageConfig::disk_image_name`].
    pub disk_image_name: Option<String>,
}

/// Builder for [`PackageConfig`].
///
/// # Examples
///
/// ```no_run
/// use log_rocket_packager::bundler::ConfigBuilder;
///
/// # fn example() -> log_rocket_packager::bundler::Result<()> {
/// let config = ConfigBuilder::new()
///     .icon_source("assets/icon.png")
///     .version("1.2.0")
///     .build()?;
/// assert_eq!(config.bundle_dir_name(), "Log Rocket.app");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    app_name: String,
    executable_name: String,
    identifier: String,
    version: String,
    icon_source: PathBuf,
    minimum_system_version: String,
    document_types: Vec<DocumentType>,
    disk_image_name: String,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Creates a builder pre-filled with the Log Rocket defaults.
    pub fn new() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.into(),
            executable_name: DEFAULT_EXECUTABLE_NAME.into(),
            identifier: DEFAULT_IDENTIFIER.into(),
            version: DEFAULT_VERSION.into(),
            icon_source: PathBuf::from(DEFAULT_ICON_SOURCE),
            minimum_system_version: DEFAULT_MINIMUM_SYSTEM_VERSION.into(),
            document_types: vec![DocumentType::log_files()],
            disk_image_name: DEFAULT_DISK_IMAGE_NAME.into(),
        }
    }

    /// Reads a TOML configuration file and layers it over the current values.
    pub fn load_file(self, path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).fs_context("reading config file", path)?;
        let file: ConfigFile = toml::from_str(&contents)?;
        log::debug!("Loaded packaging config from {}", path.display());

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(self.merge(file, base_dir))
    }

    /// Layers an already parsed [`ConfigFile`] over the current values.
    ///
    /// A relative icon path is joined onto `base_dir`.
    pub fn merge(mut self, file: ConfigFile, base_dir: &Path) -> Self {
        if let Some(v) = file.app_name {
            self.app_name = v;
        }
        if let Some(v) = file.executable_name {
            self.executable_name = v;
        }
        if let Some(v) = file.identifier {
            self.identifier = v;
        }
        if let Some(v) = file.version {
            self.version = v;
        }
        if let Some(v) = file.icon {
            self.icon_source = if v.is_relative() { base_dir.join(v) } else { v };
        }
        if let Some(v) = file.minimum_system_version {
            self.minimum_system_version = v;
        }
        if let Some(v) = file.document_types {
            self.document_types = v;
        }
        if let Some(v) = file.disk_image_name {
            self.disk_image_name = v;
        }
        self
    }

    /// Sets the display name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Sets the executable file name.
    pub fn executable_name(mut self, name: impl Into<String>) -> Self {
        self.executable_name = name.into();
        self
    }

    /// Sets the bundle identifier.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Sets the marketing version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the icon source image.
    pub fn icon_source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.icon_source = path.as_ref().to_path_buf();
        self
    }

    /// Sets the minimum supported macOS version.
    pub fn minimum_system_version(mut self, version: impl Into<String>) -> Self {
        self.minimum_system_version = version.into();
        self
    }

    /// Replaces the document-type associations.
    pub fn document_types(mut self, types: Vec<DocumentType>) -> Self {
        self.document_types = types;
        self
    }

    /// Sets the disk image file name.
    pub fn disk_image_name(mut self, name: impl Into<String>) -> Self {
        self.disk_image_name = name.into();
        self
    }

    /// Validates and freezes the configuration.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the icon source is missing or not an image, the
    /// identifier is empty or malformed, or any other required value is blank.
    pub fn build(self) -> Result<PackageConfig> {
        require("app_name", &self.app_name)?;
        require("version", &self.version)?;
        require("minimum_system_version", &self.minimum_system_version)?;
        validate_identifier(&self.identifier)?;
        validate_file_name("executable_name", &self.executable_name)?;
        validate_file_name("disk_image_name", &self.disk_image_name)?;

        for doc in &self.document_types {
            if doc.name.trim().is_empty() {
                return Err(Error::Config("document type without a name".into()));
            }
            if doc.extensions.is_empty() {
                return Err(Error::Config(format!(
                    "document type '{}' declares no extensions",
                    doc.name
                )));
            }
        }

        if !self.icon_source.is_file() {
            return Err(Error::Config(format!(
                "icon source {} does not exist",
                self.icon_source.display()
            )));
        }
        if let Err(e) = image::image_dimensions(&self.icon_source) {
            return Err(Error::Config(format!(
                "icon source {} is not a readable image: {e}",
                self.icon_source.display()
            )));
        }

        Ok(PackageConfig {
            app_name: self.app_name,
            executable_name: self.executable_name,
            identifier: self.identifier,
            version: self.version,
            icon_source: self.icon_source,
            minimum_system_version: self.minimum_system_version,
            document_types: self.document_types,
            disk_image_name: self.disk_image_name,
        })
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_file_name(field: &str, value: &str) -> Result<()> {
    require(field, value)?;
    if value.contains('/') || value == "." || value == ".." {
        return Err(Error::Config(format!(
            "{field} must be a plain file name, got '{value}'"
        )));
    }
    Ok(())
}

/// Reverse-domain form: dot-separated, non-empty segments of ASCII
/// alphanumerics and hyphens.
fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(Error::Config("bundle identifier must not be empty".into()));
    }
    let well_formed = identifier.split('.').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    if !well_formed {
        return Err(Error::Config(format!(
            "bundle identifier '{identifier}' is not in reverse-domain form"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("logo.png");
        image::RgbaImage::new(1, 1).save(&path).unwrap();
        path
    }

    #[test]
    fn defaults_resolve_with_existing_icon() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigBuilder::new()
            .icon_source(icon_fixture(dir.path()))
            .build()
            .unwrap();

        assert_eq!(config.app_name(), "Log Rocket");
        assert_eq!(config.bundle_dir_name(), "Log Rocket.app");
        assert_eq!(config.icon_file_name(), "AppIcon.icns");
        assert_eq!(config.disk_image_name(), "LogRocket.dmg");
        assert_eq!(config.document_types(), &[DocumentType::log_files()]);
    }

    #[test]
    fn missing_icon_is_a_config_error() {
        let err = ConfigBuilder::new()
            .icon_source("/tmp/does-not-exist/logo.png")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("does not exist")));
    }

    #[test]
    fn icon_that_is_not_an_image_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join("logo.png");
        std::fs::write(&icon, b"not a png").unwrap();

        let err = ConfigBuilder::new().icon_source(&icon).build().unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("not a readable image")), "{err}");
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigBuilder::new()
            .icon_source(icon_fixture(dir.path()))
            .identifier("")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("must not be empty")));
    }

    #[test]
    fn malformed_identifiers_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let icon = icon_fixture(dir.path());
        for bad in ["com..example", "com.example.", "com.exa mple", "com/example"] {
            let result = ConfigBuilder::new()
                .icon_source(&icon)
                .identifier(bad)
                .build();
            assert!(matches!(result, Err(Error::Config(_))), "{bad} accepted");
        }
    }

    #[test]
    fn executable_name_must_be_plain() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigBuilder::new()
            .icon_source(icon_fixture(dir.path()))
            .executable_name("bin/log_rocket")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn config_file_layers_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        icon_fixture(dir.path());
        let config_path = dir.path().join("packager.toml");
        std::fs::write(
            &config_path,
            r#"
identifier = "org.example.logs"
icon = "logo.png"

[[document_types]]
name = "Access Log"
role = "Editor"
extensions = ["access", "log"]
"#,
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .load_file(&config_path)
            .unwrap()
            .version("2.0.0")
            .build()
            .unwrap();

        assert_eq!(config.identifier(), "org.example.logs");
        assert_eq!(config.version(), "2.0.0");
        assert_eq!(config.icon_source(), dir.path().join("logo.png"));
        assert_eq!(config.app_name(), DEFAULT_APP_NAME);
        let doc = &config.document_types()[0];
        assert_eq!(doc.role, DocumentRole::Editor);
        assert!(doc.content_types.is_empty());
        assert_eq!(
            doc.extensions.iter().map(String::as_str).collect::<Vec<_>>(),
            ["access", "log"]
        );
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("packager.toml");
        std::fs::write(&config_path, "signing_identity = \"-\"\n").unwrap();
        let err = ConfigBuilder::new().load_file(&config_path).unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }
}
