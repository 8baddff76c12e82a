//! macOS DMG disk image creation.
//!
//! The finished `.app` is copied into a temporary staging directory, next to
//! an `Applications` symlink for drag-to-install, and the staging directory is
//! handed to a [`DiskImager`]. The image always lands at the same fixed file
//! name, replacing whatever a previous run left there.

use crate::bundler::{
    error::{Context, Error, ErrorExt, Result},
    settings::PackageConfig,
    tools::DiskImager,
    utils::fs,
};
use std::path::{Path, PathBuf};

/// On-disk format of the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DiskImageFormat {
    /// zlib-compressed, read-only.
    #[default]
    Udzo,
}

impl DiskImageFormat {
    /// Value for `hdiutil create -format`.
    pub fn hdiutil_format(&self) -> &'static str {
        match self {
            DiskImageFormat::Udzo => "UDZO",
        }
    }
}

/// What to put in the disk image and where to write it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiskImageSpec {
    file_name: String,
    output_dir: PathBuf,
    source_dir: PathBuf,
    volume_name: String,
    format: DiskImageFormat,
    applications_link: bool,
}

impl DiskImageSpec {
    /// Image of the bundle at `source_dir`, written to `output_dir`.
    pub fn new(config: &PackageConfig, source_dir: &Path, output_dir: &Path) -> Self {
        Self {
            file_name: config.disk_image_name().to_string(),
            output_dir: output_dir.to_path_buf(),
            source_dir: source_dir.to_path_buf(),
            volume_name: config.app_name().to_string(),
            format: DiskImageFormat::default(),
            applications_link: true,
        }
    }

    /// Whether to stage an `Applications` symlink next to the bundle.
    pub fn with_applications_link(mut self, enabled: bool) -> Self {
        self.applications_link = enabled;
        self
    }

    /// Fixed file name of the image.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Full path of the image.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }

    /// The finished package directory.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Volume name shown when the image is mounted.
    pub fn volume_name(&self) -> &str {
        &self.volume_name
    }

    /// Image format.
    pub fn format(&self) -> DiskImageFormat {
        self.format
    }

    /// Whether an `Applications` symlink is staged.
    pub fn applications_link(&self) -> bool {
        self.applications_link
    }
}

/// Creates the disk image described by `spec` and returns its path.
///
/// # Process
/// 1. Remove any image already at the output path
/// 2. Copy the bundle into a temporary staging directory
/// 3. Add the `Applications` symlink if requested
/// 4. Run the imager over the staging directory
///
/// The staging directory is removed on every exit path.
///
/// # Errors
///
/// [`Error::Packaging`] if the imager fails or writes nothing. The bundle at
/// `spec.source_dir()` is left untouched either way.
pub async fn write_disk_image(spec: &DiskImageSpec, imager: &dyn DiskImager) -> Result<PathBuf> {
    log::info!("Creating {} from {}", spec.file_name(), spec.source_dir().display());

    let output = spec.output_path();
    fs::create_dir_all(&spec.output_dir, false).await?;
    fs::remove_file(&output).await?;

    let staging = tempfile::Builder::new()
        .prefix("dmg-staging-")
        .tempdir()
        .fs_context("creating DMG staging directory in", std::env::temp_dir())?;

    let app_name = spec
        .source_dir()
        .file_name()
        .context("invalid app bundle path")?;
    let staged_app = staging.path().join(app_name);

    log::debug!("Copying .app to staging: {}", staged_app.display());
    fs::copy_dir(spec.source_dir(), &staged_app)
        .await
        .with_context(|| format!("copying .app bundle to {}", staged_app.display()))?;

    if spec.applications_link() {
        let link = staging.path().join("Applications");
        fs::symlink(Path::new("/Applications"), &link)
            .fs_context("creating Applications symlink", &link)?;
    }

    imager.create(spec, staging.path()).await?;

    if !output.is_file() {
        return Err(Error::Packaging(format!(
            "imager reported success but {} was not written",
            output.display()
        )));
    }

    log::info!("Created {} DMG: {}", spec.format().hdiutil_format(), output.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::ConfigBuilder;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Writes a listing of the staged folder as the "image".
    #[derive(Default)]
    struct ListingImager {
        staged: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DiskImager for ListingImager {
        async fn create(&self, spec: &DiskImageSpec, source_folder: &Path) -> Result<()> {
            let mut names: Vec<String> = std::fs::read_dir(source_folder)
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            std::fs::write(spec.output_path(), names.join("\n")).unwrap();
            *self.staged.lock().unwrap() = names;
            Ok(())
        }
    }

    struct FailingImager;

    #[async_trait]
    impl DiskImager for FailingImager {
        async fn create(&self, _spec: &DiskImageSpec, _source_folder: &Path) -> Result<()> {
            Err(Error::Packaging("hdiutil: create failed - Resource busy".into()))
        }
    }

    fn spec(root: &Path) -> DiskImageSpec {
        let logo = root.join("logo.png");
        image::RgbaImage::new(1, 1).save(&logo).unwrap();
        let config = ConfigBuilder::new().icon_source(logo).build().unwrap();

        let app = root.join("macos").join(config.bundle_dir_name());
        std::fs::create_dir_all(app.join("Contents/MacOS")).unwrap();
        std::fs::write(app.join("Contents/Info.plist"), b"<plist/>").unwrap();

        DiskImageSpec::new(&config, &app, &root.join("dmg"))
    }

    #[tokio::test]
    async fn stages_bundle_with_applications_link() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(dir.path());
        let imager = ListingImager::default();

        let path = write_disk_image(&spec, &imager).await.unwrap();

        assert_eq!(path, dir.path().join("dmg/LogRocket.dmg"));
        assert_eq!(*imager.staged.lock().unwrap(), ["Applications", "Log Rocket.app"]);
    }

    #[tokio::test]
    async fn applications_link_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(dir.path()).with_applications_link(false);
        let imager = ListingImager::default();

        write_disk_image(&spec, &imager).await.unwrap();

        assert_eq!(*imager.staged.lock().unwrap(), ["Log Rocket.app"]);
    }

    #[tokio::test]
    async fn failure_removes_stale_image_and_keeps_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(dir.path());
        std::fs::create_dir_all(dir.path().join("dmg")).unwrap();
        std::fs::write(spec.output_path(), b"previous run").unwrap();

        let err = write_disk_image(&spec, &FailingImager).await.unwrap_err();

        assert!(matches!(err, Error::Packaging(_)));
        assert!(!spec.output_path().exists());
        assert!(spec.source_dir().join("Contents/Info.plist").is_file());
    }

    #[test]
    fn default_format_is_compressed_read_only() {
        assert_eq!(DiskImageFormat::default().hdiutil_format(), "UDZO");
    }
}
