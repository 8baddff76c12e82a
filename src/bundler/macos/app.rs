//! macOS application bundle (.app) assembly.

use crate::bundler::{
    error::{Context, ErrorExt, Result},
    settings::PackageConfig,
    utils::fs,
};
use std::path::{Path, PathBuf};

/// Directory tree of an application bundle.
///
/// ```text
/// <AppName>.app/
/// └── Contents/
///     ├── Info.plist
///     ├── MacOS/<executable>
///     └── Resources/AppIcon.icns
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    root: PathBuf,
    contents: PathBuf,
    executable_dir: PathBuf,
    resources: PathBuf,
}

impl PackageLayout {
    /// Layout of `config`'s bundle placed inside `parent`.
    pub fn new(parent: &Path, config: &PackageConfig) -> Self {
        let root = parent.join(config.bundle_dir_name());
        let contents = root.join("Contents");
        Self {
            executable_dir: contents.join("MacOS"),
            resources: contents.join("Resources"),
            contents,
            root,
        }
    }

    /// The `.app` directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `Contents`
    pub fn contents(&self) -> &Path {
        &self.contents
    }

    /// `Contents/MacOS`
    pub fn executable_dir(&self) -> &Path {
        &self.executable_dir
    }

    /// `Contents/Resources`
    pub fn resources(&self) -> &Path {
        &self.resources
    }

    /// `Contents/Info.plist`
    pub fn info_plist(&self) -> PathBuf {
        self.contents.join("Info.plist")
    }
}

/// Builds the bundle for `config` inside `parent` from scratch.
///
/// Any existing bundle at the same path is deleted first; nothing from a
/// previous run is merged. There is no rollback: if a step fails, the
/// partially written tree stays on disk.
///
/// The copied executable is always `rwxr-xr-x`, whatever the mode of
/// `executable`.
///
/// # Errors
///
/// [`Error::Fs`](crate::bundler::Error::Fs) for any filesystem failure.
pub async fn assemble(
    config: &PackageConfig,
    parent: &Path,
    executable: &Path,
    icon_container: &Path,
    info_plist: &str,
) -> Result<PackageLayout> {
    let layout = PackageLayout::new(parent, config);

    log::info!(
        "Bundling {} at {}",
        config.bundle_dir_name(),
        layout.root().display()
    );

    fs::create_dir_all(layout.root(), true).await?;
    fs::create_dir_all(layout.executable_dir(), false).await?;
    fs::create_dir_all(layout.resources(), false).await?;

    let plist_path = layout.info_plist();
    tokio::fs::write(&plist_path, info_plist)
        .await
        .fs_context("writing", &plist_path)?;

    let icon_dest = layout.resources().join(config.icon_file_name());
    fs::copy_file(icon_container, &icon_dest)
        .await
        .context("failed to copy icon container into bundle")?;

    let executable_dest = layout.executable_dir().join(config.executable_name());
    fs::copy_file(executable, &executable_dest)
        .await
        .with_context(|| format!("failed to copy {} to .app bundle", config.executable_name()))?;
    fs::set_executable(&executable_dest).await?;

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::ConfigBuilder;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        config: PackageConfig,
        executable: PathBuf,
        icon: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let logo = root.join("logo.png");
        image::RgbaImage::new(1, 1).save(&logo).unwrap();
        let executable = root.join("log_rocket");
        std::fs::write(&executable, b"#!/bin/sh\n").unwrap();
        let icon = root.join("AppIcon.icns");
        std::fs::write(&icon, b"icns").unwrap();
        let config = ConfigBuilder::new().icon_source(logo).build().unwrap();
        Fixture {
            _dir: dir,
            root,
            config,
            executable,
            icon,
        }
    }

    #[tokio::test]
    async fn assembles_canonical_layout() {
        let f = fixture();
        let out = f.root.join("macos");

        let layout = assemble(&f.config, &out, &f.executable, &f.icon, "<plist/>")
            .await
            .unwrap();

        assert_eq!(layout.root(), out.join("Log Rocket.app"));
        assert_eq!(std::fs::read_to_string(layout.info_plist()).unwrap(), "<plist/>");
        assert!(layout.executable_dir().join("log_rocket").is_file());

        let resources: Vec<_> = std::fs::read_dir(layout.resources())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(resources, ["AppIcon.icns"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn executable_bit_is_set() {
        use std::os::unix::fs::PermissionsExt;

        let f = fixture();
        let layout = assemble(&f.config, &f.root, &f.executable, &f.icon, "")
            .await
            .unwrap();

        let mode = std::fs::metadata(layout.executable_dir().join("log_rocket"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn executable_mode_does_not_follow_the_source() {
        use std::os::unix::fs::PermissionsExt;

        let f = fixture();
        std::fs::set_permissions(&f.executable, std::fs::Permissions::from_mode(0o600)).unwrap();

        let layout = assemble(&f.config, &f.root, &f.executable, &f.icon, "")
            .await
            .unwrap();

        let mode = std::fs::metadata(layout.executable_dir().join("log_rocket"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn stale_bundle_contents_are_discarded() {
        let f = fixture();
        let stale = PackageLayout::new(&f.root, &f.config);
        std::fs::create_dir_all(stale.resources()).unwrap();
        std::fs::write(stale.resources().join("Old.icns"), b"old").unwrap();

        let layout = assemble(&f.config, &f.root, &f.executable, &f.icon, "")
            .await
            .unwrap();

        assert!(!layout.resources().join("Old.icns").exists());
        assert!(layout.resources().join("AppIcon.icns").is_file());
    }

    #[tokio::test]
    async fn missing_executable_is_a_filesystem_error() {
        let f = fixture();
        let err = assemble(&f.config, &f.root, &f.root.join("missing"), &f.icon, "")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("failed to copy log_rocket"));
        assert!(matches!(err, crate::bundler::Error::Context(_, ref inner)
            if matches!(**inner, crate::bundler::Error::Fs { .. })));
    }
}
