//! Packaging pipeline orchestration.
//!
//! [`Bundler`] drives the stages in a fixed order and records how far it got:
//!
//! ```text
//! Resolved → IconsBuilt → ManifestBuilt → Assembled → Imaged → Done
//!     └──────────┴─────────────┴──────────────┴──────────┴──→ Failed
//! ```
//!
//! Each edge is taken only after its stage succeeded. The first error moves the
//! pipeline to [`PipelineState::Failed`] and is returned unchanged; nothing is
//! retried or rolled back.
//!
//! # Example
//!
//! ```ignore
//! use log_rocket_packager::bundler::{Bundler, ConfigBuilder, Toolchain};
//!
//! let config = ConfigBuilder::new().icon_source("src/icons/logo.png").build()?;
//! let mut bundler = Bundler::new(config, Toolchain::system())
//!     .out_dir("target/release/bundle");
//! let report = bundler.bundle().await?;
//!
//! println!("Created: {}", report.disk_image.display());
//! println!("SHA256: {}", report.disk_image_checksum);
//! ```

use crate::bail;
use crate::bundler::{
    error::{Error, ErrorExt, Result},
    macos::{
        app,
        dmg::{self, DiskImageSpec},
        icon, info_plist,
    },
    settings::PackageConfig,
    tools::Toolchain,
    utils::fs,
};
use std::{
    fmt, io,
    path::{Path, PathBuf},
};

/// Default output directory for bundles.
pub const DEFAULT_OUT_DIR: &str = "target/release/bundle";

/// How far a packaging run has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Configuration accepted, nothing written yet.
    Resolved,
    /// Icon container compiled.
    IconsBuilt,
    /// `Info.plist` rendered.
    ManifestBuilt,
    /// `.app` bundle written.
    Assembled,
    /// Disk image written.
    Imaged,
    /// Every stage succeeded.
    Done,
    /// A stage failed; the run halted.
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Resolved => "resolved",
            PipelineState::IconsBuilt => "icons built",
            PipelineState::ManifestBuilt => "manifest built",
            PipelineState::Assembled => "assembled",
            PipelineState::Imaged => "imaged",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    /// The `.app` directory.
    pub app_bundle: PathBuf,
    /// SHA-256 over the bundle tree (relative paths and contents).
    pub app_bundle_checksum: String,
    /// The disk image.
    pub disk_image: PathBuf,
    /// Size of the disk image in bytes.
    pub disk_image_size: u64,
    /// SHA-256 of the disk image.
    pub disk_image_checksum: String,
}

/// Staged packaging pipeline.
///
/// Output goes to `<out_dir>/macos/<AppName>.app` and
/// `<out_dir>/dmg/<disk_image_name>`. Intermediate files live in a temporary
/// `.work-*` directory inside `out_dir` that is removed when the run ends.
#[derive(Debug)]
pub struct Bundler {
    config: PackageConfig,
    toolchain: Toolchain,
    executable: PathBuf,
    out_dir: PathBuf,
    applications_link: bool,
    state: PipelineState,
    last_completed: Option<PipelineState>,
}

impl Bundler {
    /// Creates a pipeline for a resolved configuration.
    ///
    /// The executable defaults to `target/release/<executable_name>`.
    pub fn new(config: PackageConfig, toolchain: Toolchain) -> Self {
        let executable = Path::new("target/release").join(config.executable_name());
        Self {
            config,
            toolchain,
            executable,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            applications_link: true,
            state: PipelineState::Resolved,
            last_completed: None,
        }
    }

    /// Sets the compiled executable to package.
    pub fn executable<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.executable = path.as_ref().to_path_buf();
        self
    }

    /// Sets the output directory.
    pub fn out_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.out_dir = path.as_ref().to_path_buf();
        self
    }

    /// Whether the disk image gets an `Applications` symlink.
    pub fn applications_link(mut self, enabled: bool) -> Self {
        self.applications_link = enabled;
        self
    }

    /// The resolved configuration.
    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Last state reached successfully, if any stage has run.
    pub fn last_completed(&self) -> Option<PipelineState> {
        self.last_completed
    }

    /// Runs every stage in order.
    ///
    /// On failure the state becomes [`PipelineState::Failed`], the error is
    /// logged with the stage that produced it, and returned. Running again
    /// starts from scratch and replaces all previous output.
    pub async fn bundle(&mut self) -> Result<PackageReport> {
        self.state = PipelineState::Resolved;
        self.last_completed = Some(PipelineState::Resolved);

        match self.run_stages().await {
            Ok(report) => {
                self.advance(PipelineState::Done);
                Ok(report)
            }
            Err(e) => {
                log::error!("Packaging failed after stage '{}': {e}", self.state);
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    fn advance(&mut self, next: PipelineState) {
        log::debug!("Pipeline: {} -> {next}", self.state);
        self.state = next;
        self.last_completed = Some(next);
    }

    async fn run_stages(&mut self) -> Result<PackageReport> {
        if !self.executable.is_file() {
            return Err(Error::Fs {
                context: "locating executable",
                path: self.executable.clone(),
                error: io::Error::new(io::ErrorKind::NotFound, "no such file"),
            });
        }

        fs::create_dir_all(&self.out_dir, false).await?;
        let work_dir = tempfile::Builder::new()
            .prefix(".work-")
            .tempdir_in(&self.out_dir)
            .fs_context("creating work directory in", &self.out_dir)?;

        let icon_container = icon::generate_icon_container(
            &self.config,
            self.toolchain.resizer.as_ref(),
            self.toolchain.compiler.as_ref(),
            work_dir.path(),
        )
        .await?;
        self.advance(PipelineState::IconsBuilt);

        let manifest = info_plist::render(&self.config)?;
        self.advance(PipelineState::ManifestBuilt);

        let layout = app::assemble(
            &self.config,
            &self.out_dir.join("macos"),
            &self.executable,
            &icon_container,
            &manifest,
        )
        .await?;
        self.advance(PipelineState::Assembled);

        let spec = DiskImageSpec::new(&self.config, layout.root(), &self.out_dir.join("dmg"))
            .with_applications_link(self.applications_link);
        let disk_image = dmg::write_disk_image(&spec, self.toolchain.imager.as_ref()).await?;
        self.advance(PipelineState::Imaged);

        let disk_image_size = tokio::fs::metadata(&disk_image)
            .await
            .fs_context("reading artifact metadata", &disk_image)?
            .len();

        Ok(PackageReport {
            app_bundle_checksum: calculate_sha256(layout.root()).await?,
            app_bundle: layout.root().to_path_buf(),
            disk_image_checksum: calculate_sha256(&disk_image).await?,
            disk_image,
            disk_image_size,
        })
    }
}

/// Calculates the SHA-256 of a file, or of a directory tree via
/// [`calculate_directory_sha256`]. Returns lowercase hex.
pub async fn calculate_sha256(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use tokio::io::AsyncReadExt;

    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading metadata", path)?;

    if metadata.is_file() {
        let mut file = tokio::fs::File::open(path)
            .await
            .fs_context("opening file for hashing", path)?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 8192];

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .fs_context("reading file for hash calculation", path)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    } else if metadata.is_dir() {
        calculate_directory_sha256(path).await
    } else {
        bail!("Path is neither file nor directory: {}", path.display())
    }
}

/// Hashes a directory tree in a stable order.
///
/// Files are visited sorted by path; each contributes its path relative to
/// `dir_path` followed by its contents. Equal trees hash equally regardless
/// of where they live or when they were written.
pub async fn calculate_directory_sha256(dir_path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};
    use tokio::io::AsyncReadExt;

    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(dir_path).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            entries.push(entry);
        }
    }
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    for entry in entries {
        let rel_path = entry.path().strip_prefix(dir_path)?;
        hasher.update(rel_path.to_string_lossy().as_bytes());

        let mut file = tokio::fs::File::open(entry.path())
            .await
            .fs_context("opening file for hashing", entry.path())?;

        loop {
            let n = file
                .read(&mut buffer)
                .await
                .fs_context("reading file for hash calculation", entry.path())?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_checksum_matches_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        std::fs::write(&path, b"abc").unwrap();

        assert_eq!(
            calculate_sha256(&path).await.unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn directory_checksum_ignores_location() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        for root in [a.path(), b.path()] {
            std::fs::create_dir_all(root.join("Contents/MacOS")).unwrap();
            std::fs::write(root.join("Contents/Info.plist"), b"plist").unwrap();
            std::fs::write(root.join("Contents/MacOS/app"), b"bin").unwrap();
        }

        assert_eq!(
            calculate_directory_sha256(a.path()).await.unwrap(),
            calculate_directory_sha256(b.path()).await.unwrap()
        );

        std::fs::write(b.path().join("Contents/MacOS/app"), b"bin2").unwrap();
        assert_ne!(
            calculate_directory_sha256(a.path()).await.unwrap(),
            calculate_directory_sha256(b.path()).await.unwrap()
        );
    }

    #[test]
    fn states_render_for_logs() {
        assert_eq!(PipelineState::IconsBuilt.to_string(), "icons built");
        assert_eq!(PipelineState::Failed.to_string(), "failed");
    }
}
