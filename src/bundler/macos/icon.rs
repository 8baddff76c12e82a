//! Icon container generation.
//!
//! Renders every required rendition through an [`ImageResizer`], checks each
//! one's pixel size, then hands the complete iconset to an [`IconCompiler`].

use crate::bundler::error::{Error, ErrorExt, Result};
use crate::bundler::resources::icons::{IconSet, prepare_square_source, verify_dimensions};
use crate::bundler::settings::{ICON_CONTAINER_NAME, PackageConfig};
use crate::bundler::tools::{IconCompiler, ImageResizer};
use crate::bundler::utils::fs;
use std::path::{Path, PathBuf};

/// Builds `AppIcon.icns` inside `work_dir` and returns its path.
///
/// Renditions are written to a scratch directory under `work_dir`. The scratch
/// directory is a [`tempfile::TempDir`], so it is removed when this function
/// returns, whether it succeeds or fails.
///
/// # Errors
///
/// - [`Error::Config`] if the icon source is no longer a readable image
/// - [`Error::Resize`] if any rendition fails or comes out at the wrong size
/// - [`Error::IconCompile`] if the container cannot be compiled
pub async fn generate_icon_container(
    config: &PackageConfig,
    resizer: &dyn ImageResizer,
    compiler: &dyn IconCompiler,
    work_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(work_dir, false).await?;

    let scratch = tempfile::Builder::new()
        .prefix("icons-")
        .tempdir_in(work_dir)
        .fs_context("creating icon scratch directory in", work_dir)?;

    let iconset_dir = scratch.path().join(format!("{ICON_CONTAINER_NAME}.iconset"));
    fs::create_dir_all(&iconset_dir, false).await?;

    let source = prepare_square_source(config.icon_source(), scratch.path())?;
    let icon_set = IconSet::new(&iconset_dir, &source);

    for rendition in icon_set.renditions() {
        let size = rendition.pixel_size();
        log::debug!("Rendering {} ({size}x{size})", rendition.file_name());
        resizer
            .resize(&rendition.source, &rendition.output, size, size)
            .await?;
        verify_dimensions(rendition)?;
    }

    let output = work_dir.join(config.icon_file_name());
    fs::remove_file(&output).await?;
    compiler.compile(&icon_set, &output).await?;

    if !output.is_file() {
        return Err(Error::IconCompile(format!(
            "compiler reported success but {} was not written",
            output.display()
        )));
    }

    log::info!(
        "Created icon container {} from {} renditions",
        output.display(),
        icon_set.renditions().len()
    );
    Ok(output)
}
