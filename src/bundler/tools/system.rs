//! Host tool implementations: `sips`, `iconutil` and `hdiutil`.

use super::{DiskImager, IconCompiler, ImageResizer};
use crate::bundler::error::{Error, Result};
use crate::bundler::macos::dmg::DiskImageSpec;
use crate::bundler::resources::icons::IconSet;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::Path;
use std::process::ExitStatus;

/// Why an external tool did not succeed.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ToolFailure {
    #[error("{program} not found in PATH: {error}")]
    NotFound {
        program: &'static str,
        error: which::Error,
    },

    #[error("failed to execute {program}: {error}")]
    Spawn {
        program: &'static str,
        error: std::io::Error,
    },

    #[error("{program} exited with {status}: {diagnostic}")]
    Exit {
        program: &'static str,
        status: ExitStatus,
        diagnostic: String,
    },
}

/// Runs `program` to completion, capturing its output.
///
/// The diagnostic of a failed run is the tool's stderr, or stdout when stderr
/// is empty.
pub(crate) async fn run_tool(
    program: &'static str,
    args: &[&OsStr],
) -> std::result::Result<(), ToolFailure> {
    let path = which::which(program).map_err(|error| ToolFailure::NotFound { program, error })?;

    log::debug!(
        "Running {} {}",
        path.display(),
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let output = tokio::process::Command::new(&path)
        .args(args)
        .output()
        .await
        .map_err(|error| ToolFailure::Spawn { program, error })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let diagnostic = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        return Err(ToolFailure::Exit {
            program,
            status: output.status,
            diagnostic,
        });
    }

    Ok(())
}

/// Resizes with `sips -s format png -z <height> <width> <source> --out <output>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SipsResizer;

#[async_trait]
impl ImageResizer for SipsResizer {
    async fn resize(&self, source: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
        let (h, w) = (height.to_string(), width.to_string());
        run_tool(
            "sips",
            &[
                OsStr::new("-s"),
                OsStr::new("format"),
                OsStr::new("png"),
                OsStr::new("-z"),
                OsStr::new(&h),
                OsStr::new(&w),
                source.as_os_str(),
                OsStr::new("--out"),
                output.as_os_str(),
            ],
        )
        .await
        .map_err(|failure| Error::Resize {
            width,
            height,
            reason: failure.to_string(),
        })
    }
}

/// Compiles with `iconutil -c icns <iconset> -o <output>`.
///
/// `iconutil` reads the rendition files by name, so the iconset directory must
/// follow the `icon_<W>x<H>[@2x].png` convention and end in `.iconset`.
#[derive(Debug, Default, Clone, Copy)]
pub struct IconutilCompiler;

#[async_trait]
impl IconCompiler for IconutilCompiler {
    async fn compile(&self, icon_set: &IconSet, output: &Path) -> Result<()> {
        run_tool(
            "iconutil",
            &[
                OsStr::new("-c"),
                OsStr::new("icns"),
                icon_set.dir().as_os_str(),
                OsStr::new("-o"),
                output.as_os_str(),
            ],
        )
        .await
        .map_err(|failure| Error::IconCompile(failure.to_string()))
    }
}

/// Creates images with `hdiutil create -volname <name> -srcfolder <dir> -ov -format <fmt> <out>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HdiutilImager;

#[async_trait]
impl DiskImager for HdiutilImager {
    async fn create(&self, spec: &DiskImageSpec, source_folder: &Path) -> Result<()> {
        let output = spec.output_path();
        run_tool(
            "hdiutil",
            &[
                OsStr::new("create"),
                OsStr::new("-volname"),
                OsStr::new(spec.volume_name()),
                OsStr::new("-srcfolder"),
                source_folder.as_os_str(),
                OsStr::new("-ov"),
                OsStr::new("-format"),
                OsStr::new(spec.format().hdiutil_format()),
                output.as_os_str(),
            ],
        )
        .await
        .map_err(|failure| Error::Packaging(failure.to_string()))
    }
}
