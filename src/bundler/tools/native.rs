//! In-process icon capabilities built on the `image` and `icns` crates.

use super::{IconCompiler, ImageResizer};
use crate::bundler::error::{Error, Result};
use crate::bundler::resources::icons::{IconRendition, IconSet, load_and_resize};
use async_trait::async_trait;
use icns::{IconFamily, IconType, Image as IconsImage};
use std::path::{Path, PathBuf};
use tokio::task;

/// Lanczos3 resize through the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeResizer;

#[async_trait]
impl ImageResizer for NativeResizer {
    async fn resize(&self, source: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
        let source = source.to_path_buf();
        let output = output.to_path_buf();
        let to_resize_error = |reason: String| Error::Resize {
            width,
            height,
            reason,
        };

        task::spawn_blocking(move || -> Result<()> {
            let rgba = load_and_resize(&source, width, height)?;
            rgba.save_with_format(&output, image::ImageFormat::Png)?;
            Ok(())
        })
        .await
        .map_err(|e| to_resize_error(format!("resize task failed: {e}")))?
        .map_err(|e| to_resize_error(e.to_string()))
    }
}

/// ICNS encoding through the `icns` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeIconCompiler;

#[async_trait]
impl IconCompiler for NativeIconCompiler {
    async fn compile(&self, icon_set: &IconSet, output: &Path) -> Result<()> {
        let renditions: Vec<IconRendition> = icon_set.renditions().to_vec();
        let output: PathBuf = output.to_path_buf();

        task::spawn_blocking(move || write_icns(&renditions, &output))
            .await
            .map_err(|e| Error::IconCompile(format!("ICNS encoding task failed: {e}")))?
    }
}

fn write_icns(renditions: &[IconRendition], output: &Path) -> Result<()> {
    let mut family = IconFamily::new();

    for rendition in renditions {
        let icon_type = icon_type_for(rendition).ok_or_else(|| {
            Error::IconCompile(format!("no ICNS slot for {}", rendition.file_name()))
        })?;

        let rgba = image::open(&rendition.output)
            .map_err(|e| {
                Error::IconCompile(format!("reading {}: {e}", rendition.output.display()))
            })?
            .to_rgba8();
        let (width, height) = rgba.dimensions();

        let icns_img = IconsImage::from_data(icns::PixelFormat::RGBA, width, height, rgba.into_raw())
            .map_err(|e| {
                Error::IconCompile(format!("creating ICNS image for {}: {e}", rendition.file_name()))
            })?;

        family.add_icon_with_type(&icns_img, icon_type).map_err(|e| {
            Error::IconCompile(format!("adding {} to icon family: {e}", rendition.file_name()))
        })?;
        log::debug!("Added {} to icon family", rendition.file_name());
    }

    let file = std::fs::File::create(output).map_err(|e| {
        Error::IconCompile(format!("creating {}: {e}", output.display()))
    })?;
    family
        .write(std::io::BufWriter::new(file))
        .map_err(|e| Error::IconCompile(format!("writing ICNS data: {e}")))?;

    Ok(())
}

/// Maps a (base size, scale) rendition to its ICNS element type.
fn icon_type_for(rendition: &IconRendition) -> Option<IconType> {
    let icon_type = match (rendition.base_size, rendition.scale) {
        (16, 1) => IconType::RGBA32_16x16,
        (16, 2) => IconType::RGBA32_16x16_2x,
        (32, 1) => IconType::RGBA32_32x32,
        (32, 2) => IconType::RGBA32_32x32_2x,
        (128, 1) => IconType::RGBA32_128x128,
        (128, 2) => IconType::RGBA32_128x128_2x,
        (256, 1) => IconType::RGBA32_256x256,
        (256, 2) => IconType::RGBA32_256x256_2x,
        (512, 1) => IconType::RGBA32_512x512,
        (512, 2) => IconType::RGBA32_512x512_2x,
        _ => return None,
    };
    Some(icon_type)
}
