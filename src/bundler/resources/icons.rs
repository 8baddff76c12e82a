//! Icon renditions for the macOS icon container.
//!
//! An `.icns` container holds ten bitmaps: five base sizes, each at 1x and 2x.
//!
//! | Base size | 1x file | 2x file | Pixel sizes |
//! |-----------|---------|---------|-------------|
//! | 16 | `icon_16x16.png` | `icon_16x16@2x.png` | 16, 32 |
//! | 32 | `icon_32x32.png` | `icon_32x32@2x.png` | 32, 64 |
//! | 128 | `icon_128x128.png` | `icon_128x128@2x.png` | 128, 256 |
//! | 256 | `icon_256x256.png` | `icon_256x256@2x.png` | 256, 512 |
//! | 512 | `icon_512x512.png` | `icon_512x512@2x.png` | 512, 1024 |
//!
//! Together they cover the seven distinct pixel sizes 16 through 1024.
//!
//! # Aspect ratio
//!
//! Renditions are square. A non-square source is center-cropped to a square
//! whose side is the source's shorter edge before any resize happens, so the
//! result never depends on how a resize tool treats aspect ratio.

use crate::bundler::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Every (base size, scale) pair the icon container needs, in container order.
pub const REQUIRED_RENDITIONS: [(u32, u32); 10] = [
    (16, 1),
    (16, 2),
    (32, 1),
    (32, 2),
    (128, 1),
    (128, 2),
    (256, 1),
    (256, 2),
    (512, 1),
    (512, 2),
];

/// One fixed-size bitmap of the application icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRendition {
    /// Point size the rendition is declared for.
    pub base_size: u32,

    /// 1 for standard, 2 for high-density displays.
    pub scale: u32,

    /// Image the rendition is derived from.
    pub source: PathBuf,

    /// Where the rendition is written.
    pub output: PathBuf,
}

impl IconRendition {
    /// Creates a rendition whose output lives in `iconset_dir` under the conventional name.
    pub fn new(base_size: u32, scale: u32, source: PathBuf, iconset_dir: &Path) -> Self {
        Self {
            base_size,
            scale,
            source,
            output: iconset_dir.join(rendition_file_name(base_size, scale)),
        }
    }

    /// Edge length of the bitmap in pixels.
    pub fn pixel_size(&self) -> u32 {
        self.base_size * self.scale
    }

    /// `icon_<W>x<H>.png` or `icon_<W>x<H>@2x.png`.
    pub fn file_name(&self) -> String {
        rendition_file_name(self.base_size, self.scale)
    }
}

/// File name `iconutil` expects for a (base size, scale) pair.
pub fn rendition_file_name(base_size: u32, scale: u32) -> String {
    if scale == 1 {
        format!("icon_{base_size}x{base_size}.png")
    } else {
        format!("icon_{base_size}x{base_size}@{scale}x.png")
    }
}

/// The renditions of one icon, laid out in an iconset directory.
#[derive(Debug, Clone)]
pub struct IconSet {
    dir: PathBuf,
    renditions: Vec<IconRendition>,
}

impl IconSet {
    /// Plans the full required set from `source` inside `dir`.
    pub fn new(dir: &Path, source: &Path) -> Self {
        let renditions = REQUIRED_RENDITIONS
            .iter()
            .map(|&(base, scale)| IconRendition::new(base, scale, source.to_path_buf(), dir))
            .collect();
        Self {
            dir: dir.to_path_buf(),
            renditions,
        }
    }

    /// The iconset directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Renditions in container order.
    pub fn renditions(&self) -> &[IconRendition] {
        &self.renditions
    }
}

/// Largest centered square inside a `width`x`height` image, as `(x, y, side)`.
pub fn center_square(width: u32, height: u32) -> (u32, u32, u32) {
    let side = width.min(height);
    ((width - side) / 2, (height - side) / 2, side)
}

/// Returns a square version of `source`.
///
/// Square sources are returned as-is. Otherwise the center square is cropped
/// out and written to `scratch_dir`.
///
/// # Errors
///
/// - [`Error::Config`] if `source` is not a readable image
/// - [`Error::Resize`] if the crop cannot be decoded or written
pub fn prepare_square_source(source: &Path, scratch_dir: &Path) -> Result<PathBuf> {
    let (width, height) = image::image_dimensions(source).map_err(|e| {
        Error::Config(format!(
            "icon source {} is not a readable image: {e}",
            source.display()
        ))
    })?;
    if width == height {
        return Ok(source.to_path_buf());
    }

    let (x, y, side) = center_square(width, height);
    log::info!(
        "Icon source is {}x{}, center-cropping to {}x{}",
        width,
        height,
        side,
        side
    );

    let to_resize_error = |reason: String| Error::Resize {
        width: side,
        height: side,
        reason,
    };
    let cropped = image::open(source)
        .map_err(|e| to_resize_error(format!("decoding {}: {e}", source.display())))?
        .crop_imm(x, y, side, side);
    let square_path = scratch_dir.join("source-square.png");
    cropped
        .save_with_format(&square_path, image::ImageFormat::Png)
        .map_err(|e| to_resize_error(format!("writing {}: {e}", square_path.display())))?;
    Ok(square_path)
}

/// Checks that a produced rendition has exactly its declared pixel size.
pub fn verify_dimensions(rendition: &IconRendition) -> Result<()> {
    let expected = rendition.pixel_size();
    let (width, height) = image::image_dimensions(&rendition.output).map_err(|e| Error::Resize {
        width: expected,
        height: expected,
        reason: format!("unreadable output {}: {e}", rendition.output.display()),
    })?;

    if (width, height) != (expected, expected) {
        return Err(Error::Resize {
            width: expected,
            height: expected,
            reason: format!(
                "{} is {}x{}",
                rendition.output.display(),
                width,
                height
            ),
        });
    }
    Ok(())
}

/// Loads and resizes an icon to exact dimensions.
///
/// Uses Lanczos3 filtering, which preserves sharp edges when downscaling.
pub fn load_and_resize(
    source_path: &Path,
    target_width: u32,
    target_height: u32,
) -> Result<image::RgbaImage> {
    let img = image::open(source_path).map_err(|e| Error::Fs {
        context: "loading icon for resize",
        path: source_path.to_path_buf(),
        error: std::io::Error::other(e),
    })?;

    let resized = img.resize_exact(
        target_width,
        target_height,
        image::imageops::FilterType::Lanczos3,
    );

    Ok(resized.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn required_set_covers_seven_pixel_sizes_without_repeats() {
        assert_eq!(REQUIRED_RENDITIONS.len(), 10);

        let pairs: HashSet<_> = REQUIRED_RENDITIONS.iter().collect();
        assert_eq!(pairs.len(), 10);

        let mut pixel_sizes: Vec<u32> = REQUIRED_RENDITIONS.iter().map(|(b, s)| b * s).collect();
        pixel_sizes.sort_unstable();
        pixel_sizes.dedup();
        assert_eq!(pixel_sizes, [16, 32, 64, 128, 256, 512, 1024]);
    }

    #[test]
    fn file_names_follow_iconset_convention() {
        assert_eq!(rendition_file_name(16, 1), "icon_16x16.png");
        assert_eq!(rendition_file_name(512, 2), "icon_512x512@2x.png");

        let set = IconSet::new(Path::new("/tmp/AppIcon.iconset"), Path::new("logo.png"));
        let names: Vec<String> = set.renditions().iter().map(IconRendition::file_name).collect();
        assert_eq!(names.len(), 10);
        assert!(names.contains(&"icon_128x128@2x.png".to_string()));
        assert_eq!(
            set.renditions()[3].output,
            Path::new("/tmp/AppIcon.iconset/icon_32x32@2x.png")
        );
        assert_eq!(set.renditions()[3].pixel_size(), 64);
    }

    #[test]
    fn center_square_crops_the_long_edge() {
        assert_eq!(center_square(300, 200), (50, 0, 200));
        assert_eq!(center_square(200, 301), (0, 50, 200));
        assert_eq!(center_square(64, 64), (0, 0, 64));
    }

    #[test]
    fn non_square_source_is_cropped_into_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("wide.png");
        image::RgbaImage::new(90, 30).save(&source).unwrap();

        let square = prepare_square_source(&source, dir.path()).unwrap();
        assert_ne!(square, source);
        assert_eq!(image::image_dimensions(&square).unwrap(), (30, 30));
    }

    #[test]
    fn square_source_is_used_directly() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("square.png");
        image::RgbaImage::new(48, 48).save(&source).unwrap();

        assert_eq!(prepare_square_source(&source, dir.path()).unwrap(), source);
    }

    #[test]
    fn undecodable_source_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("logo.png");
        std::fs::write(&source, b"not a png").unwrap();

        let err = prepare_square_source(&source, dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
        assert!(err.to_string().contains("not a readable image"));
    }

    #[test]
    fn wrong_dimensions_are_a_resize_error() {
        let dir = tempfile::tempdir().unwrap();
        let rendition = IconRendition::new(16, 2, PathBuf::from("logo.png"), dir.path());
        image::RgbaImage::new(16, 16).save(&rendition.output).unwrap();

        let err = verify_dimensions(&rendition).unwrap_err();
        assert!(matches!(err, Error::Resize { width: 32, height: 32, .. }));
    }
}
