//! Capabilities the pipeline orchestrates but does not implement.
//!
//! The packaging stages never shell out directly. They call one of three small
//! traits, so the same pipeline can drive the host's tools, an in-process
//! implementation, or a fake in tests.
//!
//! | Capability | System implementation | Native implementation |
//! |------------|-----------------------|-----------------------|
//! | [`ImageResizer`] | `sips` | `image` crate (Lanczos3) |
//! | [`IconCompiler`] | `iconutil` | `icns` crate |
//! | [`DiskImager`] | `hdiutil` | none |
//!
//! Implementations own the translation of their failures into the packaging
//! error taxonomy: a resizer reports [`Error::Resize`](crate::bundler::Error::Resize),
//! a compiler [`Error::IconCompile`](crate::bundler::Error::IconCompile), an
//! imager [`Error::Packaging`](crate::bundler::Error::Packaging).

mod native;
mod system;

pub use native::{NativeIconCompiler, NativeResizer};
pub use system::{HdiutilImager, IconutilCompiler, SipsResizer};

use crate::bundler::error::Result;
use crate::bundler::macos::dmg::DiskImageSpec;
use crate::bundler::resources::icons::IconSet;
use async_trait::async_trait;
use std::path::Path;

/// Produces a bitmap of exact pixel dimensions from a source image.
#[async_trait]
pub trait ImageResizer: Send + Sync {
    /// Writes `source` scaled to `width`x`height` as a PNG at `output`.
    async fn resize(&self, source: &Path, output: &Path, width: u32, height: u32) -> Result<()>;
}

/// Compiles a complete set of renditions into one icon container.
#[async_trait]
pub trait IconCompiler: Send + Sync {
    /// Writes the container for `icon_set` to `output`.
    async fn compile(&self, icon_set: &IconSet, output: &Path) -> Result<()>;
}

/// Wraps a directory into a compressed, read-only disk image.
#[async_trait]
pub trait DiskImager: Send + Sync {
    /// Creates `spec.output_path()` from the contents of `source_folder`.
    async fn create(&self, spec: &DiskImageSpec, source_folder: &Path) -> Result<()>;
}

/// Which implementation produces icon renditions and the icon container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IconBackend {
    /// `sips` and `iconutil` from the host.
    #[default]
    System,
    /// In-process resize and ICNS encoding.
    Native,
}

/// The set of capabilities one packaging run uses.
pub struct Toolchain {
    /// Rendition producer.
    pub resizer: Box<dyn ImageResizer>,
    /// Icon container producer.
    pub compiler: Box<dyn IconCompiler>,
    /// Disk image producer.
    pub imager: Box<dyn DiskImager>,
}

impl Toolchain {
    /// Host tools for every capability.
    pub fn system() -> Self {
        Self::for_backend(IconBackend::System)
    }

    /// Selects the icon implementation; disk images always go through `hdiutil`.
    pub fn for_backend(backend: IconBackend) -> Self {
        let (resizer, compiler): (Box<dyn ImageResizer>, Box<dyn IconCompiler>) = match backend {
            IconBackend::System => (Box::new(SipsResizer), Box::new(IconutilCompiler)),
            IconBackend::Native => (Box::new(NativeResizer), Box::new(NativeIconCompiler)),
        };
        Self {
            resizer,
            compiler,
            imager: Box::new(HdiutilImager),
        }
    }
}

impl std::fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolchain").finish_non_exhaustive()
    }
}
