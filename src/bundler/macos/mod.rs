//! macOS packaging stages.
//!
//! - [`icon`]: renditions and the `AppIcon.icns` container
//! - [`info_plist`]: the bundle descriptor
//! - [`app`]: the `.app` directory tree
//! - [`dmg`]: the distributable disk image

pub mod app;
pub mod dmg;
pub mod icon;
pub mod info_plist;
