//! Error types for packaging operations.
//!
//! Every stage of the pipeline reports failures through the single [`Error`]
//! enum. The first five variants form the packaging taxonomy:
//!
//! | Variant | Stage |
//! |---------|-------|
//! | [`Error::Config`] | configuration resolution |
//! | [`Error::Resize`] | icon rendition generation |
//! | [`Error::IconCompile`] | icon container compilation |
//! | [`Error::Fs`] | bundle assembly and any other filesystem operation |
//! | [`Error::Packaging`] | disk image creation |
//!
//! External tool failures never surface raw: the capability implementations
//! translate spawn errors, exit codes and stderr into the variant of the stage
//! that invoked the tool.
//!
//! # Features
//!
//! - **Context trait**: Add context to errors similar to anyhow
//! - **ErrorExt trait**: Filesystem operations with automatic path context
//! - **bail! macro**: Early return with formatted error messages

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the packager.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Invalid or missing static input (configuration file, icon source, identifier).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A single icon rendition could not be produced at its exact size.
    #[error("failed to render {width}x{height} icon rendition: {reason}")]
    Resize {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
        /// Diagnostic from the resize capability
        reason: String,
    },

    /// The icon container could not be compiled from the renditions.
    #[error("failed to compile icon container: {0}")]
    IconCompile(String),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "creating Resources directory")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// The disk image could not be created.
    #[error("failed to create disk image: {0}")]
    Packaging(String),

    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// Image decoding or encoding error.
    #[error("{0}")]
    ImageError(#[from] image::ImageError),

    /// Property list serialization error.
    #[error("{0}")]
    Plist(#[from] plist::Error),

    /// Configuration file parsing error.
    #[error("{0}")]
    Toml(#[from] toml::de::Error),

    /// Error walking a directory tree.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            Error::Context(_, inner) => inner.recovery_suggestions(),
            Error::Config(_) | Error::Toml(_) => vec![
                "Check the values in the --config file and on the command line".to_string(),
                "Bundle identifiers use reverse-domain form, e.g. com.example.viewer".to_string(),
            ],
            Error::Resize { .. } | Error::ImageError(_) => vec![
                "Verify the icon source is a readable PNG".to_string(),
                "Try --icon-backend native if sips is unavailable".to_string(),
            ],
            Error::IconCompile(_) => vec![
                "Install the Xcode Command Line Tools: xcode-select --install".to_string(),
                "Try --icon-backend native to compile the container in-process".to_string(),
            ],
            Error::Fs { path, .. } => vec![
                format!("Check permissions and free space at {}", path.display()),
                "Remove the output directory and run again".to_string(),
            ],
            Error::Packaging(_) => vec![
                "Eject any mounted volume with the same name and run again".to_string(),
                "The assembled .app bundle is intact and can be distributed directly".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with the packager's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying executable".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
