//! `open-log-rocket`: open a log file in the installed application.
//!
//! The helper validates its single argument and asks the OS to start the app
//! with the file's absolute path as the app's only argument:
//!
//! ```text
//! open -a "Log Rocket" --args /abs/path/to/file.log
//! ```
//!
//! Setting `LOG_ROCKET_OPENER` replaces `open` with another program that
//! takes the same arguments.

use crate::bundler::DEFAULT_APP_NAME;
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Environment variable naming the program used instead of `open`.
pub const OPENER_ENV: &str = "LOG_ROCKET_OPENER";

/// Open a log file in Log Rocket
#[derive(Parser, Debug)]
#[command(name = "open-log-rocket", version, about = "Open a log file in Log Rocket")]
pub struct LaunchArgs {
    /// Log file to open
    #[arg(value_name = "LOG_FILE_PATH")]
    pub log_file: Option<PathBuf>,
}

/// Why the helper could not open the file.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// No path was given.
    #[error("{usage}")]
    Usage {
        /// Rendered usage line
        usage: String,
    },

    /// The path does not name an existing regular file.
    #[error("File does not exist: {}", path.display())]
    NotFound {
        /// The path as given
        path: PathBuf,
    },

    /// The opener could not be started or reported failure.
    #[error("Failed to open {app}: {reason}")]
    Open {
        /// Application that was asked to open the file
        app: String,
        /// Diagnostic from the opener
        reason: String,
    },
}

impl LaunchError {
    /// Process exit code for this error.
    ///
    /// Every failure exits with 1: missing argument, missing file and opener
    /// failure are not distinguished by code, only by the printed message.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Asks the OS to start an application with one argument.
pub trait Opener {
    /// Starts `app` with `argument` as its sole argument.
    fn open(&self, app: &str, argument: &Path) -> Result<(), LaunchError>;
}

/// Runs `open -a <app> --args <argument>`, or the program named by
/// [`OPENER_ENV`] with the same arguments.
#[derive(Debug, Clone)]
pub struct SystemOpener {
    program: String,
}

impl SystemOpener {
    /// Uses `program` in place of `open`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `open`, unless [`OPENER_ENV`] is set.
    pub fn from_env() -> Self {
        match std::env::var(OPENER_ENV) {
            Ok(program) if !program.is_empty() => Self::new(program),
            _ => Self::new("open"),
        }
    }
}

impl Opener for SystemOpener {
    fn open(&self, app: &str, argument: &Path) -> Result<(), LaunchError> {
        log::debug!(
            "Running: {} -a {app:?} --args {}",
            self.program,
            argument.display()
        );

        let status = Command::new(&self.program)
            .arg("-a")
            .arg(app)
            .arg("--args")
            .arg(argument)
            .status()
            .map_err(|e| LaunchError::Open {
                app: app.to_string(),
                reason: format!("could not run {}: {e}", self.program),
            })?;

        if !status.success() {
            return Err(LaunchError::Open {
                app: app.to_string(),
                reason: format!("{} exited with {status}", self.program),
            });
        }
        Ok(())
    }
}

/// Validates `log_file` and hands its absolute path to `opener`.
///
/// # Errors
///
/// - [`LaunchError::Usage`] if no path was given
/// - [`LaunchError::NotFound`] if the path is not an existing file
/// - [`LaunchError::Open`] if the opener fails
pub fn launch(log_file: Option<&Path>, opener: &dyn Opener) -> Result<(), LaunchError> {
    let Some(path) = log_file else {
        return Err(LaunchError::Usage {
            usage: LaunchArgs::command().render_usage().to_string(),
        });
    };

    if !path.is_file() {
        return Err(LaunchError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let absolute = std::path::absolute(path).map_err(|_| LaunchError::NotFound {
        path: path.to_path_buf(),
    })?;

    log::info!("Opening {} in {DEFAULT_APP_NAME}", absolute.display());
    opener.open(DEFAULT_APP_NAME, &absolute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingOpener {
        calls: RefCell<Vec<(String, PathBuf)>>,
    }

    impl Opener for RecordingOpener {
        fn open(&self, app: &str, argument: &Path) -> Result<(), LaunchError> {
            self.calls
                .borrow_mut()
                .push((app.to_string(), argument.to_path_buf()));
            Ok(())
        }
    }

    #[test]
    fn missing_argument_is_usage_error() {
        let opener = RecordingOpener::default();
        let err = launch(None, &opener).unwrap_err();

        assert!(matches!(err, LaunchError::Usage { .. }));
        assert!(err.to_string().contains("open-log-rocket"));
        assert_eq!(err.exit_code(), 1);
        assert!(opener.calls.borrow().is_empty());
    }

    #[test]
    fn missing_file_is_not_opened() {
        let opener = RecordingOpener::default();
        let err = launch(Some(Path::new("/tmp/does-not-exist.log")), &opener).unwrap_err();

        assert!(matches!(err, LaunchError::NotFound { .. }));
        assert!(err.to_string().contains("does not exist"));
        assert!(opener.calls.borrow().is_empty());
    }

    #[test]
    fn directory_is_not_a_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let opener = RecordingOpener::default();

        let err = launch(Some(dir.path()), &opener).unwrap_err();
        assert!(matches!(err, LaunchError::NotFound { .. }));
    }

    #[test]
    fn existing_file_is_passed_as_sole_absolute_argument() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("server.log");
        std::fs::write(&log, b"started\n").unwrap();
        let opener = RecordingOpener::default();

        launch(Some(log.as_path()), &opener).unwrap();

        let calls = opener.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Log Rocket");
        assert_eq!(calls[0].1, log);
        assert!(calls[0].1.is_absolute());
    }

    #[cfg(unix)]
    #[test]
    fn failing_opener_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("server.log");
        std::fs::write(&log, b"").unwrap();

        let err = launch(Some(log.as_path()), &SystemOpener::new("false")).unwrap_err();
        assert!(matches!(err, LaunchError::Open { .. }));

        let err = launch(Some(log.as_path()), &SystemOpener::new("/nonexistent/opener")).unwrap_err();
        assert!(err.to_string().contains("could not run"));
    }

    #[test]
    fn every_failure_exits_with_one() {
        let errors = [
            LaunchError::Usage {
                usage: "Usage: open-log-rocket [LOG_FILE_PATH]".into(),
            },
            LaunchError::NotFound {
                path: PathBuf::from("missing.log"),
            },
            LaunchError::Open {
                app: "Log Rocket".into(),
                reason: "open exited with exit status: 1".into(),
            },
        ];
        for err in &errors {
            assert_eq!(err.exit_code(), 1, "{err}");
        }
    }
}
