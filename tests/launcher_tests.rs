#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn helper() -> Command {
        let mut cmd = Command::cargo_bin("open-log-rocket").unwrap();
        cmd.env_remove("LOG_ROCKET_OPENER");
        cmd
    }

    #[test]
    fn no_argument_prints_usage() {
        helper()
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("Usage"))
            .stderr(predicate::str::contains("open-log-rocket"));
    }

    #[test]
    fn missing_file_is_reported() {
        helper()
            .arg("/tmp/does-not-exist.log")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("does not exist"))
            .stderr(predicate::str::contains("/tmp/does-not-exist.log"));
    }

    #[cfg(unix)]
    #[test]
    fn existing_file_is_handed_to_the_app() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        std::fs::write(&log, b"2024-01-01 INFO started\n").unwrap();

        helper()
            .env("LOG_ROCKET_OPENER", "echo")
            .arg(&log)
            .assert()
            .success()
            .stdout(predicate::str::contains("-a Log Rocket --args"))
            .stdout(predicate::str::contains(log.to_string_lossy().into_owned()));
    }

    #[cfg(unix)]
    #[test]
    fn relative_path_is_made_absolute() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("relative.log"), b"").unwrap();

        helper()
            .current_dir(dir.path())
            .env("LOG_ROCKET_OPENER", "echo")
            .arg("relative.log")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                dir.path().join("relative.log").to_string_lossy().into_owned(),
            ));
    }

    #[cfg(unix)]
    #[test]
    fn opener_failure_exits_nonzero() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        std::fs::write(&log, b"").unwrap();

        helper()
            .env("LOG_ROCKET_OPENER", "false")
            .arg(&log)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Failed to open Log Rocket"));
    }
}
