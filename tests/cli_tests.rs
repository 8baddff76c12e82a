#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    #[test]
    fn help_lists_packaging_flags() {
        Command::cargo_bin("log-rocket-packager")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--app-version"))
            .stdout(predicate::str::contains("--icon-backend"));
    }

    #[test]
    fn missing_icon_fails_with_configuration_error() {
        let dir = tempfile::tempdir().unwrap();

        Command::cargo_bin("log-rocket-packager")
            .unwrap()
            .current_dir(dir.path())
            .args(["--icon", "no-such-logo.png", "--quiet"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("invalid configuration"))
            .stderr(predicate::str::contains("Recovery suggestions"));
    }
}
