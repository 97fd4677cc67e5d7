mod common;

use common::LogFixture;
use predicates::prelude::*;

#[test]
fn test_prompt_analyzes_until_exit() {
    let fixture = LogFixture::sample();
    let input = format!("{}\nexit\n{}\n", fixture.path_str(), fixture.path_str());

    let mut cmd = assert_cmd::cargo_bin_cmd!("logtally");
    cmd.write_stdin(input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total lines: 6").count(1))
        .stderr(predicate::str::contains("Enter a log file path"))
        .stderr(predicate::str::contains("Analyzing file #1"))
        .stderr(predicate::str::contains("Analyzing file #2").not());
}

#[test]
fn test_prompt_rejects_missing_and_directory() {
    let fixture = LogFixture::sample();
    let input = format!(
        "/definitely/not/a/file.log\n{}\n{}\nEXIT\n",
        fixture.dir.path().display(),
        fixture.path_str()
    );

    let mut cmd = assert_cmd::cargo_bin_cmd!("logtally");
    cmd.write_stdin(input);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("File does not exist"))
        .stderr(predicate::str::contains("Path is a directory, not a file"))
        .stderr(predicate::str::contains("Analyzing file #1"))
        .stdout(predicate::str::contains("Analysis Results:"));
}

#[test]
fn test_prompt_ends_at_eof() {
    let mut cmd = assert_cmd::cargo_bin_cmd!("logtally");
    cmd.write_stdin("");

    cmd.assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_positional_file_is_reported() {
    let mut cmd = assert_cmd::cargo_bin_cmd!("logtally");
    cmd.arg("/definitely/not/a/file.log");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("File does not exist"));
}
