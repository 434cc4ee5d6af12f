use predicates::prelude::*;

use crate::support::Test;

#[test]
fn test_completions_bash() {
    let t = Test::new();
    t.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("linksmith"))
        .stdout(predicate::str::contains("setup"));
}

#[test]
fn test_completions_zsh() {
    let t = Test::new();
    t.cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef linksmith"));
}

#[test]
fn test_completions_unknown_shell() {
    let t = Test::new();
    t.cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
