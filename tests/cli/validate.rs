use crate::support::assertions::*;
use crate::support::fixtures::*;
use crate::support::Test;

#[test]
fn test_validate_requires_project() {
    let t = Test::new();
    let output = t.validate(&["-D", "example.com"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "missing required setting: project");
    assert_stdout_contains(&output, "--project");
}

#[test]
fn test_validate_test_link_domains_are_skipped() {
    let t = Test::new();
    t.ios_project().entitlements(&["myapp.test-app.link"]);

    let output = t.validate(&["-p", "project.toml"]);
    assert_success(&output);
    assert_stdout_contains(&output, "myapp.test-app.link (skipped)");
    assert_stdout_contains(&output, "passed validation");
}

#[test]
fn test_validate_explicit_list_mismatch_fails() {
    let t = Test::new();
    t.ios_project().entitlements(&["myapp.test-app.link"]);

    let output = t.validate(&["-p", "project.toml", "-D", "other.test-app.link"]);
    assert_exit_code(&output, 1);
    assert_stdout_contains(&output, "do not match the expected domains");
    assert_stderr_contains(&output, "domain validation failed");
}

#[test]
fn test_validate_explicit_list_matches_in_any_order() {
    let t = Test::new();
    t.ios_project()
        .entitlements(&["a.test-app.link", "b.test-app.link"]);

    let output = t.validate(&[
        "-p",
        "project.toml",
        "-D",
        "b.test-app.link,a.test-app.link",
    ]);
    assert_success(&output);
    assert_stdout_excludes(&output, "do not match");
}

#[test]
fn test_validate_without_claimed_domains() {
    let t = Test::new();
    t.ios_project();

    let output = t.validate(&["-p", "project.toml"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "no domains specified");

    let output = t.validate(&["-p", "project.toml", "--allow-empty-domains"]);
    assert_success(&output);
}

#[test]
fn test_validate_requires_team_identifier() {
    let t = Test::new();
    t.write(
        "project.toml",
        &PROJECT_TOML.replace("DEVELOPMENT_TEAM = \"TEAM123\"\n", ""),
    );
    t.write(INFO_PLIST_PATH, INFO_PLIST);
    t.entitlements(&["example.com"]);

    let output = t.validate(&["-p", "project.toml"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "DEVELOPMENT_TEAM");
}
