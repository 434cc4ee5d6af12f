use crate::support::assertions::*;
use crate::support::fixtures::*;
use crate::support::Test;

#[test]
fn test_no_domains_fails_with_hint() {
    let t = Test::new();
    let output = t.domains(&[]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "no domains specified");
    assert_stdout_contains(&output, "--app-link-subdomain");
}

#[test]
fn test_invalid_domains_type_in_config() {
    let t = Test::new();
    t.config("domains = 42");
    let output = t.domains(&[]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "unsupported type integer for domains");
}

#[test]
fn test_unknown_config_field() {
    let t = Test::new();
    t.config(r#"live_kee = "typo""#);
    let output = t.domains(&["-D", "a.com"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "invalid config file");
}

#[test]
fn test_invalid_policy_rejected_by_parser() {
    let t = Test::new();
    let output = t.validate(&["--policy", "some"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "some");
}

#[test]
fn test_setup_requires_a_key() {
    let t = Test::new();
    t.ios_project();
    let output = t.run(&["setup", "--no-validate", "-D", "example.com", "-p", "project.toml"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "live_key or test_key");
    assert_stdout_contains(&output, "--live-key");
}

#[test]
fn test_setup_requires_a_destination() {
    let t = Test::new();
    let output = t.setup(&["-D", "example.com"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "project or android_manifest");
}

#[test]
fn test_missing_project_file() {
    let t = Test::new();
    let output = t.setup(&["-D", "example.com", "-p", "absent.toml"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "project file not found");
}

#[test]
fn test_unknown_target() {
    let t = Test::new();
    t.ios_project();
    let output = t.setup(&["-D", "example.com", "-p", "project.toml", "-t", "Nope"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "target not found: Nope");
}

#[test]
fn test_missing_info_plist() {
    let t = Test::new();
    t.write("project.toml", PROJECT_TOML);
    let output = t.setup(&["-D", "example.com", "-p", "project.toml"]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "document not found");
}

#[test]
fn test_named_activity_not_found() {
    let t = Test::new();
    t.android_project();
    let output = t.setup(&[
        "-D",
        "example.com",
        "--android-manifest",
        "android",
        "--activity",
        ".Missing",
    ]);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "activity .Missing not found");

    // The failed edit leaves the manifest untouched.
    assert_eq!(t.read(ANDROID_MANIFEST_PATH), MANIFEST);
}
