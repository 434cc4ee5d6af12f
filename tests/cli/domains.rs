use crate::support::assertions::*;
use crate::support::fixtures::*;
use crate::support::Test;

#[test]
fn test_domains_explicit_then_generated() {
    let t = Test::new();
    let output = t.domains(&[
        "--live-key",
        LIVE_KEY,
        "--app-link-subdomain",
        "myapp",
        "-D",
        "example.com, myapp.app.link",
    ]);
    assert_success(&output);
    assert_eq!(
        stdout(&output).lines().collect::<Vec<_>>(),
        ["example.com", "myapp.app.link", "myapp-alternate.app.link"]
    );
}

#[test]
fn test_domains_with_both_keys() {
    let t = Test::new();
    let output = t.domains(&[
        "--live-key",
        LIVE_KEY,
        "--test-key",
        TEST_KEY,
        "--app-link-subdomain",
        "myapp",
    ]);
    assert_success(&output);
    assert_eq!(
        stdout(&output).lines().collect::<Vec<_>>(),
        [
            "myapp.app.link",
            "myapp-alternate.app.link",
            "myapp.test-app.link",
            "myapp-alternate.test-app.link"
        ]
    );
}

#[test]
fn test_domains_json() {
    let t = Test::new();
    let output = t.domains(&["-D", "a.com,b.com,a.com", "--json"]);
    assert_success(&output);
    let parsed: Vec<String> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed, ["a.com", "b.com"]);
}

#[test]
fn test_domains_from_config_file() {
    let t = Test::new();
    t.config(
        r#"
live_key = "key_live_file"
app_link_subdomain = "fromfile"
domains = ["config.example.com"]
"#,
    );
    let output = t.domains(&[]);
    assert_success(&output);
    assert_eq!(
        stdout(&output).lines().collect::<Vec<_>>(),
        [
            "config.example.com",
            "fromfile.app.link",
            "fromfile-alternate.app.link"
        ]
    );
}

#[test]
fn test_flag_overrides_config_domains() {
    let t = Test::new();
    t.config(r#"domains = "config.example.com""#);
    let output = t.domains(&["-D", "flag.example.com"]);
    assert_success(&output);
    assert_stdout_contains(&output, "flag.example.com");
    assert_stdout_excludes(&output, "config.example.com");
}

#[test]
fn test_environment_variable_binds_domains() {
    let t = Test::new();
    let output = t
        .cmd()
        .arg("domains")
        .env("LINKSMITH_DOMAINS", "env.example.com")
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "env.example.com");
}

#[test]
fn test_subdomain_without_key_generates_nothing() {
    let t = Test::new();
    let output = t.domains(&["--app-link-subdomain", "myapp", "--allow-empty-domains"]);
    assert_success(&output);
    assert_stdout_contains(&output, "no domains");
}

#[test]
fn test_allow_empty_domains_json() {
    let t = Test::new();
    let output = t.domains(&["--allow-empty-domains", "--json"]);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "[]");
}
