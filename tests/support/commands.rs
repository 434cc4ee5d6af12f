//! Command helpers.

use std::process::Output;

use assert_cmd::Command;

use super::Test;

/// Variables the CLI binds to flags; cleared so the host can't leak in.
const BOUND_VARIABLES: &[&str] = &[
    "LINKSMITH_VERBOSE",
    "LINKSMITH_LIVE_KEY",
    "LINKSMITH_TEST_KEY",
    "LINKSMITH_APP_LINK_SUBDOMAIN",
    "LINKSMITH_DOMAINS",
    "LINKSMITH_ALLOW_EMPTY_DOMAINS",
    "LINKSMITH_PROJECT",
    "LINKSMITH_TARGET",
    "LINKSMITH_CONFIGURATION",
    "LINKSMITH_TIMEOUT_MS",
    "LINKSMITH_JOBS",
    "LINKSMITH_POLICY",
    "LINKSMITH_URI_SCHEME",
    "LINKSMITH_ANDROID_MANIFEST",
    "LINKSMITH_ACTIVITY",
    "LINKSMITH_REMOVE_EXISTING",
    "LINKSMITH_LOG",
    "LINKSMITH_LOG_FORMAT",
];

impl Test {
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("linksmith").expect("binary not built");
        cmd.current_dir(self.dir.path());
        for var in BOUND_VARIABLES {
            cmd.env_remove(var);
        }
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("failed to run")
    }

    pub fn domains(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("domains")
            .args(args)
            .output()
            .expect("failed to run domains")
    }

    /// `setup --no-validate` with the live key.
    pub fn setup(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(["setup", "--no-validate", "--live-key", super::fixtures::LIVE_KEY])
            .args(args)
            .output()
            .expect("failed to run setup")
    }

    pub fn validate(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("validate")
            .args(args)
            .output()
            .expect("failed to run validate")
    }
}
