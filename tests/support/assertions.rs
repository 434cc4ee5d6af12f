//! Test assertions.

use std::process::Output;

pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed with status {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        stdout(output),
        stderr(output)
    );
}

pub fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "command succeeded unexpectedly\nstdout: {}\nstderr: {}",
        stdout(output),
        stderr(output)
    );
}

pub fn assert_exit_code(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "unexpected exit code\nstdout: {}\nstderr: {}",
        stdout(output),
        stderr(output)
    );
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn assert_stdout_contains(output: &Output, expected: &str) {
    let out = stdout(output);
    assert!(
        out.contains(expected),
        "stdout does not contain {expected:?}\nstdout: {out}"
    );
}

pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = stderr(output);
    assert!(
        err.contains(expected),
        "stderr does not contain {expected:?}\nstderr: {err}"
    );
}

pub fn assert_stdout_excludes(output: &Output, unexpected: &str) {
    let out = stdout(output);
    assert!(
        !out.contains(unexpected),
        "stdout unexpectedly contains {unexpected:?}\nstdout: {out}"
    );
}
