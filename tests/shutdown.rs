use std::{env, process::Command};

use conlog::{
    ENV_COLOR, ENV_CONSOLE, ENV_FILE, ENV_FILE_NUM, ENV_FILE_SIZE, ENV_FORMAT, ENV_LEVEL,
};

// set in the child process started by `run_child`
const CHILD: &str = "CONLOG_SHUTDOWN_CHILD";

// reruns a single test of this binary in a new process with the default
// configuration and returns its stdout
fn run_child(test: &str) -> String {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::new(env::current_exe().unwrap());
    cmd.args([test, "--exact", "--nocapture", "--test-threads=1"])
        .current_dir(dir.path())
        .env(CHILD, "1");
    for key in [
        ENV_LEVEL,
        ENV_FILE,
        ENV_FORMAT,
        ENV_CONSOLE,
        ENV_COLOR,
        ENV_FILE_SIZE,
        ENV_FILE_NUM,
    ] {
        cmd.env_remove(key);
    }
    let output = cmd.output().unwrap();
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_console_records_survive_exit() {
    if env::var_os(CHILD).is_some() {
        for i in 0..5 {
            conlog::info(&format!("record before exit {}", i));
        }
        // no destructors run, as when main returns with the logger in a static
        std::process::exit(0);
    }
    let stdout = run_child("test_console_records_survive_exit");
    let records = stdout
        .lines()
        .filter(|line| line.contains("[INFO] record before exit "))
        .collect::<Vec<_>>();
    assert_eq!(records.len(), 5);
    assert_eq!(records[4].ends_with("record before exit 4"), true);
}

#[test]
fn test_panic_record_reaches_console() {
    if env::var_os(CHILD).is_some() {
        conlog::panic("fatal record");
    }
    let stdout = run_child("test_panic_record_reaches_console");
    assert_eq!(stdout.contains("[PANIC] fatal record"), true);
}
