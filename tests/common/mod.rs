#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

impl CmdResult {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_sweep") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "sweep.exe" } else { "sweep" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve sweep binary path for integration test"),
    }
}

/// Run the binary with an isolated HOME and no `ASW_*` overrides from the caller.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_with_env(case_name, args, &[])
}

pub fn run_cli_case_with_env(case_name: &str, args: &[&str], env: &[(&str, &str)]) -> CmdResult {
    let root = std::env::temp_dir().join("asw-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");
    let home = tempfile::tempdir().expect("create isolated HOME");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env("RUST_BACKTRACE", "1");
    for name in [
        "ASW_SELECTOR_MIN_VISIBLE_ROWS",
        "ASW_LOG_ENABLED",
        "ASW_LOG_PATH",
        "ASW_DEFAULT_STALE",
    ] {
        command.env_remove(name);
    }
    for (name, value) in env {
        command.env(name, value);
    }
    let output = command.output().expect("execute sweep command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Create `root/rel/payload.bin` of `len` bytes.
pub fn write_payload(root: &Path, rel: &str, len: usize) -> PathBuf {
    let dir = root.join(rel);
    fs::create_dir_all(&dir).expect("create fixture dir");
    let file = dir.join("payload.bin");
    fs::write(&file, vec![0u8; len]).expect("write fixture payload");
    file
}

/// A 5 MB `node_modules`, a 50 KB `dist` and a `.git` under `project/`.
pub fn project_fixture(root: &Path) {
    for i in 0..5 {
        write_payload(root, &format!("project/node_modules/pkg{i}"), 1024 * 1024);
    }
    write_payload(root, "project/dist", 50 * 1024);
    write_payload(root, "project/.git/objects", 300 * 1024);
    write_payload(root, "project/src", 1024);
}
