//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A recorded command as it appears in a report log.
pub fn log_entry(command: &[&str], stdout: &str, stderr: &str, return_code: i32) -> Value {
    json!({
        "command": command,
        "stdout": stdout,
        "stderr": stderr,
        "return_code": return_code,
    })
}

/// A plausible log for one arch of a glibc image with one CPython install.
pub fn glibc_log(os: &str, python: &str, pip: &str, git: Option<&str>) -> Vec<Value> {
    let interpreter = "/opt/python/cp311-cp311/bin/python";
    let mut log = vec![
        log_entry(
            &["cat", "/etc/os-release"],
            &format!("NAME=\"AlmaLinux\"\nPRETTY_NAME=\"{os}\"\n"),
            "",
            0,
        ),
        log_entry(
            &["ldd", "--version"],
            "ldd (GNU libc) 2.28\nCopyright (C) 2018\n",
            "",
            0,
        ),
        log_entry(&["which", "dnf"], "/usr/bin/dnf\n", "", 0),
        log_entry(&["which", "apk"], "", "", 1),
        log_entry(
            &[interpreter, "--version"],
            &format!("Python {python}\n"),
            "",
            0,
        ),
        log_entry(
            &[interpreter, "-m", "pip", "list", "--format=freeze"],
            &format!("pip=={pip}\nsetuptools==69.0.2\nauditwheel==6.0.0\n"),
            "",
            0,
        ),
    ];
    if let Some(git) = git {
        log.push(log_entry(
            &["git", "--version"],
            &format!("git version {git}\n"),
            "",
            0,
        ));
    }
    log
}

pub fn image_report(image: &str, log: Vec<Value>) -> Value {
    json!({
        "metadata": {"image": image, "generated_at": 1717200000.0},
        "data": {"log": log},
    })
}

pub fn version_json(name: &str, tag: &str, reports_by_arch: Vec<(&str, Value)>) -> Value {
    let reports: serde_json::Map<String, Value> = reports_by_arch
        .into_iter()
        .map(|(arch, report)| (arch.to_string(), report))
        .collect();
    json!({
        "metadata": {"domain": "quay.io", "org": "pypa", "name": name, "tag": tag},
        "reports_by_arch": reports,
    })
}

/// A temporary data directory laid out as `index.json` plus `versions/`.
pub struct DataDir {
    temp: TempDir,
}

impl DataDir {
    pub fn new() -> anyhow::Result<Self> {
        let temp = TempDir::new()?;
        std::fs::create_dir_all(temp.path().join("versions"))?;
        std::fs::write(temp.path().join("config.json"), "{}")?;
        Ok(Self { temp })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn write_json(&self, relative: &str, value: &Value) -> anyhow::Result<PathBuf> {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_vec_pretty(value)?)?;
        Ok(path)
    }

    pub fn write_version(&self, name: &str, tag: &str, value: &Value) -> anyhow::Result<PathBuf> {
        self.write_json(&format!("versions/quay.io_pypa_{name}_{tag}.json"), value)
    }

    /// Run the binary with this directory as its data dir and an empty config.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_mlreport"))
            .args(args)
            .env("MLREPORT_DATA_DIR", self.temp.path())
            .env("MLREPORT_CONFIG", self.temp.path().join("config.json"))
            .env_remove("MLREPORT_FORMAT")
            .env_remove("MLREPORT_ARCH_ORDER")
            .env_remove("RUST_LOG")
            .output()
            .expect("run mlreport")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
