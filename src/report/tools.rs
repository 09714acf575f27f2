//! Tools installed outside any Python environment.
use super::python::upsert;
use crate::log::{command_output, LogEntry};
use regex::Regex;

/// Individually probed tools: key, command, version pattern.
const PROBES: [(&str, &[&str], &str); 6] = [
    ("auditwheel", &["auditwheel", "--version"], r"auditwheel (\S+)"),
    ("patchelf", &["patchelf", "--version"], r"patchelf (\S+)"),
    ("git", &["git", "--version"], r"git version (\S+)"),
    ("curl", &["curl", "--version"], r"curl (\S+)"),
    ("openssl", &["openssl", "version"], r"OpenSSL (\S+)"),
    ("pipx", &["pipx", "--version"], r"(\S+)"),
];

/// `pipx list --short` entries first, then the probes in order; a later
/// value for the same name replaces the earlier one in place.
pub(super) fn global_tools(log: &[LogEntry]) -> Vec<(String, String)> {
    let mut tools: Vec<(String, String)> = Vec::new();

    if let Some(listing) = command_output(log, &["pipx", "list", "--short"]) {
        for line in listing.trim().lines() {
            let mut parts = line.split_whitespace();
            let (Some(name), Some(version)) = (parts.next(), parts.next()) else {
                continue;
            };
            upsert(&mut tools, name, version.to_string());
        }
    }

    for (key, command, pattern) in PROBES {
        let Some(output) = command_output(log, command) else {
            continue;
        };
        let regex = Regex::new(pattern).expect("regex for tool version probe");
        if let Some(version) = regex.captures(&output).and_then(|caps| caps.get(1)) {
            upsert(&mut tools, key, version.as_str().to_string());
        }
    }

    tools
}
