//! Operating system identity: release, libc and package managers.
use crate::log::{command_output, ArgMatcher, CommandQuery, LogEntry, OutputPart};
use regex::Regex;

/// Candidates probed with `which`, in display order.
pub(super) const PACKAGE_MANAGERS: [&str; 7] =
    ["dnf", "yum", "apt-get", "apk", "pacman", "zypper", "emerge"];

/// `PRETTY_NAME` from `/etc/os-release` (the whole file when the key is
/// missing), else `/etc/redhat-release`.
pub(super) fn release(log: &[LogEntry]) -> Option<String> {
    let os_release = command_output(log, &["cat", "/etc/os-release"])
        .filter(|text| !text.trim().is_empty());
    if let Some(os_release) = os_release {
        return Some(pretty_name(&os_release).unwrap_or_else(|| os_release.trim().to_string()));
    }
    command_output(log, &["cat", "/etc/redhat-release"])
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn pretty_name(os_release: &str) -> Option<String> {
    let regex = Regex::new(r"(?m)^PRETTY_NAME=(.*)$").expect("regex for os-release PRETTY_NAME");
    let raw = regex.captures(os_release)?.get(1)?.as_str().trim();
    let unquoted = match raw.strip_prefix('"') {
        Some(rest) => rest.strip_suffix('"').unwrap_or(rest),
        None => raw,
    };
    Some(unquoted.trim().to_string())
}

/// `musl libc <version>` when the musl loader was probed, otherwise the first
/// line of `ldd --version`.
pub(super) fn libc(log: &[LogEntry]) -> Option<String> {
    musl_version(log).or_else(|| glibc_line(log))
}

fn musl_version(log: &[LogEntry]) -> Option<String> {
    let loader = Regex::new(r"ld-musl-.*\.so").expect("regex for musl loader path");
    let stderr = CommandQuery::new([ArgMatcher::Pattern(loader)])
        .part(OutputPart::Stderr)
        .allow_failure()
        .run(log)?;
    let version = Regex::new(r"Version (\S+)").expect("regex for musl version");
    let caps = version.captures(&stderr)?;
    Some(format!("musl libc {}", caps.get(1)?.as_str()))
}

fn glibc_line(log: &[LogEntry]) -> Option<String> {
    let output = CommandQuery::new(["ldd", "--version"])
        .part(OutputPart::All)
        .allow_failure()
        .run(log)?;
    let first = output.lines().next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

/// Every candidate found on the image, comma-joined.
pub(super) fn package_manager(log: &[LogEntry]) -> Option<String> {
    let present: Vec<&str> = PACKAGE_MANAGERS
        .into_iter()
        .filter(|name| {
            command_output(log, &["which", *name])
                .map(|path| !path.trim().is_empty())
                .unwrap_or(false)
        })
        .collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(", "))
    }
}
