//! Recorded command executions and lookups over them.
//!
//! A report log is an ordered list of commands that were run inside an image
//! together with their captured output. Extraction never runs anything; it
//! asks "what did command X print?" and treats a miss as an unknown value.
use anyhow::{anyhow, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One recorded command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub command: Vec<String>,
    /// Older logs captured a single combined `output` stream.
    #[serde(default, alias = "output")]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    pub return_code: i32,
}

impl LogEntry {
    pub fn succeeded(&self) -> bool {
        self.return_code == 0
    }

    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }
}

/// Which captured stream a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputPart {
    #[default]
    Stdout,
    Stderr,
    /// stdout followed directly by stderr.
    All,
}

/// Test applied to a single argv position.
#[derive(Debug, Clone)]
pub enum ArgMatcher {
    Exact(String),
    /// Unanchored regex search against the argument.
    Pattern(Regex),
}

impl ArgMatcher {
    pub fn pattern(pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).map_err(|err| anyhow!("invalid regex: {pattern}: {err}"))?;
        Ok(ArgMatcher::Pattern(regex))
    }

    pub fn is_match(&self, arg: &str) -> bool {
        match self {
            ArgMatcher::Exact(value) => arg == value,
            ArgMatcher::Pattern(regex) => regex.is_match(arg),
        }
    }
}

impl From<&str> for ArgMatcher {
    fn from(value: &str) -> Self {
        ArgMatcher::Exact(value.to_string())
    }
}

impl From<String> for ArgMatcher {
    fn from(value: String) -> Self {
        ArgMatcher::Exact(value)
    }
}

impl From<Regex> for ArgMatcher {
    fn from(regex: Regex) -> Self {
        ArgMatcher::Pattern(regex)
    }
}

/// A lookup over a command log.
///
/// Matching is position by position and only over the query's own length, so
/// `["pipx", "list"]` also matches a logged `pipx list --short`.
#[derive(Debug, Clone)]
pub struct CommandQuery {
    args: Vec<ArgMatcher>,
    part: OutputPart,
    allow_failure: bool,
}

impl CommandQuery {
    pub fn new<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ArgMatcher>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            part: OutputPart::Stdout,
            allow_failure: false,
        }
    }

    pub fn part(mut self, part: OutputPart) -> Self {
        self.part = part;
        self
    }

    /// Return output even when the command exited non-zero.
    pub fn allow_failure(mut self) -> Self {
        self.allow_failure = true;
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if entry.command.len() < self.args.len() {
            return false;
        }
        self.args
            .iter()
            .zip(&entry.command)
            .all(|(matcher, arg)| matcher.is_match(arg))
    }

    /// Output of the first matching entry.
    ///
    /// Only the first match is considered: if it failed and failures are not
    /// allowed the answer is `None`, even when a later entry would succeed.
    pub fn run(&self, log: &[LogEntry]) -> Option<String> {
        let entry = self.find(log)?;
        if !entry.succeeded() && !self.allow_failure {
            tracing::debug!(
                command = ?entry.command,
                return_code = entry.return_code,
                "ignoring failed command"
            );
            return None;
        }
        Some(match self.part {
            OutputPart::Stdout => entry.stdout.clone(),
            OutputPart::Stderr => entry.stderr.clone(),
            OutputPart::All => format!("{}{}", entry.stdout, entry.stderr),
        })
    }

    pub fn find<'a>(&self, log: &'a [LogEntry]) -> Option<&'a LogEntry> {
        log.iter().find(|entry| self.matches(entry))
    }
}

/// Shorthand for an exact-token stdout query.
pub fn command_output(log: &[LogEntry], command: &[&str]) -> Option<String> {
    CommandQuery::new(command.iter().copied()).run(log)
}

/// Render an argv the way a shell would accept it.
pub fn format_command(command: &[String]) -> String {
    shell_words::join(command)
}

#[cfg(test)]
pub(crate) fn entry(command: &[&str], stdout: &str, stderr: &str, return_code: i32) -> LogEntry {
    LogEntry {
        command: command.iter().map(|arg| arg.to_string()).collect(),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        return_code,
    }
}
