//! Per-architecture image reports and the facts extracted from them.
//!
//! A report wraps the command log recorded for one (image, arch) pair. All
//! facts are derived from that log on demand; nothing here runs commands.
use crate::field::{sort_fields, Field};
use crate::log::{CommandQuery, LogEntry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

mod os;
mod python;
mod tools;

pub use python::{
    find_python_paths, identifier_from_path, Interpreter, PythonEnvironment,
    PythonEnvironmentInfo,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub image: String,
    /// Seconds since the epoch.
    pub generated_at: f64,
}

impl ReportMetadata {
    pub fn generated_at_rfc3339(&self) -> Option<String> {
        let stamp = OffsetDateTime::from_unix_timestamp(self.generated_at.trunc() as i64).ok()?;
        stamp.format(&Rfc3339).ok()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportData {
    #[serde(default)]
    pub log: Option<Vec<LogEntry>>,
}

/// Per-report JSON as written by the inspection run.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageReportJson {
    pub metadata: ReportMetadata,
    pub data: ReportData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    MissingLog { image: String },
    EmptyLog { image: String },
    /// The per-arch document did not have the expected shape.
    Invalid { message: String },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::MissingLog { image } => write!(f, "missing log {image}"),
            ReportError::EmptyLog { image } => write!(f, "empty log {image}"),
            ReportError::Invalid { message } => write!(f, "invalid report: {message}"),
        }
    }
}

impl std::error::Error for ReportError {}

#[derive(Debug)]
pub struct ImageReport {
    metadata: Option<ReportMetadata>,
    log: Vec<LogEntry>,
    fields: OnceLock<Vec<Field>>,
}

impl ImageReport {
    /// Build a report; the log must be present and non-empty.
    pub fn new(metadata: Option<ReportMetadata>, data: ReportData) -> Result<Self, ReportError> {
        let image = metadata
            .as_ref()
            .map(|metadata| metadata.image.clone())
            .unwrap_or_else(|| "<unknown image>".to_string());
        let log = data.log.ok_or(ReportError::MissingLog {
            image: image.clone(),
        })?;
        if log.is_empty() {
            return Err(ReportError::EmptyLog { image });
        }
        Ok(Self {
            metadata,
            log,
            fields: OnceLock::new(),
        })
    }

    pub fn from_json(json: ImageReportJson) -> Result<Self, ReportError> {
        Self::new(Some(json.metadata), json.data)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let json: ImageReportJson =
            serde_json::from_slice(bytes).context("parse image report JSON")?;
        Ok(Self::from_json(json)?)
    }

    pub fn metadata(&self) -> Option<&ReportMetadata> {
        self.metadata.as_ref()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn command_output(&self, query: &CommandQuery) -> Option<String> {
        query.run(&self.log)
    }

    pub fn operating_system_release(&self) -> Option<String> {
        os::release(&self.log)
    }

    pub fn libc(&self) -> Option<String> {
        os::libc(&self.log)
    }

    pub fn package_manager(&self) -> Option<String> {
        os::package_manager(&self.log)
    }

    /// Python installs in the order they first appear in the log.
    pub fn python_environments(&self) -> Vec<PythonEnvironment<'_>> {
        find_python_paths(&self.log)
            .into_iter()
            .map(|path| PythonEnvironment::new(&self.log, path))
            .collect()
    }

    pub fn global_tools(&self) -> Vec<(String, String)> {
        tools::global_tools(&self.log)
    }

    /// All fields in extraction order; computed once.
    pub fn fields(&self) -> &[Field] {
        self.fields.get_or_init(|| self.extract_fields())
    }

    pub fn sorted_fields(&self) -> Vec<Field> {
        sort_fields(self.fields().to_vec())
    }

    fn extract_fields(&self) -> Vec<Field> {
        let mut fields = vec![
            Field::new("os", "OS", self.operating_system_release()),
            Field::new("os.libc", "libc", self.libc()),
            Field::new("os.packageManager", "Package manager", self.package_manager()),
        ];
        for python in self.python_environments() {
            fields.extend(python.fields());
        }
        fields.push(Field::new("global-tools", "Global Tools", Some(String::new())));
        for (name, version) in self.global_tools() {
            fields.push(Field::new(
                format!("global-tools.{name}"),
                name,
                Some(version),
            ));
        }
        tracing::debug!(
            image = self.metadata.as_ref().map(|m| m.image.as_str()).unwrap_or(""),
            fields = fields.len(),
            "extracted report fields"
        );
        fields
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
