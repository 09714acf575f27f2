//! One tag of an image across all of its architectures.
//!
//! Fields from every per-arch report are joined on their id and each joined
//! row is collapsed into a single summary string.
use crate::arch::ArchOrder;
use crate::field::{sort_fields, Field};
use crate::report::{ImageReport, ImageReportJson, ReportData, ReportError};
use crate::summary::{group_values, summarise_values};
use crate::tag::ImageTag;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Value used for an arch whose field is present but has no value.
pub const MISSING_VALUE: &str = "None";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    pub domain: String,
    pub org: String,
    pub name: String,
    pub tag: String,
}

/// A `reports_by_arch` entry: either a whole per-report document or just its
/// `data` object.
#[derive(Debug, Clone)]
pub enum ArchReportJson {
    Full(ImageReportJson),
    Data(ReportData),
}

impl ArchReportJson {
    /// An object with a `data` key is a whole document and must parse as one.
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        if value.get("data").is_some() {
            serde_json::from_value(value).map(ArchReportJson::Full)
        } else {
            serde_json::from_value(value).map(ArchReportJson::Data)
        }
    }

    pub fn build(self) -> Result<ImageReport, ReportError> {
        match self {
            ArchReportJson::Full(full) => ImageReport::from_json(full),
            ArchReportJson::Data(data) => ImageReport::new(None, data),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionJson {
    pub metadata: VersionMetadata,
    pub reports_by_arch: BTreeMap<String, serde_json::Value>,
}

/// An arch whose report could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchFailure {
    pub arch: String,
    pub error: ReportError,
}

#[derive(Debug)]
struct Aggregate {
    fields: Vec<Field>,
    disagreements: Vec<String>,
}

#[derive(Debug)]
pub struct Version {
    metadata: VersionMetadata,
    reports: Vec<(String, ImageReport)>,
    failures: Vec<ArchFailure>,
    aggregate: OnceLock<Aggregate>,
}

impl Version {
    pub fn new(
        metadata: VersionMetadata,
        mut reports: Vec<(String, ImageReport)>,
        failures: Vec<ArchFailure>,
        order: &ArchOrder,
    ) -> Self {
        reports.sort_by(|a, b| order.compare(&a.0, &b.0));
        Self {
            metadata,
            reports,
            failures,
            aggregate: OnceLock::new(),
        }
    }

    /// Build every arch report; arches that fail are kept as failures.
    pub fn from_json(json: VersionJson, order: &ArchOrder) -> Self {
        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (arch, raw) in json.reports_by_arch {
            let built = ArchReportJson::from_value(raw)
                .map_err(|err| ReportError::Invalid {
                    message: err.to_string(),
                })
                .and_then(ArchReportJson::build);
            match built {
                Ok(report) => reports.push((arch, report)),
                Err(error) => {
                    tracing::warn!(arch = %arch, error = %error, "skipping arch report");
                    failures.push(ArchFailure { arch, error });
                }
            }
        }
        Self::new(json.metadata, reports, failures, order)
    }

    pub fn from_slice(bytes: &[u8], order: &ArchOrder) -> Result<Self> {
        let json: VersionJson = serde_json::from_slice(bytes).context("parse version JSON")?;
        Ok(Self::from_json(json, order))
    }

    pub fn load(path: &Path, order: &ArchOrder) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read version {}", path.display()))?;
        Self::from_slice(&bytes, order).with_context(|| format!("load {}", path.display()))
    }

    /// File name used for a version under `versions/`.
    pub fn filename_for(domain: &str, org: &str, name: &str, tag: &str) -> String {
        format!("{domain}_{org}_{name}_{tag}.json")
    }

    pub fn metadata(&self) -> &VersionMetadata {
        &self.metadata
    }

    pub fn filename(&self) -> String {
        let m = &self.metadata;
        Self::filename_for(&m.domain, &m.org, &m.name, &m.tag)
    }

    /// `domain/org/name:tag`.
    pub fn id(&self) -> String {
        let m = &self.metadata;
        format!("{}/{}/{}:{}", m.domain, m.org, m.name, m.tag)
    }

    pub fn image_tag(&self) -> ImageTag {
        ImageTag::parse(&self.metadata.tag)
    }

    /// Every arch, including failed ones, in display order.
    pub fn archs(&self, order: &ArchOrder) -> Vec<&str> {
        let mut archs: Vec<&str> = self
            .reports
            .iter()
            .map(|(arch, _)| arch.as_str())
            .chain(self.failures.iter().map(|failure| failure.arch.as_str()))
            .collect();
        order.sort(&mut archs);
        archs
    }

    pub fn report(&self, arch: &str) -> Option<&ImageReport> {
        self.reports
            .iter()
            .find(|(name, _)| name == arch)
            .map(|(_, report)| report)
    }

    pub fn failures(&self) -> &[ArchFailure] {
        &self.failures
    }

    /// Summarised, display-ordered fields; computed once.
    pub fn fields(&self) -> &[Field] {
        &self.aggregate().fields
    }

    /// Ids of fields whose value differs between arches.
    pub fn disagreements(&self) -> &[String] {
        &self.aggregate().disagreements
    }

    fn aggregate(&self) -> &Aggregate {
        self.aggregate.get_or_init(|| self.build_aggregate())
    }

    fn build_aggregate(&self) -> Aggregate {
        // first-seen order; each row holds only the arches that produced it
        let mut rows: Vec<(Field, Vec<(&str, Option<String>)>)> = Vec::new();
        let mut index: BTreeMap<String, usize> = BTreeMap::new();

        for (arch, report) in &self.reports {
            for field in report.sorted_fields() {
                let row = match index.get(&field.id) {
                    Some(row) => *row,
                    None => {
                        index.insert(field.id.clone(), rows.len());
                        rows.push((field.clone(), Vec::new()));
                        rows.len() - 1
                    }
                };
                rows[row].1.push((arch.as_str(), field.value));
            }
        }

        let mut fields = Vec::with_capacity(rows.len());
        let mut disagreements = Vec::new();
        for (canonical, values) in rows {
            let pairs: Vec<(&str, &str)> = values
                .iter()
                .map(|(arch, value)| (*arch, value.as_deref().unwrap_or(MISSING_VALUE)))
                .collect();
            if group_values(pairs.iter().copied()).len() > 1 {
                disagreements.push(canonical.id.clone());
            }
            let summary = summarise_values(pairs);
            fields.push(Field::new(canonical.id, canonical.label, Some(summary)));
        }

        tracing::debug!(
            version = %self.id(),
            fields = fields.len(),
            disagreements = disagreements.len(),
            "aggregated version fields"
        );
        Aggregate {
            fields: sort_fields(fields),
            disagreements,
        }
    }
}
