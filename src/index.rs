//! The versions index: every known version plus the latest tag per repository.
use crate::name::{parse_repo_name, RepoName};
use crate::standards::compare_standard_names;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Queries shorter than this return nothing.
pub const MIN_QUERY_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRef {
    pub domain: String,
    pub org: String,
    pub name: String,
    pub tag: String,
    pub archs: Vec<String>,
    pub filename: String,
}

impl VersionRef {
    /// `domain/org/name:tag`.
    pub fn id(&self) -> String {
        format!("{}/{}/{}:{}", self.domain, self.org, self.name, self.tag)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestMetadata {
    pub generated_at: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestJson {
    pub metadata: LatestMetadata,
    /// Repository name to its latest tag.
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexJson {
    pub versions_reports: Vec<VersionRef>,
    pub latest: LatestJson,
}

#[derive(Debug)]
pub struct VersionsIndex {
    json: IndexJson,
    latest: Vec<(RepoName, String)>,
}

impl VersionsIndex {
    pub fn new(json: IndexJson) -> Self {
        let mut latest = Vec::new();
        for (repo, tag) in &json.latest.data {
            match parse_repo_name(repo) {
                Ok(parts) => latest.push((parts, tag.clone())),
                Err(err) => tracing::warn!(repo = %repo, error = %err, "skipping latest entry"),
            }
        }
        Self { json, latest }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let json: IndexJson = serde_json::from_slice(bytes).context("parse index JSON")?;
        Ok(Self::new(json))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read index {}", path.display()))?;
        Self::from_slice(&bytes)
    }

    pub fn generated_at(&self) -> f64 {
        self.json.latest.metadata.generated_at
    }

    /// `repo:tag` for every latest entry.
    pub fn latest_image_ids(&self) -> Vec<String> {
        self.json
            .latest
            .data
            .iter()
            .map(|(repo, tag)| format!("{repo}:{tag}"))
            .collect()
    }

    pub fn all_version_refs(&self) -> Vec<&VersionRef> {
        sorted(self.json.versions_reports.iter().collect())
    }

    /// Versions whose tag is the latest one for some arch of their repository.
    pub fn latest_version_refs(&self) -> Vec<&VersionRef> {
        let refs = self
            .json
            .versions_reports
            .iter()
            .filter(|version| {
                self.latest.iter().any(|(repo, tag)| {
                    repo.domain == version.domain
                        && repo.org == version.org
                        && repo.name == version.name
                        && *tag == version.tag
                })
            })
            .collect();
        sorted(refs)
    }

    /// Comma-separated, case-insensitive substring search over version ids.
    ///
    /// `latest` and `all` are reserved words.
    pub fn search(&self, query: &str) -> Vec<&VersionRef> {
        let query = query.trim().to_lowercase();
        if query.len() < MIN_QUERY_LEN {
            return Vec::new();
        }
        match query.as_str() {
            "latest" => return self.latest_version_refs(),
            "all" => return self.all_version_refs(),
            _ => {}
        }
        let parts: Vec<&str> = query
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        let refs = self
            .json
            .versions_reports
            .iter()
            .filter(|version| {
                let id = version.id().to_lowercase();
                parts.iter().any(|part| id.contains(part))
            })
            .collect();
        sorted(refs)
    }
}

/// Standard rank first, then name, then newest tag.
fn sorted(mut refs: Vec<&VersionRef>) -> Vec<&VersionRef> {
    refs.sort_by(|a, b| {
        compare_standard_names(&a.name, &b.name)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| b.tag.cmp(&a.tag))
            .then_with(|| a.id().cmp(&b.id()))
    });
    refs
}

/// Process-wide index, loaded at most once.
///
/// Concurrent callers wait on the lock while the first one loads; a failed
/// load leaves the slot empty so a later call can retry.
#[derive(Debug, Default)]
pub struct SharedIndex {
    slot: Mutex<Option<Arc<VersionsIndex>>>,
}

impl SharedIndex {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<VersionsIndex>>
    where
        F: FnOnce() -> Result<VersionsIndex>,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(load()?);
        tracing::info!(
            versions = index.json.versions_reports.len(),
            "versions index loaded"
        );
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }

    pub fn get(&self) -> Option<Arc<VersionsIndex>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
