//! Display fields and their canonical ordering.
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Packages shown ahead of everything else inside a Python environment.
pub const IMPORTANT_PACKAGES: [&str; 4] = ["pip", "setuptools", "build", "wheel"];

/// One extracted fact.
///
/// `id` is a dot-separated path built the same way on every architecture, so
/// it is the join key when reports are compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub label: String,
    pub value: Option<String>,
}

impl Field {
    pub fn new(id: impl Into<String>, label: impl Into<String>, value: Option<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            value,
        }
    }

    /// Number of dot-separated segments below the top level.
    pub fn depth(&self) -> usize {
        if self.id.starts_with("python.") {
            // package names may contain dots of their own
            return self.id.splitn(3, '.').count() - 1;
        }
        self.id.matches('.').count()
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Os,
    Other,
    Python,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    section: Section,
    interpreter: String,
    major: Reverse<u32>,
    minor: Reverse<u32>,
    abi: String,
    /// `None` for the environment header row; `(transitive, name)` otherwise.
    package: Option<(bool, String)>,
    id: String,
}

impl SortKey {
    fn new(regex: &Regex, id: &str) -> Self {
        let plain = |section| SortKey {
            section,
            interpreter: String::new(),
            major: Reverse(0),
            minor: Reverse(0),
            abi: String::new(),
            package: None,
            id: id.to_string(),
        };
        if id == "os" || id.starts_with("os.") {
            return plain(Section::Os);
        }
        let Some(caps) = regex.captures(id) else {
            return plain(Section::Other);
        };
        let group = |idx: usize| caps.get(idx).map(|m| m.as_str()).unwrap_or_default();
        let (Ok(major), Ok(minor)) = (group(2).parse::<u32>(), group(3).parse::<u32>()) else {
            return plain(Section::Other);
        };
        let package = caps.get(5).map(|m| {
            let name = m.as_str();
            (!IMPORTANT_PACKAGES.contains(&name), name.to_string())
        });
        SortKey {
            section: Section::Python,
            interpreter: group(1).to_string(),
            major: Reverse(major),
            minor: Reverse(minor),
            abi: group(4).to_string(),
            package,
            id: id.to_string(),
        }
    }
}

fn python_field_regex() -> Regex {
    Regex::new(r"^python\.([A-Za-z_]*?)(\d)(\d+)-([^.]*)(?:\.(.+))?$")
        .expect("regex for python field ids")
}

/// Order fields for display.
///
/// OS rows come first, then any other non-Python rows, then Python
/// environments from the highest interpreter version down. Inside one
/// environment the header row leads, followed by the important packages and
/// then everything else, each by name.
pub fn sort_fields(fields: Vec<Field>) -> Vec<Field> {
    let regex = python_field_regex();
    let mut keyed: Vec<(SortKey, Field)> = fields
        .into_iter()
        .map(|field| (SortKey::new(&regex, &field.id), field))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, field)| field).collect()
}
