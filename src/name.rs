//! Repository and image reference parsing.
//!
//! Repository names look like `quay.io/pypa/manylinux_2_28_x86_64`: a domain,
//! an organization, a standard-like base name and an optional trailing
//! architecture. Images append `:<tag>`.
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Architecture reported for repositories that carry no arch suffix.
pub const MULTIARCH: &str = "multiarch";

const REPO_NAME_PATTERN: &str =
    r"^(?P<domain>.*)/(?P<org>.*)/(?P<name>[a-z]+(?:\d|\d\d\d\d|(?:_\d+)+))(?:_(?P<arch>.*))?$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The input does not follow `domain/org/name[_arch]`.
    NoMatch { input: String },
    /// The input matched but one of the required parts is empty.
    MissingPart { input: String, part: &'static str },
    /// An image reference without a `:<tag>` suffix.
    MissingTag { input: String },
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::NoMatch { input } => write!(
                f,
                "repo name {input} does not match {REPO_NAME_PATTERN}"
            ),
            NameError::MissingPart { input, part } => {
                write!(f, "repo name {input} is missing its {part}")
            }
            NameError::MissingTag { input } => write!(f, "image {input} has no tag"),
        }
    }
}

impl std::error::Error for NameError {}

/// Structured parts of a repository name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoName {
    pub domain: String,
    pub org: String,
    pub name: String,
    pub arch: String,
}

impl RepoName {
    pub fn is_multiarch(&self) -> bool {
        self.arch == MULTIARCH
    }

    /// `domain/org/name` without the arch suffix.
    pub fn base(&self) -> String {
        format!("{}/{}/{}", self.domain, self.org, self.name)
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.domain, self.org, self.name)?;
        if !self.is_multiarch() {
            write!(f, "_{}", self.arch)?;
        }
        Ok(())
    }
}

/// A repository name plus image tag, e.g. `quay.io/pypa/manylinux2014_x86_64:2024-01-01-abc1234`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    #[serde(flatten)]
    pub repo: RepoName,
    pub tag: String,
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repo, self.tag)
    }
}

pub fn parse_repo_name(input: &str) -> Result<RepoName, NameError> {
    let regex = Regex::new(REPO_NAME_PATTERN).expect("regex for repo names");
    let Some(caps) = regex.captures(input) else {
        return Err(NameError::NoMatch {
            input: input.to_string(),
        });
    };
    let part = |name: &str| caps.name(name).map(|m| m.as_str()).unwrap_or_default();

    let domain = part("domain");
    let org = part("org");
    let name = part("name");
    for (label, value) in [("domain", domain), ("org", org), ("name", name)] {
        if value.is_empty() {
            return Err(NameError::MissingPart {
                input: input.to_string(),
                part: label,
            });
        }
    }

    let arch = match part("arch") {
        "" => MULTIARCH,
        arch => arch,
    };

    Ok(RepoName {
        domain: domain.to_string(),
        org: org.to_string(),
        name: name.to_string(),
        arch: arch.to_string(),
    })
}

/// Parse `repo:tag`. The tag separator is the last `:` after the final `/`,
/// so registry ports in the domain are left alone.
pub fn parse_image_ref(input: &str) -> Result<ImageRef, NameError> {
    let missing_tag = || NameError::MissingTag {
        input: input.to_string(),
    };
    let (repo, tag) = input.rsplit_once(':').ok_or_else(missing_tag)?;
    if tag.is_empty() || tag.contains('/') {
        return Err(missing_tag());
    }
    Ok(ImageRef {
        repo: parse_repo_name(repo)?,
        tag: tag.to_string(),
    })
}
