//! Output rendering for field lists and the other command results.
//!
//! Every renderer returns a `String`; JSON output serializes the same records
//! the text and markdown views are built from.
use crate::field::Field;
use crate::index::VersionRef;
use crate::log::{format_command, LogEntry};
use crate::name::RepoName;
use crate::report::ImageReport;
use crate::standards::Standard;
use crate::summary::format_list;
use crate::tag::time_ago;
use crate::version::Version;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use time::Date;

mod table;

use table::{markdown_field_rows, markdown_table, text_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown output format: {other} (expected text, markdown or json)"
            )),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("serialize output JSON")?;
    text.push('\n');
    Ok(text)
}

pub fn render_fields(fields: &[Field], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(fields),
        OutputFormat::Text => Ok(text_table(fields)),
        OutputFormat::Markdown => Ok(markdown_table(
            &["Field", "Value"],
            &markdown_field_rows(fields),
        )),
    }
}

fn parent_id(id: &str) -> Option<String> {
    if let Some(rest) = id.strip_prefix("python.") {
        let (identifier, _) = rest.split_once('.')?;
        return Some(format!("python.{identifier}"));
    }
    id.rsplit_once('.').map(|(head, _)| head.to_string())
}

/// Keep only the listed ids plus the section rows they sit under.
pub fn differences_only(fields: &[Field], ids: &[String]) -> Vec<Field> {
    let mut keep: BTreeSet<String> = ids.iter().cloned().collect();
    for id in ids {
        if let Some(parent) = parent_id(id) {
            keep.insert(parent);
        }
    }
    fields
        .iter()
        .filter(|field| keep.contains(&field.id))
        .cloned()
        .collect()
}

pub struct VersionView<'a> {
    pub version: &'a Version,
    pub archs: Vec<&'a str>,
    pub differences_only: bool,
    pub today: Date,
}

#[derive(Serialize)]
struct VersionJsonOut<'a> {
    id: String,
    archs: &'a [&'a str],
    failures: Vec<FailureOut>,
    disagreements: &'a [String],
    fields: Vec<Field>,
}

#[derive(Serialize)]
struct FailureOut {
    arch: String,
    error: String,
}

pub fn render_version(view: &VersionView<'_>, format: OutputFormat) -> Result<String> {
    let version = view.version;
    let fields = if view.differences_only {
        differences_only(version.fields(), version.disagreements())
    } else {
        version.fields().to_vec()
    };
    let failures: Vec<FailureOut> = version
        .failures()
        .iter()
        .map(|failure| FailureOut {
            arch: failure.arch.clone(),
            error: failure.error.to_string(),
        })
        .collect();

    if format == OutputFormat::Json {
        return to_json(&VersionJsonOut {
            id: version.id(),
            archs: &view.archs,
            failures,
            disagreements: version.disagreements(),
            fields,
        });
    }

    let mut out = String::new();
    let heading = format!("{} ({})", version.id(), format_list(&view.archs));
    let tag = version.image_tag();
    let built = tag.date.map(|date| {
        let mut line = format!("built {date} ({})", time_ago(date, view.today));
        if let Some(commit) = &tag.commit {
            line.push_str(&format!(", commit {commit}"));
        }
        line
    });

    match format {
        OutputFormat::Markdown => {
            out.push_str(&format!("## {heading}\n\n"));
            if let Some(built) = built {
                out.push_str(&format!("{built}\n\n"));
            }
            for failure in &failures {
                out.push_str(&format!("> error on {}: {}\n", failure.arch, failure.error));
            }
            if !failures.is_empty() {
                out.push('\n');
            }
            out.push_str(&render_fields(&fields, OutputFormat::Markdown)?);
        }
        _ => {
            out.push_str(&format!("{heading}\n"));
            if let Some(built) = built {
                out.push_str(&format!("{built}\n"));
            }
            for failure in &failures {
                out.push_str(&format!("error on {}: {}\n", failure.arch, failure.error));
            }
            out.push('\n');
            out.push_str(&text_table(&fields));
        }
    }
    Ok(out)
}

#[derive(Serialize)]
struct ReportJsonOut<'a> {
    image: Option<&'a str>,
    generated_at: Option<String>,
    fields: Vec<Field>,
}

pub fn render_report(report: &ImageReport, format: OutputFormat) -> Result<String> {
    let fields = report.sorted_fields();
    let image = report.metadata().map(|metadata| metadata.image.as_str());
    let generated_at = report
        .metadata()
        .and_then(|metadata| metadata.generated_at_rfc3339());
    match format {
        OutputFormat::Json => to_json(&ReportJsonOut {
            image,
            generated_at,
            fields,
        }),
        OutputFormat::Text | OutputFormat::Markdown => {
            let mut out = String::new();
            if let Some(image) = image {
                let prefix = if format == OutputFormat::Markdown { "## " } else { "" };
                out.push_str(&format!("{prefix}{image}\n"));
            }
            if let Some(generated_at) = generated_at {
                out.push_str(&format!("generated {generated_at}\n"));
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&render_fields(&fields, format)?);
            Ok(out)
        }
    }
}

/// Parts of a repository name, plus the tag when one was given.
pub fn render_repo_name(repo: &RepoName, tag: Option<&str>, format: OutputFormat) -> Result<String> {
    let mut rows = vec![
        ("domain", repo.domain.as_str()),
        ("org", repo.org.as_str()),
        ("name", repo.name.as_str()),
        ("arch", repo.arch.as_str()),
    ];
    if let Some(tag) = tag {
        rows.push(("tag", tag));
    }
    match format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(repo).context("serialize repo name")?;
            if let (Some(tag), Some(object)) = (tag, value.as_object_mut()) {
                object.insert("tag".to_string(), serde_json::Value::from(tag));
            }
            to_json(&value)
        }
        OutputFormat::Text => Ok(rows
            .iter()
            .map(|(key, value)| format!("{key:<6}  {value}\n"))
            .collect()),
        OutputFormat::Markdown => Ok(markdown_table(
            &["Part", "Value"],
            &rows
                .iter()
                .map(|(key, value)| vec![key.to_string(), value.to_string()])
                .collect::<Vec<_>>(),
        )),
    }
}

pub fn render_version_refs(refs: &[&VersionRef], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(refs),
        OutputFormat::Text => Ok(refs
            .iter()
            .map(|version| format!("{}  [{}]\n", version.id(), version.archs.join(", ")))
            .collect()),
        OutputFormat::Markdown => Ok(markdown_table(
            &["Version", "Archs", "File"],
            &refs
                .iter()
                .map(|version| {
                    vec![
                        version.id(),
                        version.archs.join(", "),
                        version.filename.clone(),
                    ]
                })
                .collect::<Vec<_>>(),
        )),
    }
}

pub fn render_standards(standards: &[Standard], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(standards),
        OutputFormat::Text => Ok(standards
            .iter()
            .enumerate()
            .map(|(rank, standard)| {
                format!("{rank}. {}\n   {}\n", standard.name, standard.description)
            })
            .collect()),
        OutputFormat::Markdown => Ok(markdown_table(
            &["Rank", "Standard", "Description"],
            &standards
                .iter()
                .enumerate()
                .map(|(rank, standard)| {
                    vec![
                        rank.to_string(),
                        standard.name.to_string(),
                        standard.description.to_string(),
                    ]
                })
                .collect::<Vec<_>>(),
        )),
    }
}

pub fn render_commands(log: &[LogEntry], failed_only: bool, format: OutputFormat) -> Result<String> {
    let entries: Vec<&LogEntry> = log
        .iter()
        .filter(|entry| !failed_only || !entry.succeeded())
        .collect();
    match format {
        OutputFormat::Json => to_json(&entries),
        OutputFormat::Text => Ok(entries
            .iter()
            .map(|entry| format!("{:>4}  {}\n", entry.return_code, format_command(&entry.command)))
            .collect()),
        OutputFormat::Markdown => Ok(markdown_table(
            &["Exit", "Command"],
            &entries
                .iter()
                .map(|entry| {
                    vec![
                        entry.return_code.to_string(),
                        format!("`{}`", format_command(&entry.command)),
                    ]
                })
                .collect::<Vec<_>>(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::ArchOrder;
    use crate::log::entry;
    use crate::report::ReportData;
    use crate::version::VersionMetadata;
    use time::macros::date;

    fn field(id: &str, value: &str) -> Field {
        Field::new(id, id.rsplit('.').next().unwrap_or(id), Some(value.to_string()))
    }

    #[test]
    fn output_format_parses_names() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn differences_keep_section_rows() {
        let fields = vec![
            field("os", "A"),
            field("os.libc", "B"),
            field("global-tools", ""),
            field("global-tools.git", "1 (2 on s390x)"),
            field("python.cp311-cp311", "3.11.4"),
            field("python.cp311-cp311.zope.interface", "6.0 (5.0 on i686)"),
            field("python.cp311-cp311.pip", "23.0"),
        ];
        let ids = vec![
            "global-tools.git".to_string(),
            "python.cp311-cp311.zope.interface".to_string(),
        ];
        let kept: Vec<String> = differences_only(&fields, &ids)
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(
            kept,
            vec![
                "global-tools",
                "global-tools.git",
                "python.cp311-cp311",
                "python.cp311-cp311.zope.interface",
            ]
        );
    }

    #[test]
    fn json_fields_are_the_records_themselves() {
        let fields = vec![Field::new("os", "OS", None)];
        let json = render_fields(&fields, OutputFormat::Json).unwrap();
        let parsed: Vec<Field> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, fields);
    }

    #[test]
    fn text_version_has_heading_build_line_and_failures() {
        let log = vec![entry(
            &["cat", "/etc/os-release"],
            "PRETTY_NAME=\"AlmaLinux 8.9\"\n",
            "",
            0,
        )];
        let report = ImageReport::new(None, ReportData { log: Some(log) }).unwrap();
        let version = Version::new(
            VersionMetadata {
                domain: "quay.io".to_string(),
                org: "pypa".to_string(),
                name: "manylinux_2_28".to_string(),
                tag: "2024-06-01-abc1234".to_string(),
            },
            vec![("x86_64".to_string(), report)],
            vec![crate::version::ArchFailure {
                arch: "aarch64".to_string(),
                error: crate::report::ReportError::EmptyLog {
                    image: "img".to_string(),
                },
            }],
            &ArchOrder::default(),
        );
        let view = VersionView {
            version: &version,
            archs: version.archs(&ArchOrder::default()),
            differences_only: false,
            today: date!(2024 - 06 - 30),
        };
        let text = render_version(&view, OutputFormat::Text).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("quay.io/pypa/manylinux_2_28:2024-06-01-abc1234 (x86_64 and aarch64)")
        );
        assert_eq!(
            lines.next(),
            Some("built 2024-06-01 (29 days ago), commit abc1234")
        );
        assert_eq!(lines.next(), Some("error on aarch64: empty log img"));
        assert!(text.contains("OS "), "{text}");
        assert!(text.contains("AlmaLinux 8.9"), "{text}");
    }

    #[test]
    fn commands_can_be_filtered_to_failures() {
        let log = vec![
            entry(&["which", "dnf"], "/usr/bin/dnf", "", 0),
            entry(&["which", "apk"], "", "", 1),
        ];
        let text = render_commands(&log, true, OutputFormat::Text).unwrap();
        assert_eq!(text, "   1  which apk\n");
    }

    #[test]
    fn repo_name_text_lists_parts() {
        let repo = crate::name::parse_repo_name("quay.io/pypa/manylinux2014_x86_64").unwrap();
        let text = render_repo_name(&repo, None, OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "domain  quay.io\norg     pypa\nname    manylinux2014\narch    x86_64\n"
        );
        let json = render_repo_name(&repo, Some("2024-01-01-abc"), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tag"], "2024-01-01-abc");
        assert_eq!(value["arch"], "x86_64");
    }
}
