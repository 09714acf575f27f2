//! Python interpreter installs found in a command log.
//!
//! Installs are recognised by their executable path, `.../python/<identifier>/bin/python`,
//! where the identifier names the build (`cp311-cp311`, `cp27-cp27mu`,
//! `pp310-pypy310_pp73`).
use crate::field::Field;
use crate::log::{CommandQuery, LogEntry, OutputPart};
use regex::Regex;
use std::fmt;

const PYTHON_SUFFIX: &str = "/bin/python";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpreter {
    CPython,
    PyPy,
    /// Unrecognised family prefix, shown verbatim.
    Other(String),
}

impl Interpreter {
    fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "cp" => Interpreter::CPython,
            "pp" => Interpreter::PyPy,
            other => {
                tracing::warn!(interpreter = other, "unknown interpreter id");
                Interpreter::Other(other.to_string())
            }
        }
    }
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interpreter::CPython => f.write_str("CPython"),
            Interpreter::PyPy => f.write_str("PyPy"),
            Interpreter::Other(other) => f.write_str(other),
        }
    }
}

/// What the build identifier says about an install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonEnvironmentInfo {
    pub interpreter: Interpreter,
    pub major: u32,
    pub minor: u32,
    /// ABI letters of 2.7 builds (`m`, `mu`).
    pub variant: Option<String>,
}

impl PythonEnvironmentInfo {
    pub fn parse(identifier: &str) -> Option<Self> {
        let regex = Regex::new(r"^([a-z]+?)(\d)(\d+)").expect("regex for python identifiers");
        let caps = regex.captures(identifier)?;
        let major = caps.get(2)?.as_str().parse::<u32>().ok()?;
        let minor = caps.get(3)?.as_str().parse::<u32>().ok()?;
        let interpreter = Interpreter::from_prefix(caps.get(1)?.as_str());

        let variant = if major == 2 && minor == 7 {
            let letters = Regex::new(r"[a-z]+$").expect("regex for abi variant letters");
            letters.find(identifier).map(|m| m.as_str().to_string())
        } else {
            None
        };

        Some(Self {
            interpreter,
            major,
            minor,
            variant,
        })
    }

    pub fn name(&self) -> String {
        format!("{} {}.{}", self.interpreter, self.major, self.minor)
    }
}

/// Distinct interpreter paths in first-seen order.
pub fn find_python_paths(log: &[LogEntry]) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for program in log.iter().filter_map(LogEntry::program) {
        if program.ends_with(PYTHON_SUFFIX) && !paths.iter().any(|path| path == program) {
            paths.push(program.to_string());
        }
    }
    paths
}

/// The directory segment above `bin/python`.
pub fn identifier_from_path(path: &str) -> String {
    let dir = path.strip_suffix(PYTHON_SUFFIX).unwrap_or(path);
    dir.rsplit('/').next().unwrap_or(dir).to_string()
}

/// One interpreter install, answering questions from the report log.
#[derive(Debug, Clone)]
pub struct PythonEnvironment<'a> {
    log: &'a [LogEntry],
    path: String,
    identifier: String,
    info: Option<PythonEnvironmentInfo>,
}

impl<'a> PythonEnvironment<'a> {
    pub fn new(log: &'a [LogEntry], path: String) -> Self {
        let identifier = identifier_from_path(&path);
        let info = PythonEnvironmentInfo::parse(&identifier);
        if info.is_none() {
            tracing::warn!(identifier = %identifier, "unknown python environment identifier");
        }
        Self {
            log,
            path,
            identifier,
            info,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn info(&self) -> Option<&PythonEnvironmentInfo> {
        self.info.as_ref()
    }

    /// `CPython 3.11`, or the raw identifier when it could not be parsed.
    pub fn pretty_name(&self) -> String {
        match &self.info {
            Some(info) => info.name(),
            None => self.identifier.clone(),
        }
    }

    /// Display label; a 2.7 ABI variant is wrapped in a `variant` span.
    pub fn label(&self) -> String {
        let mut label = self.pretty_name();
        if let Some(variant) = self.info.as_ref().and_then(|info| info.variant.as_deref()) {
            label.push_str(&format!("<span class=\"variant\">{variant}</span>"));
        }
        label
    }

    /// Version from `--version`, with the PyPy release appended when present.
    pub fn python_version(&self) -> Option<String> {
        let output = self.output(&["--version"], OutputPart::All)?;
        let version = output.split_whitespace().nth(1)?;
        let pypy = Regex::new(r"\[PyPy (\S+)").expect("regex for pypy version marker");
        match pypy.captures(&output).and_then(|caps| caps.get(1)) {
            Some(pypy_version) => Some(format!("{version} | {}", pypy_version.as_str())),
            None => Some(version.to_string()),
        }
    }

    /// Installed package versions, `pip list` first and the older probes as a
    /// fallback.
    pub fn tool_versions(&self) -> Vec<(String, String)> {
        if let Some(listing) =
            self.output(&["-m", "pip", "list", "--format=freeze"], OutputPart::Stdout)
        {
            return parse_freeze(&listing);
        }

        let mut versions: Vec<(String, String)> = Vec::new();
        if let Some(pip) = self
            .output(&["-m", "pip", "--version"], OutputPart::Stdout)
            .and_then(|out| out.split_whitespace().nth(1).map(str::to_string))
        {
            upsert(&mut versions, "pip", pip);
        }
        if let Some(setuptools) = self.output(
            &["-c", "import setuptools; print(setuptools.__version__)"],
            OutputPart::Stdout,
        ) {
            let setuptools = setuptools.trim();
            if !setuptools.is_empty() {
                upsert(&mut versions, "setuptools", setuptools.to_string());
            }
        }
        if let Some(freeze) = self.output(&["-m", "pip", "freeze"], OutputPart::Stdout) {
            for (name, version) in parse_freeze(&freeze) {
                upsert(&mut versions, &name, version);
            }
        }
        versions
    }

    pub fn fields(&self) -> Vec<Field> {
        let base = format!("python.{}", self.identifier);
        let mut fields = vec![Field::new(&base, self.label(), self.python_version())];
        for (name, version) in self.tool_versions() {
            fields.push(Field::new(format!("{base}.{name}"), name, Some(version)));
        }
        fields
    }

    fn output(&self, args: &[&str], part: OutputPart) -> Option<String> {
        let mut command = vec![self.path.as_str()];
        command.extend_from_slice(args);
        CommandQuery::new(command).part(part).run(self.log)
    }
}

/// `name==version` lines; lines without a version are skipped.
fn parse_freeze(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let (name, version) = line.trim().split_once("==")?;
            let (name, version) = (name.trim(), version.trim());
            if name.is_empty() || version.is_empty() {
                return None;
            }
            Some((name.to_string(), version.to_string()))
        })
        .collect()
}

pub(super) fn upsert(entries: &mut Vec<(String, String)>, key: &str, value: String) {
    match entries.iter_mut().find(|(name, _)| name == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key.to_string(), value)),
    }
}
