//! Command line behaviour against a temporary data directory.

mod common;

use common::{glibc_log, image_report, log_entry, stderr, stdout, version_json, DataDir};
use serde_json::json;

fn data_dir_with_version() -> DataDir {
    let data = DataDir::new().expect("temp data dir");
    let version = version_json(
        "manylinux_2_28",
        "2024-06-01-abc1234",
        vec![
            (
                "x86_64",
                image_report(
                    "quay.io/pypa/manylinux_2_28_x86_64:2024-06-01-abc1234",
                    glibc_log("AlmaLinux 8.9", "3.11.9", "24.0", Some("2.43.0")),
                ),
            ),
            (
                "aarch64",
                image_report(
                    "quay.io/pypa/manylinux_2_28_aarch64:2024-06-01-abc1234",
                    glibc_log("AlmaLinux 8.9", "3.11.9", "24.0", Some("2.44.0")),
                ),
            ),
        ],
    );
    data.write_version("manylinux_2_28", "2024-06-01-abc1234", &version)
        .expect("write version");
    data.write_json(
        "index.json",
        &json!({
            "versions_reports": [{
                "domain": "quay.io", "org": "pypa", "name": "manylinux_2_28",
                "tag": "2024-06-01-abc1234", "archs": ["x86_64", "aarch64"],
                "filename": "quay.io_pypa_manylinux_2_28_2024-06-01-abc1234.json"
            }],
            "latest": {
                "metadata": {"generated_at": 1717200000},
                "data": {"quay.io/pypa/manylinux_2_28_x86_64": "2024-06-01-abc1234"}
            }
        }),
    )
    .expect("write index");
    data
}

#[test]
fn parse_name_prints_parts() {
    let data = DataDir::new().unwrap();
    let output = data.run(&["parse-name", "quay.io/pypa/manylinux2014_aarch64"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "domain  quay.io\norg     pypa\nname    manylinux2014\narch    aarch64\n"
    );
}

#[test]
fn parse_name_with_tag_as_json() {
    let data = DataDir::new().unwrap();
    let output = data.run(&[
        "parse-name",
        "quay.io/pypa/musllinux_1_2:2024-06-01-abc1234",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["name"], "musllinux_1_2");
    assert_eq!(value["arch"], "multiarch");
    assert_eq!(value["tag"], "2024-06-01-abc1234");
}

#[test]
fn bad_name_exits_with_usage_code() {
    let data = DataDir::new().unwrap();
    let output = data.run(&["parse-name", "manylinux2014"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("manylinux2014"), "{}", stderr(&output));
}

#[test]
fn version_by_id_reads_the_data_dir() {
    let data = data_dir_with_version();
    let output = data.run(&[
        "version",
        "--id",
        "quay.io/pypa/manylinux_2_28:2024-06-01-abc1234",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with(
        "quay.io/pypa/manylinux_2_28:2024-06-01-abc1234 (x86_64 and aarch64)\n"
    ));
    assert!(text.contains("2.43.0 on x86_64; 2.44.0 on aarch64"), "{text}");
    assert!(text.contains("AlmaLinux 8.9"), "{text}");
}

#[test]
fn version_differences_as_markdown() {
    let data = data_dir_with_version();
    let output = data.run(&[
        "version",
        "--id",
        "quay.io/pypa/manylinux_2_28:2024-06-01-abc1234",
        "--differences",
        "--format",
        "markdown",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("| **Global Tools** |"), "{text}");
    assert!(text.contains("| git |"), "{text}");
    assert!(!text.contains("AlmaLinux"), "{text}");
}

#[test]
fn missing_version_file_is_a_failure() {
    let data = DataDir::new().unwrap();
    let output = data.run(&["version", "--id", "quay.io/pypa/manylinux1:2020-01-01-x"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("read version"), "{}", stderr(&output));
}

#[test]
fn search_uses_the_index() {
    let data = data_dir_with_version();
    let output = data.run(&["search", "latest"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "quay.io/pypa/manylinux_2_28:2024-06-01-abc1234  [x86_64, aarch64]\n"
    );

    let output = data.run(&["search", "2_"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn report_and_commands_read_one_image_report() {
    let data = DataDir::new().unwrap();
    let mut log = glibc_log("AlmaLinux 8.9", "3.11.9", "24.0", None);
    log.push(log_entry(&["pipx", "list", "--short"], "", "pipx: not found", 127));
    let path = data
        .write_json(
            "reports/x86_64.json",
            &image_report("quay.io/pypa/manylinux_2_28_x86_64:latest", log),
        )
        .unwrap();
    let path = path.to_str().unwrap();

    let output = data.run(&["report", path]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("quay.io/pypa/manylinux_2_28_x86_64:latest\n"), "{text}");
    assert!(text.contains("CPython 3.11"), "{text}");

    let output = data.run(&["commands", path, "--failed"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "   1  which apk\n 127  pipx list --short\n"
    );
}

#[test]
fn standards_lists_the_catalog() {
    let data = DataDir::new().unwrap();
    let output = data.run(&["standards", "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value[0]["name"], "manylinux_2_34");
    assert_eq!(value.as_array().map(Vec::len), Some(7));
}

#[test]
fn format_can_come_from_the_environment() {
    let data = DataDir::new().unwrap();
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_mlreport"))
        .args(["standards"])
        .env("MLREPORT_CONFIG", data.path().join("config.json"))
        .env("MLREPORT_FORMAT", "markdown")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("| Rank | Standard | Description |\n"));
}
