use crate::field::Field;
use regex::Regex;

const INDENT: &str = "  ";

/// Replace the variant span with a bracketed suffix: `CPython 2.7 [mu]`.
pub(super) fn plain_label(label: &str) -> String {
    let span = Regex::new(r#"<span class="variant">([^<]*)</span>"#)
        .expect("regex for variant label markup");
    span.replace_all(label, " [$1]").into_owned()
}

pub(super) fn display_value(value: Option<&str>) -> &str {
    value.unwrap_or(crate::version::MISSING_VALUE)
}

/// Two aligned columns, child rows indented under their section.
pub(super) fn text_table(fields: &[Field]) -> String {
    let rows: Vec<(String, &str)> = fields
        .iter()
        .map(|field| {
            let label = format!(
                "{}{}",
                INDENT.repeat(field.depth()),
                plain_label(&field.label)
            );
            (label, display_value(field.value.as_deref()))
        })
        .collect();
    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (label, value) in rows {
        let pad = width - label.chars().count();
        let line = format!("{label}{}  {value}", " ".repeat(pad));
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub(super) fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!(
        "|{}\n",
        headers.iter().map(|_| "---|").collect::<String>()
    ));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| escape_markdown(cell)).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

/// Field rows for a markdown table; top-level rows are bold.
pub(super) fn markdown_field_rows(fields: &[Field]) -> Vec<Vec<String>> {
    fields
        .iter()
        .map(|field| {
            let label = plain_label(&field.label);
            let label = if field.depth() == 0 {
                format!("**{label}**")
            } else {
                label
            };
            vec![label, display_value(field.value.as_deref()).to_string()]
        })
        .collect()
}

fn escape_markdown(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_markup_becomes_brackets() {
        assert_eq!(
            plain_label("CPython 2.7<span class=\"variant\">mu</span>"),
            "CPython 2.7 [mu]"
        );
        assert_eq!(plain_label("CPython 3.11"), "CPython 3.11");
    }

    #[test]
    fn text_table_aligns_and_indents() {
        let fields = vec![
            Field::new("os", "OS", Some("AlmaLinux 8.9".to_string())),
            Field::new("os.libc", "libc", None),
        ];
        assert_eq!(
            text_table(&fields),
            "OS      AlmaLinux 8.9\n  libc  None\n"
        );
    }

    #[test]
    fn markdown_cells_are_escaped() {
        let table = markdown_table(&["A", "B"], &[vec!["x|y".to_string(), "1\n2".to_string()]]);
        assert_eq!(table, "| A | B |\n|---|---|\n| x\\|y | 1 2 |\n");
    }
}
