//! Collapse per-architecture values into one display string.

/// Architectures that share one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueGroup<'a> {
    pub value: &'a str,
    pub keys: Vec<&'a str>,
}

/// Group keys by identical value, largest group first.
///
/// Groups of equal size keep the order in which their value was first seen.
pub fn group_values<'a, I>(values: I) -> Vec<ValueGroup<'a>>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut groups: Vec<ValueGroup<'a>> = Vec::new();
    for (key, value) in values {
        match groups.iter_mut().find(|group| group.value == value) {
            Some(group) => group.keys.push(key),
            None => groups.push(ValueGroup {
                value,
                keys: vec![key],
            }),
        }
    }
    groups.sort_by(|a, b| b.keys.len().cmp(&a.keys.len()));
    groups
}

/// Summarise `(arch, value)` pairs.
///
/// One distinct value is returned as is. When one group is strictly larger
/// than every other it leads and the rest are listed in parentheses; when the
/// two largest groups tie every group is listed.
pub fn summarise_values<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let groups = group_values(values);
    match groups.as_slice() {
        [] => String::new(),
        [only] => only.value.to_string(),
        [first, second, ..] if first.keys.len() > second.keys.len() => {
            let majority = if first.value.is_empty() {
                "None"
            } else {
                first.value
            };
            format!("{majority} ({})", describe_groups(&groups[1..]))
        }
        _ => describe_groups(&groups),
    }
}

fn describe_groups(groups: &[ValueGroup<'_>]) -> String {
    groups
        .iter()
        .map(|group| format!("{} on {}", group.value, format_list(&group.keys)))
        .collect::<Vec<_>>()
        .join("; ")
}

/// `a`, `a and b`, `a, b and c`.
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [head @ .., last] => {
            let head: Vec<&str> = head.iter().map(|item| item.as_ref()).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}
