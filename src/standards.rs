//! Known platform policies, newest first.
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Standard {
    pub name: &'static str,
    pub description: &'static str,
}

pub static STANDARDS: [Standard; 7] = [
    Standard {
        name: "manylinux_2_34",
        description: "manylinux_2_34 is the latest of the manylinux standards, with a glibc version of 2.34. It's based on AlmaLinux, a community-driven Linux distribution forked from CentOS and RHEL. Its tag was defined in the generic PEP 600.",
    },
    Standard {
        name: "manylinux_2_28",
        description: "manylinux_2_28 is a previous manylinux standard, with a glibc version of 2.28. It's based on AlmaLinux, a community-driven Linux distribution forked from CentOS and RHEL. Its tag was defined in the generic PEP 600.",
    },
    Standard {
        name: "manylinux_2_24",
        description: "manylinux_2_24 is a previous manylinux standard, with a glibc version of 2.24. It's the only manylinux standard based on Debian. Its tag was defined in the generic PEP 600.",
    },
    Standard {
        name: "manylinux2014",
        description: "manylinux2014 is a manylinux standard with a glibc version of 2.17. It's the final manylinux standard based on CentOS, in this case CentOS 7. Its policy was defined in PEP 599.",
    },
    Standard {
        name: "manylinux2010",
        description: "manylinux2010 is a manylinux standard with a glibc version of 2.12. The images are based on CentOS 6. Its tag was defined in PEP 571.",
    },
    Standard {
        name: "manylinux1",
        description: "manylinux1 is the first manylinux standard, with a glibc version of 2.5. The images are based on CentOS 5.11. It was defined in PEP 513.",
    },
    Standard {
        name: "musllinux_1_1",
        description: "musllinux_1_1 is a wheel policy based on the musl libc, in this case musl v1.1. The images are based on Alpine. It was defined in PEP 656.",
    },
];

/// Position in the catalog; lower is newer.
pub fn rank(name: &str) -> Option<usize> {
    STANDARDS.iter().position(|standard| standard.name == name)
}

pub fn find(name: &str) -> Option<&'static Standard> {
    STANDARDS.iter().find(|standard| standard.name == name)
}

/// Catalog order; names outside the catalog sort after it and compare equal.
pub fn compare_standard_names(a: &str, b: &str) -> Ordering {
    match (rank(a), rank(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_is_rank() {
        assert_eq!(rank("manylinux_2_34"), Some(0));
        assert_eq!(rank("manylinux2014"), Some(3));
        assert_eq!(rank("manylinux_2_39"), None);
        assert_eq!(find("manylinux1").map(|s| s.name), Some("manylinux1"));
    }

    #[test]
    fn unknown_names_sort_last() {
        let mut names = vec!["unknown", "manylinux1", "manylinux_2_28"];
        names.sort_by(|a, b| compare_standard_names(a, b));
        assert_eq!(names, vec!["manylinux_2_28", "manylinux1", "unknown"]);
        assert_eq!(compare_standard_names("x", "y"), Ordering::Equal);
    }
}
