//! Architecture display order.
use std::cmp::Ordering;

pub const DEFAULT_ARCH_ORDER: [&str; 5] = ["x86_64", "i686", "aarch64", "ppc64le", "s390x"];

/// Known architectures in a fixed order; anything else follows alphabetically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchOrder {
    order: Vec<String>,
}

impl Default for ArchOrder {
    fn default() -> Self {
        Self::new(DEFAULT_ARCH_ORDER)
    }
}

impl ArchOrder {
    pub fn new<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: order.into_iter().map(Into::into).collect(),
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let position = |arch: &str| self.order.iter().position(|known| known == arch);
        match (position(a), position(b)) {
            (Some(a_pos), Some(b_pos)) => a_pos.cmp(&b_pos),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    }

    pub fn sort<S: AsRef<str>>(&self, archs: &mut [S]) {
        archs.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_archs_follow_default_order() {
        let mut archs = vec!["s390x", "aarch64", "x86_64", "ppc64le", "i686"];
        ArchOrder::default().sort(&mut archs);
        assert_eq!(archs, vec!["x86_64", "i686", "aarch64", "ppc64le", "s390x"]);
    }

    #[test]
    fn unknown_archs_sort_last_alphabetically() {
        let mut archs = vec!["riscv64", "armv7l", "x86_64"];
        ArchOrder::default().sort(&mut archs);
        assert_eq!(archs, vec!["x86_64", "armv7l", "riscv64"]);
    }

    #[test]
    fn custom_order_overrides_default() {
        let order = ArchOrder::new(["aarch64", "x86_64"]);
        assert_eq!(order.compare("aarch64", "x86_64"), Ordering::Less);
        assert_eq!(order.compare("i686", "x86_64"), Ordering::Greater);
    }
}
