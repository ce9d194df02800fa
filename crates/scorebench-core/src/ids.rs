//! Identifier minting

use serde::{Deserialize, Serialize};

/// Counter-backed identifier source, scoped to one synthesis call.
///
/// Produces `{prefix}{counter:0width}{suffix}`, e.g. `tn0010-8400-...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    pub next: u64,
    #[serde(default = "default_width")]
    pub width: usize,
}

fn default_width() -> usize {
    4
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: String::new(),
            next: start,
            width: default_width(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}{:0width$}{}", self.prefix, self.next, self.suffix, width = self.width);
        self.next += 1;
        id
    }
}

/// Identifier for a duplicated event: original id tagged with the shift
pub fn shifted_id(original: &str, offset: u32) -> String {
    format!("{original}+{offset}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_format() {
        let mut ids = IdGenerator::new("tn", 10).with_suffix("-8400");
        assert_eq!(ids.next_id(), "tn0010-8400");
        assert_eq!(ids.next_id(), "tn0011-8400");

        let mut wide = IdGenerator::new("bn", 10000);
        assert_eq!(wide.next_id(), "bn10000");
    }

    #[test]
    fn test_shifted_id() {
        assert_eq!(shifted_id("tn0010", 8640), "tn0010+8640");
    }
}
