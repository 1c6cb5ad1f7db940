//! Identifier assignment.
//!
//! Style ids are memoized by class name, so every reference to a class in
//! one run agrees with the emitted style. Node ids are fresh on every call.
//! Ids are UUID-shaped and derived from an FNV-1a hash plus a run counter,
//! which keeps them reproducible for identical input.

use std::collections::{HashMap, HashSet};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Default)]
pub struct IdTable {
    styles: HashMap<String, String>,
    issued: HashSet<String>,
    counter: u64,
}

impl IdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id for class `name`; the same name always yields the same id.
    pub fn style_id(&mut self, name: &str) -> String {
        if let Some(id) = self.styles.get(name) {
            return id.clone();
        }
        let id = self.fresh("style", name);
        self.styles.insert(name.to_string(), id.clone());
        id
    }

    /// A new node id.
    pub fn node_id(&mut self) -> String {
        self.fresh("node", "")
    }

    /// Whether `name` already has a style id.
    pub fn has_style(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    fn fresh(&mut self, kind: &str, name: &str) -> String {
        loop {
            self.counter += 1;
            let high = fnv1a(&[kind.as_bytes(), name.as_bytes()]);
            let counter = self.counter.to_le_bytes();
            let low = fnv1a(&[name.as_bytes(), &counter[..]]);
            let id = format_uuid(high, low);
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

fn fnv1a(parts: &[&[u8]]) -> u64 {
    let mut hash = FNV_OFFSET;
    for part in parts {
        for byte in *part {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        // Separator so ("ab", "c") and ("a", "bc") differ
        hash ^= 0xff;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Lay out 128 bits as `8-4-4-4-12` hex with version 4 / variant 1 bits.
fn format_uuid(high: u64, low: u64) -> String {
    let high = (high & 0xffff_ffff_ffff_0fff) | 0x0000_0000_0000_4000;
    let low = (low & 0x3fff_ffff_ffff_ffff) | 0x8000_0000_0000_0000;
    format!(
        "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        high >> 32,
        (high >> 16) & 0xffff,
        high & 0xffff,
        low >> 48,
        low & 0xffff_ffff_ffff
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_name_same_id() {
        let mut ids = IdTable::new();
        let a = ids.style_id("card");
        let b = ids.style_id("card");
        assert_eq!(a, b);
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_different_names_never_collide() {
        let mut ids = IdTable::new();
        let all: HashSet<String> = (0..2000).map(|i| ids.style_id(&format!("class-{i}"))).collect();
        assert_eq!(all.len(), 2000);
    }

    #[test]
    fn test_node_ids_are_fresh() {
        let mut ids = IdTable::new();
        assert_ne!(ids.node_id(), ids.node_id());
    }

    #[test]
    fn test_uuid_shape() {
        let id = IdTable::new().style_id("hero");
        let groups: Vec<usize> = id.split('-').map(str::len).collect();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);
        assert!(id.chars().all(|c| c == '-' || c.is_ascii_hexdigit()));
        assert_eq!(id.chars().nth(14), Some('4'));
    }

    #[test]
    fn test_reproducible_across_runs() {
        let mut first = IdTable::new();
        let mut second = IdTable::new();
        assert_eq!(first.style_id("a"), second.style_id("a"));
        assert_eq!(first.node_id(), second.node_id());
    }
}
