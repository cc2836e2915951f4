//! Measure how a node set shares out keys, and what happens when a node goes away.
use crate::hashable::Hashable;
use crate::rendezvous::Rendezvous;
use crate::scorer::Scorer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyStyle {
    /// `key-0`, `key-1`, ...
    Sequential,
    /// random v4 UUIDs, different every run
    Uuid,
}

pub fn sample_keys(count: usize, style: KeyStyle) -> Vec<String> {
    match style {
        KeyStyle::Sequential => (0..count).map(|i| format!("key-{}", i)).collect(),
        KeyStyle::Uuid => (0..count)
            .map(|_| Uuid::new_v4().hyphenated().to_string().to_uppercase())
            .collect(),
    }
}

/// How many keys each node wins
#[derive(Debug, Serialize)]
pub struct Spread {
    pub keys: usize,
    pub expected_per_node: f64,
    /// largest relative distance of any node from `expected_per_node`
    pub max_deviation: f64,
    pub counts: BTreeMap<String, usize>,
}

impl Spread {
    pub fn measure<Node, S, K>(rendezvous: &Rendezvous<Node, S>, keys: &[K]) -> Spread
    where
        Node: Hashable + Display,
        S: Scorer,
        K: AsRef<[u8]>,
    {
        // nodes that win nothing still get a row
        let mut counts: BTreeMap<String, usize> =
            rendezvous.nodes().map(|node| (node.to_string(), 0)).collect();

        for key in keys {
            if let Some(node) = rendezvous.get(key) {
                *counts.entry(node.to_string()).or_default() += 1;
            }
        }

        let expected_per_node = if counts.is_empty() {
            0.0
        } else {
            keys.len() as f64 / counts.len() as f64
        };

        let max_deviation = if expected_per_node > 0.0 {
            counts
                .values()
                .map(|&count| (count as f64 - expected_per_node).abs() / expected_per_node)
                .fold(0.0, f64::max)
        } else {
            0.0
        };

        Spread {
            keys: keys.len(),
            expected_per_node,
            max_deviation,
            counts,
        }
    }
}

/// Which keys move when a node is removed
#[derive(Debug, Serialize)]
pub struct Remap {
    pub keys: usize,
    pub removed: String,
    pub moved: usize,
    pub moved_from_removed: usize,
    /// keys that moved even though they weren't on the removed node - always zero
    /// for a correct rendezvous hash
    pub moved_from_others: usize,
    /// where the keys from the removed node ended up
    pub destinations: BTreeMap<String, usize>,
}

impl Remap {
    pub fn measure<Node, S, K>(rendezvous: &Rendezvous<Node, S>, removed: &Node, keys: &[K]) -> Remap
    where
        Node: Hashable + Display + Clone,
        S: Scorer + Clone,
        K: AsRef<[u8]>,
    {
        let mut after = rendezvous.clone();
        after.remove(removed);

        let removed_bytes = removed.hash_bytes();

        let mut remap = Remap {
            keys: keys.len(),
            removed: removed.to_string(),
            moved: 0,
            moved_from_removed: 0,
            moved_from_others: 0,
            destinations: BTreeMap::new(),
        };

        for key in keys {
            let before = rendezvous.get(key).map(|node| node.hash_bytes());
            let now = after.get(key);

            if before == now.map(|node| node.hash_bytes()) {
                continue;
            }

            remap.moved += 1;
            if before.as_ref() == Some(&removed_bytes) {
                remap.moved_from_removed += 1;
                if let Some(node) = now {
                    *remap.destinations.entry(node.to_string()).or_default() += 1;
                }
            } else {
                remap.moved_from_others += 1;
            }
        }

        remap
    }
}
