//! Snapshot text format for consistency checks.
//!
//! A snapshot is one `key=value` line per entry, sorted by key, joined with
//! `\n` and without a trailing newline. For `String` keys the sort is byte
//! order. Parsing splits each line at the first `=`, so keys containing `=`
//! do not round-trip.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Display;
use std::fs;
use std::hash::Hash;
use std::path::Path;

use crate::error::OpLogError;
use crate::store::CacheStore;

/// Renders entries as sorted `key=value` lines.
pub fn render<K, V, I>(entries: I) -> String
where
    K: Ord + Display,
    V: Display,
    I: IntoIterator<Item = (K, V)>,
{
    let mut entries: Vec<(K, V)> = entries.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the current contents of `store`.
pub fn render_store<K, V>(store: &CacheStore<K, V>) -> String
where
    K: Eq + Hash + Clone + Ord + Display,
    V: Display,
{
    render(store.iter())
}

pub fn write_snapshot<K, V>(path: impl AsRef<Path>, store: &CacheStore<K, V>) -> Result<(), OpLogError>
where
    K: Eq + Hash + Clone + Ord + Display,
    V: Display,
{
    let path = path.as_ref();
    fs::write(path, render_store(store)).map_err(|err| OpLogError::new(path, err))
}

pub fn read_snapshot(path: impl AsRef<Path>) -> Result<String, OpLogError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|err| OpLogError::new(path, err))
}

/// Parses snapshot text into a sorted map. Lines without `=` are skipped.
pub fn parse(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Differences between two snapshots, each list sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
    /// `(key, left value, right value)`
    pub changed: Vec<(String, String, String)>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.only_left.is_empty() && self.only_right.is_empty() && self.changed.is_empty()
    }
}

impl fmt::Display for SnapshotDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("snapshots match");
        }
        for key in &self.only_left {
            writeln!(f, "- {key}")?;
        }
        for key in &self.only_right {
            writeln!(f, "+ {key}")?;
        }
        for (key, left, right) in &self.changed {
            writeln!(f, "~ {key}: {left} -> {right}")?;
        }
        Ok(())
    }
}

/// Compares two snapshot texts entry by entry.
pub fn compare(left: &str, right: &str) -> SnapshotDiff {
    let left = parse(left);
    let right = parse(right);
    let mut diff = SnapshotDiff::default();

    for (key, left_value) in &left {
        match right.get(key) {
            None => diff.only_left.push(key.clone()),
            Some(right_value) if right_value != left_value => {
                diff.changed
                    .push((key.clone(), left_value.clone(), right_value.clone()));
            },
            Some(_) => {},
        }
    }
    diff.only_right = right
        .keys()
        .filter(|key| !left.contains_key(*key))
        .cloned()
        .collect();
    diff
}
