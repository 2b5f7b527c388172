//! Plain-text operation logs and replay.
//!
//! One operation per line:
//!
//! ```text
//! PUT <key> <value...>     value is the rest of the line, spaces included
//! GET <key>
//! REMOVE <key>
//! ```
//!
//! Keywords are case-insensitive. Blank lines, unknown keywords and lines
//! missing a key (or a value, for `PUT`) are skipped. The key and the value
//! are separated by a single whitespace character; anything after it belongs
//! to the value, so `Display` output parses back to the same operation.
//! Extra separators are kept: `PUT k  v` stores `" v"`.
//!
//! ## Example
//!
//! ```
//! use freqcache::oplog::{Operation, parse_log, replay};
//! use freqcache::store::CacheStore;
//!
//! let ops = parse_log("put a hello world\nGET a\n\nFLUSH\nremove a\n");
//! assert_eq!(ops.len(), 3);
//! assert_eq!(ops[0], Operation::put("a", "hello world"));
//!
//! let mut store = CacheStore::new(Some(8));
//! let stats = replay(&mut store, &ops);
//! assert_eq!(stats.hits, 1);
//! assert!(store.is_empty());
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::OpLogError;
use crate::store::CacheStore;

/// A single logged cache operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Put { key: String, value: String },
    Get { key: String },
    Remove { key: String },
}

impl Operation {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Operation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn get(key: impl Into<String>) -> Self {
        Operation::Get { key: key.into() }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Operation::Remove { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Operation::Put { key, .. } | Operation::Get { key } | Operation::Remove { key } => key,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Put { key, value } => write!(f, "PUT {key} {value}"),
            Operation::Get { key } => write!(f, "GET {key}"),
            Operation::Remove { key } => write!(f, "REMOVE {key}"),
        }
    }
}

/// Splits off the first whitespace-delimited token.
///
/// The remainder starts at the delimiter (or is empty).
fn split_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some(s.split_at(end)),
        None => Some((s, "")),
    }
}

/// Parses one log line; `None` for blank, unknown or malformed lines.
pub fn parse_line(line: &str) -> Option<Operation> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (command, rest) = split_token(line)?;

    if command.eq_ignore_ascii_case("PUT") {
        let (key, rest) = split_token(rest)?;
        let mut chars = rest.chars();
        chars.next()?;
        Some(Operation::put(key, chars.as_str()))
    } else if command.eq_ignore_ascii_case("GET") {
        let (key, _) = split_token(rest)?;
        Some(Operation::get(key))
    } else if command.eq_ignore_ascii_case("REMOVE") {
        let (key, _) = split_token(rest)?;
        Some(Operation::remove(key))
    } else {
        None
    }
}

/// Parses every recognised line of `text`, in order.
pub fn parse_log(text: &str) -> Vec<Operation> {
    text.lines().filter_map(parse_line).collect()
}

/// Renders operations one per line, with a trailing newline.
pub fn render_log<'a, I>(ops: I) -> String
where
    I: IntoIterator<Item = &'a Operation>,
{
    let mut out = String::new();
    for op in ops {
        out.push_str(&op.to_string());
        out.push('\n');
    }
    out
}

pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<Operation>, OpLogError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| OpLogError::new(path, err))?;
    let ops = parse_log(&text);
    tracing::debug!(path = %path.display(), operations = ops.len(), "read operation log");
    Ok(ops)
}

pub fn write_log(path: impl AsRef<Path>, ops: &[Operation]) -> Result<(), OpLogError> {
    let path = path.as_ref();
    fs::write(path, render_log(ops)).map_err(|err| OpLogError::new(path, err))
}

/// Counters collected while replaying a log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub puts: u64,
    pub gets: u64,
    pub hits: u64,
    pub misses: u64,
    pub removes: u64,
    pub removed: u64,
    pub evictions: u64,
}

impl ReplayStats {
    pub fn operations(&self) -> u64 {
        self.puts + self.gets + self.removes
    }
}

/// Applies `ops` to `store` in order.
pub fn replay<'a, I>(store: &mut CacheStore<String, String>, ops: I) -> ReplayStats
where
    I: IntoIterator<Item = &'a Operation>,
{
    let mut stats = ReplayStats::default();
    for op in ops {
        match op {
            Operation::Put { key, value } => {
                stats.puts += 1;
                if store.put(key.clone(), value.clone()).is_some() {
                    stats.evictions += 1;
                }
            },
            Operation::Get { key } => {
                stats.gets += 1;
                if store.try_get(key.as_str()).is_some() {
                    stats.hits += 1;
                } else {
                    stats.misses += 1;
                }
            },
            Operation::Remove { key } => {
                stats.removes += 1;
                if store.remove(key.as_str()).is_some() {
                    stats.removed += 1;
                }
            },
        }
    }
    tracing::debug!(?stats, entries = store.len(), "replay finished");
    stats
}
