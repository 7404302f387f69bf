//! Normalizes raw repository-graph payloads into canonical local/remote views.
//!
//! Two payload shapes are accepted. The modern one carries branch heads and per-commit
//! branch membership:
//!
//! ```json
//! { "currentBranch": "main",
//!   "commits": [{ "hash": "...", "parents": ["..."], "branches": ["main"] }],
//!   "branchHeads": { "main": "..." },
//!   "forkPoints": { "feature": "..." },
//!   "remote": { "branchHeads": { "main": "..." } } }
//! ```
//!
//! The legacy one is a flat `commits` list that all belongs to `currentBranch`.
//! Missing sections never fail ingest; they simply come out empty.

use crate::config::EngineConfig;
use crate::core::{
    short_hash_of, BranchHeads, Commit, ForkPoints, GraphView, HashIndex, NormalizedGraph, Parents,
};
use crate::error::{GraphError, Result};
use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexSet;
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::{debug, warn};

/// Numbers above this are taken as milliseconds rather than seconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Parse JSON text and normalize it
pub fn normalize_str(raw: &str, config: &EngineConfig) -> Result<NormalizedGraph> {
    let value: Value = serde_json::from_str(raw)?;
    normalize(&value, config)
}

/// Normalize a payload into `local` and `remote` views sharing one commit pool
pub fn normalize(raw: &Value, config: &EngineConfig) -> Result<NormalizedGraph> {
    let payload = raw
        .as_object()
        .ok_or_else(|| GraphError::Payload(format!("expected a JSON object, got {}", kind_of(raw))))?;

    let local_section = section(payload, "local");
    let remote_section = section(payload, "remote");

    let current_branch = str_field(payload, "currentBranch")
        .or_else(|| local_section.and_then(|s| str_field(s, "currentBranch")))
        .unwrap_or(config.main_branch.as_str())
        .to_string();

    let mut commits = collect_commits(payload, local_section, remote_section);

    let local_heads = payload
        .get("branchHeads")
        .or_else(|| local_section.and_then(|s| s.get("branchHeads")));
    let remote_heads = remote_section.and_then(|s| s.get("branchHeads"));

    let modern = local_heads.is_some()
        || remote_heads.is_some()
        || commits_carry_membership(payload, local_section, remote_section);

    let (local_heads, remote_heads) = if modern {
        (string_map(local_heads), string_map(remote_heads))
    } else {
        debug!(branch = %current_branch, "payload has no branch data, using legacy shape");
        for commit in &mut commits {
            commit.branches = vec![current_branch.clone()];
        }
        let mut heads = BranchHeads::new();
        if let Some(newest) = commits.first() {
            heads.insert(current_branch.clone(), newest.hash.clone());
        }
        (heads, BranchHeads::new())
    };

    let fork_points: ForkPoints = string_map(
        payload
            .get("forkPoints")
            .or_else(|| local_section.and_then(|s| s.get("forkPoints"))),
    );

    let local = build_view(&current_branch, local_heads, &commits, &fork_points);
    let remote = build_view(&current_branch, remote_heads, &commits, &fork_points);

    Ok(NormalizedGraph { local, remote })
}

fn build_view(
    current_branch: &str,
    branch_heads: BranchHeads,
    commits: &[Commit],
    fork_points: &ForkPoints,
) -> GraphView {
    let mut branches: IndexSet<String> = branch_heads.keys().cloned().collect();
    for commit in commits {
        branches.extend(commit.branches.iter().cloned());
    }

    GraphView {
        branches: branches.into_iter().collect(),
        current_branch: current_branch.to_string(),
        branch_heads,
        commits: commits.to_vec(),
        fork_points: fork_points.clone(),
    }
}

fn section<'a>(payload: &'a Map<String, Value>, name: &str) -> Option<&'a Map<String, Value>> {
    payload.get(name).and_then(Value::as_object)
}

fn commit_arrays<'a>(
    payload: &'a Map<String, Value>,
    local: Option<&'a Map<String, Value>>,
    remote: Option<&'a Map<String, Value>>,
) -> impl Iterator<Item = &'a Vec<Value>> {
    [Some(payload), local, remote]
        .into_iter()
        .flatten()
        .filter_map(|s| s.get("commits").and_then(Value::as_array))
}

fn commits_carry_membership(
    payload: &Map<String, Value>,
    local: Option<&Map<String, Value>>,
    remote: Option<&Map<String, Value>>,
) -> bool {
    commit_arrays(payload, local, remote)
        .flatten()
        .any(|c| c.get("branches").map(Value::is_array).unwrap_or(false))
}

/// Top-level commits, then local, then remote; first occurrence of a hash wins.
/// The result is newest first.
fn collect_commits(
    payload: &Map<String, Value>,
    local: Option<&Map<String, Value>>,
    remote: Option<&Map<String, Value>>,
) -> Vec<Commit> {
    let mut seen = HashSet::new();
    let mut commits = Vec::new();

    for (position, raw) in commit_arrays(payload, local, remote).flatten().enumerate() {
        let Some(commit) = parse_commit(raw) else {
            warn!(position, "dropping commit record without a hash");
            continue;
        };
        if seen.insert(commit.hash.clone()) {
            commits.push(commit);
        }
    }

    newest_first(commits)
}

/// Order the merged pool so every commit precedes its parents.
///
/// Sections may each be newest first while their concatenation is not, e.g. a
/// remote that is ahead of local. Among commits whose children are all placed,
/// the newest `committed_at` goes first, then payload order.
fn newest_first(commits: Vec<Commit>) -> Vec<Commit> {
    let index = HashIndex::from_commits(&commits);
    let slot: HashMap<&str, usize> = commits
        .iter()
        .enumerate()
        .map(|(i, c)| (c.hash.as_str(), i))
        .collect();

    let parents: Vec<IndexSet<usize>> = commits
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.parents
                .iter()
                .filter_map(|p| index.resolve(p))
                .filter_map(|p| slot.get(p).copied())
                .filter(|&p| p != i)
                .collect()
        })
        .collect();

    let mut children = vec![0usize; commits.len()];
    for &p in parents.iter().flatten() {
        children[p] += 1;
    }

    let mut ready: BinaryHeap<(Option<DateTime<Utc>>, Reverse<usize>)> = children
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n == 0)
        .map(|(i, _)| (commits[i].committed_at, Reverse(i)))
        .collect();

    let mut order = Vec::with_capacity(commits.len());
    while let Some((_, Reverse(i))) = ready.pop() {
        order.push(i);
        for &p in &parents[i] {
            children[p] -= 1;
            if children[p] == 0 {
                ready.push((commits[p].committed_at, Reverse(p)));
            }
        }
    }

    if order.len() < commits.len() {
        // parent cycle; whatever is left keeps payload order
        debug!(unordered = commits.len() - order.len(), "commit pool has a parent cycle");
        let placed: HashSet<usize> = order.iter().copied().collect();
        order.extend((0..commits.len()).filter(|i| !placed.contains(i)));
    }

    let mut slots: Vec<Option<Commit>> = commits.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

fn parse_commit(raw: &Value) -> Option<Commit> {
    let record = raw.as_object()?;
    let hash = str_field(record, "hash")?.to_string();

    let short_hash = str_field(record, "shortHash")
        .map(str::to_string)
        .unwrap_or_else(|| short_hash_of(&hash));

    let mut branches: IndexSet<String> = IndexSet::new();
    branches.extend(string_list(record.get("branches")));

    Some(Commit {
        short_hash,
        message: str_field(record, "message").unwrap_or_default().to_string(),
        author: author_of(record.get("author")),
        committed_at: record.get("committedAt").and_then(parse_timestamp),
        parents: string_list(record.get("parents")).collect::<Parents>(),
        branches: branches.into_iter().collect(),
        is_head: str_field(record, "isHead").map(str::to_string),
        files: file_list(record.get("files")),
        hash,
    })
}

/// Author may be a bare name or an object with a `name`
fn author_of(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Object(author)) => str_field(author, "name").unwrap_or_default().to_string(),
        _ => String::new(),
    }
}

/// Files may be bare paths or objects with a `path` or `filename`
fn file_list(raw: Option<&Value>) -> Vec<String> {
    let Some(items) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(path) => Some(path.as_str()),
            Value::Object(file) => str_field(file, "path").or_else(|| str_field(file, "filename")),
            _ => None,
        })
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(number) => {
            let value = number.as_i64()?;
            if value.abs() >= MILLIS_THRESHOLD {
                Utc.timestamp_millis_opt(value).single()
            } else {
                Utc.timestamp_opt(value, 0).single()
            }
        }
        _ => None,
    }
}

fn str_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn string_list(raw: Option<&Value>) -> impl Iterator<Item = String> + '_ {
    raw.and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// String-valued entries of a JSON object, in payload order
fn string_map(raw: Option<&Value>) -> BranchHeads {
    raw.and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| {
            let value = value.as_str().map(str::trim).filter(|s| !s.is_empty())?;
            Some((key.clone(), value.to_string()))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
