//! Which commits a pull or push would move between the local and remote views.
//!
//! This is a linear-history approximation of `git log dest..source`: the newest
//! destination commit the source also has is taken as the shared base, and every
//! source commit newer than it is missing on the other side. No merge base is
//! computed.

use crate::core::{Commit, GraphView, HashIndex, NormalizedGraph};
use crate::error::GraphError;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// remote -> local
    Pull,
    /// local -> remote
    Push,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Pull => "pull",
            Direction::Push => "push",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pull" => Ok(Direction::Pull),
            "push" => Ok(Direction::Push),
            _ => Err(GraphError::Direction(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferCommit {
    pub hash: String,
    pub message: String,
    pub files: Vec<String>,
}

impl From<&Commit> for TransferCommit {
    fn from(commit: &Commit) -> Self {
        Self {
            hash: commit.hash.clone(),
            message: commit.message.clone(),
            files: commit.files.clone(),
        }
    }
}

/// Commits one side lacks, plus every path they touch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transfer {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub branch: String,
    pub commits: Vec<TransferCommit>,
    pub files: Vec<String>,
}

impl Transfer {
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Compare newest-first histories of `branch` on both sides.
///
/// Commits are matched through `index`, so abbreviated and full hashes of one
/// commit agree while distinct commits sharing a prefix do not.
pub fn analyze(
    branch: &str,
    local: &[Commit],
    remote: &[Commit],
    direction: Direction,
    index: &HashIndex,
) -> Transfer {
    let (source, destination) = match direction {
        Direction::Pull => (remote, local),
        Direction::Push => (local, remote),
    };

    let missing = match common_base(source, destination, index) {
        Some(i) => &source[..i],
        None => source,
    };

    let mut files: IndexSet<&str> = IndexSet::new();
    for commit in missing {
        files.extend(commit.files.iter().map(String::as_str));
    }

    debug!(%branch, %direction, missing = missing.len(), "transfer analyzed");

    Transfer {
        direction,
        branch: branch.to_string(),
        commits: missing.iter().map(TransferCommit::from).collect(),
        files: files.into_iter().map(str::to_string).collect(),
    }
}

/// Last index in `source` of the newest destination commit it shares
fn common_base(source: &[Commit], destination: &[Commit], index: &HashIndex) -> Option<usize> {
    destination.iter().find_map(|base| {
        source
            .iter()
            .rposition(|commit| index.same_commit(&commit.hash, &base.hash))
    })
}

/// Newest-first first-parent history of `branch` within `view`.
///
/// Walks from the branch head through the view's own commits; stops at the
/// first reference the view cannot resolve or at a repeat.
pub fn branch_history(view: &GraphView, branch: &str, index: &HashIndex) -> Vec<Commit> {
    let Some(head) = view.head_of(branch) else {
        return Vec::new();
    };

    let mut history = Vec::new();
    let mut seen = HashSet::new();
    let mut next = Some(head.to_string());

    while let Some(reference) = next.take() {
        let Some(canonical) = index.resolve(&reference) else {
            break;
        };
        let Some(commit) = view.commits.iter().find(|c| c.hash == canonical) else {
            break;
        };
        if !seen.insert(commit.hash.clone()) {
            break;
        }
        next = commit.first_parent().map(str::to_string);
        history.push(commit.clone());
    }

    history
}

/// Transfer for `branch` between the two views of `graph`
pub fn transfer_for(graph: &NormalizedGraph, branch: &str, direction: Direction, index: &HashIndex) -> Transfer {
    let local = branch_history(&graph.local, branch, index);
    let remote = branch_history(&graph.remote, branch, index);
    analyze(branch, &local, &remote, direction, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BranchHeads;
    use pretty_assertions::assert_eq;

    fn commit(hash: &str, parents: &[&str], files: &[&str]) -> Commit {
        Commit::new(
            hash.to_string(),
            parents.iter().map(|p| p.to_string()).collect(),
            None,
            "Test".to_string(),
            format!("commit {hash}"),
        )
        .with_files(files.iter().copied())
    }

    fn run(local: &[Commit], remote: &[Commit], direction: Direction) -> Transfer {
        let index = HashIndex::from_commits(local.iter().chain(remote));
        analyze("main", local, remote, direction, &index)
    }

    fn hashes(transfer: &Transfer) -> Vec<&str> {
        transfer.commits.iter().map(|c| c.hash.as_str()).collect()
    }

    fn linear() -> Vec<Commit> {
        vec![
            commit("c3", &["c2"], &["src/lib.rs", "README.md"]),
            commit("c2", &["c1"], &["src/lib.rs"]),
            commit("c1", &[], &["Cargo.toml"]),
        ]
    }

    #[test]
    fn test_push_ahead() {
        let local = linear();
        let remote = local[1..].to_vec();

        let push = run(&local, &remote, Direction::Push);
        assert_eq!(hashes(&push), vec!["c3"]);
        assert_eq!(push.files, vec!["src/lib.rs", "README.md"]);

        let pull = run(&local, &remote, Direction::Pull);
        assert!(pull.is_empty());
        assert!(pull.files.is_empty());
    }

    #[test]
    fn test_no_common_base_takes_everything() {
        let local = linear();
        let remote = vec![commit("r1", &[], &["remote.txt"])];

        let pull = run(&local, &remote, Direction::Pull);
        assert_eq!(hashes(&pull), vec!["r1"]);
        assert_eq!(pull.files, vec!["remote.txt"]);

        let push = run(&local, &remote, Direction::Push);
        assert_eq!(hashes(&push), vec!["c3", "c2", "c1"]);
    }

    #[test]
    fn test_abbreviated_hashes_share_a_base() {
        let local = vec![
            commit("aaaa3333ffff", &["aaaa2222ffff"], &[]),
            commit("aaaa2222ffff", &[], &[]),
        ];
        // the remote side only knows the short form
        let remote = vec![commit("aaaa222", &[], &[])];
        let index = HashIndex::from_commits(&local);
        let push = analyze("main", &local, &remote, Direction::Push, &index);
        assert_eq!(hashes(&push), vec!["aaaa3333ffff"]);
    }

    #[test]
    fn test_shared_prefix_is_not_a_base() {
        let local = vec![commit("c2", &["c1"], &[]), commit("c1", &[], &[])];
        let remote = vec![commit("c10", &[], &[])];

        let push = run(&local, &remote, Direction::Push);
        assert_eq!(hashes(&push), vec!["c2", "c1"]);
        let pull = run(&local, &remote, Direction::Pull);
        assert_eq!(hashes(&pull), vec!["c10"]);
    }

    #[test]
    fn test_idempotent() {
        let local = linear();
        let remote = vec![commit("c1", &[], &[])];
        let first = serde_json::to_vec(&run(&local, &remote, Direction::Push)).unwrap();
        let second = serde_json::to_vec(&run(&local, &remote, Direction::Push)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wire_format() {
        let transfer = run(&linear(), &[], Direction::Push);
        let json = serde_json::to_value(&transfer).unwrap();
        assert_eq!(json["type"], "push");
        assert_eq!(json["branch"], "main");
        assert_eq!(json["commits"][0]["hash"], "c3");
        assert_eq!(json["files"], serde_json::json!(["src/lib.rs", "README.md", "Cargo.toml"]));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("pull".parse::<Direction>().unwrap(), Direction::Pull);
        assert_eq!("PUSH".parse::<Direction>().unwrap(), Direction::Push);
        assert!(matches!("sideways".parse::<Direction>(), Err(GraphError::Direction(_))));
    }

    #[test]
    fn test_branch_history_follows_first_parent() {
        let mut heads = BranchHeads::new();
        heads.insert("main".into(), "m2".into());
        let view = GraphView {
            branch_heads: heads,
            commits: vec![
                commit("m2", &["m1", "f1"], &[]),
                commit("f1", &["m0"], &[]),
                commit("m1", &["m0"], &[]),
                commit("m0", &[], &[]),
            ],
            ..Default::default()
        };
        let index = HashIndex::from_commits(&view.commits);

        let history: Vec<_> = branch_history(&view, "main", &index)
            .into_iter()
            .map(|c| c.hash)
            .collect();
        assert_eq!(history, vec!["m2", "m1", "m0"]);
        assert!(branch_history(&view, "missing", &index).is_empty());
    }

    #[test]
    fn test_transfer_between_views() {
        let mut local_heads = BranchHeads::new();
        local_heads.insert("main".into(), "c3".into());
        let mut remote_heads = BranchHeads::new();
        remote_heads.insert("main".into(), "c2".into());

        let graph = NormalizedGraph {
            local: GraphView {
                branch_heads: local_heads,
                commits: linear(),
                ..Default::default()
            },
            remote: GraphView {
                branch_heads: remote_heads,
                commits: linear(),
                ..Default::default()
            },
        };
        let index = HashIndex::from_commits(graph.commit_pool());

        assert_eq!(hashes(&transfer_for(&graph, "main", Direction::Push, &index)), vec!["c3"]);
        assert!(transfer_for(&graph, "main", Direction::Pull, &index).is_empty());
    }
}
