//! Decides which branch "owns" each commit for layout purposes.
//!
//! A commit can belong to many branches, but it is drawn in exactly one column.
//! The owner is chosen by a fixed precedence of rules, each of which is its own
//! function returning an [`Attribution`]:
//!
//! 1. the commit is some branch's tip (`is_head`),
//! 2. a first-parent walk from a non-main branch head reached it before the fork point,
//! 3. it is on main,
//! 4. the first branch it lists,
//! 5. main.

use crate::core::{Commit, GraphView, HashIndex};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Why a commit was given its branch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attribution {
    ExplicitHead(String),
    ForkTracked(String),
    MainMembership,
    FirstListed(String),
    DefaultMain,
}

impl Attribution {
    /// The branch this attribution selects
    pub fn branch<'a>(&'a self, main: &'a str) -> &'a str {
        match self {
            Attribution::ExplicitHead(branch)
            | Attribution::ForkTracked(branch)
            | Attribution::FirstListed(branch) => branch,
            Attribution::MainMembership | Attribution::DefaultMain => main,
        }
    }
}

/// Commits owned by non-main branches, found by walking first parents back
/// from each branch head
#[derive(Debug, Clone, Default)]
pub struct BranchTopology {
    owners: HashMap<String, String>,
}

impl BranchTopology {
    pub fn build(view: &GraphView, index: &HashIndex, main: &str) -> Self {
        let by_hash: HashMap<&str, &Commit> =
            view.commits.iter().map(|c| (c.hash.as_str(), c)).collect();
        let mut owners: HashMap<String, String> = HashMap::new();

        for (branch, head) in &view.branch_heads {
            if branch == main {
                continue;
            }
            let fork_point = view.fork_point_of(branch).and_then(|f| index.resolve(f));

            let mut walked: HashSet<&str> = HashSet::new();
            let mut cursor = index.resolve(head);
            let mut at_head = true;

            while let Some(hash) = cursor {
                if Some(hash) == fork_point || !walked.insert(hash) {
                    break;
                }
                let Some(commit) = by_hash.get(hash) else {
                    break;
                };
                // without a fork point, main membership marks where the branch left
                if !at_head && fork_point.is_none() && commit.belongs_to(main) {
                    break;
                }
                // the branch earlier in head order keeps a shared commit
                owners
                    .entry(commit.hash.clone())
                    .or_insert_with(|| branch.clone());

                at_head = false;
                cursor = commit.first_parent().and_then(|p| index.resolve(p));
            }

            trace!(%branch, walked = walked.len(), "walked branch topology");
        }

        Self { owners }
    }

    pub fn owner(&self, hash: &str) -> Option<&str> {
        self.owners.get(hash).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

pub fn explicit_head(commit: &Commit) -> Option<Attribution> {
    commit.is_head.clone().map(Attribution::ExplicitHead)
}

pub fn fork_tracked(commit: &Commit, topology: &BranchTopology) -> Option<Attribution> {
    topology
        .owner(&commit.hash)
        .map(|branch| Attribution::ForkTracked(branch.to_string()))
}

pub fn main_membership(commit: &Commit, main: &str) -> Option<Attribution> {
    commit.belongs_to(main).then_some(Attribution::MainMembership)
}

pub fn first_listed(commit: &Commit) -> Option<Attribution> {
    commit.branches.first().cloned().map(Attribution::FirstListed)
}

/// Apply the rules in precedence order
pub fn attribute(commit: &Commit, topology: &BranchTopology, main: &str) -> Attribution {
    explicit_head(commit)
        .or_else(|| fork_tracked(commit, topology))
        .or_else(|| main_membership(commit, main))
        .or_else(|| first_listed(commit))
        .unwrap_or(Attribution::DefaultMain)
}

/// Attribution for every commit of `view`, keyed by canonical hash, in view order
pub fn assign(view: &GraphView, index: &HashIndex, main: &str) -> IndexMap<String, Attribution> {
    let topology = BranchTopology::build(view, index, main);
    view.commits
        .iter()
        .map(|commit| (commit.hash.clone(), attribute(commit, &topology, main)))
        .collect()
}
