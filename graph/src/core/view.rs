use super::node::Commit;
use indexmap::IndexMap;
use serde::Serialize;

/// Branch name -> head commit hash, in backend order
pub type BranchHeads = IndexMap<String, String>;

/// Branch name -> best-effort hash where the branch left main
pub type ForkPoints = IndexMap<String, String>;

/// One side (local or remote) of a repository's commit graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphView {
    pub branches: Vec<String>,
    pub current_branch: String,
    pub branch_heads: BranchHeads,
    /// Newest first, as the backend sends them
    pub commits: Vec<Commit>,
    pub fork_points: ForkPoints,
}

impl GraphView {
    pub fn head_of(&self, branch: &str) -> Option<&str> {
        self.branch_heads.get(branch).map(String::as_str)
    }

    pub fn fork_point_of(&self, branch: &str) -> Option<&str> {
        self.fork_points.get(branch).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.branch_heads.is_empty()
    }

    /// Same view with a different commit list
    pub fn with_commits(&self, commits: Vec<Commit>) -> Self {
        Self {
            branches: self.branches.clone(),
            current_branch: self.current_branch.clone(),
            branch_heads: self.branch_heads.clone(),
            commits,
            fork_points: self.fork_points.clone(),
        }
    }

    /// Get statistics about the view
    pub fn stats(&self) -> ViewStats {
        ViewStats {
            total_commits: self.commits.len(),
            merge_commits: self.commits.iter().filter(|c| c.is_merge()).count(),
            root_commits: self.commits.iter().filter(|c| c.is_root()).count(),
            branch_heads: self.branch_heads.len(),
        }
    }
}

/// Both views of a fetched repository graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedGraph {
    pub local: GraphView,
    pub remote: GraphView,
}

impl NormalizedGraph {
    /// Commits of both views, local first; shared commits appear twice
    pub fn commit_pool(&self) -> impl Iterator<Item = &Commit> {
        self.local.commits.iter().chain(self.remote.commits.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    pub total_commits: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    pub branch_heads: usize,
}
