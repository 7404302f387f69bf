use chrono::{DateTime, Utc};
use serde::Serialize;
use smallvec::SmallVec;

/// Length of the abbreviated hash derived when the backend omits one
pub const SHORT_HASH_LEN: usize = 7;

/// Parent hashes in order; almost every commit has one or two
pub type Parents = SmallVec<[String; 2]>;

/// A commit as delivered by the repository backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Canonical commit ID (SHA, possibly abbreviated by the server)
    pub hash: String,
    /// Abbreviated alias of `hash`
    pub short_hash: String,
    /// Commit message (short)
    pub message: String,
    /// Author name
    pub author: String,
    /// Commit timestamp, if the backend sent a parseable one
    pub committed_at: Option<DateTime<Utc>>,
    /// Parent commit IDs, first parent first
    pub parents: Parents,
    /// Branches this commit is reachable from
    pub branches: Vec<String>,
    /// Branch whose tip is exactly this commit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_head: Option<String>,
    /// Paths touched by this commit
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl Commit {
    pub fn new(
        hash: String,
        parents: Vec<String>,
        committed_at: Option<DateTime<Utc>>,
        author: String,
        message: String,
    ) -> Self {
        let short_hash = short_hash_of(&hash);
        Self {
            hash,
            short_hash,
            message,
            author,
            committed_at,
            parents: Parents::from_vec(parents),
            branches: Vec::new(),
            is_head: None,
            files: Vec::new(),
        }
    }

    /// Replace the branch membership list
    pub fn on_branches<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.branches = branches.into_iter().map(Into::into).collect();
        self
    }

    /// Mark this commit as the tip of `branch`
    pub fn head_of(mut self, branch: impl Into<String>) -> Self {
        self.is_head = Some(branch.into());
        self
    }

    pub fn with_short_hash(mut self, short_hash: impl Into<String>) -> Self {
        self.short_hash = short_hash.into();
        self
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    pub fn belongs_to(&self, branch: &str) -> bool {
        self.branches.iter().any(|b| b == branch)
    }
}

/// Abbreviate a hash the way the backend does when it sends none
pub fn short_hash_of(hash: &str) -> String {
    hash.get(..SHORT_HASH_LEN).unwrap_or(hash).to_string()
}
