/// Why the graph is being fetched again
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    /// Another repository was selected
    RepositoryChanged(String),
    /// A commit, reset, push or pull changed the graph
    GraphDirty,
    SimplifiedToggled(bool),
    /// The refetch following a successful merge
    MergeApplied,
}

impl RefreshEvent {
    /// Only the merge's own refetch leaves the merge highlight in place
    pub fn keeps_highlight(&self) -> bool {
        matches!(self, RefreshEvent::MergeApplied)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RefreshEvent::RepositoryChanged(_) => "repository-changed",
            RefreshEvent::GraphDirty => "graph-dirty",
            RefreshEvent::SimplifiedToggled(_) => "simplified-toggled",
            RefreshEvent::MergeApplied => "merge-applied",
        }
    }
}
