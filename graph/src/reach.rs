use crate::core::{Commit, GraphView, HashIndex};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::trace;

/// Canonical hashes reachable from `starts` by following parent links.
///
/// References are resolved through `index`, so heads and parents may be full,
/// short, or prefix forms. Unresolvable references are dropped silently.
pub fn reachable_hashes<'a, I>(starts: I, commits: &[Commit], index: &HashIndex) -> HashSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let by_hash: HashMap<&str, &Commit> = commits.iter().map(|c| (c.hash.as_str(), c)).collect();

    let mut queue: VecDeque<String> = starts.into_iter().map(str::to_string).collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut reachable: HashSet<String> = HashSet::new();

    while let Some(reference) = queue.pop_front() {
        if !visited.insert(reference.clone()) {
            continue;
        }
        let Some(canonical) = index.resolve(&reference) else {
            trace!(%reference, "unresolved reference skipped");
            continue;
        };
        let Some(commit) = by_hash.get(canonical) else {
            trace!(%reference, "reference outside this view skipped");
            continue;
        };
        if reachable.insert(commit.hash.clone()) {
            queue.extend(commit.parents.iter().cloned());
        }
    }

    reachable
}

/// Copy of `view` holding only commits reachable from one of its branch heads,
/// in their original order
pub fn prune_unreachable(view: &GraphView, index: &HashIndex) -> GraphView {
    let heads = view.branch_heads.values().map(String::as_str);
    let reachable = reachable_hashes(heads, &view.commits, index);

    let commits: Vec<Commit> = view
        .commits
        .iter()
        .filter(|c| reachable.contains(&c.hash))
        .cloned()
        .collect();

    if commits.len() < view.commits.len() {
        trace!(
            kept = commits.len(),
            dropped = view.commits.len() - commits.len(),
            "pruned unreachable commits"
        );
    }

    view.with_commits(commits)
}
