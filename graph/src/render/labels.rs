use crate::config::EngineConfig;
use crate::core::{GraphView, HashIndex};
use crate::layout::{Position, PositionMap};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Branch name -> color, shared by every view of one render
pub type BranchColors = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchLabel {
    pub point: Position,
    pub color: String,
}

/// Whether `branch` currently points at the same commit as main in `view`
pub fn coincides_with_main(view: &GraphView, branch: &str, main: &str, index: &HashIndex) -> bool {
    if branch == main {
        return false;
    }
    match (view.head_of(branch), view.head_of(main)) {
        (Some(head), Some(main_head)) => index.same_commit(head, main_head),
        _ => false,
    }
}

/// Assign colors across views: main gets its fixed color, every other branch the
/// next palette entry in first-encounter order.
///
/// Branches are met in branch-head order of each view, then as primary branches
/// of each layout. A branch whose head sits on main's head in every view that has
/// it contributes nothing visible and gets no color.
pub fn assign_colors(
    config: &EngineConfig,
    views: &[(&GraphView, &PositionMap)],
    index: &HashIndex,
) -> BranchColors {
    let main = config.main_branch.as_str();

    let mut candidates: IndexSet<&str> = IndexSet::new();
    for (view, _) in views {
        candidates.extend(view.branch_heads.keys().map(String::as_str));
    }
    for (_, positions) in views {
        candidates.extend(positions.iter().map(|p| p.branch.as_str()));
    }

    let mut colors = BranchColors::new();
    colors.insert(main.to_string(), config.main_color.clone());

    for branch in candidates {
        if branch == main || colors.contains_key(branch) || is_redundant(views, branch, main, index) {
            continue;
        }
        let color = config.palette_color(colors.len() - 1).to_string();
        colors.insert(branch.to_string(), color);
    }

    colors
}

fn is_redundant(views: &[(&GraphView, &PositionMap)], branch: &str, main: &str, index: &HashIndex) -> bool {
    let mut with_head = views
        .iter()
        .filter(|(view, _)| view.head_of(branch).is_some())
        .peekable();
    with_head.peek().is_some() && with_head.all(|(view, _)| coincides_with_main(view, branch, main, index))
}

/// Pick where each colored branch's label sits in one view.
///
/// Preference: the topmost commit exclusive to the branch, then the topmost commit
/// associated with it at all, then its head resolved through the alias index.
pub fn resolve_labels(
    view: &GraphView,
    positions: &PositionMap,
    index: &HashIndex,
    colors: &BranchColors,
    main: &str,
) -> IndexMap<String, BranchLabel> {
    let mut labels = IndexMap::new();

    for (branch, color) in colors {
        if coincides_with_main(view, branch, main, index) {
            continue;
        }
        let Some(point) = anchor_for(view, positions, index, branch) else {
            continue;
        };
        labels.insert(
            branch.clone(),
            BranchLabel {
                point: point.clone(),
                color: color.clone(),
            },
        );
    }

    labels
}

fn anchor_for<'p>(
    view: &GraphView,
    positions: &'p PositionMap,
    index: &HashIndex,
    branch: &str,
) -> Option<&'p Position> {
    topmost(positions, |p| p.is_exclusive_to(branch))
        .or_else(|| topmost(positions, |p| p.is_on(branch)))
        .or_else(|| {
            view.head_of(branch)
                .and_then(|head| positions.resolve(head, index))
        })
}

fn topmost<'p>(positions: &'p PositionMap, keep: impl Fn(&Position) -> bool) -> Option<&'p Position> {
    positions.iter().filter(|&p| keep(p)).min_by_key(|p| p.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BranchHeads, Commit};
    use pretty_assertions::assert_eq;

    fn commit(hash: &str, branches: &[&str]) -> Commit {
        Commit::new(hash.into(), vec![], None, "A".into(), String::new())
            .on_branches(branches.iter().copied())
    }

    fn heads(pairs: &[(&str, &str)]) -> BranchHeads {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn positioned(entries: &[(&Commit, i32, &str)]) -> PositionMap {
        let mut map = PositionMap::new();
        for (commit, y, branch) in entries {
            map.insert(Position::new(commit, 0, *y, branch));
        }
        map
    }

    #[test]
    fn test_colors_follow_first_encounter_and_cycle() {
        let mut config = EngineConfig::default();
        config.palette = vec!["#a".into(), "#b".into()];

        let local = GraphView {
            branch_heads: heads(&[("main", "m"), ("one", "x1"), ("two", "x2")]),
            ..Default::default()
        };
        let remote = GraphView {
            branch_heads: heads(&[("three", "x3"), ("one", "x1")]),
            ..Default::default()
        };
        let c = commit("y", &["four"]);
        let local_positions = positioned(&[(&c, 0, "four")]);
        let remote_positions = PositionMap::new();

        let colors = assign_colors(
            &config,
            &[(&local, &local_positions), (&remote, &remote_positions)],
            &HashIndex::new(),
        );
        let order: Vec<_> = colors.iter().map(|(b, c)| (b.as_str(), c.as_str())).collect();
        assert_eq!(
            order,
            vec![
                ("main", config.main_color.as_str()),
                ("one", "#a"),
                ("two", "#b"),
                ("three", "#a"),
                ("four", "#b"),
            ]
        );
    }

    #[test]
    fn test_branch_on_main_head_gets_no_color_or_label() {
        let config = EngineConfig::default();
        let m = commit("m1", &["main", "feature"]).head_of("main");
        let view = GraphView {
            branch_heads: heads(&[("main", "m1"), ("feature", "m1")]),
            commits: vec![m.clone()],
            ..Default::default()
        };
        let positions = positioned(&[(&m, 0, "main")]);
        let index = HashIndex::from_commits(&view.commits);

        let colors = assign_colors(&config, &[(&view, &positions)], &index);
        assert!(!colors.contains_key("feature"));

        // even with a color handed in, the label is suppressed
        let mut forced = colors.clone();
        forced.insert("feature".into(), "#f".into());
        let labels = resolve_labels(&view, &positions, &index, &forced, "main");
        assert!(labels.contains_key("main"));
        assert!(!labels.contains_key("feature"));
    }

    #[test]
    fn test_abbreviated_head_still_coincides() {
        let c = commit("abcdef123456", &["main"]);
        let view = GraphView {
            branch_heads: heads(&[("main", "abcdef123456"), ("feature", "abcdef1")]),
            commits: vec![c],
            ..Default::default()
        };
        let index = HashIndex::from_commits(&view.commits);
        assert!(coincides_with_main(&view, "feature", "main", &index));
        assert!(!coincides_with_main(&view, "main", "main", &index));
    }

    #[test]
    fn test_shared_prefix_is_not_coincidence() {
        let commits = vec![commit("c1", &["main"]), commit("c10", &["feature"])];
        let view = GraphView {
            branch_heads: heads(&[("main", "c1"), ("feature", "c10")]),
            commits,
            ..Default::default()
        };
        let index = HashIndex::from_commits(&view.commits);
        assert!(!coincides_with_main(&view, "feature", "main", &index));

        let positions = positioned(&[(&view.commits[0], 0, "main"), (&view.commits[1], 10, "feature")]);
        let colors = assign_colors(&EngineConfig::default(), &[(&view, &positions)], &index);
        assert!(colors.contains_key("feature"));
        let labels = resolve_labels(&view, &positions, &index, &colors, "main");
        assert_eq!(labels["feature"].point.hash, "c10");
    }

    #[test]
    fn test_anchor_preference() {
        let shared = commit("s", &["main", "feature"]);
        let exclusive_old = commit("e1", &["feature"]);
        let exclusive_new = commit("e2", &["feature"]);
        let view = GraphView {
            branch_heads: heads(&[("main", "s"), ("feature", "e2")]),
            ..Default::default()
        };
        let positions = positioned(&[
            (&shared, 0, "main"),
            (&exclusive_old, 10, "feature"),
            (&exclusive_new, 20, "feature"),
        ]);
        let index = HashIndex::new();

        assert_eq!(anchor_for(&view, &positions, &index, "feature").unwrap().hash, "e1");
        // main has no exclusive commit, falls to the topmost associated one
        assert_eq!(anchor_for(&view, &positions, &index, "main").unwrap().hash, "s");
    }

    #[test]
    fn test_anchor_from_head_when_nothing_associated() {
        let c = commit("abcdef123456", &["main"]);
        let view = GraphView {
            branch_heads: heads(&[("main", "abcdef123456"), ("release", "abcdef1234")]),
            commits: vec![c.clone()],
            ..Default::default()
        };
        let positions = positioned(&[(&c, 0, "main")]);
        let index = HashIndex::from_commits(&view.commits);
        assert_eq!(
            anchor_for(&view, &positions, &index, "release").unwrap().hash,
            "abcdef123456"
        );
        assert!(anchor_for(&view, &positions, &index, "ghost").is_none());
    }
}
