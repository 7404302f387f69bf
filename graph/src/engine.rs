use crate::config::EngineConfig;
use crate::core::{GraphView, HashIndex, NormalizedGraph};
use crate::divergence::{self, Direction, Transfer};
use crate::highlight::HighlightState;
use crate::layout::{Layout, LayoutEngine, PositionMap};
use crate::reach;
use crate::render::{assign_colors, resolve_labels, BranchColors, BranchLabel, EdgeSynthesizer, LineSegments};
use crate::topology;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// Everything the renderer needs for one view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedView {
    pub positions: PositionMap,
    pub branch_labels: IndexMap<String, BranchLabel>,
    pub line_segments: LineSegments,
    pub branch_color_map: BranchColors,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedGraph {
    pub local: RenderedView,
    pub remote: RenderedView,
}

/// Graph engine entrypoint: normalized graph in, drawable views out.
///
/// Rendering is pure; the same graph and highlight always give the same output.
#[derive(Debug, Clone, Default)]
pub struct GraphEngine {
    config: EngineConfig,
}

impl GraphEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn render(&self, graph: &NormalizedGraph, highlight: Option<&HighlightState>) -> RenderedGraph {
        let index = HashIndex::from_commits(graph.commit_pool());
        let local = self.lay_out(&graph.local, &index);
        let remote = self.lay_out(&graph.remote, &index);

        // one color per branch across both panels
        let colors = assign_colors(
            &self.config,
            &[(&local.0, &local.1.positions), (&remote.0, &remote.1.positions)],
            &index,
        );

        RenderedGraph {
            local: self.finish(&local.0, local.1, &index, &colors, highlight),
            remote: self.finish(&remote.0, remote.1, &index, &colors, highlight),
        }
    }

    /// Commits `direction` would move for `branch`
    pub fn transfer(&self, graph: &NormalizedGraph, branch: &str, direction: Direction) -> Transfer {
        let index = HashIndex::from_commits(graph.commit_pool());
        divergence::transfer_for(graph, branch, direction, &index)
    }

    fn lay_out(&self, view: &GraphView, index: &HashIndex) -> (GraphView, Layout) {
        let pruned = reach::prune_unreachable(view, index);
        let attributions = topology::assign(&pruned, index, &self.config.main_branch);
        let layout = LayoutEngine::new(&self.config).layout(&pruned, &attributions);
        debug!(stats = ?pruned.stats(), columns = layout.columns.len(), "view laid out");
        (pruned, layout)
    }

    fn finish(
        &self,
        view: &GraphView,
        layout: Layout,
        index: &HashIndex,
        colors: &BranchColors,
        highlight: Option<&HighlightState>,
    ) -> RenderedView {
        let line_segments =
            EdgeSynthesizer::new(index, colors, &self.config.neutral_color, highlight).synthesize(&layout.positions);
        let branch_labels = resolve_labels(view, &layout.positions, index, colors, &self.config.main_branch);

        RenderedView {
            positions: layout.positions,
            branch_labels,
            line_segments,
            branch_color_map: colors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{MergeOutcome, MergeRequest};
    use crate::ingest;
    use chrono::Utc;
    use serde_json::json;

    fn payload() -> NormalizedGraph {
        let raw = json!({
            "currentBranch": "main",
            "commits": [
                { "hash": "m2", "parents": ["m1", "f2"], "branches": ["main"], "isHead": "main" },
                { "hash": "f2", "parents": ["f1"], "branches": ["main", "feature"], "isHead": "feature" },
                { "hash": "f1", "parents": ["m1"], "branches": ["main", "feature"] },
                { "hash": "m1", "parents": [], "branches": ["main", "feature"] },
                { "hash": "stray", "parents": [], "branches": [] }
            ],
            "branchHeads": { "main": "m2", "feature": "f2" },
            "forkPoints": { "feature": "m1" },
            "remote": { "branchHeads": { "main": "m1" } }
        });
        ingest::normalize(&raw, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_render_prunes_and_shares_colors() {
        let rendered = GraphEngine::default().render(&payload(), None);

        assert!(rendered.local.positions.get("stray").is_none());
        assert_eq!(rendered.local.positions.len(), 4);
        // remote only reaches m1
        assert_eq!(rendered.remote.positions.len(), 1);
        assert_eq!(rendered.local.branch_color_map, rendered.remote.branch_color_map);
        assert!(rendered.local.branch_labels.contains_key("feature"));
        // no feature head on the remote, so its label falls back to a member commit
        assert_eq!(rendered.remote.branch_labels["feature"].point.hash, "m1");
    }

    #[test]
    fn test_merge_highlight_marks_merge_edges() {
        let request = MergeRequest::new("feature", "main");
        let outcome = MergeOutcome {
            fast_forward: false,
            merge_commit_hash: Some("m2".into()),
            has_conflict: false,
        };
        let state = HighlightState::from_merge(&request, &outcome, Utc::now()).unwrap();
        let rendered = GraphEngine::default().render(&payload(), Some(&state));

        let recent: Vec<_> = rendered
            .local
            .line_segments
            .values()
            .filter(|e| e.recent)
            .map(|e| e.child.as_str())
            .collect();
        assert_eq!(recent, vec!["m2", "m2"]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let engine = GraphEngine::default();
        let graph = payload();
        let first = serde_json::to_string(&engine.render(&graph, None)).unwrap();
        let second = serde_json::to_string(&engine.render(&graph, None)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_transfer_through_engine() {
        let transfer = GraphEngine::default().transfer(&payload(), "main", Direction::Push);
        let hashes: Vec<_> = transfer.commits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, vec!["m2"]);
    }
}
