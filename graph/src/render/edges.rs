use crate::core::{edge_key, Edge, EdgeKind, HashIndex, Point};
use crate::highlight::HighlightState;
use crate::layout::{Position, PositionMap};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// Edge key -> edge, in layout order
pub type LineSegments = IndexMap<String, Edge>;

/// Builds parent -> child lines for every positioned commit
pub struct EdgeSynthesizer<'a> {
    index: &'a HashIndex,
    colors: &'a IndexMap<String, String>,
    neutral_color: &'a str,
    highlight: Option<&'a HighlightState>,
}

impl<'a> EdgeSynthesizer<'a> {
    pub fn new(
        index: &'a HashIndex,
        colors: &'a IndexMap<String, String>,
        neutral_color: &'a str,
        highlight: Option<&'a HighlightState>,
    ) -> Self {
        Self {
            index,
            colors,
            neutral_color,
            highlight,
        }
    }

    pub fn synthesize(&self, positions: &PositionMap) -> LineSegments {
        let mut segments = LineSegments::new();
        // dedupe on coordinates, not hashes, so aliases of one node pair collapse
        let mut drawn: HashSet<(Point, Point)> = HashSet::new();

        for child in positions {
            for reference in &child.parents {
                let Some(parent) = positions.resolve(reference, self.index) else {
                    debug!(child = %child.hash, parent = %reference, "parent has no position, edge skipped");
                    continue;
                };
                if !drawn.insert((parent.point(), child.point())) {
                    continue;
                }

                let edge = Edge {
                    parent: parent.hash.clone(),
                    child: child.hash.clone(),
                    points: [parent.point(), child.point()],
                    color: self.color_for(parent, child).to_string(),
                    kind: if child.is_merge {
                        EdgeKind::Merge
                    } else {
                        EdgeKind::Normal
                    },
                    recent: self.is_recent(child),
                };
                segments.insert(edge_key(&parent.hash, &child.hash), edge);
            }
        }

        segments
    }

    fn branch_color(&self, branch: &str) -> Option<&str> {
        self.colors.get(branch).map(String::as_str)
    }

    fn color_for(&self, parent: &Position, child: &Position) -> &str {
        if parent.x != child.x {
            self.branch_color(&child.branch)
                .or_else(|| self.branch_color(&parent.branch))
                .unwrap_or(self.neutral_color)
        } else {
            self.branch_color(&child.branch).unwrap_or(self.neutral_color)
        }
    }

    fn is_recent(&self, child: &Position) -> bool {
        let Some(highlight) = self.highlight.filter(|h| h.is_merge()) else {
            return false;
        };
        match &highlight.commit_hash {
            Some(hash) => self.index.same_commit(hash, &child.hash),
            None => child.branch == highlight.target,
        }
    }
}
