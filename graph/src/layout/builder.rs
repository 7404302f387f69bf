use super::position::{Position, PositionMap};
use crate::config::EngineConfig;
use crate::core::{BranchHeads, GraphView};
use crate::topology::Attribution;
use indexmap::IndexMap;

/// Branch name -> column x
pub type Columns = IndexMap<String, i32>;

/// Result of laying out one view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub positions: PositionMap,
    pub columns: Columns,
}

/// Assigns every commit of a view an (x, y) coordinate.
///
/// Columns are per branch: main sits at `base_x` and each other branch takes the
/// next free column in branch-head order. Rows are a single timeline shared by all
/// columns, oldest commit first, so `y` tells when a commit happened relative to
/// every other commit regardless of branch.
pub struct LayoutEngine<'a> {
    config: &'a EngineConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn columns(&self, heads: &BranchHeads) -> Columns {
        let mut columns = Columns::new();
        columns.insert(self.config.main_branch.clone(), self.config.base_x);

        for branch in heads.keys() {
            if columns.contains_key(branch) {
                continue;
            }
            let x = self.config.base_x + self.config.column_spacing * columns.len() as i32;
            columns.insert(branch.clone(), x);
        }

        columns
    }

    /// Lay out `view`, whose commits arrive newest first.
    ///
    /// `attributions` is keyed by canonical hash; commits without one are drawn on main.
    pub fn layout(&self, view: &GraphView, attributions: &IndexMap<String, Attribution>) -> Layout {
        let columns = self.columns(&view.branch_heads);
        let main = self.config.main_branch.as_str();
        let main_x = columns.get(main).copied().unwrap_or(self.config.base_x);

        let mut positions = PositionMap::new();
        for (row, commit) in view.commits.iter().rev().enumerate() {
            let branch = attributions
                .get(&commit.hash)
                .map(|a| a.branch(main))
                .unwrap_or(main);
            let x = columns.get(branch).copied().unwrap_or(main_x);
            let y = self.config.base_y + self.config.row_spacing * row as i32;
            positions.insert(Position::new(commit, x, y, branch));
        }

        Layout { positions, columns }
    }
}
