use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Layout, palette and timing settings for the engine.
///
/// Every field may be omitted from a TOML file; missing ones keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Branch that owns the fixed base column and color
    pub main_branch: String,
    /// x of the main column
    pub base_x: i32,
    /// Horizontal distance between branch columns
    pub column_spacing: i32,
    /// y of the oldest commit
    pub base_y: i32,
    /// Vertical distance between consecutive commits
    pub row_spacing: i32,
    pub main_color: String,
    /// Color for edges whose branches have no color
    pub neutral_color: String,
    /// Colors handed out to non-main branches, cycling
    pub palette: Vec<String>,
    pub highlight_ttl_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            main_branch: "main".to_string(),
            base_x: 60,
            column_spacing: 120,
            base_y: 40,
            row_spacing: 60,
            main_color: "#3b82f6".to_string(),
            neutral_color: "#9ca3af".to_string(),
            palette: [
                "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
                "#6366f1",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            highlight_ttl_ms: 3000,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Palette entry for the n-th non-main branch
    pub fn palette_color(&self, n: usize) -> &str {
        if self.palette.is_empty() {
            return &self.neutral_color;
        }
        &self.palette[n % self.palette.len()]
    }

    pub fn highlight_ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.highlight_ttl_ms.min(i64::MAX as u64) as i64)
    }

    pub fn is_main(&self, branch: &str) -> bool {
        branch == self.main_branch
    }
}
