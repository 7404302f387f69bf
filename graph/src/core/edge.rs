use serde::Serialize;

/// A layout coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Regular parent-child relationship
    Normal,
    /// Edge out of a commit with several parents
    Merge,
}

/// A line between a parent commit and one of its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Canonical hash of the parent endpoint
    pub parent: String,
    /// Canonical hash of the child endpoint
    pub child: String,
    /// Parent point first, child point second
    pub points: [Point; 2],
    pub color: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    /// Touched by the live merge highlight
    pub recent: bool,
}

impl Edge {
    pub fn key(&self) -> String {
        edge_key(&self.parent, &self.child)
    }

    pub fn is_merge(&self) -> bool {
        self.kind == EdgeKind::Merge
    }
}

pub fn edge_key(parent: &str, child: &str) -> String {
    format!("{parent}->{child}")
}
