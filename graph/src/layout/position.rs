use crate::core::{Commit, HashIndex, Parents, Point};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Where a commit is drawn, plus the commit data the renderer shows next to it
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub x: i32,
    pub y: i32,
    /// Primary branch, the one whose column holds this commit
    pub branch: String,
    pub branches: Vec<String>,
    pub hash: String,
    pub short_hash: String,
    pub message: String,
    pub author: String,
    pub committed_at: Option<DateTime<Utc>>,
    pub parents: Parents,
    pub is_merge: bool,
    pub is_head: Option<String>,
}

impl Position {
    pub fn new(commit: &Commit, x: i32, y: i32, branch: &str) -> Self {
        Self {
            x,
            y,
            branch: branch.to_string(),
            branches: commit.branches.clone(),
            hash: commit.hash.clone(),
            short_hash: commit.short_hash.clone(),
            message: commit.message.clone(),
            author: commit.author.clone(),
            committed_at: commit.committed_at,
            parents: commit.parents.clone(),
            is_merge: commit.is_merge(),
            is_head: commit.is_head.clone(),
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Associated with `branch` by layout or by membership
    pub fn is_on(&self, branch: &str) -> bool {
        self.branch == branch || self.branches.iter().any(|b| b == branch)
    }

    /// Reachable from `branch` and from no other branch
    pub fn is_exclusive_to(&self, branch: &str) -> bool {
        !self.branches.is_empty() && self.branches.iter().all(|b| b == branch)
    }
}

/// Positions addressable by full hash and by short hash.
///
/// Both keys lead to the same stored position; iteration visits each position
/// once, in layout order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMap {
    positions: Vec<Position>,
    keys: IndexMap<String, usize>,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, position: Position) {
        let slot = self.positions.len();
        self.keys.insert(position.hash.clone(), slot);
        if !position.short_hash.is_empty() {
            self.keys.entry(position.short_hash.clone()).or_insert(slot);
        }
        self.positions.push(position);
    }

    /// Lookup by full or short hash
    pub fn get(&self, key: &str) -> Option<&Position> {
        self.keys.get(key).map(|&slot| &self.positions[slot])
    }

    /// Lookup by any reference the alias index can resolve
    pub fn resolve(&self, reference: &str, index: &HashIndex) -> Option<&Position> {
        self.get(reference)
            .or_else(|| index.resolve(reference).and_then(|canonical| self.get(canonical)))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Position> {
        self.positions.iter()
    }

    /// Every key, full and short
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl<'a> IntoIterator for &'a PositionMap {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for PositionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len()))?;
        for (key, &slot) in &self.keys {
            map.serialize_entry(key, &self.positions[slot])?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, short: &str, branches: &[&str]) -> Commit {
        Commit::new(hash.into(), vec![], None, "A".into(), "msg".into())
            .with_short_hash(short)
            .on_branches(branches.iter().copied())
    }

    #[test]
    fn test_both_keys_share_one_position() {
        let mut map = PositionMap::new();
        map.insert(Position::new(&commit("abcdef123456", "abcdef1", &["main"]), 10, 20, "main"));

        assert_eq!(map.len(), 1);
        let by_full = map.get("abcdef123456").unwrap();
        let by_short = map.get("abcdef1").unwrap();
        assert!(std::ptr::eq(by_full, by_short));
        assert_eq!(map.keys().count(), 2);
    }

    #[test]
    fn test_serializes_every_alias() {
        let mut map = PositionMap::new();
        map.insert(Position::new(&commit("abcdef123456", "abcdef1", &["main"]), 10, 20, "main"));
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["abcdef1"], json["abcdef123456"]);
        assert_eq!(json["abcdef1"]["x"], 10);
        assert_eq!(json["abcdef1"]["shortHash"], "abcdef1");
    }

    #[test]
    fn test_exclusivity() {
        let only = Position::new(&commit("a", "a", &["feature"]), 0, 0, "feature");
        let shared = Position::new(&commit("b", "b", &["feature", "main"]), 0, 0, "main");
        assert!(only.is_exclusive_to("feature"));
        assert!(!shared.is_exclusive_to("feature"));
        assert!(shared.is_on("feature"));
    }
}
