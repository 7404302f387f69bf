use super::node::Commit;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

/// Shortest reference that takes part in prefix matching
pub const MIN_PREFIX_LEN: usize = 4;

/// Bidirectional alias index: every known full or short hash -> canonical hash,
/// and canonical hash -> its aliases.
///
/// Servers mix full and abbreviated hashes freely, so a reference is resolved by
/// exact key first, then by prefix in either direction. A prefix shared by two
/// different commits resolves to nothing.
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    keys: BTreeMap<String, String>,
    aliases: HashMap<String, SmallVec<[String; 2]>>,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_commits<'a, I>(commits: I) -> Self
    where
        I: IntoIterator<Item = &'a Commit>,
    {
        let commits: Vec<&Commit> = commits.into_iter().collect();
        let mut index = Self::new();

        // Full hashes win over short aliases that happen to collide with them
        for commit in &commits {
            index.insert_canonical(&commit.hash);
        }
        for commit in &commits {
            index.insert_alias(&commit.short_hash, &commit.hash);
        }

        index
    }

    fn insert_canonical(&mut self, hash: &str) {
        if hash.is_empty() || self.keys.contains_key(hash) {
            return;
        }
        self.keys.insert(hash.to_string(), hash.to_string());
        self.aliases.entry(hash.to_string()).or_default();
    }

    fn insert_alias(&mut self, alias: &str, canonical: &str) {
        if alias.is_empty() || alias == canonical || self.keys.contains_key(alias) {
            return;
        }
        self.keys.insert(alias.to_string(), canonical.to_string());
        self.aliases
            .entry(canonical.to_string())
            .or_default()
            .push(alias.to_string());
    }

    /// Resolve a full, short, or prefix reference to its canonical hash
    pub fn resolve(&self, reference: &str) -> Option<&str> {
        if reference.is_empty() {
            return None;
        }
        if let Some(canonical) = self.keys.get(reference) {
            return Some(canonical);
        }
        if reference.len() < MIN_PREFIX_LEN {
            return None;
        }

        // reference is a prefix of known keys
        let mut found: Option<&str> = None;
        let range = (Bound::Included(reference), Bound::Unbounded);
        for (key, canonical) in self.keys.range::<str, _>(range) {
            if !key.starts_with(reference) {
                break;
            }
            match found {
                None => found = Some(canonical),
                Some(previous) if previous == canonical => {}
                Some(_) => return None,
            }
        }
        if found.is_some() {
            return found;
        }

        // a known key is a prefix of the reference, longest first
        (MIN_PREFIX_LEN..reference.len())
            .rev()
            .filter_map(|len| reference.get(..len))
            .find_map(|prefix| self.keys.get(prefix).map(String::as_str))
    }

    /// Canonical hash plus every alias registered for it
    pub fn aliases_of(&self, canonical: &str) -> impl Iterator<Item = &str> {
        let extra = self
            .aliases
            .get(canonical)
            .into_iter()
            .flat_map(|aliases| aliases.iter().map(String::as_str));
        self.aliases
            .get_key_value(canonical)
            .map(|(key, _)| key.as_str())
            .into_iter()
            .chain(extra)
    }

    /// Whether two references resolve to the same commit; references the
    /// index cannot resolve only match themselves
    pub fn same_commit(&self, a: &str, b: &str) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        match (self.resolve(a), self.resolve(b)) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, short: &str) -> Commit {
        Commit::new(hash.into(), vec![], None, "A".into(), String::new()).with_short_hash(short)
    }

    fn index() -> HashIndex {
        let commits = vec![
            commit("a1b2c3d4e5f6", "a1b2c3d"),
            commit("a1b2ffff0000", "a1b2fff"),
            commit("9f8e7d6c5b4a", "9f8e7d6"),
        ];
        HashIndex::from_commits(&commits)
    }

    #[test]
    fn test_exact_and_short_resolve() {
        let index = index();
        assert_eq!(index.resolve("a1b2c3d4e5f6"), Some("a1b2c3d4e5f6"));
        assert_eq!(index.resolve("9f8e7d6"), Some("9f8e7d6c5b4a"));
    }

    #[test]
    fn test_prefix_resolve_both_directions() {
        let index = index();
        assert_eq!(index.resolve("9f8e7d"), Some("9f8e7d6c5b4a"));
        assert_eq!(index.resolve("9f8e7d6c5b4a0000"), Some("9f8e7d6c5b4a"));
    }

    #[test]
    fn test_ambiguous_prefix_is_unresolved() {
        let index = index();
        assert_eq!(index.resolve("a1b2"), None);
        assert_eq!(index.resolve("a1b2c"), Some("a1b2c3d4e5f6"));
    }

    #[test]
    fn test_unknown_and_tiny_references() {
        let index = index();
        assert_eq!(index.resolve(""), None);
        assert_eq!(index.resolve("9f8"), None);
        assert_eq!(index.resolve("deadbeef"), None);
    }

    #[test]
    fn test_aliases_and_same_commit() {
        let index = index();
        let aliases: Vec<_> = index.aliases_of("9f8e7d6c5b4a").collect();
        assert_eq!(aliases, vec!["9f8e7d6c5b4a", "9f8e7d6"]);
        assert!(index.same_commit("9f8e7d6", "9f8e7d6c5b4a"));
        assert!(!index.same_commit("9f8e7d6", "a1b2c3d"));
        // unresolvable references never match by prefix
        assert!(!index.same_commit("cafe1234", "cafe"));
        assert!(index.same_commit("cafe1234", "cafe1234"));
        assert!(!index.same_commit("a1b2", "a1b2c3d4e5f6"));
        assert!(!index.same_commit("", ""));
    }
}
