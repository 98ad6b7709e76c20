//! Bookkeeping of notes currently governed by the private marker.
//!
//! Membership is a hint, not the truth: a tracked note may have been edited
//! outside Veil since it was marked. Callers re-read live content before
//! acting on membership.

use std::collections::BTreeSet;

/// Set of vault-relative paths believed to carry the private marker.
#[derive(Debug, Default, Clone)]
pub struct PathTracker {
    paths: BTreeSet<String>,
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `path`. Returns `true` if it was not tracked before.
    pub fn mark_private(&mut self, path: &str) -> bool {
        self.paths.insert(path.to_string())
    }

    /// Stop tracking `path`. Returns `true` if it was tracked.
    pub fn unmark_private(&mut self, path: &str) -> bool {
        self.paths.remove(path)
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Every tracked path, in sorted order.
    pub fn all_tracked(&self) -> Vec<String> {
        self.paths.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_unmark() {
        let mut tracker = PathTracker::new();

        assert!(tracker.mark_private("notes/a.md"));
        assert!(!tracker.mark_private("notes/a.md"));
        assert!(tracker.is_tracked("notes/a.md"));

        assert!(tracker.unmark_private("notes/a.md"));
        assert!(!tracker.unmark_private("notes/a.md"));
        assert!(!tracker.is_tracked("notes/a.md"));
    }

    #[test]
    fn test_all_tracked_is_sorted() {
        let mut tracker = PathTracker::new();
        tracker.mark_private("z.md");
        tracker.mark_private("a.md");
        tracker.mark_private("m/n.md");

        assert_eq!(tracker.all_tracked(), vec!["a.md", "m/n.md", "z.md"]);
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut tracker = PathTracker::new();
        tracker.mark_private("a.md");
        tracker.clear();
        assert!(tracker.is_empty());
    }
}
