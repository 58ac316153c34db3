//! Query results for region lookups.

/// Result of a region query with traversal counters.
///
/// The counters are cheap to collect and make it easy to check that the tree
/// is actually pruning work (`entries_tested` well below the entry count).
#[derive(Debug, Clone)]
pub struct QueryResult<'a, T> {
    /// Items whose box intersects the query region
    pub items: Vec<&'a T>,
    /// Nodes whose region was entered
    pub nodes_visited: usize,
    /// Entries whose box was tested against the region
    pub entries_tested: usize,
}

impl<T> Default for QueryResult<'_, T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            nodes_visited: 0,
            entries_tested: 0,
        }
    }
}

impl<T> QueryResult<'_, T> {
    /// Number of matching items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
