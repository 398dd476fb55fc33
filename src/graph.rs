//! Graph state for the active query.
//!
//! `GraphStore` owns the paper list behind the graph plus the year filter,
//! and keeps a laid-out snapshot in step with them. Every mutation re-runs
//! the radial layout over the visible papers, so the snapshot is always a
//! function of (papers, query, filter) and never of earlier snapshots.

use crate::layout::radial_layout;
use crate::models::{GraphEdge, GraphNode, GraphSnapshot, PaperRecord};
use std::collections::HashSet;
use tracing::debug;

/// Whether a paper is shown under the given year threshold. Papers with no
/// year are hidden whenever a threshold is set.
pub fn passes_year_filter(paper: &PaperRecord, threshold: Option<i32>) -> bool {
    match threshold {
        None => true,
        Some(min) => paper.year.is_some_and(|year| year >= min),
    }
}

#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    papers: Vec<PaperRecord>,
    query: Option<String>,
    year_filter: Option<i32>,
    snapshot: GraphSnapshot,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Replace everything with a fresh result set. Duplicate ids in
    /// `records` collapse to one paper, keeping the first position and the
    /// last content.
    pub fn set_papers(&mut self, records: Vec<PaperRecord>, query: &str, filter: Option<i32>) {
        let mut papers: Vec<PaperRecord> = Vec::with_capacity(records.len());
        for record in records {
            match papers.iter_mut().find(|p| p.paper_id == record.paper_id) {
                Some(existing) => *existing = record,
                None => papers.push(record),
            }
        }

        self.papers = papers;
        self.query = Some(query.to_string());
        self.year_filter = filter;
        self.relayout();
    }

    /// Merge papers from an expand. Records whose id is already present are
    /// dropped, so repeating the same batch is a no-op. Returns how many
    /// papers were actually added.
    pub fn add_papers(&mut self, records: Vec<PaperRecord>) -> usize {
        let mut known: HashSet<String> = self.papers.iter().map(|p| p.paper_id.clone()).collect();
        let before = self.papers.len();

        for record in records {
            if known.insert(record.paper_id.clone()) {
                self.papers.push(record);
            }
        }

        let added = self.papers.len() - before;
        debug!(added, total = self.papers.len(), "merged expanded papers");
        if added > 0 {
            self.relayout();
        }
        added
    }

    /// Remove a paper along with its gap node and both incident edges.
    pub fn remove_paper(&mut self, paper_id: &str) -> bool {
        let before = self.papers.len();
        self.papers.retain(|p| p.paper_id != paper_id);
        let removed = self.papers.len() != before;
        if removed {
            self.relayout();
        }
        removed
    }

    pub fn set_filter(&mut self, threshold: Option<i32>) {
        self.year_filter = threshold;
        self.relayout();
    }

    fn relayout(&mut self) {
        self.snapshot = match &self.query {
            Some(query) => {
                let visible: Vec<&PaperRecord> = self.visible_papers().collect();
                radial_layout(&visible, query)
            }
            None => GraphSnapshot::default(),
        };
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// All papers in the graph, including those hidden by the year filter.
    pub fn papers(&self) -> &[PaperRecord] {
        &self.papers
    }

    pub fn visible_papers(&self) -> impl Iterator<Item = &PaperRecord> + '_ {
        let filter = self.year_filter;
        self.papers.iter().filter(move |p| passes_year_filter(p, filter))
    }

    pub fn paper(&self, paper_id: &str) -> Option<&PaperRecord> {
        self.papers.iter().find(|p| p.paper_id == paper_id)
    }

    pub fn contains(&self, paper_id: &str) -> bool {
        self.paper(paper_id).is_some()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn year_filter(&self) -> Option<i32> {
        self.year_filter
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.snapshot.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.snapshot.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{gap_node_id, paper_node_id};

    fn paper(id: &str, year: Option<i32>, with_abstract: bool) -> PaperRecord {
        PaperRecord {
            paper_id: id.to_string(),
            title: format!("Paper {}", id),
            year,
            authors: Vec::new(),
            r#abstract: with_abstract.then(|| format!("Abstract of {}", id)),
            citation_count: Some(1),
            open_access_pdf_url: None,
            research_gap: with_abstract.then(|| format!("Gap of {}", id)),
        }
    }

    fn node_ids(store: &GraphStore) -> Vec<String> {
        store.nodes().iter().map(|n| n.id().to_string()).collect()
    }

    #[test]
    fn test_transformers_search_shape() {
        let mut store = GraphStore::new();
        let records = vec![
            paper("p1", Some(2017), true),
            paper("p2", Some(2018), false),
            paper("p3", Some(2019), true),
            paper("p4", Some(2020), false),
            paper("p5", Some(2021), true),
        ];
        store.set_papers(records, "transformers", None);

        assert_eq!(store.nodes().len(), 9);
        assert_eq!(store.edges().len(), 8);
    }

    #[test]
    fn test_empty_store_has_no_nodes() {
        let store = GraphStore::new();
        assert!(store.nodes().is_empty());
        assert!(store.query().is_none());
    }

    #[test]
    fn test_query_with_no_results_keeps_center() {
        let mut store = GraphStore::new();
        store.set_papers(Vec::new(), "nothing", None);
        assert_eq!(store.nodes().len(), 1);
    }

    #[test]
    fn test_set_papers_collapses_duplicate_ids() {
        let mut store = GraphStore::new();
        let mut newer = paper("a", Some(2024), false);
        newer.title = "Newer".to_string();
        store.set_papers(
            vec![paper("a", Some(2020), false), paper("b", None, false), newer],
            "q",
            None,
        );
        assert_eq!(store.papers().len(), 2);
        assert_eq!(store.papers()[0].title, "Newer");
    }

    #[test]
    fn test_expand_skips_visible_duplicates() {
        let mut store = GraphStore::new();
        store.set_papers(
            vec![paper("a", Some(2020), true), paper("b", Some(2021), false)],
            "q",
            None,
        );

        let citing = vec![
            paper("c", Some(2022), true),
            paper("a", Some(2020), true),
            paper("d", Some(2023), false),
        ];
        assert_eq!(store.add_papers(citing), 2);
        assert_eq!(store.papers().len(), 4);
    }

    #[test]
    fn test_add_papers_is_idempotent() {
        let mut store = GraphStore::new();
        store.set_papers(vec![paper("a", Some(2020), true)], "q", None);
        let batch = vec![paper("b", Some(2021), true), paper("c", None, false)];

        store.add_papers(batch.clone());
        let once = store.snapshot().clone();
        assert_eq!(store.add_papers(batch), 0);
        assert_eq!(store.snapshot(), &once);
    }

    #[test]
    fn test_add_papers_dedupes_within_batch() {
        let mut store = GraphStore::new();
        store.set_papers(Vec::new(), "q", None);
        let added = store.add_papers(vec![paper("x", None, false), paper("x", None, false)]);
        assert_eq!(added, 1);
    }

    #[test]
    fn test_expand_reassigns_angles() {
        let mut store = GraphStore::new();
        store.set_papers(vec![paper("a", None, false), paper("b", None, false)], "q", None);
        let before = store.nodes()[2].position();
        store.add_papers(vec![paper("c", None, false)]);
        let after = store.nodes()[2].position();
        assert_ne!(before, after);
    }

    #[test]
    fn test_remove_paper_drops_gap_and_edges() {
        let mut store = GraphStore::new();
        store.set_papers(
            vec![paper("a", Some(2020), true), paper("b", Some(2021), true)],
            "q",
            None,
        );
        assert!(store.remove_paper("a"));

        let ids = node_ids(&store);
        assert!(!ids.contains(&paper_node_id("a")));
        assert!(!ids.contains(&gap_node_id("a")));
        assert!(store
            .edges()
            .iter()
            .all(|e| e.target != paper_node_id("a") && e.source != paper_node_id("a")));
        assert_eq!(store.nodes().len(), 3);
        assert!(!store.remove_paper("a"));
    }

    #[test]
    fn test_filter_hides_old_and_undated_papers() {
        let mut store = GraphStore::new();
        store.set_papers(
            vec![
                paper("old", Some(2015), false),
                paper("new", Some(2024), false),
                paper("undated", None, false),
            ],
            "q",
            None,
        );
        store.set_filter(Some(2020));

        let ids = node_ids(&store);
        assert_eq!(ids, vec!["center-node".to_string(), paper_node_id("new")]);
        assert_eq!(store.papers().len(), 3);
    }

    #[test]
    fn test_clearing_filter_restores_full_set() {
        let mut store = GraphStore::new();
        store.set_papers(
            vec![paper("a", Some(2010), true), paper("b", Some(2023), true)],
            "q",
            None,
        );
        let unfiltered = store.snapshot().clone();

        store.set_filter(Some(2020));
        assert_ne!(store.snapshot(), &unfiltered);
        store.set_filter(None);
        assert_eq!(store.snapshot(), &unfiltered);
    }

    #[test]
    fn test_filter_applies_to_expanded_papers() {
        let mut store = GraphStore::new();
        store.set_papers(vec![paper("a", Some(2024), false)], "q", Some(2023));
        store.add_papers(vec![paper("b", Some(2001), false)]);
        assert_eq!(store.visible_papers().count(), 1);
        assert!(store.contains("b"));
    }
}
