//! Radial layout of the query graph.
//!
//! The center node sits at a fixed origin, papers are spread evenly on a
//! circle around it, and each paper's gap node continues outward along the
//! same angle. Layout is always recomputed from scratch, so angles are
//! reassigned whenever the visible paper set changes.

use crate::models::{EdgeKind, GraphEdge, GraphNode, GraphSnapshot, PaperRecord, Position};
use std::f64::consts::PI;

pub const CENTER_NODE_ID: &str = "center-node";
pub const ORIGIN: Position = Position { x: 400.0, y: 300.0 };
pub const PAPER_RADIUS: f64 = 350.0;
pub const GAP_RADIUS: f64 = 250.0;

// ============================================================================
// Node Ids
// ============================================================================

pub fn paper_node_id(paper_id: &str) -> String {
    format!("paper-{}", paper_id)
}

pub fn gap_node_id(paper_id: &str) -> String {
    format!("gap-{}", paper_id)
}

fn query_edge_id(paper_id: &str) -> String {
    format!("edge-center-{}", paper_id)
}

fn extraction_edge_id(paper_id: &str) -> String {
    format!("edge-paper-gap-{}", paper_id)
}

pub fn center_label(query: &str) -> String {
    format!("Query: {}", query)
}

// ============================================================================
// Placement
// ============================================================================

/// Angle of paper `index` when `count` papers share the circle.
pub fn angle_for(index: usize, count: usize) -> f64 {
    index as f64 * (2.0 * PI / count.max(1) as f64)
}

fn polar(around: Position, radius: f64, angle: f64) -> Position {
    Position {
        x: around.x + radius * angle.cos(),
        y: around.y + radius * angle.sin(),
    }
}

/// Lay out the center node, the given papers (in order) and their gaps.
///
/// Produces `1 + N + g` nodes and `N + g` edges, where `g` counts papers
/// with a non-empty research gap.
pub fn radial_layout(papers: &[&PaperRecord], query: &str) -> GraphSnapshot {
    let mut nodes = Vec::with_capacity(1 + papers.len() * 2);
    let mut edges = Vec::with_capacity(papers.len() * 2);

    nodes.push(GraphNode::Center {
        id: CENTER_NODE_ID.to_string(),
        label: center_label(query),
        position: ORIGIN,
    });

    for (index, paper) in papers.iter().enumerate() {
        let angle = angle_for(index, papers.len());
        let paper_position = polar(ORIGIN, PAPER_RADIUS, angle);
        let paper_id = paper_node_id(&paper.paper_id);

        nodes.push(GraphNode::Paper {
            id: paper_id.clone(),
            paper_id: paper.paper_id.clone(),
            position: paper_position,
        });
        edges.push(GraphEdge {
            id: query_edge_id(&paper.paper_id),
            source: CENTER_NODE_ID.to_string(),
            target: paper_id.clone(),
            kind: EdgeKind::Query,
        });

        if let Some(gap) = paper.gap() {
            let gap_id = gap_node_id(&paper.paper_id);
            nodes.push(GraphNode::Gap {
                id: gap_id.clone(),
                paper_id: paper.paper_id.clone(),
                text: gap.to_string(),
                // Measured from the paper, not the origin
                position: polar(paper_position, GAP_RADIUS, angle),
            });
            edges.push(GraphEdge {
                id: extraction_edge_id(&paper.paper_id),
                source: paper_id,
                target: gap_id,
                kind: EdgeKind::Extraction,
            });
        }
    }

    GraphSnapshot { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str, gap: Option<&str>) -> PaperRecord {
        PaperRecord {
            paper_id: id.to_string(),
            title: format!("Paper {}", id),
            year: Some(2020),
            authors: Vec::new(),
            r#abstract: None,
            citation_count: None,
            open_access_pdf_url: None,
            research_gap: gap.map(str::to_string),
        }
    }

    fn close(a: Position, b: Position) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_empty_layout_has_only_center() {
        let snapshot = radial_layout(&[], "graphs");
        assert_eq!(snapshot.nodes.len(), 1);
        assert!(snapshot.edges.is_empty());
        assert!(matches!(
            &snapshot.nodes[0],
            GraphNode::Center { label, .. } if label == "Query: graphs"
        ));
        assert_eq!(angle_for(0, 0), 0.0);
    }

    #[test]
    fn test_counts_follow_gaps() {
        let records = vec![
            paper("a", Some("gap a")),
            paper("b", None),
            paper("c", Some("")),
            paper("d", Some("gap d")),
        ];
        let refs: Vec<&PaperRecord> = records.iter().collect();
        let snapshot = radial_layout(&refs, "q");
        // Empty gap text gets no node
        assert_eq!(snapshot.nodes.len(), 1 + 4 + 2);
        assert_eq!(snapshot.edges.len(), 4 + 2);
    }

    #[test]
    fn test_positions_on_circles() {
        let records = vec![paper("a", Some("g")), paper("b", Some("g"))];
        let refs: Vec<&PaperRecord> = records.iter().collect();
        let snapshot = radial_layout(&refs, "q");

        let first = snapshot.nodes[1].position();
        assert!(close(first, Position { x: 750.0, y: 300.0 }));
        let first_gap = snapshot.nodes[2].position();
        assert!(close(first_gap, Position { x: 1000.0, y: 300.0 }));

        // Second paper sits opposite the first
        let second = snapshot.nodes[3].position();
        assert!(close(second, Position { x: 50.0, y: 300.0 }));
        let second_gap = snapshot.nodes[4].position();
        assert!(close(second_gap, Position { x: -200.0, y: 300.0 }));
    }

    #[test]
    fn test_ids_derive_from_paper_id() {
        let records = vec![paper("xyz", Some("g"))];
        let refs: Vec<&PaperRecord> = records.iter().collect();
        let snapshot = radial_layout(&refs, "q");
        let ids: Vec<&str> = snapshot.nodes.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec![CENTER_NODE_ID, "paper-xyz", "gap-xyz"]);

        assert_eq!(snapshot.edges[0].source, CENTER_NODE_ID);
        assert_eq!(snapshot.edges[0].target, "paper-xyz");
        assert_eq!(snapshot.edges[0].kind, EdgeKind::Query);
        assert_eq!(snapshot.edges[1].source, "paper-xyz");
        assert_eq!(snapshot.edges[1].target, "gap-xyz");
        assert_eq!(snapshot.edges[1].kind, EdgeKind::Extraction);
    }
}
