//! Research-gap annotation of a batch of papers.

use crate::gemini::ResearchAssistant;
use crate::models::PaperRecord;
use futures_util::future::join_all;
use tracing::debug;

/// Attach a research gap to every paper that has an abstract. Extractions
/// run concurrently and the batch finishes once all have settled; a paper
/// whose extraction fails simply keeps no gap. Order is preserved.
pub async fn annotate_with_gaps(
    assistant: &dyn ResearchAssistant,
    papers: Vec<PaperRecord>,
) -> Vec<PaperRecord> {
    let total = papers.len();
    let tasks = papers.into_iter().map(|mut paper| async move {
        let gap = match paper.abstract_text() {
            Some(text) => assistant.extract_gap(text).await,
            None => None,
        };
        paper.research_gap = gap;
        paper
    });

    let annotated = join_all(tasks).await;
    let with_gap = annotated.iter().filter(|p| p.research_gap.is_some()).count();
    debug!(total, with_gap, "annotated papers with research gaps");
    annotated
}
