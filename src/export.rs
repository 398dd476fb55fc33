//! Export of saved papers as JSON or CSV.

use crate::models::PaperRecord;

pub const JSON_FILENAME: &str = "saved_papers.json";
pub const CSV_FILENAME: &str = "saved_papers.csv";
pub const CSV_HEADER: &str = "Title,Year,Authors,Abstract,Research Gap";

/// Pretty-printed JSON array of the records.
pub fn to_json(papers: &[PaperRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(papers)
}

/// Wrap a field in double quotes, doubling any embedded quotes.
pub fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// CSV with one row per paper. The year column is left bare; authors are
/// joined with `; `.
pub fn to_csv(papers: &[PaperRecord]) -> String {
    let mut rows = Vec::with_capacity(papers.len() + 1);
    rows.push(CSV_HEADER.to_string());

    for paper in papers {
        let year = paper.year.map(|y| y.to_string()).unwrap_or_default();
        let row = [
            csv_quote(&paper.title),
            year,
            csv_quote(&paper.author_names("; ")),
            csv_quote(paper.r#abstract.as_deref().unwrap_or("")),
            csv_quote(paper.research_gap.as_deref().unwrap_or("")),
        ];
        rows.push(row.join(","));
    }

    rows.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;

    fn sample() -> PaperRecord {
        PaperRecord {
            paper_id: "p1".to_string(),
            title: "The \"Best\" Paper".to_string(),
            year: Some(2021),
            authors: vec![
                Author {
                    author_id: None,
                    name: "Ada Lovelace".to_string(),
                },
                Author {
                    author_id: Some("9".to_string()),
                    name: "Alan Turing".to_string(),
                },
            ],
            r#abstract: Some("Line one, line two.".to_string()),
            citation_count: Some(3),
            open_access_pdf_url: None,
            research_gap: None,
        }
    }

    #[test]
    fn test_csv_quote_doubles_quotes() {
        assert_eq!(csv_quote(r#"say "hi""#), r#""say ""hi""""#);
        assert_eq!(csv_quote(""), r#""""#);
    }

    #[test]
    fn test_csv_rows() {
        let mut undated = sample();
        undated.year = None;
        undated.authors.clear();
        undated.research_gap = Some("More data.".to_string());

        let csv = to_csv(&[sample(), undated]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            r#""The ""Best"" Paper",2021,"Ada Lovelace; Alan Turing","Line one, line two.","""#
        );
        assert_eq!(
            lines[2],
            r#""The ""Best"" Paper",,"","Line one, line two.","More data.""#
        );
    }

    #[test]
    fn test_csv_empty_is_header_only() {
        assert_eq!(to_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn test_json_export_is_array_of_records() {
        let json = to_json(&[sample()]).unwrap();
        let parsed: Vec<PaperRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![sample()]);
        assert!(json.contains("\n  "));
    }
}
