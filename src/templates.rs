//! HTML page for the web interface.
//!
//! The page keeps its session in the browser but hands every state change
//! to the server: layout, expand merging, save toggling and export all run
//! through the Rust graph, selection and export modules. Only the summary
//! generation counter and the layout request sequence live in script.

use crate::export::{CSV_FILENAME, JSON_FILENAME};
use crate::workbench::{mock_papers, YEAR_FILTER_OPTIONS};

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
:root {
    --bg: #030712;
    --panel: #111827;
    --border: #1f2937;
    --fg: #f3f4f6;
    --muted: #9ca3af;
    --blue: #3b82f6;
    --red: #ef4444;
    --green: #10b981;
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    background: var(--bg);
    color: var(--fg);
    height: 100vh;
    display: flex;
    flex-direction: column;
}

header {
    display: flex;
    gap: 1rem;
    align-items: center;
    padding: 0.75rem 1.5rem;
    background: var(--panel);
    border-bottom: 1px solid var(--border);
}
header h1 { font-size: 1.2rem; }
header form { flex: 1; display: flex; gap: 0.5rem; max-width: 40rem; }
input, select, button {
    background: var(--bg);
    color: var(--fg);
    border: 1px solid var(--border);
    border-radius: 6px;
    padding: 0.4rem 0.7rem;
    font-size: 0.9rem;
}
input { flex: 1; }
button { cursor: pointer; }
button.primary { background: var(--blue); border-color: var(--blue); }

main { flex: 1; display: flex; overflow: hidden; position: relative; }
#graph { flex: 1; }
#status { position: absolute; top: 1rem; left: 1rem; color: var(--muted); }
#error { position: absolute; top: 1rem; right: 1rem; color: var(--red); max-width: 30rem; }

.node-center rect { fill: #1f2937; stroke: var(--blue); stroke-width: 2; }
.node-paper rect { fill: #1f2937; stroke: #4b5563; }
.node-gap rect { fill: #451a1a; stroke: var(--red); }
.node text { fill: var(--fg); font-size: 12px; }
.node .action { fill: var(--blue); cursor: pointer; }
.edge-query { stroke: #6b7280; stroke-width: 2; }
.edge-extraction { stroke: var(--red); stroke-width: 1.5; stroke-dasharray: 5,5; }

aside {
    width: 22rem;
    background: var(--panel);
    border-left: 1px solid var(--border);
    padding: 1rem;
    overflow-y: auto;
    display: none;
}
aside.open { display: block; }
aside h2 { font-size: 1rem; margin-bottom: 0.75rem; }
aside p { font-size: 0.85rem; color: var(--muted); margin-bottom: 0.75rem; }
aside .gap { color: #fca5a5; }
aside .actions { display: flex; gap: 0.5rem; flex-wrap: wrap; margin-top: 0.75rem; }
.saved-item { border-bottom: 1px solid var(--border); padding: 0.5rem 0; font-size: 0.85rem; }
"#;

// ============================================================================
// Index Page
// ============================================================================

fn year_options_html() -> String {
    let mut html = String::from(r#"<option value="">All Years</option>"#);
    for year in YEAR_FILTER_OPTIONS {
        html.push_str(&format!(r#"<option value="{year}">{year}+</option>"#, year = year));
    }
    html
}

/// Serialize for embedding inside a `<script>` element.
fn script_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

pub fn index_page() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>GapGraph</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <h1>GapGraph</h1>
        <form id="search-form">
            <input type="text" id="query" placeholder="Search for research topics (e.g., 'quantum computing', 'transformers')...">
            <button type="submit" class="primary">Search</button>
        </form>
        <select id="year-filter">{year_options}</select>
        <button id="saved-toggle">Saved (<span id="saved-count">0</span>)</button>
    </header>
    <main>
        <svg id="graph"></svg>
        <div id="status">Enter a topic above to visualize related papers and their extracted limitations, future work, and research gaps.</div>
        <div id="error"></div>
        <aside id="details"></aside>
        <aside id="saved"></aside>
    </main>
    <script>
    const MOCK_PAPERS = {mock};
    const state = {{ papers: [], query: '', yearFilter: null, saved: [], selected: null, summary: null, summarizing: false, summaryGeneration: 0, layoutSeq: 0 }};
    const $ = (id) => document.getElementById(id);
    const esc = (s) => String(s ?? '').replace(/[&<>"']/g, (c) => ({{'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}})[c]);

    async function api(route, body) {{
        const response = await fetch(route, {{
            method: 'POST',
            headers: {{ 'Content-Type': 'application/json' }},
            body: JSON.stringify(body),
        }});
        const text = await response.text();
        if (!response.ok) {{
            let message = 'Server error: ' + response.status;
            try {{ const err = JSON.parse(text); if (err.error) message = err.error; }} catch (e) {{}}
            throw new Error(message);
        }}
        try {{ return JSON.parse(text); }} catch (e) {{ throw new Error('Invalid response from server'); }}
    }}

    async function relayout() {{
        if (!state.query) return;
        const seq = ++state.layoutSeq;
        let snapshot;
        try {{
            snapshot = await api('/api/graph/layout', {{ papers: state.papers, query: state.query, yearFilter: state.yearFilter }});
        }} catch (err) {{
            if (seq === state.layoutSeq) setError(err.message);
            return;
        }}
        // Superseded by a later change
        if (seq !== state.layoutSeq) return;
        draw(snapshot);
    }}

    function draw(snapshot) {{
        const byId = Object.fromEntries(snapshot.nodes.map((n) => [n.id, n]));
        const papers = Object.fromEntries(state.papers.map((p) => [p.paperId, p]));
        const xs = snapshot.nodes.map((n) => n.position.x), ys = snapshot.nodes.map((n) => n.position.y);
        const pad = 200;
        $('graph').setAttribute('viewBox', [Math.min(...xs) - pad, Math.min(...ys) - pad,
            Math.max(...xs) - Math.min(...xs) + 2 * pad, Math.max(...ys) - Math.min(...ys) + 2 * pad].join(' '));

        let svg = '';
        for (const e of snapshot.edges) {{
            const s = byId[e.source].position, t = byId[e.target].position;
            svg += `<line class="edge-${{e.kind}}" x1="${{s.x}}" y1="${{s.y}}" x2="${{t.x}}" y2="${{t.y}}"/>`;
        }}
        for (const n of snapshot.nodes) {{
            const {{ x, y }} = n.position;
            if (n.type === 'center') {{
                svg += `<g class="node node-center"><rect x="${{x - 100}}" y="${{y - 20}}" width="200" height="40" rx="8"/>
                    <text x="${{x}}" y="${{y + 5}}" text-anchor="middle">${{esc(n.label)}}</text></g>`;
            }} else if (n.type === 'paper') {{
                const p = papers[n.paperId];
                const saved = state.saved.some((s) => s.paperId === n.paperId);
                svg += `<g class="node node-paper"><rect x="${{x - 140}}" y="${{y - 35}}" width="280" height="70" rx="8"/>
                    <text x="${{x - 130}}" y="${{y - 15}}">${{esc(p.title.slice(0, 40))}} (${{p.year || 'N/A'}})</text>
                    <text class="action" x="${{x - 130}}" y="${{y + 20}}" data-act="explore" data-id="${{esc(n.paperId)}}">Explore</text>
                    <text class="action" x="${{x - 60}}" y="${{y + 20}}" data-act="expand" data-id="${{esc(n.paperId)}}">Expand</text>
                    <text class="action" x="${{x + 10}}" y="${{y + 20}}" data-act="save" data-id="${{esc(n.paperId)}}">${{saved ? 'Saved' : 'Save'}}</text>
                    <text class="action" x="${{x + 70}}" y="${{y + 20}}" data-act="remove" data-id="${{esc(n.paperId)}}">Remove</text></g>`;
            }} else {{
                svg += `<g class="node node-gap"><rect x="${{x - 120}}" y="${{y - 25}}" width="240" height="50" rx="8"/>
                    <text x="${{x - 110}}" y="${{y + 4}}">${{esc(n.text.slice(0, 38))}}...</text></g>`;
            }}
        }}
        $('graph').innerHTML = svg;
    }}

    function setError(message) {{ $('error').textContent = message || ''; }}
    function setStatus(message) {{ $('status').textContent = message || ''; }}
    function paper(id) {{ return state.papers.find((p) => p.paperId === id) || state.saved.find((p) => p.paperId === id); }}

    async function search(query) {{
        if (!query.trim()) return;
        state.query = query;
        setError(null);
        setStatus('Fetching papers and extracting research gaps...');
        try {{
            state.papers = await api('/api/search-gaps', {{ searchQuery: query }});
        }} catch (err) {{
            setError(err.message || 'Failed to fetch data');
            state.papers = MOCK_PAPERS;
        }}
        setStatus(null);
        await relayout();
    }}

    async function expand(id) {{
        setStatus('Fetching citing papers...');
        try {{
            const citing = await api('/api/expand-paper', {{ paperId: id }});
            const merged = await api('/api/graph/merge', {{ papers: state.papers, added: citing }});
            state.papers = merged.papers;
            await relayout();
        }} catch (err) {{
            setError(err.message || 'Failed to expand paper');
        }}
        setStatus(null);
    }}

    async function toggleSave(id) {{
        const p = paper(id);
        if (!p) return;
        try {{
            state.saved = (await api('/api/saved/toggle', {{ saved: state.saved, paper: p }})).saved;
        }} catch (err) {{
            setError(err.message);
            return;
        }}
        $('saved-count').textContent = state.saved.length;
        renderSaved();
        renderDetails();
        relayout();
    }}

    function select(id) {{
        state.selected = paper(id) || null;
        state.summaryGeneration += 1;
        state.summary = null;
        state.summarizing = false;
        renderDetails();
    }}

    async function summarize() {{
        const selected = state.selected;
        const generation = state.summaryGeneration;
        if (!selected || !selected.abstract || state.summarizing || state.summary) return;
        state.summarizing = true;
        renderDetails();
        let summary;
        try {{
            summary = (await api('/api/summarize-paper', {{ abstract: selected.abstract }})).summary;
        }} catch (err) {{
            summary = 'Failed to generate summary.';
        }}
        // Reselecting, even the same paper, starts a new generation
        if (generation !== state.summaryGeneration) return;
        state.summary = summary;
        state.summarizing = false;
        renderDetails();
    }}

    function renderDetails() {{
        const p = state.selected;
        const panel = $('details');
        panel.classList.toggle('open', !!p);
        if (!p) {{ panel.innerHTML = ''; return; }}
        const saved = state.saved.some((s) => s.paperId === p.paperId);
        panel.innerHTML = `<h2>${{esc(p.title)}}</h2>
            <p>${{esc(p.year || 'N/A')}} &middot; ${{p.citationCount ?? 0}} Citations<br>${{esc(p.authors.map((a) => a.name).join(', '))}}</p>
            ${{p.abstract ? `<button id="summarize" ${{state.summarizing || state.summary ? 'disabled' : ''}}>${{state.summary ? 'Summarized' : state.summarizing ? 'Summarizing...' : 'Summarize with AI'}}</button>` : ''}}
            ${{state.summary ? `<p>${{esc(state.summary)}}</p>` : ''}}
            <p>${{esc(p.abstract || 'No abstract available.')}}</p>
            ${{p.researchGap ? `<p class="gap"><strong>Extracted Research Gaps</strong><br>${{esc(p.researchGap)}}</p>` : ''}}
            <div class="actions">
                ${{p.openAccessPdfUrl ? `<a href="${{esc(p.openAccessPdfUrl)}}" target="_blank" rel="noopener noreferrer"><button>PDF</button></a>` : ''}}
                <button id="detail-save">${{saved ? 'Saved' : 'Save Paper'}}</button>
                <a href="https://www.semanticscholar.org/paper/${{esc(p.paperId)}}" target="_blank" rel="noopener noreferrer"><button>View on Semantic Scholar</button></a>
                <button id="detail-close">Close</button>
            </div>`;
        if ($('summarize')) $('summarize').onclick = summarize;
        $('detail-save').onclick = () => toggleSave(p.paperId);
        $('detail-close').onclick = () => select(null);
    }}

    async function exportSaved(route, filename) {{
        try {{
            const response = await fetch(route, {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify({{ papers: state.saved }}),
            }});
            if (!response.ok) throw new Error('Server error: ' + response.status);
            const url = URL.createObjectURL(await response.blob());
            const a = document.createElement('a');
            a.href = url;
            a.download = filename;
            document.body.appendChild(a);
            a.click();
            a.remove();
            URL.revokeObjectURL(url);
        }} catch (err) {{
            setError(err.message);
        }}
    }}

    function renderSaved() {{
        const panel = $('saved');
        let html = '<h2>Saved Papers</h2>';
        if (state.saved.length === 0) {{
            html += '<p>No saved papers yet.</p>';
        }} else {{
            html += '<div class="actions"><button id="export-json">JSON</button><button id="export-csv">CSV</button></div>';
            for (const p of state.saved) {{
                html += `<div class="saved-item">${{esc(p.title)}} <button data-view="${{esc(p.paperId)}}">View Details</button></div>`;
            }}
        }}
        panel.innerHTML = html;
        if ($('export-json')) $('export-json').onclick = () => exportSaved('/api/export/json', '{json_file}');
        if ($('export-csv')) $('export-csv').onclick = () => exportSaved('/api/export/csv', '{csv_file}');
        panel.querySelectorAll('[data-view]').forEach((b) => b.onclick = () => select(b.dataset.view));
    }}

    $('search-form').onsubmit = (e) => {{ e.preventDefault(); search($('query').value); }};
    $('year-filter').onchange = (e) => {{ state.yearFilter = e.target.value ? parseInt(e.target.value, 10) : null; relayout(); }};
    $('saved-toggle').onclick = () => {{ $('saved').classList.toggle('open'); renderSaved(); }};
    $('graph').onclick = (e) => {{
        const act = e.target.dataset && e.target.dataset.act;
        const id = e.target.dataset && e.target.dataset.id;
        if (act === 'explore') select(id);
        else if (act === 'expand') expand(id);
        else if (act === 'save') toggleSave(id);
        else if (act === 'remove') {{ state.papers = state.papers.filter((p) => p.paperId !== id); relayout(); }}
    }};
    </script>
</body>
</html>"##,
        style = STYLE,
        year_options = year_options_html(),
        mock = script_json(&mock_papers()),
        json_file = JSON_FILENAME,
        csv_file = CSV_FILENAME,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_options() {
        let html = year_options_html();
        assert!(html.starts_with(r#"<option value="">All Years</option>"#));
        assert!(html.contains(r#"<option value="2015">2015+</option>"#));
    }

    #[test]
    fn test_script_json_escapes_closing_tags() {
        let json = script_json(&vec!["</script><script>alert(1)"]);
        assert!(!json.contains("</script>"));
    }

    #[test]
    fn test_page_discards_superseded_responses() {
        let page = index_page();
        assert!(page.contains("state.summaryGeneration += 1;"));
        assert!(page.contains("if (generation !== state.summaryGeneration) return;"));
        assert!(page.contains("if (seq !== state.layoutSeq) return;"));
        assert!(!page.contains("state.selected !== selected"));
    }

    #[test]
    fn test_page_delegates_state_changes() {
        let page = index_page();
        for route in [
            "/api/graph/merge",
            "/api/saved/toggle",
            "/api/export/json",
            "/api/export/csv",
        ] {
            assert!(page.contains(route), "{}", route);
        }
        assert!(page.contains("'saved_papers.csv'"));
    }

    #[test]
    fn test_index_page_embeds_mock_papers() {
        let page = index_page();
        assert!(page.contains("const MOCK_PAPERS = [{\"paperId\":\"mock-1\""));
        assert!(page.contains("/api/graph/layout"));
    }
}
