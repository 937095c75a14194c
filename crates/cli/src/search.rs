//! Plain-text rendering of search results

use ragscope_core::RankedResultList;

/// Maximum characters of chunk text shown per result
pub const PREVIEW_CHARS: usize = 200;

/// Render ranked results as numbered entries with a text preview
pub fn format_results(query: &str, results: &RankedResultList) -> String {
    let mut lines = vec![format!("Query: '{query}'"), format!("{:-<70}", "")];

    if results.is_empty() {
        lines.push("No results above the similarity threshold.".to_string());
        return lines.join("\n");
    }

    for (i, item) in results.iter().enumerate() {
        lines.push(format!(
            "{}. {} (chunk {}) similarity {:.3}",
            i + 1,
            item.source,
            item.chunk_index,
            item.similarity
        ));
        lines.push(format!("   {}", preview(&item.text, PREVIEW_CHARS)));
    }
    lines.join("\n")
}

/// Single-line preview truncated at a character boundary
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
