//! Terminal output formatter

use super::FormatOptions;
use blockhub_core::search::{
    explain_score, FacetValue, HighlightField, SearchResultItem, MARK_CLOSE, MARK_OPEN,
};
use blockhub_core::{SearchResponse, SuggestionResponse};
use chrono::Utc;

pub fn format_response(response: &SearchResponse, options: &FormatOptions) -> String {
    if response.results.is_empty() {
        return format!(
            "No results for \"{}\" ({} ms)\n",
            response.query.q, response.search_time
        );
    }

    let mut output = String::new();
    let now = Utc::now();
    let first = response.query.offset.saturating_add(1);
    output.push_str(&format!(
        "Showing {}-{} of {} results ({} ms)\n\n",
        first,
        response.query.offset.saturating_add(response.results.len()),
        response.total_count,
        response.search_time
    ));

    for result in &response.results {
        output.push_str(&format!(
            "{:>4} [{}] {}\n",
            result.score_or_zero(),
            result.module,
            result.title
        ));
        output.push_str(&format!(
            "     {} · {} · {}  {}\n",
            result.author.name,
            result.category,
            result.created_at.format("%Y-%m-%d"),
            result.url()
        ));

        if let Some(fragment) = best_fragment(result) {
            output.push_str(&format!("     {}\n", fragment));
        } else if !result.excerpt.is_empty() {
            output.push_str(&format!("     {}\n", result.excerpt));
        }

        if options.explain {
            let b = explain_score(result, &options.query, now);
            output.push_str(&format!(
                "     title {:.1} + excerpt {:.1} + content {:.1} + engagement {:.1} + recency {:.1}\n",
                b.title, b.excerpt, b.content, b.engagement, b.recency
            ));
        }
        output.push('\n');
    }

    if let Some(facets) = &response.facets {
        push_facet(&mut output, "Modules", &facets.modules);
        push_facet(&mut output, "Categories", &facets.categories);
        push_facet(&mut output, "Authors", &facets.authors);
        push_facet(&mut output, "Tags", &facets.tags);
        push_facet(&mut output, "Dates", &facets.date_ranges);
    }

    output
}

/// First content or excerpt fragment, with marks rendered as asterisks
fn best_fragment(result: &SearchResultItem) -> Option<String> {
    let highlights = result.highlights.as_ref()?;
    highlights
        .iter()
        .find(|h| h.field != HighlightField::Title)
        .and_then(|h| h.fragments.first())
        .map(|f| f.replace(MARK_OPEN, "*").replace(MARK_CLOSE, "*"))
}

fn push_facet(output: &mut String, name: &str, values: &[FacetValue]) {
    if values.is_empty() {
        return;
    }
    let joined: Vec<String> = values
        .iter()
        .map(|v| format!("{} ({})", v.label, v.count))
        .collect();
    output.push_str(&format!("{:<11} {}\n", format!("{}:", name), joined.join(", ")));
}

pub fn format_suggestions(response: &SuggestionResponse) -> String {
    let mut output = String::new();

    for (heading, values) in [
        ("Completions", &response.completions),
        ("Did you mean", &response.corrections),
        ("Popular", &response.popular),
    ] {
        if values.is_empty() {
            continue;
        }
        output.push_str(&format!("{}:\n", heading));
        for value in values {
            output.push_str(&format!("  {}\n", value));
        }
    }

    if output.is_empty() {
        output.push_str("No suggestions\n");
    }
    output
}
