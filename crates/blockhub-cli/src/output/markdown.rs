//! Markdown output formatter

use super::FormatOptions;
use blockhub_core::search::explain_score;
use blockhub_core::{SearchResponse, SuggestionResponse};
use chrono::Utc;

pub fn format_response(response: &SearchResponse, options: &FormatOptions) -> String {
    let mut output = String::from("# Search Results\n\n");
    let now = Utc::now();

    for (i, r) in response.results.iter().enumerate() {
        output.push_str(&format!(
            "## {}. {} (Score: {})\n\n",
            response.query.offset.saturating_add(i + 1),
            r.title,
            r.score_or_zero()
        ));
        output.push_str(&format!("- **Module**: {}\n", r.module.label()));
        output.push_str(&format!("- **Author**: {}\n", r.author.name));
        output.push_str(&format!("- **Category**: {}\n", r.category));
        if !r.tags.is_empty() {
            output.push_str(&format!("- **Tags**: {}\n", r.tags.join(", ")));
        }
        output.push_str(&format!("- **Link**: `{}`\n", r.url()));
        if options.explain {
            let b = explain_score(r, &options.query, now);
            output.push_str(&format!(
                "- **Breakdown**: title {:.1}, excerpt {:.1}, content {:.1}, engagement {:.1}, recency {:.1}\n",
                b.title, b.excerpt, b.content, b.engagement, b.recency
            ));
        }
        if !r.excerpt.is_empty() {
            output.push_str(&format!("\n> {}\n", r.excerpt));
        }
        output.push_str("\n---\n\n");
    }

    if response.results.is_empty() {
        output.push_str("*No results found*\n");
    } else {
        output.push_str(&format!(
            "*{} of {} results in {} ms*\n",
            response.results.len(),
            response.total_count,
            response.search_time
        ));
    }

    output
}

pub fn format_suggestions(response: &SuggestionResponse) -> String {
    let mut output = String::from("# Suggestions\n\n");

    for (heading, values) in [
        ("Completions", &response.completions),
        ("Did you mean", &response.corrections),
        ("Popular searches", &response.popular),
    ] {
        if values.is_empty() {
            continue;
        }
        output.push_str(&format!("## {}\n\n", heading));
        for value in values {
            output.push_str(&format!("- {}\n", value));
        }
        output.push('\n');
    }

    if response.completions.is_empty()
        && response.corrections.is_empty()
        && response.popular.is_empty()
    {
        output.push_str("*No suggestions*\n");
    }

    output
}
