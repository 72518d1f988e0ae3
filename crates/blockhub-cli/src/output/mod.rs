//! Output formatters

pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use blockhub_core::{SearchResponse, SuggestionResponse};

/// Format options
pub struct FormatOptions {
    /// Append the score breakdown of each result
    pub explain: bool,
    pub query: String,
}

/// Format a search response
pub fn format_search_response(
    response: &SearchResponse,
    format: OutputFormat,
    options: &FormatOptions,
) -> String {
    match format {
        OutputFormat::Json => json::format_response(response),
        OutputFormat::Md => markdown::format_response(response, options),
        OutputFormat::Cli => terminal::format_response(response, options),
    }
}

/// Format a suggestion bundle
pub fn format_suggestions(response: &SuggestionResponse, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_suggestions(response),
        OutputFormat::Md => markdown::format_suggestions(response),
        OutputFormat::Cli => terminal::format_suggestions(response),
    }
}
