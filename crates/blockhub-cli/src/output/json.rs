//! JSON output formatter

use blockhub_core::{SearchResponse, SuggestionResponse};

pub fn format_response(response: &SearchResponse) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

pub fn format_suggestions(response: &SuggestionResponse) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string()) + "\n"
}
