//! Highlight fragments around matched query terms

use super::{query_terms, Highlight, HighlightField, SearchResultItem};
use crate::error::Result;
use regex::{Regex, RegexBuilder};

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";
pub const ELLIPSIS: &str = "...";

/// Characters of context per content/excerpt fragment
const FRAGMENT_WINDOW: usize = 150;

/// Fragments emitted per content/excerpt field
const MAX_FRAGMENTS: usize = 3;

/// Compiled matchers for one query, reusable across every item of a search
#[derive(Debug, Clone)]
pub struct Highlighter {
    /// Alternation of all terms, longest first
    any_term: Regex,
    /// One matcher per distinct term, in query order
    per_term: Vec<Regex>,
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

impl Highlighter {
    /// Build matchers for a query; `None` when no term is long enough to highlight
    ///
    /// Terms are regex-escaped, so user input never reaches the pattern syntax.
    pub fn new(query: &str) -> Result<Option<Self>> {
        let mut terms = query_terms(query);
        let mut seen = std::collections::HashSet::new();
        terms.retain(|t| seen.insert(t.clone()));
        if terms.is_empty() {
            return Ok(None);
        }

        let per_term = terms
            .iter()
            .map(|t| case_insensitive(&regex::escape(t)))
            .collect::<Result<Vec<_>>>()?;

        let mut longest_first = terms.clone();
        longest_first.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
        let alternation = longest_first
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Some(Self {
            any_term: case_insensitive(&alternation)?,
            per_term,
        }))
    }

    /// Highlights for every field with at least one match
    pub fn highlight(&self, item: &SearchResultItem) -> Vec<Highlight> {
        let mut highlights = Vec::new();

        if self.any_term.is_match(&item.title) {
            highlights.push(Highlight {
                field: HighlightField::Title,
                fragments: vec![self.mark(&item.title)],
            });
        }

        if let Some(content) = item.content.as_deref() {
            let fragments = self.fragments(content);
            if !fragments.is_empty() {
                highlights.push(Highlight {
                    field: HighlightField::Content,
                    fragments,
                });
            }
        }

        let fragments = self.fragments(&item.excerpt);
        if !fragments.is_empty() {
            highlights.push(Highlight {
                field: HighlightField::Excerpt,
                fragments,
            });
        }

        highlights
    }

    /// Wrap every term occurrence in markers
    fn mark(&self, text: &str) -> String {
        self.any_term
            .replace_all(text, |caps: &regex::Captures| {
                format!("{}{}{}", MARK_OPEN, &caps[0], MARK_CLOSE)
            })
            .into_owned()
    }

    /// One window per term around its first occurrence, capped at `MAX_FRAGMENTS`
    fn fragments(&self, text: &str) -> Vec<String> {
        let mut fragments: Vec<String> = Vec::new();
        if text.is_empty() {
            return fragments;
        }
        let total_chars = text.chars().count();

        for term_re in &self.per_term {
            if fragments.len() >= MAX_FRAGMENTS {
                break;
            }
            let Some(found) = term_re.find(text) else {
                continue;
            };

            let match_start = text[..found.start()].chars().count();
            let match_end = match_start + found.as_str().chars().count();
            let start = match_start.saturating_sub(FRAGMENT_WINDOW / 2);
            let end = (start + FRAGMENT_WINDOW).max(match_end).min(total_chars);

            let window = char_slice(text, start, end);
            let mut fragment = String::new();
            if start > 0 {
                fragment.push_str(ELLIPSIS);
            }
            fragment.push_str(&self.mark(window));
            if end < total_chars {
                fragment.push_str(ELLIPSIS);
            }

            if !fragments.contains(&fragment) {
                fragments.push(fragment);
            }
        }

        fragments
    }
}

/// Substring by character positions
fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |pos: usize| {
        text.char_indices()
            .nth(pos)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len())
    };
    &text[byte_at(start)..byte_at(end)]
}

/// Highlights for one item; empty when the query has no highlightable term
pub fn highlight(item: &SearchResultItem, query: &str) -> Result<Vec<Highlight>> {
    Ok(Highlighter::new(query)?
        .map(|h| h.highlight(item))
        .unwrap_or_default())
}
