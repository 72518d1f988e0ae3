//! Facet aggregation over a combined result set

use super::{capitalize, SearchResultItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authors kept in the author facet
const MAX_AUTHOR_FACETS: usize = 10;

/// Tags kept in the tag facet
const MAX_TAG_FACETS: usize = 15;

/// One bucket of a facet group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub count: usize,
    pub label: String,
}

/// Grouped counts for a result set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFacets {
    pub modules: Vec<FacetValue>,
    pub categories: Vec<FacetValue>,
    pub authors: Vec<FacetValue>,
    pub tags: Vec<FacetValue>,
    pub date_ranges: Vec<FacetValue>,
}

/// Creation-date bucket, in canonical display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DateBucket {
    PastWeek,
    PastMonth,
    PastThreeMonths,
    PastSixMonths,
    Older,
}

impl DateBucket {
    pub const ALL: [DateBucket; 5] = [
        DateBucket::PastWeek,
        DateBucket::PastMonth,
        DateBucket::PastThreeMonths,
        DateBucket::PastSixMonths,
        DateBucket::Older,
    ];

    /// Bucket for a creation date, by calendar-day difference from `now`
    pub fn for_date(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let days = (now.date_naive() - created_at.date_naive()).num_days();
        match days {
            d if d <= 7 => Self::PastWeek,
            d if d <= 30 => Self::PastMonth,
            d if d <= 90 => Self::PastThreeMonths,
            d if d <= 180 => Self::PastSixMonths,
            _ => Self::Older,
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            Self::PastWeek => "week",
            Self::PastMonth => "month",
            Self::PastThreeMonths => "3months",
            Self::PastSixMonths => "6months",
            Self::Older => "older",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PastWeek => "Past week",
            Self::PastMonth => "Past month",
            Self::PastThreeMonths => "Past 3 months",
            Self::PastSixMonths => "Past 6 months",
            Self::Older => "6+ months ago",
        }
    }
}

/// Counter preserving first-occurrence order for tie breaks
#[derive(Default)]
struct OrderedCounter {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl OrderedCounter {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    /// Buckets by descending count (stable, so ties keep first-occurrence order)
    fn into_facets(
        self,
        cap: Option<usize>,
        label: impl Fn(&str) -> String,
    ) -> Vec<FacetValue> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some(cap) = cap {
            entries.truncate(cap);
        }
        entries
            .into_iter()
            .map(|(value, count)| FacetValue {
                label: label(&value),
                value,
                count,
            })
            .collect()
    }
}

/// Compute facets over the full (unpaginated) result set
pub fn aggregate_facets(results: &[SearchResultItem], now: DateTime<Utc>) -> SearchFacets {
    let mut modules = OrderedCounter::default();
    let mut categories = OrderedCounter::default();
    let mut authors = OrderedCounter::default();
    let mut tags = OrderedCounter::default();
    let mut dates: HashMap<DateBucket, usize> = HashMap::new();

    for item in results {
        modules.add(item.module.as_str());
        if !item.category.is_empty() {
            categories.add(&item.category);
        }
        if !item.author.name.is_empty() {
            authors.add(&item.author.name);
        }
        for tag in &item.tags {
            tags.add(tag);
        }
        *dates
            .entry(DateBucket::for_date(item.created_at, now))
            .or_insert(0) += 1;
    }

    let date_ranges = DateBucket::ALL
        .iter()
        .filter_map(|bucket| {
            dates.get(bucket).map(|&count| FacetValue {
                value: bucket.value().to_string(),
                count,
                label: bucket.label().to_string(),
            })
        })
        .collect();

    SearchFacets {
        modules: modules.into_facets(None, capitalize),
        categories: categories.into_facets(None, capitalize),
        authors: authors.into_facets(Some(MAX_AUTHOR_FACETS), str::to_string),
        tags: tags.into_facets(Some(MAX_TAG_FACETS), str::to_string),
        date_ranges,
    }
}
