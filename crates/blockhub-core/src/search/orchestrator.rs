//! Cross-module search and suggestion pipelines

use super::{
    aggregate_facets, is_visible, normalize_with_excerpt, popular_searches, rank_completions,
    score, sort_results, suggest_corrections, Highlighter, Module, RequestType, SearchRequest,
    SearchResponse, SearchResultItem, SearchStats, SuggestionConfig, SuggestionResponse,
    COMPLETION_FETCH_LIMIT, MIN_SUGGEST_LENGTH,
};
use crate::config::{Config, SearchConfig};
use crate::error::{BlockhubError, Result};
use crate::repository::{ModuleQuery, RawItem, RepositoryRegistry};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;

/// Composes module repositories into one ranked, faceted search
#[derive(Debug, Clone)]
pub struct SearchEngine {
    registry: RepositoryRegistry,
    settings: SearchConfig,
    suggestions: SuggestionConfig,
    stats: Arc<SearchStats>,
}

impl SearchEngine {
    /// Engine with default settings and word lists
    pub fn new(registry: RepositoryRegistry) -> Self {
        Self {
            registry,
            settings: SearchConfig::default(),
            suggestions: SuggestionConfig::default(),
            stats: Arc::new(SearchStats::new()),
        }
    }

    /// Engine configured from a loaded `Config`
    pub fn from_config(registry: RepositoryRegistry, config: &Config) -> Self {
        Self::new(registry)
            .with_settings(config.search.clone())
            .with_suggestions(config.suggestions.clone())
    }

    pub fn with_settings(mut self, settings: SearchConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_suggestions(mut self, suggestions: SuggestionConfig) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &SearchConfig {
        &self.settings
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Run a full search at the current time
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.search_at(request, Utc::now()).await
    }

    /// Run a full search, scoring and bucketing relative to `now`
    ///
    /// A module whose repository is missing or fails contributes no results;
    /// only validation errors and failures outside the per-module fan-out are
    /// returned as errors.
    pub async fn search_at(
        &self,
        request: &SearchRequest,
        now: DateTime<Utc>,
    ) -> Result<SearchResponse> {
        let started = Instant::now();

        if let Err(e) = request.validate(self.settings.max_query_length) {
            self.stats.record_failed_search();
            return Err(e);
        }

        let modules = request.filters.target_modules();
        let (module_limit, module_offset) =
            self.settings
                .pagination
                .window(request.limit, request.offset, modules.len());
        let hint = request.sort.hint();

        tracing::debug!(
            query = %request.q,
            modules = ?modules,
            module_limit,
            module_offset,
            "Fanning out search"
        );

        let fetches = modules.iter().map(|&module| {
            let params = ModuleQuery::from_filters(
                module,
                &request.filters,
                request.date_range.as_ref(),
                hint,
                module_limit,
                module_offset,
            );
            self.fetch_module(module, &request.q, params)
        });
        let pages = join_all(fetches).await;

        let highlighter = if request.highlight {
            Highlighter::new(&request.q).map_err(|e| self.failed(started, e))?
        } else {
            None
        };

        let combined: Vec<SearchResultItem> = pages
            .into_iter()
            .flatten()
            .map(|raw| {
                let mut item = normalize_with_excerpt(raw, self.settings.excerpt_length);
                item.score = Some(score(&item, &request.q, now));
                if let Some(highlighter) = &highlighter {
                    let highlights = highlighter.highlight(&item);
                    if !highlights.is_empty() {
                        item.highlights = Some(highlights);
                    }
                }
                item
            })
            .collect();

        let sorted = sort_results(&combined, request.sort);
        let facets = request.facets.then(|| aggregate_facets(&sorted, now));
        let total_count = sorted.len();
        let results: Vec<SearchResultItem> = sorted
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .collect();

        let elapsed = started.elapsed();
        self.stats.record_request(RequestType::Search, elapsed);
        tracing::info!(
            query = %request.q,
            total = total_count,
            returned = results.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Search complete"
        );

        Ok(SearchResponse {
            results,
            total_count,
            search_time: elapsed.as_millis() as u64,
            facets,
            query: request.echo(),
        })
    }

    /// One module's visible items; failures are logged and yield nothing
    async fn fetch_module(&self, module: Module, query: &str, params: ModuleQuery) -> Vec<RawItem> {
        let Some(repository) = self.registry.get(module) else {
            tracing::warn!(module = %module, "No repository bound for module, skipping");
            self.stats.record_module_failure();
            return Vec::new();
        };

        match repository.search(query, &params).await {
            Ok(page) => {
                tracing::debug!(
                    module = %module,
                    returned = page.items.len(),
                    total = page.total,
                    "Module search returned"
                );
                page.items
                    .into_iter()
                    .filter(|item| is_visible(item, &params.statuses))
                    .collect()
            }
            Err(e) => {
                tracing::warn!(module = %module, error = %e, "Module search failed, continuing without it");
                self.stats.record_module_failure();
                Vec::new()
            }
        }
    }

    fn failed(&self, started: Instant, error: BlockhubError) -> BlockhubError {
        self.stats.record_failed_search();
        BlockhubError::SearchFailed {
            elapsed_ms: started.elapsed().as_millis() as u64,
            message: error.to_string(),
        }
    }

    /// Completions, corrections and popular searches for a partial query
    ///
    /// Queries shorter than two characters yield an empty bundle. The three
    /// parts are computed independently, and a failing module only drops its
    /// own completions.
    pub async fn suggest(&self, query: &str, module: Option<Module>) -> SuggestionResponse {
        let started = Instant::now();
        let query = query.trim();
        if query.chars().count() < MIN_SUGGEST_LENGTH {
            return SuggestionResponse::default();
        }

        let completions = self.completions(query, module).await;
        let corrections = suggest_corrections(query, &self.suggestions);
        let popular = popular_searches(query, module, &self.suggestions);

        let elapsed = started.elapsed();
        self.stats.record_request(RequestType::Suggest, elapsed);
        tracing::debug!(
            query,
            completions = completions.len(),
            corrections = corrections.len(),
            popular = popular.len(),
            "Suggestions computed"
        );

        SuggestionResponse {
            completions,
            corrections,
            popular,
            search_time: elapsed.as_millis() as u64,
        }
    }

    async fn completions(&self, query: &str, module: Option<Module>) -> Vec<String> {
        let modules = match module {
            Some(module) => vec![module],
            None => Module::ALL.to_vec(),
        };

        let fetches = modules.into_iter().map(|module| async move {
            let repository = self.registry.get(module)?;
            match repository.titles(query, COMPLETION_FETCH_LIMIT).await {
                Ok(titles) => Some(titles),
                Err(e) => {
                    tracing::warn!(module = %module, error = %e, "Completion lookup failed");
                    self.stats.record_module_failure();
                    None
                }
            }
        });

        let titles: Vec<String> = join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .flatten()
            .collect();
        rank_completions(query, &titles)
    }
}
