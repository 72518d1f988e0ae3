//! Search command

use crate::app::{OutputFormat, SearchArgs};
use crate::output::{format_search_response, FormatOptions};
use blockhub_core::search::DateRange;
use anyhow::Result;
use blockhub_core::{SearchEngine, SearchFilters, SearchRequest};

pub async fn run(args: SearchArgs, engine: &SearchEngine, format: OutputFormat) -> Result<()> {
    let explain = args.explain;
    let request = build_request(args);
    let response = engine.search(&request).await?;

    let options = FormatOptions {
        explain,
        query: request.q.clone(),
    };
    print!("{}", format_search_response(&response, format, &options));
    Ok(())
}

fn build_request(args: SearchArgs) -> SearchRequest {
    let date_range = match (args.from, args.to) {
        (None, None) => None,
        (from, to) => Some(DateRange { from, to }),
    };

    SearchRequest {
        q: args.query.join(" "),
        filters: SearchFilters {
            modules: args.modules,
            authors: args.authors,
            categories: args.categories,
            tags: args.tags,
            difficulty: args.difficulties,
            status: args.statuses,
        },
        sort: args.sort,
        date_range,
        limit: args.limit,
        offset: args.offset,
        highlight: !args.no_highlight,
        facets: !args.no_facets,
    }
}
