//! Repository backed by the platform REST API

use super::{BlogPost, ContentRepository, ForumPost, ModulePage, ModuleQuery, RawItem, WikiGuide};
use crate::config::RemoteConfig;
use crate::error::{BlockhubError, Result};
use crate::search::Module;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// One page as returned by a module listing endpoint
#[derive(Debug, Deserialize)]
struct ApiPage<T> {
    #[serde(alias = "posts", alias = "guides")]
    items: Vec<T>,
    #[serde(default)]
    total: Option<usize>,
}

/// Repository querying one module's search endpoint over HTTP
#[derive(Debug, Clone)]
pub struct HttpRepository {
    module: Module,
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpRepository {
    pub fn new(module: Module, base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(module, base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(
        module: Module,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("blockhub/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            module,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            client,
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Registry with every module served by the configured platform
    pub fn registry(config: &RemoteConfig) -> Result<super::RepositoryRegistry> {
        let url = config.url.as_deref().ok_or_else(|| {
            BlockhubError::Config(format!(
                "remote.url is not set (configure it or export {})",
                crate::config::API_URL_ENV
            ))
        })?;
        let timeout = Duration::from_secs(config.timeout_secs);

        let mut registry = super::RepositoryRegistry::new();
        for module in Module::ALL {
            let repository =
                Self::with_timeout(module, url, timeout)?.with_api_key(config.api_key.clone());
            registry.register(std::sync::Arc::new(repository));
        }
        Ok(registry)
    }

    /// Endpoint path for this module
    pub fn endpoint(&self) -> String {
        let path = match self.module {
            Module::Forum => "/api/forum/posts",
            Module::Blog => "/api/blog/posts",
            Module::Wiki => "/api/wiki/guides",
        };
        format!("{}{}", self.base_url, path)
    }

    fn status_error(&self, status: StatusCode, url: &str) -> BlockhubError {
        let message = match status {
            StatusCode::NOT_FOUND => format!("endpoint not found (404): {}", url),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => format!(
                "access denied ({}): {}. Check remote.api_key.",
                status.as_u16(),
                url
            ),
            StatusCode::TOO_MANY_REQUESTS => {
                format!("rate limit exceeded (429): {}. Try again later.", url)
            }
            s => format!(
                "HTTP error {}: {}",
                s.as_u16(),
                s.canonical_reason().unwrap_or("Unknown error")
            ),
        };
        BlockhubError::repository(self.module, message)
    }
}

/// Query-string pairs for a module search
pub fn query_pairs(query: &str, params: &ModuleQuery) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("q", query.to_string()),
        ("sort", params.sort_hint.as_str().to_string()),
        ("limit", params.limit.to_string()),
        ("offset", params.offset.to_string()),
    ];

    let mut joined = |key: &'static str, values: Vec<String>| {
        if !values.is_empty() {
            pairs.push((key, values.join(",")));
        }
    };
    joined("categories", params.categories.clone());
    joined("tags", params.tags.clone());
    joined("authors", params.authors.clone());
    joined(
        "status",
        params.statuses.iter().map(|s| s.as_str().to_string()).collect(),
    );
    joined(
        "difficulty",
        params
            .difficulties
            .iter()
            .map(|d| d.as_str().to_string())
            .collect(),
    );

    if let Some(range) = &params.date_range {
        if let Some(from) = range.from {
            pairs.push(("from", from.to_rfc3339()));
        }
        if let Some(to) = range.to {
            pairs.push(("to", to.to_rfc3339()));
        }
    }

    pairs
}

fn decode<T: DeserializeOwned>(body: &str, wrap: fn(T) -> RawItem) -> Result<ModulePage> {
    let page: ApiPage<T> = serde_json::from_str(body)?;
    let items: Vec<RawItem> = page.items.into_iter().map(wrap).collect();
    Ok(ModulePage {
        total: page.total.unwrap_or(items.len()),
        items,
    })
}

/// Decode a listing response into module-tagged items
pub fn decode_page(module: Module, body: &str) -> Result<ModulePage> {
    match module {
        Module::Forum => decode::<ForumPost>(body, RawItem::Forum),
        Module::Blog => decode::<BlogPost>(body, RawItem::Blog),
        Module::Wiki => decode::<WikiGuide>(body, RawItem::Wiki),
    }
}

#[async_trait]
impl ContentRepository for HttpRepository {
    fn module(&self) -> Module {
        self.module
    }

    async fn search(&self, query: &str, params: &ModuleQuery) -> Result<ModulePage> {
        let url = self.endpoint();
        let mut request = self.client.get(&url).query(&query_pairs(query, params));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(module = %self.module, url = %url, "Remote module search");

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request to {} timed out", url)
            } else if e.is_connect() {
                format!("cannot reach {}", url)
            } else {
                e.to_string()
            };
            BlockhubError::repository(self.module, message)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, &url));
        }

        let body = response.text().await?;
        decode_page(self.module, &body)
            .map_err(|e| BlockhubError::repository(self.module, format!("bad response: {}", e)))
    }
}
