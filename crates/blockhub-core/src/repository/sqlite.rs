//! Repository backed by the local SQLite store

use super::{ContentRepository, ModulePage, ModuleQuery, RepositoryRegistry};
use crate::db::Database;
use crate::error::{BlockhubError, Result};
use crate::search::Module;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// One module's view of a shared `Database`
///
/// Queries run on the blocking thread pool; the connection is guarded by a mutex.
#[derive(Clone)]
pub struct SqliteRepository {
    module: Module,
    db: Arc<Mutex<Database>>,
}

impl SqliteRepository {
    pub fn new(module: Module, db: Arc<Mutex<Database>>) -> Self {
        Self { module, db }
    }

    /// Registry with all modules served from the same database
    pub fn registry(db: Database) -> RepositoryRegistry {
        Self::shared_registry(Arc::new(Mutex::new(db)))
    }

    /// Like [`SqliteRepository::registry`], for a database the caller keeps using
    pub fn shared_registry(shared: Arc<Mutex<Database>>) -> RepositoryRegistry {
        Module::ALL
            .into_iter()
            .fold(RepositoryRegistry::new(), |registry, module| {
                registry.with(Arc::new(Self::new(module, shared.clone())))
            })
    }
}

#[async_trait]
impl ContentRepository for SqliteRepository {
    fn module(&self) -> Module {
        self.module
    }

    async fn search(&self, query: &str, params: &ModuleQuery) -> Result<ModulePage> {
        let module = self.module;
        let db = self.db.clone();
        let query = query.to_string();
        let params = params.clone();

        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|_| BlockhubError::repository(module, "database lock poisoned"))?;
            db.search_items(module, &query, &params)
        })
        .await
        .map_err(|e| BlockhubError::repository(module, format!("search task failed: {}", e)))?
    }

    async fn titles(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let module = self.module;
        let db = self.db.clone();
        let query = query.to_string();

        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|_| BlockhubError::repository(module, "database lock poisoned"))?;
            db.search_titles(module, &query, limit)
        })
        .await
        .map_err(|e| BlockhubError::repository(module, format!("titles task failed: {}", e)))?
    }
}
