//! Database statistics

use super::Database;
use crate::error::Result;
use crate::search::Module;

/// Item counts for one module
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ModuleCount {
    pub module: Module,
    pub items: usize,
    /// Items carrying the module's default-visible status
    pub visible: usize,
}

/// Database stats
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatabaseStats {
    pub total_items: usize,
    pub modules: Vec<ModuleCount>,
    pub schema_version: Option<i32>,
    pub last_import: Option<String>,
}

impl Database {
    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let mut modules = Vec::with_capacity(Module::ALL.len());
        for module in Module::ALL {
            let (items, visible): (i64, i64) = self.conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(status = ?2), 0)
                 FROM content_items WHERE module = ?1",
                rusqlite::params![module.as_str(), module.default_status().as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            modules.push(ModuleCount {
                module,
                items: items as usize,
                visible: visible as usize,
            });
        }

        let last_import: Option<String> = self.conn.query_row(
            "SELECT MAX(imported_at) FROM content_items",
            [],
            |row| row.get(0),
        )?;

        Ok(DatabaseStats {
            total_items: modules.iter().map(|m| m.items).sum(),
            modules,
            schema_version: self.schema_version()?,
            last_import,
        })
    }

    /// Vacuum the database
    pub fn vacuum(&self) -> Result<()> {
        self.conn.execute("VACUUM", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::*;
    use crate::repository::RawItem;
    use crate::search::test_support::fixed_now;
    use crate::search::ContentStatus;

    #[test]
    fn test_stats_counts_per_module() {
        let mut db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        let empty = db.get_stats().unwrap();
        assert_eq!(empty.total_items, 0);
        assert!(empty.last_import.is_none());

        let now = fixed_now();
        let mut draft = blog("b2", "Draft", "", now);
        if let RawItem::Blog(post) = &mut draft {
            post.status = ContentStatus::Draft;
        }
        db.upsert_items(&[
            forum("f1", "One", "", now),
            blog("b1", "Two", "", now),
            draft,
        ])
        .unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_items, 3);
        let blog_counts = stats
            .modules
            .iter()
            .find(|m| m.module == Module::Blog)
            .unwrap();
        assert_eq!(blog_counts.items, 2);
        assert_eq!(blog_counts.visible, 1);
        assert!(stats.last_import.is_some());
    }
}
