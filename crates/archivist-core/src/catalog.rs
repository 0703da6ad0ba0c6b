//! Read-only catalog interface and its SQLite implementation.
//!
//! The catalog answers three questions: which categories exist, which content
//! files belong to a category, and which item ids (for images) belong to a
//! category. Rows carry their raw tag and category columns; membership and
//! classification are decided by the grouper, not by SQL.

use crate::error::{BuildError, BuildResult};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// A content file referenced by an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRow {
    /// Path relative to the content root.
    pub path: String,
    /// Raw `;`-delimited tag column.
    pub tags: String,
    /// Raw `;`-delimited category column.
    pub categories: String,
}

/// An item whose images are bundled per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRow {
    pub id: String,
    pub tags: String,
    pub categories: String,
}

/// Read-only source of truth for grouping.
///
/// Rows may include false positives for a category (the SQL side only
/// pre-filters); callers must re-validate membership.
pub trait CatalogSource {
    /// Distinct category names, sorted.
    fn categories(&self) -> BuildResult<Vec<String>>;

    /// Content rows that may belong to `category`, in catalog order.
    fn content_rows(&self, category: &str) -> BuildResult<Vec<ContentRow>>;

    /// Image rows that may belong to `category`, in catalog order.
    fn image_rows(&self, category: &str) -> BuildResult<Vec<ImageRow>>;
}

impl<T: CatalogSource + ?Sized> CatalogSource for &T {
    fn categories(&self) -> BuildResult<Vec<String>> {
        (**self).categories()
    }

    fn content_rows(&self, category: &str) -> BuildResult<Vec<ContentRow>> {
        (**self).content_rows(category)
    }

    fn image_rows(&self, category: &str) -> BuildResult<Vec<ImageRow>> {
        (**self).image_rows(category)
    }
}

/// Catalog backed by the curated SQLite database.
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open the database strictly read-only.
    pub fn open(path: &Path) -> BuildResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| BuildError::data_source(format!("open {}", path.display()), e))?;
        Ok(Self { conn })
    }

    /// Wrap an existing connection (in-memory databases in tests).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

fn like_pattern(category: &str) -> String {
    format!("%{}%", category)
}

impl CatalogSource for SqliteCatalog {
    fn categories(&self) -> BuildResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT name FROM platform_alias ORDER BY name ASC")
            .map_err(|e| BuildError::data_source("prepare category query", e))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| BuildError::data_source("list categories", e))?;
        Ok(names)
    }

    fn content_rows(&self, category: &str) -> BuildResult<Vec<ContentRow>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT game_data.path, game.tagsStr, game.platformsStr
                 FROM game_data
                 JOIN game ON game_data.gameId = game.id
                 WHERE game.platformsStr LIKE ?1",
            )
            .map_err(|e| BuildError::data_source("prepare content query", e))?;
        let rows = stmt
            .query_map(params![like_pattern(category)], |row| {
                Ok(ContentRow {
                    path: row.get(0)?,
                    tags: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    categories: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| BuildError::data_source(format!("content rows for {}", category), e))?;
        Ok(rows)
    }

    fn image_rows(&self, category: &str) -> BuildResult<Vec<ImageRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, tagsStr, platformsStr FROM game WHERE platformsStr LIKE ?1")
            .map_err(|e| BuildError::data_source("prepare image query", e))?;
        let rows = stmt
            .query_map(params![like_pattern(category)], |row| {
                Ok(ImageRow {
                    id: row.get(0)?,
                    tags: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    categories: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(|e| BuildError::data_source(format!("image rows for {}", category), e))?;
        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SCHEMA: &str = "
        CREATE TABLE platform_alias (name TEXT NOT NULL);
        CREATE TABLE game (id TEXT PRIMARY KEY, tagsStr TEXT, platformsStr TEXT);
        CREATE TABLE game_data (gameId TEXT NOT NULL, path TEXT NOT NULL);
    ";

    pub(crate) fn catalog_with(games: &[(&str, &str, &str, &[&str])]) -> SqliteCatalog {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        for (id, tags, platforms, paths) in games {
            conn.execute(
                "INSERT INTO game (id, tagsStr, platformsStr) VALUES (?1, ?2, ?3)",
                params![id, tags, platforms],
            )
            .unwrap();
            for p in *paths {
                conn.execute(
                    "INSERT INTO game_data (gameId, path) VALUES (?1, ?2)",
                    params![id, p],
                )
                .unwrap();
            }
            for platform in crate::classify::split_tags(platforms) {
                conn.execute(
                    "INSERT INTO platform_alias (name) VALUES (?1)",
                    params![platform],
                )
                .unwrap();
            }
        }
        SqliteCatalog::from_connection(conn)
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        let catalog = catalog_with(&[
            ("g1", "", "SNES; Arcade", &[]),
            ("g2", "", "Arcade", &[]),
        ]);
        assert_eq!(catalog.categories().unwrap(), vec!["Arcade", "SNES"]);
    }

    #[test]
    fn content_rows_prefilter_by_substring() {
        let catalog = catalog_with(&[
            ("g1", "Action", "SNES", &["a.zip", "b.zip"]),
            ("g2", "", "Super SNES Extended", &["c.zip"]),
            ("g3", "", "Arcade", &["d.zip"]),
        ]);
        let rows = catalog.content_rows("SNES").unwrap();
        let paths: Vec<_> = rows.iter().map(|r| r.path.as_str()).collect();
        // The LIKE pre-filter is allowed to over-match; the grouper filters.
        assert_eq!(paths, vec!["a.zip", "b.zip", "c.zip"]);
        assert_eq!(rows[0].tags, "Action");
    }

    #[test]
    fn null_columns_read_as_empty() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO game (id, tagsStr, platformsStr) VALUES ('g1', NULL, 'Arcade')",
            [],
        )
        .unwrap();
        let catalog = SqliteCatalog::from_connection(conn);
        let rows = catalog.image_rows("Arcade").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tags, "");
    }

    #[test]
    fn missing_schema_is_a_data_source_error() {
        let catalog = SqliteCatalog::from_connection(Connection::open_in_memory().unwrap());
        let err = catalog.categories().unwrap_err();
        assert!(matches!(err, BuildError::DataSource { .. }));
    }
}
