//! Work-item source
//!
//! Work items live in a SQLite `issues` table maintained by an external tracker. This
//! module only reads it: a filtered listing and a cheap change fingerprint.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TicketError {
    #[error("work-item database not found: {0}")]
    Missing(PathBuf),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("background task failed: {0}")]
    Join(String),
}

/// A ticket/issue to be acted upon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub category: String,
    pub priority: i64,
    pub updated_at: String,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: "open".to_string(),
            category: String::new(),
            priority: 2,
            updated_at: String::new(),
        }
    }
}

/// Filter applied when listing work items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketFilter {
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    /// Maximum number of rows returned
    pub limit: usize,
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self {
            status: None,
            category: None,
            search: None,
            limit: 200,
        }
    }
}

/// Source of work items
#[async_trait]
pub trait TicketSource: Send + Sync {
    /// List work items matching `filter`
    async fn list(&self, filter: &TicketFilter) -> Result<Vec<WorkItem>, TicketError>;

    /// Cheap value that changes whenever the underlying data changes
    async fn fingerprint(&self) -> Result<String, TicketError>;
}

/// Reads work items from a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteTicketSource {
    path: PathBuf,
}

impl SqliteTicketSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(path: &Path) -> Result<Connection, TicketError> {
        if !path.exists() {
            return Err(TicketError::Missing(path.to_path_buf()));
        }
        Ok(Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?)
    }

    fn list_blocking(path: &Path, filter: &TicketFilter) -> Result<Vec<WorkItem>, TicketError> {
        let conn = Self::open(path)?;

        let mut sql = String::from(
            "SELECT id, title, COALESCE(description, ''), COALESCE(status, ''),
                    COALESCE(issue_type, ''), COALESCE(priority, 0), COALESCE(updated_at, '')
             FROM issues WHERE 1 = 1",
        );
        let mut args: Vec<String> = Vec::new();

        if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(" AND status = ?");
            args.push(status.to_string());
        }
        if let Some(category) = filter.category.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(" AND issue_type = ?");
            args.push(category.to_string());
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(" AND (id LIKE ? OR title LIKE ? OR description LIKE ?)");
            let pattern = format!("%{}%", search);
            args.extend(std::iter::repeat(pattern).take(3));
        }
        sql.push_str(&format!(
            " ORDER BY priority ASC, updated_at DESC LIMIT {}",
            filter.limit
        ));

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok(WorkItem {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    status: row.get(3)?,
                    category: row.get(4)?,
                    priority: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn fingerprint_blocking(path: &Path) -> Result<String, TicketError> {
        let conn = Self::open(path)?;
        let (count, latest): (i64, String) = conn.query_row(
            "SELECT COUNT(*), COALESCE(MAX(updated_at), '') FROM issues",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(format!("{}:{}", count, latest))
    }
}

#[async_trait]
impl TicketSource for SqliteTicketSource {
    async fn list(&self, filter: &TicketFilter) -> Result<Vec<WorkItem>, TicketError> {
        let path = self.path.clone();
        let filter = filter.clone();
        tokio::task::spawn_blocking(move || Self::list_blocking(&path, &filter))
            .await
            .map_err(|e| TicketError::Join(e.to_string()))?
    }

    async fn fingerprint(&self) -> Result<String, TicketError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::fingerprint_blocking(&path))
            .await
            .map_err(|e| TicketError::Join(e.to_string()))?
    }
}
