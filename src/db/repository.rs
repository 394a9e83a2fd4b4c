use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::ingest::parse_published;
use crate::models::{Article, StoredArticle};

use super::schema::{HAS_UNIQUE_LINK, MIGRATE_UNIQUE_LINK, SCHEMA, SWAP_MIGRATED_TABLE};

pub struct Repository {
    conn: Connection,
}

impl Repository {
    /// Open (or create) the store. A pre-existing table is left as is;
    /// call [`Repository::migrate`] to enforce unique links on it.
    pub async fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Insert unless a row with the same link exists. Returns whether a
    /// row was created.
    pub async fn insert_if_absent(&self, article: &Article) -> Result<bool> {
        let article = article.clone();
        let inserted = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    r#"INSERT OR IGNORE INTO articles (title, link, published, summary, source, image_url)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                    params![
                        article.title,
                        article.link,
                        article.published,
                        article.summary,
                        article.source,
                        article.image_url,
                    ],
                )?;
                Ok(changed > 0)
            })
            .await?;
        Ok(inserted)
    }

    /// Insert each article, logging and skipping rows that fail.
    pub async fn save_articles(&self, articles: &[Article]) -> usize {
        let mut inserted = 0;
        for article in articles {
            match self.insert_if_absent(article).await {
                Ok(true) => inserted += 1,
                Ok(false) => tracing::debug!("Already stored: {}", article.link),
                Err(e) => tracing::warn!("Failed to save {}: {}", article.link, e),
            }
        }
        inserted
    }

    /// Impose a unique constraint on `link`, keeping the earliest row per
    /// link. Returns the number of rows removed; zero when the table is
    /// missing or already unique.
    pub async fn migrate(&self) -> Result<usize> {
        let removed = self
            .conn
            .call(|conn| {
                let exists: Option<String> = conn
                    .query_row(
                        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'articles'",
                        [],
                        |row| row.get(0),
                    )
                    .optional()?;
                if exists.is_none() {
                    return Ok(None);
                }

                let unique: i64 = conn.query_row(HAS_UNIQUE_LINK, [], |row| row.get(0))?;
                if unique > 0 {
                    return Ok(None);
                }

                let tx = conn.transaction()?;
                tx.execute_batch(MIGRATE_UNIQUE_LINK)?;
                let old_count: i64 =
                    tx.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
                let new_count: i64 =
                    tx.query_row("SELECT COUNT(*) FROM articles_new", [], |row| row.get(0))?;
                tx.execute_batch(SWAP_MIGRATED_TABLE)?;
                tx.commit()?;

                Ok(Some((old_count - new_count) as usize))
            })
            .await?;

        match removed {
            Some(n) => {
                tracing::info!("Migrated articles table, removed {} duplicate articles", n);
                Ok(n)
            }
            None => {
                tracing::debug!("Articles table already enforces unique links");
                Ok(0)
            }
        }
    }

    /// Delete duplicate links, keeping the most recently inserted row.
    pub async fn dedup_sweep(&self) -> Result<usize> {
        let removed = self
            .conn
            .call(|conn| {
                let removed = conn.execute(
                    "DELETE FROM articles WHERE rowid NOT IN (SELECT MAX(rowid) FROM articles GROUP BY link)",
                    [],
                )?;
                Ok(removed)
            })
            .await?;
        tracing::info!("Dedup sweep removed {} articles", removed);
        Ok(removed)
    }

    pub async fn count(&self) -> Result<usize> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await?;
        Ok(count)
    }

    pub async fn recent_articles(&self, limit: usize) -> Result<Vec<StoredArticle>> {
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, title, link, published, summary, source, image_url, created_at
                       FROM articles
                       ORDER BY created_at DESC, id DESC
                       LIMIT ?1"#,
                )?;
                let articles = stmt
                    .query_map(params![limit as i64], stored_article_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    /// The `CREATE TABLE` statement of the articles table.
    pub async fn table_schema(&self) -> Result<Option<String>> {
        let sql = self
            .conn
            .call(|conn| {
                let sql = conn
                    .query_row(
                        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'articles'",
                        [],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(sql)
            })
            .await?;
        Ok(sql)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // SQLite CURRENT_TIMESTAMP (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

fn stored_article_from_row(row: &Row) -> rusqlite::Result<StoredArticle> {
    let published: Option<String> = row.get(3)?;
    let created_at = row
        .get::<_, Option<String>>(7)?
        .and_then(|s| parse_datetime(&s));
    let pub_date = parse_published(published.as_deref(), created_at.unwrap_or_else(Utc::now));

    Ok(StoredArticle {
        id: row.get(0)?,
        article: Article {
            title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            link: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            published: published.unwrap_or_default(),
            pub_date,
            summary: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            source: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            image_url: row.get(6)?,
        },
    })
}
