pub const SCHEMA: &str = r#"
-- articles table, one row per link
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    link TEXT UNIQUE,
    published TEXT,
    summary TEXT,
    source TEXT,
    image_url TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_articles_link ON articles(link);
"#;

/// Rebuilds a legacy `articles` table with a unique `link`, keeping the
/// earliest row per link.
pub const MIGRATE_UNIQUE_LINK: &str = r#"
CREATE TABLE articles_new (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    link TEXT UNIQUE,
    published TEXT,
    summary TEXT,
    source TEXT,
    image_url TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

INSERT INTO articles_new (id, title, link, published, summary, source, image_url, created_at)
SELECT rowid, title, link, published, summary, source, image_url, created_at
FROM articles
WHERE rowid IN (SELECT MIN(rowid) FROM articles GROUP BY link)
ORDER BY rowid;
"#;

pub const SWAP_MIGRATED_TABLE: &str = r#"
DROP TABLE articles;
ALTER TABLE articles_new RENAME TO articles;
CREATE INDEX IF NOT EXISTS idx_articles_link ON articles(link);
"#;

/// Non-zero when a unique index covers `link`.
pub const HAS_UNIQUE_LINK: &str = r#"
SELECT COUNT(*)
FROM pragma_index_list('articles') AS il
JOIN pragma_index_info(il.name) AS ii
WHERE il."unique" = 1
  AND ii.name = 'link'
"#;
