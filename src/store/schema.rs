pub const SCHEMA: &str = r#"
-- Every backend keeps its records as opaque values grouped into buckets
CREATE TABLE IF NOT EXISTS kv (
    bucket TEXT NOT NULL,
    key TEXT NOT NULL,
    value BLOB NOT NULL,
    updated_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (bucket, key)
);
"#;
