//! Shared helpers for row-set tests against an in-memory SQLite database

use rusqlite::Connection;
use sea_query::{SelectStatement, SqliteQueryBuilder};

pub struct TestDatabase {
    conn: Connection,
}

#[allow(dead_code)]
impl TestDatabase {
    /// Open an in-memory database and run the given DDL/seed script
    pub fn with_script(script: &str) -> Self {
        let conn = Connection::open_in_memory().expect("open in-memory database");
        conn.execute_batch("PRAGMA foreign_keys = ON;").expect("enable foreign keys");
        conn.execute_batch(script).expect("run setup script");
        Self { conn }
    }

    /// Sorted `id` column of every row the statement returns
    pub fn ids(&self, query: &SelectStatement) -> Vec<i64> {
        let sql = query.to_string(SqliteQueryBuilder);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .unwrap_or_else(|e| panic!("prepare `{sql}`: {e}"));
        let mut ids: Vec<i64> = stmt
            .query_map([], |row| row.get::<_, i64>("id"))
            .expect("query")
            .collect::<Result<_, _>>()
            .expect("rows");
        ids.sort_unstable();
        ids
    }

    /// Sorted `name` column of every row the statement returns
    pub fn names(&self, query: &SelectStatement) -> Vec<String> {
        let sql = query.to_string(SqliteQueryBuilder);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .unwrap_or_else(|e| panic!("prepare `{sql}`: {e}"));
        let mut names: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>("name"))
            .expect("query")
            .collect::<Result<_, _>>()
            .expect("rows");
        names.sort();
        names
    }
}
