//! SQLite content-query adapter
//!
//! Scripts and ad-hoc statements are executed against a single connection
//! guarded by a mutex. Rows come back as JSON objects keyed by column name so
//! they can be attached to reports and compared in questions without a
//! schema-specific type.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::{Captures, Regex};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Batch, Connection, Statement};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::{Error, Result};

/// Result rows, one JSON object per row
pub type Rows = Vec<Value>;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\$").expect("placeholder pattern is valid"));

/// Outcome of a script run with substituted values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptOutcome {
    /// SQL after placeholder substitution
    pub modified_sql: String,
    pub rows: Rows,
}

/// Content-query capability consumed by database abilities
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Establish the connection
    async fn connect(&self) -> Result<()>;

    /// Run every statement in a SQL file, returning the rows of the last
    /// statement that produced any
    async fn execute_script(&self, script_path: &Path) -> Result<Rows>;

    /// Replace `$$` placeholders with `values` in order, then run the script
    async fn replace_values_and_execute_script(
        &self,
        script_path: &Path,
        values: &[String],
    ) -> Result<ScriptOutcome>;

    /// Run a row-producing statement with positional parameters
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Rows>;

    /// Run a statement with positional parameters, returning affected rows
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Drop the connection
    async fn close_connection(&self) -> Result<()>;
}

enum Target {
    File(PathBuf),
    Memory,
}

/// SQLite implementation of [`DatabaseAdapter`]
pub struct SqliteAdapter {
    target: Target,
    connect_timeout: Duration,
    retry_interval: Duration,
    conn: Mutex<Option<Connection>>,
}

impl SqliteAdapter {
    /// Adapter for the database file named in `config`
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            target: Target::File(config.path.clone()),
            connect_timeout: config.connect_timeout(),
            retry_interval: config.retry_interval(),
            conn: Mutex::new(None),
        }
    }

    /// In-memory database (for testing)
    pub fn in_memory() -> Self {
        Self {
            target: Target::Memory,
            connect_timeout: Duration::from_secs(1),
            retry_interval: Duration::from_millis(100),
            conn: Mutex::new(None),
        }
    }

    /// Whether `connect` has succeeded and the connection is still open
    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }

    fn open(&self) -> Result<Connection> {
        let conn = match &self.target {
            Target::File(path) => Connection::open(path)?,
            Target::Memory => Connection::open_in_memory()?,
        };
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    fn describe(&self) -> String {
        match &self.target {
            Target::File(path) => path.display().to_string(),
            Target::Memory => ":memory:".to_string(),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(Error::NotConnected)?;
        f(conn)
    }
}

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
    async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let start = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.open() {
                Ok(conn) => {
                    *self.conn.lock() = Some(conn);
                    info!("Connected to database {} after {} attempt(s)", self.describe(), attempts);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Connection attempt {} failed: {}", attempts, e);
                }
            }

            if start.elapsed() + self.retry_interval >= self.connect_timeout {
                break;
            }
            tokio::time::sleep(self.retry_interval).await;
        }

        Err(Error::ConnectionTimeout {
            seconds: self.connect_timeout.as_secs(),
        })
    }

    async fn execute_script(&self, script_path: &Path) -> Result<Rows> {
        let sql = read_script(script_path)?;
        debug!("Executing script {}", script_path.display());
        self.with_conn(|conn| run_statements(conn, &sql))
    }

    async fn replace_values_and_execute_script(
        &self,
        script_path: &Path,
        values: &[String],
    ) -> Result<ScriptOutcome> {
        let sql = read_script(script_path)?;
        let modified_sql = substitute_placeholders(&sql, values);
        debug!("Executing script {} with {} value(s)", script_path.display(), values.len());
        let rows = self.with_conn(|conn| run_statements(conn, &modified_sql))?;
        Ok(ScriptOutcome { modified_sql, rows })
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<Rows> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            collect_rows(&mut stmt, params_from_iter(params.iter().map(to_sql_value)))
        })
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            Ok(stmt.execute(params_from_iter(params.iter().map(to_sql_value)))?)
        })
    }

    async fn close_connection(&self) -> Result<()> {
        if let Some(conn) = self.conn.lock().take() {
            conn.close().map_err(|(_, e)| Error::Database(e))?;
            info!("Closed database {}", self.describe());
        }
        Ok(())
    }
}

/// Replace each `$$` in `sql` with the next value. Placeholders left over
/// once `values` runs out stay as `$$`.
pub fn substitute_placeholders(sql: &str, values: &[String]) -> String {
    let mut remaining = values.iter();
    PLACEHOLDER
        .replace_all(sql, |_: &Captures<'_>| match remaining.next() {
            Some(value) => value.clone(),
            None => "$$".to_string(),
        })
        .into_owned()
}

fn read_script(path: &Path) -> Result<String> {
    let sql = std::fs::read_to_string(path)?;
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(Error::EmptyScript(path.display().to_string()));
    }
    Ok(sql.to_string())
}

fn run_statements(conn: &Connection, sql: &str) -> Result<Rows> {
    let mut rows = Vec::new();
    let mut batch = Batch::new(conn, sql);

    while let Some(mut stmt) = batch.next()? {
        if stmt.column_count() > 0 {
            rows = collect_rows(&mut stmt, [])?;
        } else {
            stmt.execute([])?;
        }
    }

    Ok(rows)
}

fn collect_rows<P: rusqlite::Params>(stmt: &mut Statement<'_>, params: P) -> Result<Rows> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();

    while let Some(row) = rows.next()? {
        let mut object = Map::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            object.insert(name.clone(), to_json_value(row.get_ref(idx)?));
        }
        out.push(Value::Object(object));
    }

    Ok(out)
}

fn to_json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(hex::encode(b)),
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        // Nested values are stored as JSON text
        other => SqlValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn connected() -> SqliteAdapter {
        let db = SqliteAdapter::in_memory();
        db.connect().await.unwrap();
        db.execute(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, username TEXT NOT NULL, email TEXT)",
            &[],
        )
        .await
        .unwrap();
        db
    }

    #[test]
    fn test_substitute_placeholders_in_order() {
        let sql = "INSERT INTO users (username, email) VALUES ('$$', '$$')";
        let out = substitute_placeholders(sql, &["bob".into(), "bob@example.com".into()]);
        assert_eq!(out, "INSERT INTO users (username, email) VALUES ('bob', 'bob@example.com')");
    }

    #[test]
    fn test_substitute_placeholders_leaves_extras() {
        let out = substitute_placeholders("SELECT $$, $$, $$", &["1".into()]);
        assert_eq!(out, "SELECT 1, $$, $$");
    }

    #[tokio::test]
    async fn test_not_connected() {
        let db = SqliteAdapter::in_memory();
        let err = db.query("SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[tokio::test]
    async fn test_query_and_execute_with_params() {
        let db = connected().await;

        let affected = db
            .execute(
                "INSERT INTO users (username, email) VALUES (?1, ?2)",
                &[json!("alice"), json!("alice@example.com")],
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let rows = db
            .query("SELECT id, username, email FROM users WHERE username = ?1", &[json!("alice")])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["username"], json!("alice"));
        assert_eq!(rows[0]["id"], json!(1));
    }

    #[tokio::test]
    async fn test_execute_script_returns_last_rows() {
        let tmp = TempDir::new().unwrap();
        let script = tmp.path().join("seed.sql");
        std::fs::write(
            &script,
            "CREATE TABLE items (name TEXT);\n\
             INSERT INTO items VALUES ('a');\n\
             INSERT INTO items VALUES ('b');\n\
             SELECT name FROM items ORDER BY name;\n",
        )
        .unwrap();

        let db = SqliteAdapter::in_memory();
        db.connect().await.unwrap();
        let rows = db.execute_script(&script).await.unwrap();

        assert_eq!(rows, vec![json!({"name": "a"}), json!({"name": "b"})]);
    }

    #[tokio::test]
    async fn test_empty_script_rejected() {
        let tmp = TempDir::new().unwrap();
        let script = tmp.path().join("empty.sql");
        std::fs::write(&script, "   \n").unwrap();

        let db = SqliteAdapter::in_memory();
        db.connect().await.unwrap();
        let err = db.execute_script(&script).await.unwrap_err();
        assert!(matches!(err, Error::EmptyScript(_)));
    }

    #[tokio::test]
    async fn test_replace_values_and_execute_script() {
        let tmp = TempDir::new().unwrap();
        let script = tmp.path().join("insert.sql");
        std::fs::write(
            &script,
            "INSERT INTO users (username, email) VALUES ('$$', '$$');\n\
             SELECT username, email FROM users;",
        )
        .unwrap();

        let db = connected().await;
        let outcome = db
            .replace_values_and_execute_script(&script, &["carol".into(), "carol@example.com".into()])
            .await
            .unwrap();

        assert!(outcome.modified_sql.contains("'carol'"));
        assert_eq!(outcome.rows, vec![json!({"username": "carol", "email": "carol@example.com"})]);
    }

    #[tokio::test]
    async fn test_close_connection() {
        let db = connected().await;
        assert!(db.is_connected());
        db.close_connection().await.unwrap();
        assert!(!db.is_connected());
        assert!(matches!(db.execute("SELECT 1", &[]).await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn test_connect_to_file() {
        let tmp = TempDir::new().unwrap();
        let config = DatabaseConfig {
            path: tmp.path().join("state.db"),
            ..Default::default()
        };
        let db = SqliteAdapter::new(&config);
        db.connect().await.unwrap();
        assert!(tmp.path().join("state.db").exists());
    }

    #[tokio::test]
    async fn test_connect_times_out() {
        let tmp = TempDir::new().unwrap();
        let config = DatabaseConfig {
            path: tmp.path().join("missing-dir").join("state.db"),
            connect_timeout_secs: 0,
            retry_interval_secs: 0,
        };
        let db = SqliteAdapter::new(&config);
        let err = db.connect().await.unwrap_err();
        assert!(matches!(err, Error::ConnectionTimeout { seconds: 0 }));
    }
}
