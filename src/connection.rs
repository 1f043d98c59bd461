//! DuckDB connection wrapper that loads record collections and runs queries.
//!
//! Each collection becomes a table with a single `doc JSON` column, one row
//! per exported document. Field extraction happens in SQL with JSON paths, so
//! the documents keep whatever loose shape the source platform gave them.

use crate::error::{MetricsError, Result};
use crate::store::{Fingerprint, RecordStore};
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{debug, info};

/// Wraps a DuckDB connection over the order and customer collections.
pub struct Connection {
    conn: DuckDbConnection,
    /// Resolves collection names to export files.
    pub store: RecordStore,
    // `None` marks a collection registered directly, which is never reloaded.
    loaded: RefCell<HashMap<String, Option<Fingerprint>>>,
}

impl Connection {
    /// Create a connection backed by the given store.
    ///
    /// Opens an in-memory DuckDB database; nothing is read until a
    /// collection is first needed.
    pub fn new(store: RecordStore) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            store,
            loaded: RefCell::new(HashMap::new()),
        })
    }

    /// Ensure collections are loaded and current, re-reading any export
    /// whose file changed since it was last loaded.
    pub fn ensure_collections(&self, names: &[&str]) -> Result<()> {
        for name in names {
            let reload = match self.loaded.borrow().get(*name) {
                None => true,
                Some(None) => false,
                Some(Some(fp)) => self.store.is_stale(name, fp),
            };
            if reload {
                self.load_collection(name)?;
            }
        }
        Ok(())
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run
        let stmt_ref = rows_result
            .as_ref()
            .ok_or_else(|| MetricsError::InvalidArgument("statement has no result set".into()))?;
        let column_names: Vec<String> = stmt_ref
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Create a collection table from a newline-delimited JSON file.
    ///
    /// Collections registered this way bypass the store and are never
    /// reloaded automatically.
    pub fn register_collection_from_ndjson(&self, name: &str, ndjson_path: &str) -> Result<()> {
        self.create_collection_table(name, ndjson_path, "newline_delimited")?;
        self.loaded.borrow_mut().insert(name.to_string(), None);
        Ok(())
    }

    /// Check whether a collection has been loaded.
    pub fn has_collection(&self, name: &str) -> bool {
        self.loaded.borrow().contains_key(name)
    }

    /// Return the names of all loaded collections, sorted.
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loaded.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Forget store-backed collections so they are re-read on next access.
    ///
    /// Directly registered collections stay in place.
    pub fn reset_collections(&self) {
        self.loaded.borrow_mut().retain(|_, fp| fp.is_none());
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }

    fn load_collection(&self, name: &str) -> Result<()> {
        let path = self.store.locate(name)?;
        let fingerprint = Fingerprint::of(&path)?;
        let path_str = path.to_string_lossy().replace('\\', "/");

        self.create_collection_table(name, &path_str, "auto")
            .map_err(|e| {
                MetricsError::StoreUnavailable(format!("failed to load {}: {}", path.display(), e))
            })?;
        self.loaded
            .borrow_mut()
            .insert(name.to_string(), Some(fingerprint));
        info!(collection = name, path = %path.display(), "Loaded collection");

        Ok(())
    }

    fn create_collection_table(&self, name: &str, path: &str, format: &str) -> Result<()> {
        let path_fwd = path.replace('\\', "/").replace('\'', "''");
        let table = name.replace('"', "\"\"");
        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE \"{}\" AS \
             SELECT json AS doc FROM read_json_objects('{}', format='{}')",
            table, path_fwd, format
        ))?;
        debug!(collection = name, format, "Created collection table");
        Ok(())
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; fall back to string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        _ => serde_json::Value::Null,
    }
}
