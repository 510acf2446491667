use std::fmt::Write as _;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde_json::{json, Value};

use crate::StorageError;

/// Prepares `sql`, binds `params` positionally and returns every row as a
/// JSON object keyed by the statement's column names.
pub fn query_rows(
    connection: &Connection,
    sql: &str,
    params: &[SqlValue],
) -> Result<Vec<Value>, StorageError> {
    let mut statement = connection.prepare(sql)?;
    let column_names = statement
        .column_names()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    let mut rows = statement.query(params_from_iter(params.iter()))?;
    let mut result_rows = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = serde_json::Map::with_capacity(column_names.len());
        for (index, column_name) in column_names.iter().enumerate() {
            let value = row.get::<usize, SqlValue>(index)?;
            record.insert(column_name.clone(), json_value_from_sql(value));
        }
        result_rows.push(Value::Object(record));
    }
    Ok(result_rows)
}

fn json_value_from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(value) => json!(value),
        SqlValue::Real(value) => json!(value),
        SqlValue::Text(value) => Value::String(value),
        SqlValue::Blob(value) => Value::String(encode_blob_hex(&value)),
    }
}

fn encode_blob_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_storage_class_maps_to_json() {
        let connection = Connection::open_in_memory().unwrap();
        let rows = query_rows(
            &connection,
            "SELECT NULL AS n, 42 AS i, 2.5 AS r, 'hi' AS t, x'c0ffee' AS b",
            &[],
        )
        .unwrap();
        assert_eq!(
            rows,
            vec![json!({"n": null, "i": 42, "r": 2.5, "t": "hi", "b": "c0ffee"})]
        );
    }

    #[test]
    fn numbered_parameters_bind_and_may_repeat() {
        let connection = Connection::open_in_memory().unwrap();
        let rows = query_rows(
            &connection,
            "SELECT ?1 AS a, ?2 AS b, ?1 AS again",
            &[SqlValue::Integer(7), SqlValue::Text("x".into())],
        )
        .unwrap();
        assert_eq!(rows, vec![json!({"a": 7, "b": "x", "again": 7})]);
    }

    #[test]
    fn empty_result_is_an_empty_array() {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute_batch("CREATE TABLE t (id INTEGER)")
            .unwrap();
        let rows = query_rows(&connection, "SELECT id FROM t", &[]).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn invalid_sql_surfaces_as_sqlite_error() {
        let connection = Connection::open_in_memory().unwrap();
        let result = query_rows(&connection, "SELECT FROM nowhere", &[]);
        assert!(matches!(result, Err(StorageError::Sqlite(_))));
    }
}
