use crate::error::{SchemaError, SchemaResult};

/// Read a named column from an sqlx row, reporting the column on failure.
pub(crate) fn get<'r, R, T>(row: &'r R, column: &str) -> SchemaResult<T>
where
    R: sqlx::Row,
    T: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    for<'n> &'n str: sqlx::ColumnIndex<R>,
{
    row.try_get(column)
        .map_err(|e| SchemaError::decode(column, e.to_string()))
}

/// Narrow an integer catalog value to an ordinal.
pub(crate) fn ordinal(column: &str, value: i64) -> SchemaResult<i32> {
    i32::try_from(value).map_err(|_| SchemaError::decode(column, format!("out of range: {value}")))
}
