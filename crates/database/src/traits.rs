//! PostgreSQL table metadata.

/// Schema metadata for PostgreSQL tables.
///
/// Every method returns `&'static str` so implementors can assemble their
/// statements at compile time with `const_format::concatcp!`.
///
/// No I/O happens here. Statements are executed by [`migrate`](crate::migrate).
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements for all indices.
    fn indices() -> &'static str;
}
