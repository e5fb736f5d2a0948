use crate::app::buffer::ColumnBindingMap;
use crate::constant::{SqlResult, WireType};
use crate::diagnostic::HeaderDiagnosticRecord;
use crate::error::{Error, Result};
use crate::meta::{ColumnMeta, TableMeta};
use crate::protocol::command::{read_tables_meta_response, write_get_tables_meta};
use crate::query::put_row;
use crate::row::ColumnValue;
use crate::sync::conn::Connection;

/// Table catalog lookup
#[derive(Debug)]
pub struct TableMetadataQuery {
    catalog: String,
    schema: String,
    table: String,
    table_type: String,
    result_columns: Vec<ColumnMeta>,
    found: Vec<TableMeta>,
    executed: bool,
    fetched: usize,
}

impl TableMetadataQuery {
    pub fn new(catalog: &str, schema: &str, table: &str, table_type: &str) -> Self {
        let result_columns = vec![
            ColumnMeta::catalog_column("TABLE_CAT", WireType::String),
            ColumnMeta::catalog_column("TABLE_SCHEM", WireType::String),
            ColumnMeta::catalog_column("TABLE_NAME", WireType::String),
            ColumnMeta::catalog_column("TABLE_TYPE", WireType::String),
            ColumnMeta::catalog_column("REMARKS", WireType::String),
        ];
        Self {
            catalog: catalog.to_string(),
            schema: schema.to_string(),
            table: table.to_string(),
            table_type: table_type.to_string(),
            result_columns,
            found: Vec::new(),
            executed: false,
            fetched: 0,
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn execute(&mut self, conn: &mut Connection) -> Result<SqlResult> {
        if self.executed {
            self.close()?;
        }
        self.found = conn.sync_message(
            |out| write_get_tables_meta(out, &self.catalog, &self.schema, &self.table, &self.table_type),
            read_tables_meta_response,
        )?;
        tracing::debug!(tables = self.found.len(), "tables meta received");
        self.executed = true;
        self.fetched = 0;
        Ok(SqlResult::Success)
    }

    pub fn close(&mut self) -> Result<SqlResult> {
        self.found.clear();
        self.executed = false;
        self.fetched = 0;
        Ok(SqlResult::Success)
    }

    pub fn fetch_next_row(
        &mut self,
        bindings: &mut ColumnBindingMap<'_>,
        diag: &mut HeaderDiagnosticRecord,
    ) -> Result<SqlResult> {
        if !self.executed {
            return Err(Error::QueryNotExecuted);
        }
        let Some(table) = self.found.get(self.fetched) else {
            return Ok(SqlResult::NoData);
        };
        self.fetched += 1;
        let row = i32::try_from(self.fetched).unwrap_or(i32::MAX);
        let values = [
            ColumnValue::String(table.catalog_name()),
            ColumnValue::String(table.schema_name()),
            ColumnValue::String(table.table_name()),
            ColumnValue::String(table.table_type()),
            ColumnValue::Null,
        ];
        put_row(&values, row, bindings, diag)
    }

    pub fn meta(&self) -> &[ColumnMeta] {
        &self.result_columns
    }

    pub fn data_available(&self) -> bool {
        self.executed && self.fetched < self.found.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_columns() {
        let query = TableMetadataQuery::new("", "PUBLIC", "%", "TABLE");
        let names: Vec<&str> = query.meta().iter().map(ColumnMeta::column_name).collect();
        assert_eq!(names, ["TABLE_CAT", "TABLE_SCHEM", "TABLE_NAME", "TABLE_TYPE", "REMARKS"]);
    }

    #[test]
    fn test_close_resets() {
        let mut query = TableMetadataQuery::new("", "", "", "");
        query.close().unwrap();
        assert!(!query.data_available());
    }
}
