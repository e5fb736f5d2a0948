use crate::app::buffer::ColumnBindingMap;
use crate::constant::{SqlResult, WireType};
use crate::diagnostic::HeaderDiagnosticRecord;
use crate::error::{Error, Result};
use crate::meta::ColumnMeta;
use crate::protocol::command::{read_columns_meta_response, write_get_columns_meta};
use crate::query::put_row;
use crate::row::ColumnValue;
use crate::sync::conn::Connection;
use crate::type_traits::*;

/// Column catalog lookup. Rows are produced locally from the descriptors
/// the node returns.
#[derive(Debug)]
pub struct ColumnMetadataQuery {
    schema: String,
    table: String,
    column: String,
    result_columns: Vec<ColumnMeta>,
    found: Vec<ColumnMeta>,
    executed: bool,
    /// Rows handed out so far
    fetched: usize,
}

impl ColumnMetadataQuery {
    pub fn new(schema: &str, table: &str, column: &str) -> Self {
        let result_columns = vec![
            ColumnMeta::catalog_column("TABLE_CAT", WireType::String),
            ColumnMeta::catalog_column("TABLE_SCHEM", WireType::String),
            ColumnMeta::catalog_column("TABLE_NAME", WireType::String),
            ColumnMeta::catalog_column("COLUMN_NAME", WireType::String),
            ColumnMeta::catalog_column("DATA_TYPE", WireType::Short),
            ColumnMeta::catalog_column("TYPE_NAME", WireType::String),
            ColumnMeta::catalog_column("COLUMN_SIZE", WireType::Int),
            ColumnMeta::catalog_column("BUFFER_LENGTH", WireType::Int),
            ColumnMeta::catalog_column("DECIMAL_DIGITS", WireType::Short),
            ColumnMeta::catalog_column("NUM_PREC_RADIX", WireType::Short),
            ColumnMeta::catalog_column("NULLABLE", WireType::Short),
            ColumnMeta::catalog_column("REMARKS", WireType::String),
        ];
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
            column: column.to_string(),
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
            |out| write_get_columns_meta(out, &self.schema, &self.table, &self.column),
            read_columns_meta_response,
        )?;
        tracing::debug!(columns = self.found.len(), "columns meta received");
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
        let Some(meta) = self.found.get(self.fetched) else {
            return Ok(SqlResult::NoData);
        };
        self.fetched += 1;
        let row = i32::try_from(self.fetched).unwrap_or(i32::MAX);
        put_row(&row_values(meta), row, bindings, diag)
    }

    pub fn meta(&self) -> &[ColumnMeta] {
        &self.result_columns
    }

    pub fn data_available(&self) -> bool {
        self.executed && self.fetched < self.found.len()
    }
}

fn row_values(meta: &ColumnMeta) -> [ColumnValue<'_>; 12] {
    let tag = meta.data_type();
    let decimal_digits = binary_type_decimal_digits(tag);
    [
        ColumnValue::Null,
        ColumnValue::String(meta.schema_name()),
        ColumnValue::String(meta.table_name()),
        ColumnValue::String(meta.column_name()),
        ColumnValue::Short(binary_to_sql_type(tag).code()),
        ColumnValue::String(meta.type_name()),
        ColumnValue::Int(binary_type_column_size(tag)),
        ColumnValue::Int(binary_type_transfer_length(tag)),
        if decimal_digits < 0 {
            ColumnValue::Null
        } else {
            ColumnValue::Short(decimal_digits as i16)
        },
        ColumnValue::Short(binary_type_num_precision_radix(tag) as i16),
        ColumnValue::Short(binary_type_nullability(tag) as i16),
        ColumnValue::Null,
    ]
}
