use crate::constant::{SqlResult, WireType};
use crate::error::{Error, Result};
use crate::meta::ColumnMeta;

/// Foreign key catalog lookup. The node has no foreign keys, so the result
/// set is always empty and no request is sent.
#[derive(Debug)]
pub struct ForeignKeysQuery {
    primary_catalog: String,
    primary_schema: String,
    primary_table: String,
    foreign_catalog: String,
    foreign_schema: String,
    foreign_table: String,
    result_columns: Vec<ColumnMeta>,
    executed: bool,
}

impl ForeignKeysQuery {
    pub fn new(
        primary_catalog: &str,
        primary_schema: &str,
        primary_table: &str,
        foreign_catalog: &str,
        foreign_schema: &str,
        foreign_table: &str,
    ) -> Self {
        let result_columns = vec![
            ColumnMeta::catalog_column("PKTABLE_CAT", WireType::String),
            ColumnMeta::catalog_column("PKTABLE_SCHEM", WireType::String),
            ColumnMeta::catalog_column("PKTABLE_NAME", WireType::String),
            ColumnMeta::catalog_column("PKCOLUMN_NAME", WireType::String),
            ColumnMeta::catalog_column("FKTABLE_CAT", WireType::String),
            ColumnMeta::catalog_column("FKTABLE_SCHEM", WireType::String),
            ColumnMeta::catalog_column("FKTABLE_NAME", WireType::String),
            ColumnMeta::catalog_column("FKCOLUMN_NAME", WireType::String),
            ColumnMeta::catalog_column("KEY_SEQ", WireType::Short),
            ColumnMeta::catalog_column("UPDATE_RULE", WireType::Short),
            ColumnMeta::catalog_column("DELETE_RULE", WireType::Short),
            ColumnMeta::catalog_column("FK_NAME", WireType::String),
            ColumnMeta::catalog_column("PK_NAME", WireType::String),
            ColumnMeta::catalog_column("DEFERRABILITY", WireType::Short),
        ];
        Self {
            primary_catalog: primary_catalog.to_string(),
            primary_schema: primary_schema.to_string(),
            primary_table: primary_table.to_string(),
            foreign_catalog: foreign_catalog.to_string(),
            foreign_schema: foreign_schema.to_string(),
            foreign_table: foreign_table.to_string(),
            result_columns,
            executed: false,
        }
    }

    pub fn execute(&mut self) -> Result<SqlResult> {
        tracing::debug!(
            primary_catalog = %self.primary_catalog,
            primary_schema = %self.primary_schema,
            primary_table = %self.primary_table,
            foreign_catalog = %self.foreign_catalog,
            foreign_schema = %self.foreign_schema,
            foreign_table = %self.foreign_table,
            "foreign keys requested"
        );
        self.executed = true;
        Ok(SqlResult::Success)
    }

    pub fn close(&mut self) -> Result<SqlResult> {
        self.executed = false;
        Ok(SqlResult::Success)
    }

    pub fn fetch_next_row(&mut self) -> Result<SqlResult> {
        if !self.executed {
            return Err(Error::QueryNotExecuted);
        }
        Ok(SqlResult::NoData)
    }

    pub fn meta(&self) -> &[ColumnMeta] {
        &self.result_columns
    }
}
