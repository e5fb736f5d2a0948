//! The closed set of queries a statement can own.
//!
//! Every variant runs at most one request/response round trip per call on
//! the statement's connection. Failures propagate as [`Error`]; per-column
//! warnings (truncation) are pushed into the statement's diagnostics directly.

pub mod column_metadata;
pub mod data;
pub mod foreign_keys;
pub mod table_metadata;

pub use column_metadata::ColumnMetadataQuery;
pub use data::DataQuery;
pub use foreign_keys::ForeignKeysQuery;
pub use table_metadata::TableMetadataQuery;

use crate::app::buffer::{ColumnBindingMap, ConversionResult};
use crate::app::parameter::ParameterBindingMap;
use crate::constant::SqlResult;
use crate::diagnostic::{HeaderDiagnosticRecord, SqlState, StatusDiagnosticRecord};
use crate::error::{Error, Result};
use crate::meta::ColumnMeta;
use crate::row::ColumnValue;
use crate::sync::conn::Connection;

#[derive(Debug)]
pub enum Query {
    Data(DataQuery),
    ColumnMetadata(ColumnMetadataQuery),
    TableMetadata(TableMetadataQuery),
    ForeignKeys(ForeignKeysQuery),
}

impl Query {
    pub fn execute(
        &mut self,
        conn: &mut Connection,
        params: &ParameterBindingMap<'_>,
    ) -> Result<SqlResult> {
        match self {
            Query::Data(q) => q.execute(conn, params),
            Query::ColumnMetadata(q) => q.execute(conn),
            Query::TableMetadata(q) => q.execute(conn),
            Query::ForeignKeys(q) => q.execute(),
        }
    }

    pub fn close(&mut self, conn: &mut Connection) -> Result<SqlResult> {
        match self {
            Query::Data(q) => q.close(conn),
            Query::ColumnMetadata(q) => q.close(),
            Query::TableMetadata(q) => q.close(),
            Query::ForeignKeys(q) => q.close(),
        }
    }

    /// Advance to the next row and write its bound columns.
    ///
    /// Returns [`SqlResult::NoData`] past the last row and
    /// [`SqlResult::SuccessWithInfo`] when a column was truncated.
    pub fn fetch_next_row(
        &mut self,
        conn: &mut Connection,
        bindings: &mut ColumnBindingMap<'_>,
        diag: &mut HeaderDiagnosticRecord,
    ) -> Result<SqlResult> {
        match self {
            Query::Data(q) => q.fetch_next_row(conn, bindings, diag),
            Query::ColumnMetadata(q) => q.fetch_next_row(bindings, diag),
            Query::TableMetadata(q) => q.fetch_next_row(bindings, diag),
            Query::ForeignKeys(q) => q.fetch_next_row(),
        }
    }

    /// Result column descriptors
    pub fn meta(&self) -> &[ColumnMeta] {
        match self {
            Query::Data(q) => q.meta(),
            Query::ColumnMetadata(q) => q.meta(),
            Query::TableMetadata(q) => q.meta(),
            Query::ForeignKeys(q) => q.meta(),
        }
    }

    pub fn data_available(&self) -> bool {
        match self {
            Query::Data(q) => q.data_available(),
            Query::ColumnMetadata(q) => q.data_available(),
            Query::TableMetadata(q) => q.data_available(),
            Query::ForeignKeys(_) => false,
        }
    }

    /// The node does not report row counts for any query kind
    pub fn affected_rows(&self) -> i64 {
        0
    }
}

/// Turn one column's conversion outcome into diagnostics.
///
/// Returns `true` when the value was truncated.
pub(crate) fn check_conversion(
    result: ConversionResult,
    row: i32,
    column: u16,
    diag: &mut HeaderDiagnosticRecord,
) -> Result<bool> {
    match result {
        ConversionResult::Success => Ok(false),
        ConversionResult::VarlenDataTruncated => {
            diag.add_status_record(
                StatusDiagnosticRecord::new(
                    SqlState::S01004DataTruncated,
                    "Buffer is too small for the column data. Truncated from the right.",
                )
                .with_locus(row, i32::from(column)),
            );
            Ok(true)
        }
        ConversionResult::Failure => Err(Error::ColumnRetrieval { row, column }),
        ConversionResult::Unsupported => Err(Error::UnsupportedConversion(format!(
            "column {} can not be converted to the bound type",
            column
        ))),
    }
}

/// Write a locally produced row into the bound buffers. Bindings past the
/// row's width are left untouched.
pub(crate) fn put_row(
    values: &[ColumnValue<'_>],
    row: i32,
    bindings: &mut ColumnBindingMap<'_>,
    diag: &mut HeaderDiagnosticRecord,
) -> Result<SqlResult> {
    let mut truncated = false;
    for (idx, buffer) in bindings.iter_mut() {
        let Some(value) = idx.checked_sub(1).and_then(|i| values.get(usize::from(i))) else {
            continue;
        };
        truncated |= check_conversion(value.put_into(buffer), row, *idx, diag)?;
    }
    Ok(if truncated {
        SqlResult::SuccessWithInfo
    } else {
        SqlResult::Success
    })
}
