use crate::app::buffer::{ColumnBindingMap, ConversionResult};
use crate::app::parameter::{ParameterBindingMap, collect_arguments};
use crate::constant::SqlResult;
use crate::cursor::Cursor;
use crate::diagnostic::HeaderDiagnosticRecord;
use crate::error::{Error, Result, eyre};
use crate::meta::ColumnMeta;
use crate::protocol::command::{
    ExecuteRequest, read_close_response, read_execute_response, read_fetch_response,
    write_close, write_execute, write_fetch,
};
use crate::query::check_conversion;
use crate::sync::conn::Connection;

/// SQL text executed on the node, read page by page
#[derive(Debug)]
pub struct DataQuery {
    sql: String,
    columns: Vec<ColumnMeta>,
    cursor: Option<Cursor>,
    /// 1-based number of the current row, for diagnostics
    row_number: i32,
    /// Row and column that failed to decode; the cursor cannot move past it
    stalled: Option<(i32, u16)>,
}

impl DataQuery {
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            columns: Vec::new(),
            cursor: None,
            row_number: 0,
            stalled: None,
        }
    }

    /// Server cursor id once executed
    pub fn query_id(&self) -> Option<i64> {
        self.cursor.as_ref().map(Cursor::query_id)
    }

    #[tracing::instrument(skip_all)]
    pub fn execute(
        &mut self,
        conn: &mut Connection,
        params: &ParameterBindingMap<'_>,
    ) -> Result<SqlResult> {
        if self.cursor.is_some() {
            self.close(conn)?;
        }

        let args = collect_arguments(params)?;
        let request = ExecuteRequest {
            sql: &self.sql,
            distributed_joins: conn.opts().distributed_joins,
            page_size: conn.opts().page_size,
            args: &args,
        };
        let result = conn.sync_message(|out| write_execute(out, &request), read_execute_response)?;
        tracing::debug!(
            query_id = result.query_id,
            columns = result.columns.len(),
            "query executed"
        );

        self.columns = result.columns;
        self.cursor = Some(Cursor::new(result.query_id));
        self.row_number = 0;
        self.stalled = None;
        Ok(SqlResult::Success)
    }

    /// Release the server cursor. A query that was never executed has
    /// nothing to release.
    pub fn close(&mut self, conn: &mut Connection) -> Result<SqlResult> {
        let Some(cursor) = self.cursor.take() else {
            return Ok(SqlResult::Success);
        };
        self.stalled = None;
        let query_id = cursor.query_id();
        let closed = conn.sync_message(
            |out| {
                write_close(out, query_id);
                Ok(())
            },
            read_close_response,
        )?;
        if closed != query_id {
            tracing::warn!(query_id, closed, "close acknowledged a different query");
        }
        Ok(SqlResult::Success)
    }

    #[tracing::instrument(skip_all)]
    pub fn fetch_next_row(
        &mut self,
        conn: &mut Connection,
        bindings: &mut ColumnBindingMap<'_>,
        diag: &mut HeaderDiagnosticRecord,
    ) -> Result<SqlResult> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(Error::QueryNotExecuted);
        };
        if let Some((row, column)) = self.stalled {
            return Err(Error::ColumnRetrieval { row, column });
        }
        if !cursor.has_next() {
            return Ok(SqlResult::NoData);
        }

        let query_id = cursor.query_id();
        let page_size = conn.opts().page_size;
        while cursor.needs_data_update() {
            let page = conn.sync_message(
                |out| {
                    write_fetch(out, query_id, page_size);
                    Ok(())
                },
                read_fetch_response,
            )?;
            if page.query_id != query_id {
                return Err(Error::InvalidPacket);
            }
            tracing::debug!(query_id, rows = page.row_count, last = page.last, "page fetched");
            cursor.update_data(page)?;
            if !cursor.has_next() {
                return Ok(SqlResult::NoData);
            }
        }

        if !cursor.increment()? {
            return Ok(SqlResult::NoData);
        }
        self.row_number += 1;
        let row_number = self.row_number;

        let row = cursor
            .row_mut()
            .ok_or_else(|| Error::LibraryBug(eyre!("cursor entered a row but holds none")))?;
        let column_count = u16::try_from(row.size()).map_err(|_| Error::InvalidPacket)?;

        let mut truncated = false;
        for column in 1..=column_count {
            let read = match bindings.get_mut(&column) {
                Some(buffer) => row.read_column_to_buffer(buffer),
                None => row.skip_column().map(|()| ConversionResult::Success),
            };
            let result = match read {
                Ok(result) => result,
                Err(err) => {
                    tracing::debug!(error = %err, column, "column decode failed");
                    self.stalled = Some((row_number, column));
                    return Err(Error::ColumnRetrieval {
                        row: row_number,
                        column,
                    });
                }
            };
            truncated |= check_conversion(result, row_number, column, diag)?;
        }

        Ok(if truncated {
            SqlResult::SuccessWithInfo
        } else {
            SqlResult::Success
        })
    }

    pub fn meta(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn data_available(&self) -> bool {
        self.stalled.is_none() && self.cursor.as_ref().is_some_and(Cursor::has_next)
    }
}
