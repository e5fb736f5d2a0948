use crate::app::buffer::{ApplicationDataBuffer, ColumnBindingMap};
use crate::app::parameter::{Parameter, ParameterBindingMap};
use crate::constant::{SqlResult, SqlType};
use crate::diagnostic::HeaderDiagnosticRecord;
use crate::error::{Error, Result};
use crate::meta::{AttributeValue, ColumnAttribute, ColumnMeta};
use crate::query::{
    ColumnMetadataQuery, DataQuery, ForeignKeysQuery, Query, TableMetadataQuery, check_conversion,
};
use crate::sync::conn::Connection;
use crate::type_traits::{BindingType, is_sql_type_supported};

/// A statement on a borrowed [`Connection`]
///
/// `'c` is the connection borrow; `'b` is the lifetime of the caller buffers
/// bound to columns and parameters. The statement owns at most one query and
/// closes it when replaced or dropped.
///
/// Every public operation resets [`Statement::diagnostics`], runs, and
/// reports a [`SqlResult`].
pub struct Statement<'c, 'b> {
    connection: &'c mut Connection,
    column_bindings: ColumnBindingMap<'b>,
    param_bindings: ParameterBindingMap<'b>,
    current_query: Option<Query>,
    diag: HeaderDiagnosticRecord,
}

impl<'c, 'b> Statement<'c, 'b> {
    pub(crate) fn new(connection: &'c mut Connection) -> Self {
        Self {
            connection,
            column_bindings: ColumnBindingMap::new(),
            param_bindings: ParameterBindingMap::new(),
            current_query: None,
            diag: HeaderDiagnosticRecord::new(),
        }
    }

    pub fn diagnostics(&self) -> &HeaderDiagnosticRecord {
        &self.diag
    }

    fn run(&mut self, op: impl FnOnce(&mut Self) -> Result<SqlResult>) -> SqlResult {
        self.diag.reset();
        let result = op(self);
        self.diag.complete(result, self.connection.opts())
    }

    // ========================================================================
    // Binding
    // ========================================================================

    /// Bind an output buffer to the 1-based column `column_idx`, replacing any previous binding
    pub fn bind_column(&mut self, column_idx: u16, buffer: ApplicationDataBuffer<'b>) -> SqlResult {
        self.run(|stmt| {
            if column_idx == 0 {
                return Err(Error::ColumnIndexOutOfRange(0));
            }
            if buffer.binding_type() == BindingType::Unsupported {
                return Err(Error::NotImplemented(
                    "The specified data type is not supported.".to_string(),
                ));
            }
            stmt.column_bindings.insert(column_idx, buffer);
            Ok(SqlResult::Success)
        })
    }

    pub fn unbind_column(&mut self, column_idx: u16) -> SqlResult {
        self.run(|stmt| {
            stmt.column_bindings.remove(&column_idx);
            Ok(SqlResult::Success)
        })
    }

    pub fn unbind_all_columns(&mut self) -> SqlResult {
        self.run(|stmt| {
            stmt.column_bindings.clear();
            Ok(SqlResult::Success)
        })
    }

    /// Buffer bound to `column_idx`, to read fetched values back
    pub fn column_binding(&self, column_idx: u16) -> Option<&ApplicationDataBuffer<'b>> {
        self.column_bindings.get(&column_idx)
    }

    /// Bind an input buffer to the 1-based parameter `param_idx`, sent as `sql_type`
    pub fn bind_parameter(
        &mut self,
        param_idx: u16,
        buffer: ApplicationDataBuffer<'b>,
        sql_type: SqlType,
    ) -> SqlResult {
        self.run(|stmt| {
            if param_idx == 0 {
                return Err(Error::UnboundParameter(0));
            }
            if buffer.binding_type() == BindingType::Unsupported {
                return Err(Error::NotImplemented(
                    "The specified data type is not supported.".to_string(),
                ));
            }
            if !is_sql_type_supported(sql_type) {
                return Err(Error::NotImplemented(format!(
                    "SQL type {:?} is not supported.",
                    sql_type
                )));
            }
            stmt.param_bindings
                .insert(param_idx, Parameter::new(buffer, sql_type));
            Ok(SqlResult::Success)
        })
    }

    pub fn unbind_parameter(&mut self, param_idx: u16) -> SqlResult {
        self.run(|stmt| {
            stmt.param_bindings.remove(&param_idx);
            Ok(SqlResult::Success)
        })
    }

    pub fn unbind_all_parameters(&mut self) -> SqlResult {
        self.run(|stmt| {
            stmt.param_bindings.clear();
            Ok(SqlResult::Success)
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Close the current query, if any, and make `query` current
    fn replace_query(&mut self, query: Query) -> Result<()> {
        if let Some(mut previous) = self.current_query.take() {
            previous.close(self.connection)?;
        }
        self.current_query = Some(query);
        Ok(())
    }

    fn execute_current(&mut self) -> Result<SqlResult> {
        let query = self.current_query.as_mut().ok_or(Error::QueryNotPrepared)?;
        query.execute(self.connection, &self.param_bindings)
    }

    pub fn prepare_sql_query(&mut self, sql: &str) -> SqlResult {
        self.run(|stmt| {
            stmt.replace_query(Query::Data(DataQuery::new(sql)))?;
            Ok(SqlResult::Success)
        })
    }

    /// Prepare and execute in one call
    pub fn execute_sql_query(&mut self, sql: &str) -> SqlResult {
        self.run(|stmt| {
            stmt.replace_query(Query::Data(DataQuery::new(sql)))?;
            stmt.execute_current()
        })
    }

    /// Execute the prepared query with the current parameter bindings
    pub fn execute(&mut self) -> SqlResult {
        self.run(Self::execute_current)
    }

    pub fn execute_get_columns_meta_query(&mut self, schema: &str, table: &str, column: &str) -> SqlResult {
        self.run(|stmt| {
            stmt.replace_query(Query::ColumnMetadata(ColumnMetadataQuery::new(schema, table, column)))?;
            stmt.execute_current()
        })
    }

    pub fn execute_get_tables_meta_query(
        &mut self,
        catalog: &str,
        schema: &str,
        table: &str,
        table_type: &str,
    ) -> SqlResult {
        self.run(|stmt| {
            stmt.replace_query(Query::TableMetadata(TableMetadataQuery::new(
                catalog, schema, table, table_type,
            )))?;
            stmt.execute_current()
        })
    }

    pub fn execute_get_foreign_keys_query(
        &mut self,
        primary_catalog: &str,
        primary_schema: &str,
        primary_table: &str,
        foreign_catalog: &str,
        foreign_schema: &str,
        foreign_table: &str,
    ) -> SqlResult {
        self.run(|stmt| {
            stmt.replace_query(Query::ForeignKeys(ForeignKeysQuery::new(
                primary_catalog,
                primary_schema,
                primary_table,
                foreign_catalog,
                foreign_schema,
                foreign_table,
            )))?;
            stmt.execute_current()
        })
    }

    /// Close the current query's cursor. The query stays prepared.
    pub fn close(&mut self) -> SqlResult {
        self.run(|stmt| match stmt.current_query.as_mut() {
            Some(query) => query.close(stmt.connection),
            None => Ok(SqlResult::Success),
        })
    }

    /// Advance to the next row, writing bound columns
    pub fn fetch_row(&mut self) -> SqlResult {
        self.run(|stmt| {
            let query = stmt.current_query.as_mut().ok_or(Error::QueryNotExecuted)?;
            query.fetch_next_row(stmt.connection, &mut stmt.column_bindings, &mut stmt.diag)
        })
    }

    /// Result column descriptors of the current query
    pub fn get_meta(&mut self) -> Option<&[ColumnMeta]> {
        self.run(|stmt| {
            stmt.current_query.as_ref().ok_or(Error::QueryNotPrepared)?;
            Ok(SqlResult::Success)
        });
        self.current_query.as_ref().map(Query::meta)
    }

    pub fn data_available(&self) -> bool {
        self.current_query.as_ref().is_some_and(Query::data_available)
    }

    fn column_attribute(&self, column_idx: u16, attr: ColumnAttribute) -> Result<AttributeValue> {
        let meta = self
            .current_query
            .as_ref()
            .ok_or(Error::QueryNotPrepared)?
            .meta();
        if attr == ColumnAttribute::Count {
            return Ok(AttributeValue::Num(meta.len() as i64));
        }
        let column = column_idx
            .checked_sub(1)
            .and_then(|i| meta.get(usize::from(i)))
            .ok_or(Error::ColumnIndexOutOfRange(column_idx))?;
        column
            .get_attribute(attr)
            .ok_or_else(|| Error::NotImplemented(format!("column attribute {:?}", attr)))
    }

    /// Write a column attribute into `buffer`
    pub fn get_column_attribute(
        &mut self,
        column_idx: u16,
        attr: ColumnAttribute,
        buffer: &mut ApplicationDataBuffer<'_>,
    ) -> SqlResult {
        self.run(|stmt| {
            let value = stmt.column_attribute(column_idx, attr)?;
            let result = match &value {
                AttributeValue::Str(s) => buffer.put_string(s),
                AttributeValue::Num(n) => buffer.put_i64(*n),
            };
            let truncated = check_conversion(result, 0, column_idx, &mut stmt.diag)?;
            Ok(if truncated {
                SqlResult::SuccessWithInfo
            } else {
                SqlResult::Success
            })
        })
    }

    /// Rows affected by the last execution
    pub fn affected_rows(&mut self) -> Option<i64> {
        let mut rows = None;
        self.run(|stmt| {
            let query = stmt.current_query.as_ref().ok_or(Error::QueryNotExecuted)?;
            rows = Some(query.affected_rows());
            Ok(SqlResult::Success)
        });
        if let Some(rows) = rows {
            self.diag.set_rows_affected(rows);
        }
        rows
    }
}

impl Drop for Statement<'_, '_> {
    fn drop(&mut self) {
        if let Some(query) = self.current_query.as_mut()
            && let Err(err) = query.close(self.connection)
        {
            tracing::warn!(error = %err, "failed to close query on drop");
        }
    }
}

impl std::fmt::Debug for Statement<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement")
            .field("columns_bound", &self.column_bindings.len())
            .field("params_bound", &self.param_bindings.len())
            .field("current_query", &self.current_query)
            .finish()
    }
}
