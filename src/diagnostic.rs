//! Per-operation diagnostics: one header record plus zero or more status records.
//!
//! Records are addressed 1-based: record 1 is the header, record `n >= 2` is
//! the `(n - 1)`-th status record, oldest first.

use crate::app::buffer::ApplicationDataBuffer;
use crate::constant::SqlResult;
use crate::error::{Error, Result};
use crate::opts::Opts;

const ORIGIN_ISO_9075: &str = "ISO 9075";
const ORIGIN_ODBC_3_0: &str = "ODBC 3.0";

/// Subclass codes defined by ODBC 3.0 rather than ISO 9075
const ODBC_SUBCLASSES: &[&str] = &[
    "01S00", "01S01", "01S02", "01S06", "01S07", "07S01", "08S01", "21S01", "21S02", "25S01",
    "25S02", "25S03", "42S01", "42S02", "42S11", "42S12", "42S21", "42S22", "HY095", "HY097",
    "HY098", "HY099", "HY100", "HY101", "HY105", "HY107", "HY109", "HY110", "HY111", "HYT00",
    "HYT01", "IM001", "IM002", "IM003", "IM004", "IM005", "IM006", "IM007", "IM008", "IM010",
    "IM011", "IM012",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlState {
    Unknown,
    S01004DataTruncated,
    S08001CannotConnect,
    S08002AlreadyConnected,
    S08003NotConnected,
    SHY000GeneralError,
    SHYC00OptionalFeatureNotImplemented,
}

impl SqlState {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlState::Unknown => "",
            SqlState::S01004DataTruncated => "01004",
            SqlState::S08001CannotConnect => "08001",
            SqlState::S08002AlreadyConnected => "08002",
            SqlState::S08003NotConnected => "08003",
            SqlState::SHY000GeneralError => "HY000",
            SqlState::SHYC00OptionalFeatureNotImplemented => "HYC00",
        }
    }
}

/// Diagnostic field identifiers (`SQL_DIAG_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticField {
    // Header fields
    CursorRowCount,
    DynamicFunction,
    DynamicFunctionCode,
    Number,
    ReturnCode,
    RowCount,
    // Status record fields
    ClassOrigin,
    ColumnNumber,
    ConnectionName,
    MessageText,
    Native,
    RowNumber,
    ServerName,
    SqlState,
    SubclassOrigin,
}

impl DiagnosticField {
    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            -1249 => Some(Self::CursorRowCount),
            7 => Some(Self::DynamicFunction),
            12 => Some(Self::DynamicFunctionCode),
            2 => Some(Self::Number),
            1 => Some(Self::ReturnCode),
            3 => Some(Self::RowCount),
            8 => Some(Self::ClassOrigin),
            -1247 => Some(Self::ColumnNumber),
            10 => Some(Self::ConnectionName),
            6 => Some(Self::MessageText),
            5 => Some(Self::Native),
            -1248 => Some(Self::RowNumber),
            11 => Some(Self::ServerName),
            4 => Some(Self::SqlState),
            9 => Some(Self::SubclassOrigin),
            _ => None,
        }
    }

    pub fn is_header_field(self) -> bool {
        matches!(
            self,
            Self::CursorRowCount
                | Self::DynamicFunction
                | Self::DynamicFunctionCode
                | Self::Number
                | Self::ReturnCode
                | Self::RowCount
        )
    }
}

/// One failure or warning with its locus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDiagnosticRecord {
    sql_state: SqlState,
    message: String,
    connection_name: String,
    server_name: String,
    row_num: i32,
    column_num: i32,
}

impl StatusDiagnosticRecord {
    pub fn new(sql_state: SqlState, message: impl Into<String>) -> Self {
        Self {
            sql_state,
            message: message.into(),
            connection_name: String::new(),
            server_name: String::new(),
            row_num: 0,
            column_num: 0,
        }
    }

    pub fn with_locus(mut self, row_num: i32, column_num: i32) -> Self {
        self.row_num = row_num;
        self.column_num = column_num;
        self
    }

    pub fn with_server(mut self, connection_name: &str, server_name: &str) -> Self {
        self.connection_name = connection_name.to_string();
        self.server_name = server_name.to_string();
        self
    }

    pub fn sql_state(&self) -> &'static str {
        self.sql_state.as_str()
    }

    pub fn state(&self) -> SqlState {
        self.sql_state
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn connection_name(&self) -> &str {
        &self.connection_name
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn row_number(&self) -> i32 {
        self.row_num
    }

    pub fn column_number(&self) -> i32 {
        self.column_num
    }

    pub fn class_origin(&self) -> &'static str {
        if self.sql_state().starts_with("IM") {
            ORIGIN_ODBC_3_0
        } else {
            ORIGIN_ISO_9075
        }
    }

    pub fn subclass_origin(&self) -> &'static str {
        if ODBC_SUBCLASSES.contains(&self.sql_state()) {
            ORIGIN_ODBC_3_0
        } else {
            ORIGIN_ISO_9075
        }
    }
}

impl From<&Error> for StatusDiagnosticRecord {
    fn from(err: &Error) -> Self {
        let record = Self::new(err.sql_state(), err.diagnostic_message());
        match err {
            Error::ColumnRetrieval { row, column } => record.with_locus(*row, i32::from(*column)),
            _ => record,
        }
    }
}

/// Aggregate record of one operation and the status records it produced
#[derive(Debug, Clone)]
pub struct HeaderDiagnosticRecord {
    row_count: i64,
    dynamic_function: String,
    dynamic_function_code: i32,
    result: SqlResult,
    rows_affected: i64,
    status_records: Vec<StatusDiagnosticRecord>,
}

impl Default for HeaderDiagnosticRecord {
    fn default() -> Self {
        Self {
            row_count: 0,
            dynamic_function: String::new(),
            dynamic_function_code: 0,
            result: SqlResult::Success,
            rows_affected: 0,
            status_records: Vec::new(),
        }
    }
}

impl HeaderDiagnosticRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new operation: default-failure result, no status records
    pub fn reset(&mut self) {
        self.set_header_record(SqlResult::Error);
        self.status_records.clear();
    }

    pub fn set_header_record(&mut self, result: SqlResult) {
        self.row_count = 0;
        self.dynamic_function.clear();
        self.dynamic_function_code = 0;
        self.result = result;
        self.rows_affected = 0;
    }

    pub fn add_status_record(&mut self, record: StatusDiagnosticRecord) {
        tracing::debug!(sql_state = record.sql_state(), message = record.message(), "diagnostic");
        self.status_records.push(record);
    }

    /// Close an operation: record the error, if any, and set the aggregate result.
    ///
    /// Every status record of the operation is stamped with the cache as its
    /// connection name and `host:port` as its server name.
    pub fn complete(&mut self, result: Result<SqlResult>, origin: &Opts) -> SqlResult {
        let result = match result {
            Ok(result) => result,
            Err(err) => {
                self.add_status_record(StatusDiagnosticRecord::from(&err));
                SqlResult::Error
            }
        };
        if !self.status_records.is_empty() {
            let server_name = origin.server_name();
            self.status_records = std::mem::take(&mut self.status_records)
                .into_iter()
                .map(|record| record.with_server(&origin.cache, &server_name))
                .collect();
        }
        self.set_header_record(result);
        result
    }

    pub fn operation_result(&self) -> SqlResult {
        self.result
    }

    pub fn return_code(&self) -> i16 {
        self.result.return_code()
    }

    pub fn rows_affected(&self) -> i64 {
        self.rows_affected
    }

    pub fn set_rows_affected(&mut self, rows: i64) {
        self.rows_affected = rows;
    }

    pub fn row_count(&self) -> i64 {
        self.row_count
    }

    pub fn status_records_number(&self) -> usize {
        self.status_records.len()
    }

    pub fn status_records(&self) -> &[StatusDiagnosticRecord] {
        &self.status_records
    }

    /// Status record by diagnostic record number (`2` is the first status record)
    pub fn status_record(&self, rec_num: i32) -> Option<&StatusDiagnosticRecord> {
        let idx = usize::try_from(rec_num.checked_sub(2)?).ok()?;
        self.status_records.get(idx)
    }

    /// Write one diagnostic field into `buffer`
    ///
    /// Out-of-range record numbers report [`SqlResult::NoData`]; asking a
    /// header field of a status record (or the reverse) is an error.
    pub fn get_field(
        &self,
        rec_num: i32,
        field: DiagnosticField,
        buffer: &mut ApplicationDataBuffer<'_>,
    ) -> SqlResult {
        if rec_num == 1 {
            if !field.is_header_field() {
                return SqlResult::Error;
            }
            return match field {
                DiagnosticField::CursorRowCount => {
                    buffer.put_i64(self.row_count);
                    SqlResult::Success
                }
                DiagnosticField::DynamicFunction => {
                    buffer.put_string(&self.dynamic_function);
                    SqlResult::Success
                }
                DiagnosticField::DynamicFunctionCode => {
                    buffer.put_i32(self.dynamic_function_code);
                    SqlResult::Success
                }
                DiagnosticField::Number => {
                    buffer.put_i32(self.status_records.len() as i32);
                    SqlResult::Success
                }
                DiagnosticField::ReturnCode => {
                    buffer.put_i16(self.return_code());
                    SqlResult::Success
                }
                DiagnosticField::RowCount => {
                    buffer.put_i64(self.rows_affected);
                    SqlResult::Success
                }
                _ => SqlResult::Error,
            };
        }

        let Some(record) = self.status_record(rec_num) else {
            return SqlResult::NoData;
        };
        if field.is_header_field() {
            return SqlResult::Error;
        }

        match field {
            DiagnosticField::ClassOrigin => buffer.put_string(record.class_origin()),
            DiagnosticField::ColumnNumber => buffer.put_i32(record.column_number()),
            DiagnosticField::ConnectionName => buffer.put_string(record.connection_name()),
            DiagnosticField::MessageText => buffer.put_string(record.message()),
            DiagnosticField::Native => buffer.put_i32(0),
            DiagnosticField::RowNumber => buffer.put_i64(i64::from(record.row_number())),
            DiagnosticField::ServerName => buffer.put_string(record.server_name()),
            DiagnosticField::SqlState => buffer.put_string(record.sql_state()),
            DiagnosticField::SubclassOrigin => buffer.put_string(record.subclass_origin()),
            _ => return SqlResult::Error,
        };
        SqlResult::Success
    }
}
