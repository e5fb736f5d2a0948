//! Synchronous client core for the Ignite ODBC endpoint.
//!
//! A [`Connection`] owns one framed TCP channel to a node. [`Statement`]s
//! borrow it to run SQL and catalog queries and to fetch rows into
//! caller-owned buffers ([`ApplicationDataBuffer`]). Failures surface as a
//! [`SqlResult`] plus diagnostic records instead of crossing the API boundary.

pub mod app;
mod buffer;
pub mod constant;
pub mod cursor;
pub mod decimal;
pub mod diagnostic;
pub mod error;
pub mod guid;
pub mod meta;
mod opts;
pub mod protocol;
pub mod query;
pub mod row;
pub mod sync;
pub mod type_traits;

pub use app::{ApplicationDataBuffer, ConversionResult};
pub use constant::{SqlResult, SqlType};
pub use decimal::Decimal;
pub use diagnostic::{DiagnosticField, HeaderDiagnosticRecord, SqlState, StatusDiagnosticRecord};
pub use error::{Error, Result};
pub use guid::Guid;
pub use meta::{AttributeValue, ColumnAttribute, ColumnMeta, TableMeta};
pub use opts::Opts;
pub use sync::{Connection, Statement};
pub use type_traits::BindingType;
