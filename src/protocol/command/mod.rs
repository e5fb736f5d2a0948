//! Request encoders and response decoders, one module per command.

pub mod close;
pub mod execute;
pub mod fetch;
pub mod metadata;

pub use close::{read_close_response, write_close};
pub use execute::{ExecuteRequest, ExecuteResult, read_execute_response, write_execute};
pub use fetch::{ResultPage, read_fetch_response, write_fetch};
pub use metadata::{
    read_columns_meta_response, read_tables_meta_response, write_get_columns_meta,
    write_get_tables_meta,
};
