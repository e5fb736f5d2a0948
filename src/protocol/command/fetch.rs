use crate::constant::CommandByte;
use crate::error::{Error, Result};
use crate::protocol::binary::{write_i32, write_i64};
use crate::protocol::primitive::*;
use crate::protocol::response::read_response_status;

/// Write FETCH command
pub fn write_fetch(out: &mut Vec<u8>, query_id: i64, page_size: i32) {
    write_int_1(out, CommandByte::FetchSqlQuery as u8);
    write_i64(out, query_id);
    write_i32(out, page_size);
}

/// One page of rows
///
/// `data` holds `row_count` rows back to back, each
/// `[i32 column count][tagged column values]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub query_id: i64,
    pub last: bool,
    pub row_count: i32,
    pub data: Vec<u8>,
}

/// Read FETCH response
pub fn read_fetch_response(payload: &[u8]) -> Result<ResultPage> {
    let mut reader = read_response_status(payload)?;
    let query_id = reader.read_i64()?;
    let last = reader.read_bool()?;
    let row_count = reader.read_i32()?;
    if row_count < 0 {
        return Err(Error::InvalidPacket);
    }
    Ok(ResultPage {
        query_id,
        last,
        row_count,
        data: reader.remaining().to_vec(),
    })
}
