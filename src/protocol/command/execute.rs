use crate::constant::CommandByte;
use crate::error::{Error, Result};
use crate::meta::ColumnMeta;
use crate::protocol::binary::{WireValue, wire_len, write_bool, write_i32, write_string};
use crate::protocol::primitive::*;
use crate::protocol::response::read_response_status;

/// Body of an EXECUTE request
#[derive(Debug, Clone, Copy)]
pub struct ExecuteRequest<'a> {
    pub sql: &'a str,
    pub distributed_joins: bool,
    pub page_size: i32,
    pub args: &'a [WireValue],
}

/// Write EXECUTE command
///
/// `[cmd][bool distributed_joins][string sql][i32 page_size][i32 argc][args...]`
pub fn write_execute(out: &mut Vec<u8>, req: &ExecuteRequest<'_>) -> Result<()> {
    write_int_1(out, CommandByte::ExecuteSqlQuery as u8);
    write_bool(out, req.distributed_joins);
    write_string(out, Some(req.sql))?;
    write_i32(out, req.page_size);
    write_i32(out, wire_len(req.args.len())?);
    for arg in req.args {
        arg.write(out)?;
    }
    Ok(())
}

/// Cursor handle and result-set shape returned by EXECUTE
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteResult {
    pub query_id: i64,
    pub columns: Vec<ColumnMeta>,
}

/// Read EXECUTE response
pub fn read_execute_response(payload: &[u8]) -> Result<ExecuteResult> {
    let mut reader = read_response_status(payload)?;
    let query_id = reader.read_i64()?;
    let count = reader.read_len()?;
    // Each entry is at least four null markers and a type byte
    if count > reader.remaining().len() / 5 {
        return Err(Error::InvalidPacket);
    }
    let mut columns = Vec::with_capacity(count);
    for _ in 0..count {
        columns.push(ColumnMeta::read(&mut reader)?);
    }
    Ok(ExecuteResult { query_id, columns })
}
