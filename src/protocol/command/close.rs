use crate::constant::CommandByte;
use crate::error::Result;
use crate::protocol::binary::write_i64;
use crate::protocol::primitive::*;
use crate::protocol::response::read_response_status;

/// Write CLOSE command
pub fn write_close(out: &mut Vec<u8>, query_id: i64) {
    write_int_1(out, CommandByte::CloseSqlQuery as u8);
    write_i64(out, query_id);
}

/// Read CLOSE response, returning the id of the closed cursor
pub fn read_close_response(payload: &[u8]) -> Result<i64> {
    let mut reader = read_response_status(payload)?;
    reader.read_i64()
}
