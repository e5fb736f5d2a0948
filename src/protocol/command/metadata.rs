use crate::constant::CommandByte;
use crate::error::{Error, Result};
use crate::meta::{ColumnMeta, TableMeta};
use crate::protocol::binary::{BinaryReader, write_string};
use crate::protocol::primitive::*;
use crate::protocol::response::read_response_status;

/// Write GET_COLUMNS_META command. Every filter is a tagged string.
pub fn write_get_columns_meta(out: &mut Vec<u8>, schema: &str, table: &str, column: &str) -> Result<()> {
    write_int_1(out, CommandByte::GetColumnsMeta as u8);
    write_string(out, Some(schema))?;
    write_string(out, Some(table))?;
    write_string(out, Some(column))
}

/// Write GET_TABLES_META command
pub fn write_get_tables_meta(
    out: &mut Vec<u8>,
    catalog: &str,
    schema: &str,
    table: &str,
    table_type: &str,
) -> Result<()> {
    write_int_1(out, CommandByte::GetTablesMeta as u8);
    write_string(out, Some(catalog))?;
    write_string(out, Some(schema))?;
    write_string(out, Some(table))?;
    write_string(out, Some(table_type))
}

fn read_list<T>(
    payload: &[u8],
    min_entry_len: usize,
    read: impl Fn(&mut BinaryReader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let mut reader = read_response_status(payload)?;
    let count = reader.read_len()?;
    if count > reader.remaining().len() / min_entry_len {
        return Err(Error::InvalidPacket);
    }
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(read(&mut reader)?);
    }
    Ok(items)
}

/// Read GET_COLUMNS_META response
pub fn read_columns_meta_response(payload: &[u8]) -> Result<Vec<ColumnMeta>> {
    read_list(payload, 5, ColumnMeta::read)
}

/// Read GET_TABLES_META response
pub fn read_tables_meta_response(payload: &[u8]) -> Result<Vec<TableMeta>> {
    read_list(payload, 4, TableMeta::read)
}
